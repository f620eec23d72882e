//! ZeroGallery Demo Library
//!
//! Configuration loading and the API walkthrough behind the
//! `zero-gallery-demo` binary.
//!
//! This library exposes the walkthrough for testing purposes.

pub mod config;
pub mod scenario;

// Re-export commonly used types for convenience
pub use config::{DemoConfig, DemoSettings, ServerSettings};
pub use scenario::{run, DemoReport};
