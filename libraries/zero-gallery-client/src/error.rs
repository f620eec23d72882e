//! Error types for the ZeroGallery client.

use thiserror::Error;

/// Errors that can occur when talking to a ZeroGallery server.
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Connection, DNS, timeout or body read failure
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server rejected the access token (HTTP 401)
    #[error("Unauthorized access")]
    Unauthorized,

    /// Endpoint answered 404
    #[error("Resource not found: {endpoint}")]
    NotFound { endpoint: String },

    /// Any other HTTP status >= 400
    #[error("API error: status={status}, body={body}")]
    Api { status: u16, body: String },

    /// Upload endpoint answered something other than 200
    #[error("Upload failed: status={status}, body={body}")]
    Upload { status: u16, body: String },

    /// Video stream answered neither 200 nor 206
    #[error("Unexpected status {status} for video stream")]
    UnexpectedStatus { status: u16 },

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid base URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Local filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GalleryError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            GalleryError::Unauthorized => Some(401),
            GalleryError::NotFound { .. } => Some(404),
            GalleryError::Api { status, .. }
            | GalleryError::Upload { status, .. }
            | GalleryError::UnexpectedStatus { status } => Some(*status),
            GalleryError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for gallery client operations.
pub type Result<T> = std::result::Result<T, GalleryError>;
