//! ZeroGallery Client
//!
//! HTTP client library for the ZeroGallery media gallery API.
//!
//! # Features
//!
//! - **Albums**: list, create and delete albums
//! - **Data**: list album contents, delete items
//! - **Upload**: single and multi-file multipart uploads, streamed from disk
//! - **Download**: streamed downloads with progress reporting, previews
//! - **Video**: ranged (partial content) requests for seekable playback
//!
//! # Example
//!
//! ```ignore
//! use zero_gallery_client::{ByteRange, CreateAlbumInfo, GalleryClient, GalleryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GalleryClient::new(GalleryConfig::with_token(
//!         "http://localhost:5000",
//!         "secret",
//!     ))?;
//!
//!     let album = client
//!         .create_album(&CreateAlbumInfo {
//!             name: "Holidays".into(),
//!             description: "Summer 2024".into(),
//!             token: "album-token".into(),
//!             allow_remove_data: true,
//!         })
//!         .await?;
//!
//!     let id = client.upload_file("beach.mp4", album.id).await?;
//!
//!     // First megabyte only
//!     let (mut stream, headers) = client
//!         .get_video_stream(id, ByteRange::Between(0, 1024 * 1024 - 1))
//!         .await?;
//!     println!("{:?}", headers.content_range);
//!     while let Some(chunk) = stream.chunk().await? {
//!         println!("{} bytes", chunk.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod download;
mod error;
mod library;
mod stream;
mod types;
mod upload;

// Re-export main types
pub use client::{GalleryClient, ACCESS_TOKEN_HEADER};
pub use error::{GalleryError, Result};
pub use stream::{DataStream, ProgressStream};
pub use types::{
    format_size, AlbumInfo, ByteRange, ContentRange, CreateAlbumInfo, DataInfo,
    DownloadProgress, GalleryConfig, VideoStreamHeaders, DEFAULT_TIMEOUT,
};
