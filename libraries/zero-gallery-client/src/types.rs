//! Types for ZeroGallery API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Request deadline used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to a ZeroGallery server.
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Service root (e.g., "http://localhost:5000")
    pub base_url: String,
    /// Sent as `X-Access-Token` on every request
    pub access_token: Option<String>,
    /// Deadline for a whole request, body included
    pub timeout: Duration,
}

impl GalleryConfig {
    /// Create a config with just the URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a config with an access token.
    pub fn with_token(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: Some(access_token.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Albums
// =============================================================================

/// Album as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlbumInfo {
    pub id: i64,
    pub image_preview_id: i64,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    pub is_protected: bool,
}

/// Request body for album creation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumInfo {
    pub name: String,
    pub description: String,
    /// Token protecting the album; uploads must present it
    pub token: String,
    pub allow_remove_data: bool,
}

// =============================================================================
// Data
// =============================================================================

/// Metadata of one stored file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataInfo {
    pub id: i64,
    pub album_id: i64,
    /// Size in bytes
    pub size: i64,
    /// Milliseconds since the Unix epoch
    pub created_timestamp: i64,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub extension: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub mime_type: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub tags: String,
}

impl DataInfo {
    /// Creation time with millisecond precision.
    ///
    /// Returns `None` only for timestamps outside the representable range.
    pub fn creation_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_timestamp)
    }

    /// Human readable size using 1024-based units ("1.5 KB", "3.0 MB").
    pub fn formatted_size(&self) -> String {
        format_size(self.size)
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }
}

// The server serialises unset strings as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Render a byte count with one decimal place and K/M/G/T/P/E units.
pub fn format_size(size: i64) -> String {
    const UNIT: i64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if size < UNIT {
        return format!("{} B", size);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = size / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.1} {}B", size as f64 / div as f64, PREFIXES[exp])
}

// =============================================================================
// Upload Types
// =============================================================================

/// Upload response body: one ID for a single part, an array otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UploadedIds {
    One(i64),
    Many(Vec<i64>),
}

impl UploadedIds {
    pub(crate) fn into_vec(self) -> Vec<i64> {
        match self {
            UploadedIds::One(id) => vec![id],
            UploadedIds::Many(ids) => ids,
        }
    }
}

// =============================================================================
// Download Types
// =============================================================================

/// Progress information during download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub data_id: i64,
    pub bytes_received: u64,
    /// Declared content length, if the server sent one
    pub bytes_total: Option<u64>,
}

impl DownloadProgress {
    /// Progress as 0.0 to 1.0, when the total is known.
    pub fn fraction(&self) -> Option<f32> {
        match self.bytes_total {
            Some(0) | None => None,
            Some(total) => Some(self.bytes_received as f32 / total as f32),
        }
    }
}

/// Byte range requested from a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteRange {
    /// Whole resource, no `Range` header
    #[default]
    Full,
    /// From `start` to the end of the resource
    From(u64),
    /// From the beginning up to `end`
    To(u64),
    /// Inclusive `start..=end`
    Between(u64, u64),
}

impl ByteRange {
    /// Value for the `Range` request header.
    pub fn header_value(&self) -> Option<String> {
        match self {
            ByteRange::Full => None,
            ByteRange::From(start) => Some(format!("bytes={}-", start)),
            ByteRange::To(end) => Some(format!("bytes=-{}", end)),
            ByteRange::Between(start, end) => Some(format!("bytes={}-{}", start, end)),
        }
    }
}

/// Headers returned alongside a video stream, verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoStreamHeaders {
    /// 200 for a full body, 206 for a partial one
    pub status: u16,
    pub content_range: Option<String>,
    pub content_length: Option<String>,
    pub content_type: Option<String>,
}

impl VideoStreamHeaders {
    pub fn is_partial(&self) -> bool {
        self.status == 206
    }

    /// Parsed `Content-Range`, when present and well formed.
    pub fn parsed_range(&self) -> Option<ContentRange> {
        self.content_range.as_deref().and_then(ContentRange::parse)
    }
}

/// Parsed `Content-Range: bytes <start>-<end>/<total>` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    pub end: u64,
    /// `None` when the server answered `*`
    pub total: Option<u64>,
}

impl ContentRange {
    pub fn parse(value: &str) -> Option<Self> {
        let spec = value.trim().strip_prefix("bytes ")?;
        let (range, total) = spec.split_once('/')?;
        let (start, end) = range.split_once('-')?;

        let start = start.trim().parse().ok()?;
        let end = end.trim().parse().ok()?;
        if start > end {
            return None;
        }

        let total = match total.trim() {
            "*" => None,
            t => Some(t.parse().ok()?),
        };

        Some(Self { start, end, total })
    }

    /// Number of bytes covered by the range.
    pub fn byte_count(&self) -> u64 {
        self.end - self.start + 1
    }
}
