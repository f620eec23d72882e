//! Preview, download and video stream operations.

use crate::client::{check_status, GalleryClient};
use crate::error::{GalleryError, Result};
use crate::stream::{copy_chunks, DataStream};
use crate::types::{ByteRange, DownloadProgress, VideoStreamHeaders};
use reqwest::header::{HeaderMap, HeaderName, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use reqwest::{Method, StatusCode};
use std::path::Path;
use tokio::fs::File;
use tracing::{debug, info};

impl GalleryClient {
    /// Open the preview image of a data item.
    pub async fn get_preview(&self, data_id: i64) -> Result<DataStream> {
        let endpoint = format!("api/preview/{}", data_id);
        let response = self
            .execute(self.request(Method::GET, &endpoint).await, &endpoint)
            .await?;

        Ok(DataStream::new(response))
    }

    /// Write the preview image of a data item to `output_path`.
    pub async fn save_preview(&self, data_id: i64, output_path: impl AsRef<Path>) -> Result<()> {
        let output_path = output_path.as_ref();
        let preview = self.get_preview(data_id).await?;

        let mut file = File::create(output_path).await?;
        let size = preview.copy_to(&mut file).await?;

        debug!(data_id, dest = %output_path.display(), size, "Preview saved");
        Ok(())
    }

    /// Open the full contents of a data item.
    pub async fn get_data(&self, data_id: i64) -> Result<DataStream> {
        let endpoint = format!("api/data/{}", data_id);
        let response = self
            .execute(self.request(Method::GET, &endpoint).await, &endpoint)
            .await?;

        Ok(DataStream::new(response))
    }

    /// Download a data item to `output_path`.
    pub async fn download_data(&self, data_id: i64, output_path: impl AsRef<Path>) -> Result<()> {
        let output_path = output_path.as_ref();
        let data = self.get_data(data_id).await?;

        let mut file = File::create(output_path).await?;
        let size = data.copy_to(&mut file).await?;

        info!(data_id, dest = %output_path.display(), size, "Data downloaded");
        Ok(())
    }

    /// Download a data item to `output_path`, reporting every received chunk.
    ///
    /// `progress_callback` gets the running byte count and the declared
    /// content length (`None` if the server sent none).
    pub async fn download_data_with_progress<F>(
        &self,
        data_id: i64,
        output_path: impl AsRef<Path>,
        progress_callback: F,
    ) -> Result<()>
    where
        F: FnMut(DownloadProgress) + Unpin,
    {
        let output_path = output_path.as_ref();
        let data = self.get_data(data_id).await?;
        debug!(data_id, total = ?data.content_length(), "Downloading data");

        let mut file = File::create(output_path).await?;
        let size = copy_chunks(data.with_progress(data_id, progress_callback), &mut file).await?;

        info!(data_id, dest = %output_path.display(), size, "Data downloaded");
        Ok(())
    }

    /// Open a data item for playback, optionally restricted to a byte range.
    ///
    /// Only 200 (full body) and 206 (partial body) are accepted.
    pub async fn get_video_stream(
        &self,
        data_id: i64,
        range: ByteRange,
    ) -> Result<(DataStream, VideoStreamHeaders)> {
        let endpoint = format!("api/data/{}", data_id);
        let mut request = self.request(Method::GET, &endpoint).await;
        if let Some(value) = range.header_value() {
            debug!(data_id, range = %value, "Requesting byte range");
            request = request.header(RANGE, value);
        }

        let response = self.send(request).await?;
        let response = check_status(response, &endpoint).await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
            return Err(GalleryError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let headers = video_headers(status.as_u16(), response.headers());
        Ok((DataStream::new(response), headers))
    }
}

fn video_headers(status: u16, headers: &HeaderMap) -> VideoStreamHeaders {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    VideoStreamHeaders {
        status,
        content_range: header(CONTENT_RANGE),
        content_length: header(CONTENT_LENGTH),
        content_type: header(CONTENT_TYPE),
    }
}
