//! Multipart upload operations.

use crate::client::GalleryClient;
use crate::error::{GalleryError, Result};
use crate::types::UploadedIds;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

impl GalleryClient {
    /// Upload a local file.
    ///
    /// The part is named after the file's base name. `album_id <= 0` uploads
    /// outside of any album.
    pub async fn upload_file(&self, file_path: impl AsRef<Path>, album_id: i64) -> Result<i64> {
        let file_path = file_path.as_ref();
        let file_name = file_name_of(file_path)?;

        debug!(file = %file_path.display(), album_id, "Uploading file");
        let file = File::open(file_path).await?;

        self.upload_file_reader(file, &file_name, album_id).await
    }

    /// Upload the contents of `reader` as a file called `filename`.
    ///
    /// Bytes are streamed into the multipart body as they are read.
    pub async fn upload_file_reader<R>(
        &self,
        reader: R,
        filename: &str,
        album_id: i64,
    ) -> Result<i64>
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        let body = Body::wrap_stream(ReaderStream::new(reader));
        let part = file_part(Part::stream(body), filename)?;
        let form = Form::new().part("file", part);

        let id: i64 = self.post_upload(form, album_id).await?;
        info!(data_id = id, file = %filename, album_id, "File uploaded");
        Ok(id)
    }

    /// Upload an in-memory buffer as a file called `filename`.
    pub async fn upload_file_data(
        &self,
        data: impl Into<Vec<u8>>,
        filename: &str,
        album_id: i64,
    ) -> Result<i64> {
        let data = data.into();
        let size = data.len();
        let part = file_part(Part::bytes(data), filename)?;
        let form = Form::new().part("file", part);

        let id: i64 = self.post_upload(form, album_id).await?;
        info!(data_id = id, file = %filename, size, album_id, "Data uploaded");
        Ok(id)
    }

    /// Upload several local files in one multipart request.
    ///
    /// Parts are written in the order given, but the order of the returned IDs
    /// is chosen by the server and need not match.
    pub async fn upload_multiple_files<P>(
        &self,
        file_paths: &[P],
        album_id: i64,
    ) -> Result<Vec<i64>>
    where
        P: AsRef<Path>,
    {
        if file_paths.is_empty() {
            return Err(GalleryError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "No files to upload",
            )));
        }

        let mut form = Form::new();
        for file_path in file_paths {
            let file_path = file_path.as_ref();
            let file_name = file_name_of(file_path)?;
            let file = File::open(file_path).await?;

            let body = Body::wrap_stream(ReaderStream::new(file));
            form = form.part("files", file_part(Part::stream(body), &file_name)?);
        }

        debug!(files = file_paths.len(), album_id, "Uploading files");
        let ids: UploadedIds = self.post_upload(form, album_id).await?;
        let ids = ids.into_vec();

        info!(files = file_paths.len(), ids = ?ids, album_id, "Files uploaded");
        Ok(ids)
    }

    async fn post_upload<T>(&self, form: Form, album_id: i64) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let endpoint = upload_endpoint(album_id);
        let request = self.request(Method::POST, &endpoint).await.multipart(form);

        let response = self.send(request).await?;
        let response = check_upload_status(response, &endpoint).await?;

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| GalleryError::Parse(format!("Failed to parse upload response: {}", e)))
    }
}

/// `api/upload` for `album_id <= 0`, `api/upload/{album_id}` otherwise.
pub(crate) fn upload_endpoint(album_id: i64) -> String {
    if album_id > 0 {
        format!("api/upload/{}", album_id)
    } else {
        "api/upload".to_string()
    }
}

// Uploads accept 200 only; 401 keeps its own variant.
async fn check_upload_status(response: Response, endpoint: &str) -> Result<Response> {
    let status = response.status();

    if status == StatusCode::OK {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        warn!(endpoint = %endpoint, "Upload rejected: unauthorized");
        return Err(GalleryError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(endpoint = %endpoint, status = %status, body = %body, "Upload failed");
    Err(GalleryError::Upload {
        status: status.as_u16(),
        body,
    })
}

fn file_part(part: Part, file_name: &str) -> Result<Part> {
    Ok(part
        .file_name(file_name.to_string())
        .mime_str(mime_type_for_file(file_name).as_ref())?)
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            GalleryError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid file name: {}", path.display()),
            ))
        })
}

/// MIME type guessed from the file name.
fn mime_type_for_file(file_name: &str) -> mime_guess::Mime {
    mime_guess::from_path(file_name).first_or_octet_stream()
}
