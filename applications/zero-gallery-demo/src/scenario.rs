//! End-to-end walkthrough of the gallery API.
//!
//! Only the version check and album creation abort the run. Every other step
//! logs its failure and moves on, so one broken endpoint does not hide the
//! rest.

use crate::config::DemoSettings;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zero_gallery_client::{
    ByteRange, CreateAlbumInfo, DataInfo, DownloadProgress, GalleryClient, GalleryError,
};

/// Size of the synthetic video upload.
pub const VIDEO_SIZE: usize = 10 * 1024 * 1024;

/// Bytes requested from the start of the video.
pub const VIDEO_PROBE_SIZE: u64 = 1024 * 1024;

/// Album ID that is not expected to exist.
pub const MISSING_ALBUM_ID: i64 = 999_999;

const BATCH_FILES: [&str; 3] = ["test1.txt", "test2.txt", "test3.txt"];

/// What the walkthrough created and observed.
#[derive(Debug, Clone, Default)]
pub struct DemoReport {
    pub version: String,
    pub album_id: i64,
    /// Single file upload
    pub uploaded_id: Option<i64>,
    /// Multi-file upload, in server order
    pub batch_ids: Vec<i64>,
    /// Album contents listed after the uploads
    pub listed: Vec<DataInfo>,
    pub downloaded_bytes: Option<u64>,
    pub preview_saved: bool,
    pub video_id: Option<i64>,
    pub video_content_range: Option<String>,
    pub video_bytes_received: Option<usize>,
    /// Display text of the error returned for the missing album
    pub missing_album_error: Option<String>,
    pub deleted_data: Vec<i64>,
    pub album_deleted: bool,
}

/// Run the walkthrough against `client`.
pub async fn run(client: &GalleryClient, settings: &DemoSettings) -> Result<DemoReport> {
    let mut report = DemoReport::default();
    let mut scratch = Scratch::new(&settings.work_dir).await?;

    println!("Connecting to ZeroGallery at {}", client.base_url());

    report.version = client
        .get_version()
        .await
        .context("Failed to get API version")?;
    println!("API version: {}", report.version);

    list_albums(client).await;

    println!("\nCreating album...");
    let album = client
        .create_album(&CreateAlbumInfo {
            name: settings.album_name.clone(),
            description: "Test album created by the Rust client".to_string(),
            token: "secret-token".to_string(),
            allow_remove_data: true,
        })
        .await
        .context("Failed to create album")?;
    report.album_id = album.id;
    println!("Album created: {} (ID: {})", album.name, album.id);

    println!("\nUploading files...");
    report.uploaded_id = upload_single(client, &mut scratch, album.id).await;
    report.batch_ids = upload_batch(client, &mut scratch, album.id).await;

    println!("\nAlbum contents:");
    report.listed = match client.get_album_data(album.id).await {
        Ok(items) => {
            for item in &items {
                print_item(item);
            }
            items
        }
        Err(e) => {
            warn!(album_id = album.id, error = %e, "Failed to list album data");
            Vec::new()
        }
    };

    if let Some(item) = report.listed.first() {
        println!("\nDownloading {}...", item.name);
        report.downloaded_bytes = download_with_progress(client, &mut scratch, item).await;

        if item.is_image() {
            report.preview_saved = save_preview(client, &mut scratch, item).await;
        }
    }

    println!("\nVideo range request...");
    report.video_id = upload_video(client, album.id).await;
    if let Some(video_id) = report.video_id {
        if let Some((content_range, received)) = probe_video(client, video_id).await {
            report.video_content_range = content_range;
            report.video_bytes_received = Some(received);
        }
    }

    println!("\nError handling...");
    match client.get_album_data(MISSING_ALBUM_ID).await {
        Ok(items) => warn!(
            album_id = MISSING_ALBUM_ID,
            items = items.len(),
            "Missing album unexpectedly returned data"
        ),
        Err(e) => {
            println!("Expected error: {}", e);
            report.missing_album_error = Some(e.to_string());
        }
    }

    if settings.cleanup {
        println!("\nCleaning up...");
        let ids = report
            .listed
            .iter()
            .map(|item| item.id)
            .chain(report.video_id)
            .collect::<Vec<_>>();
        report.deleted_data = delete_data(client, &ids).await;

        match client.delete_album(album.id).await {
            Ok(()) => {
                println!("  Deleted album: {}", album.name);
                report.album_deleted = true;
            }
            Err(e) => warn!(album_id = album.id, error = %e, "Failed to delete album"),
        }
    }

    scratch.remove_all().await;
    println!("\nDone!");
    Ok(report)
}

async fn list_albums(client: &GalleryClient) {
    println!("\nAlbums:");
    match client.get_albums().await {
        Ok(albums) => {
            for album in albums {
                let lock = if album.is_protected { "locked" } else { "open" };
                println!("  [{}] {} (ID: {})", lock, album.name, album.id);
            }
        }
        Err(e) => warn!(error = %e, "Failed to list albums"),
    }
}

async fn upload_single(
    client: &GalleryClient,
    scratch: &mut Scratch,
    album_id: i64,
) -> Option<i64> {
    let path = scratch
        .write("test_file.txt", b"Test content from Rust client")
        .await
        .ok()?;

    match client.upload_file(&path, album_id).await {
        Ok(id) => {
            println!("Uploaded test_file.txt (ID: {})", id);
            Some(id)
        }
        Err(e) => {
            warn!(error = %e, "Failed to upload file");
            None
        }
    }
}

async fn upload_batch(client: &GalleryClient, scratch: &mut Scratch, album_id: i64) -> Vec<i64> {
    let mut paths = Vec::with_capacity(BATCH_FILES.len());
    for (i, name) in BATCH_FILES.iter().enumerate() {
        let content = format!("Test file {} content", i + 1);
        match scratch.write(name, content.as_bytes()).await {
            Ok(path) => paths.push(path),
            Err(_) => return Vec::new(),
        }
    }

    match client.upload_multiple_files(&paths, album_id).await {
        Ok(ids) => {
            println!("Uploaded {} files", ids.len());
            ids
        }
        Err(e) => {
            warn!(error = %e, "Failed to upload files");
            Vec::new()
        }
    }
}

fn print_item(item: &DataInfo) {
    println!(
        "  {} ({}) - {}",
        item.name,
        item.formatted_size(),
        item.mime_type
    );
    if let Some(created) = item.creation_time() {
        println!("     Created: {}", created.format("%Y-%m-%d %H:%M:%S"));
    }
}

async fn download_with_progress(
    client: &GalleryClient,
    scratch: &mut Scratch,
    item: &DataInfo,
) -> Option<u64> {
    let path = scratch.track(format!("downloaded_{}", local_name(item)));
    let mut received = 0;

    let result = client
        .download_data_with_progress(item.id, &path, |progress: DownloadProgress| {
            received = progress.bytes_received;
            if let Some(fraction) = progress.fraction() {
                print!(
                    "\r  Progress: {:.1}% [{}/{} bytes]",
                    fraction * 100.0,
                    progress.bytes_received,
                    progress.bytes_total.unwrap_or_default()
                );
                let _ = std::io::stdout().flush();
            }
        })
        .await;

    match result {
        Ok(()) => {
            println!("\nSaved: {}", path.display());
            Some(received)
        }
        Err(e) => {
            println!();
            warn!(data_id = item.id, error = %e, "Download failed");
            None
        }
    }
}

async fn save_preview(client: &GalleryClient, scratch: &mut Scratch, item: &DataInfo) -> bool {
    let path = scratch.track(format!("preview_{}", local_name(item)));

    match client.save_preview(item.id, &path).await {
        Ok(()) => {
            println!("Preview saved: {}", path.display());
            true
        }
        Err(e) => {
            warn!(data_id = item.id, error = %e, "Failed to save preview");
            false
        }
    }
}

async fn upload_video(client: &GalleryClient, album_id: i64) -> Option<i64> {
    let video: Vec<u8> = (0..VIDEO_SIZE).map(|i| (i % 256) as u8).collect();

    match client.upload_file_data(video, "test_video.mp4", album_id).await {
        Ok(id) => {
            debug!(data_id = id, size = VIDEO_SIZE, "Synthetic video uploaded");
            Some(id)
        }
        Err(e) => {
            warn!(error = %e, "Failed to upload video");
            None
        }
    }
}

async fn probe_video(client: &GalleryClient, video_id: i64) -> Option<(Option<String>, usize)> {
    let range = ByteRange::Between(0, VIDEO_PROBE_SIZE - 1);

    let result = match client.get_video_stream(video_id, range).await {
        Ok((stream, headers)) => stream.bytes().await.map(|body| (headers, body.len())),
        Err(e) => Err(e),
    };

    match result {
        Ok((headers, received)) => {
            println!("Received video fragment: {} bytes", received);
            println!(
                "   Content-Range: {}",
                headers.content_range.as_deref().unwrap_or("-")
            );
            println!(
                "   Content-Type: {}",
                headers.content_type.as_deref().unwrap_or("-")
            );
            Some((headers.content_range, received))
        }
        Err(e) => {
            warn!(data_id = video_id, error = %e, "Video stream failed");
            None
        }
    }
}

async fn delete_data(client: &GalleryClient, ids: &[i64]) -> Vec<i64> {
    let mut deleted = Vec::with_capacity(ids.len());
    for &id in ids {
        match client.delete_data(id).await {
            Ok(()) => {
                println!("  Deleted data: {}", id);
                deleted.push(id);
            }
            Err(GalleryError::NotFound { .. }) => debug!(data_id = id, "Already gone"),
            Err(e) => warn!(data_id = id, error = %e, "Failed to delete data"),
        }
    }
    deleted
}

/// Local file name for a listed item.
fn local_name(item: &DataInfo) -> String {
    let stem: String = item
        .name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if item.extension.is_empty() {
        format!("{}_{}", item.id, stem)
    } else {
        format!("{}_{}.{}", item.id, stem, item.extension.trim_start_matches('.'))
    }
}

/// Files the walkthrough creates under the work directory.
struct Scratch {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl Scratch {
    async fn new(dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create work directory {}", dir.display()))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            files: Vec::new(),
        })
    }

    fn track(&mut self, name: impl AsRef<Path>) -> PathBuf {
        let path = self.dir.join(name);
        self.files.push(path.clone());
        path
    }

    async fn write(&mut self, name: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.track(name);
        tokio::fs::write(&path, contents).await.map_err(|e| {
            warn!(file = %path.display(), error = %e, "Failed to create test file");
            e
        })?;
        Ok(path)
    }

    async fn remove_all(&mut self) {
        for path in self.files.drain(..) {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!(file = %path.display(), error = %e, "Failed to remove file");
                }
            }
        }
        info!(dir = %self.dir.display(), "Scratch files removed");
    }
}
