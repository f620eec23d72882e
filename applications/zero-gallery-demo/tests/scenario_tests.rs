/// Walkthrough tests
/// Runs the full demo against a mock gallery server
use std::path::Path;
use wiremock::matchers::{body_string_contains, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zero_gallery_client::{GalleryClient, GalleryConfig};
use zero_gallery_demo::{scenario, DemoSettings};

const ALBUM_ID: i64 = 3;

fn settings(work_dir: &Path, cleanup: bool) -> DemoSettings {
    DemoSettings {
        work_dir: work_dir.to_path_buf(),
        album_name: "Demo Test".to_string(),
        cleanup,
    }
}

fn item(id: i64, name: &str, mime_type: &str, size: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "albumId": ALBUM_ID,
        "size": size,
        "createdTimestamp": 1700000000000_i64,
        "name": name,
        "extension": "jpg",
        "description": "",
        "mimeType": mime_type,
        "tags": ""
    })
}

/// Mount a server that answers every step of the walkthrough
async fn mount_gallery(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2.1.0"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/albums"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": 1,
                "imagePreviewId": 0,
                "name": "Existing",
                "description": "",
                "isProtected": true
            }
        ])))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/album"))
        .and(body_string_contains("Demo Test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": ALBUM_ID,
            "imagePreviewId": 0,
            "name": "Demo Test",
            "description": "",
            "isProtected": false
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload/3"))
        .and(body_string_contains("name=\"file\"; filename=\"test_file.txt\""))
        .respond_with(ResponseTemplate::new(200).set_body_string("10"))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload/3"))
        .and(body_string_contains("name=\"files\"; filename=\"test1.txt\""))
        .respond_with(ResponseTemplate::new(200).set_body_string("[11, 12, 13]"))
        .expect(1)
        .mount(server)
        .await;

    // The synthetic video is not valid UTF-8, so only this one matches it
    Mock::given(method("POST"))
        .and(path("/api/upload/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("20"))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/album/3/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            item(10, "photo", "image/jpeg", 2048),
            item(11, "test1", "text/plain", 19),
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/data/10"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 2048]))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/preview/10"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"thumb".to_vec()))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/data/20"))
        .and(header("Range", "bytes=0-1048575"))
        .respond_with(
            ResponseTemplate::new(206)
                .set_body_bytes(vec![0u8; 1024 * 1024])
                .insert_header("Content-Range", "bytes 0-1048575/10485760")
                .insert_header("Content-Type", "video/mp4"),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_walkthrough_with_cleanup() {
    let server = MockServer::start().await;
    mount_gallery(&server).await;

    Mock::given(method("DELETE"))
        .and(path_regex(r"^/api/data/\d+$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/album/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let work_dir = tempfile::tempdir().unwrap();
    let client = GalleryClient::new(GalleryConfig::with_token(server.uri(), "demo")).unwrap();

    let report = scenario::run(&client, &settings(work_dir.path(), true))
        .await
        .unwrap();

    assert_eq!(report.version, "2.1.0");
    assert_eq!(report.album_id, ALBUM_ID);
    assert_eq!(report.uploaded_id, Some(10));
    assert_eq!(report.batch_ids, vec![11, 12, 13]);
    assert_eq!(report.listed.len(), 2);
    assert_eq!(report.downloaded_bytes, Some(2048));
    assert!(report.preview_saved);
    assert_eq!(report.video_id, Some(20));
    assert_eq!(
        report.video_content_range.as_deref(),
        Some("bytes 0-1048575/10485760")
    );
    assert_eq!(report.video_bytes_received, Some(1024 * 1024));
    assert!(report
        .missing_album_error
        .as_deref()
        .unwrap()
        .contains("api/album/999999/data"));
    assert_eq!(report.deleted_data, vec![10, 11, 20]);
    assert!(report.album_deleted);

    // Generated and downloaded files are gone
    assert_eq!(std::fs::read_dir(work_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_walkthrough_without_cleanup_keeps_server_data() {
    let server = MockServer::start().await;
    mount_gallery(&server).await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let work_dir = tempfile::tempdir().unwrap();
    let client = GalleryClient::new(GalleryConfig::new(server.uri())).unwrap();

    let report = scenario::run(&client, &settings(work_dir.path(), false))
        .await
        .unwrap();

    assert!(report.deleted_data.is_empty());
    assert!(!report.album_deleted);
}

#[tokio::test]
async fn test_version_failure_aborts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let work_dir = tempfile::tempdir().unwrap();
    let client = GalleryClient::new(GalleryConfig::new(server.uri())).unwrap();

    let error = scenario::run(&client, &settings(work_dir.path(), false))
        .await
        .unwrap_err();
    assert!(error.to_string().contains("version"));
}

#[tokio::test]
async fn test_album_creation_failure_aborts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2.1.0"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/album"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database locked"))
        .mount(&server)
        .await;

    let work_dir = tempfile::tempdir().unwrap();
    let client = GalleryClient::new(GalleryConfig::new(server.uri())).unwrap();

    let error = scenario::run(&client, &settings(work_dir.path(), false))
        .await
        .unwrap_err();
    assert!(error.to_string().contains("create album"));
}

#[tokio::test]
async fn test_failing_steps_do_not_abort() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2.1.0"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/album"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": ALBUM_ID, "imagePreviewId": 0, "name": "Demo Test",
            "description": "", "isProtected": false
        })))
        .mount(&server)
        .await;

    // Everything else fails
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let work_dir = tempfile::tempdir().unwrap();
    let client = GalleryClient::new(GalleryConfig::new(server.uri())).unwrap();

    let report = scenario::run(&client, &settings(work_dir.path(), true))
        .await
        .unwrap();

    assert_eq!(report.album_id, ALBUM_ID);
    assert!(report.uploaded_id.is_none());
    assert!(report.batch_ids.is_empty());
    assert!(report.listed.is_empty());
    assert!(report.downloaded_bytes.is_none());
    assert!(report.video_id.is_none());
    assert!(report.missing_album_error.is_some());
    assert!(!report.album_deleted);
    assert_eq!(std::fs::read_dir(work_dir.path()).unwrap().count(), 0);
}
