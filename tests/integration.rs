use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use lan_transfer_server::server::AppState;
use lan_transfer_server::{ServerConfig, router};

const BOUNDARY: &str = "----lan-transfer-test-boundary";

// Helper to build the app over a temporary storage root
fn app_with(config: ServerConfig) -> Router {
    router(Arc::new(AppState::new(config)))
}

fn app(temp: &TempDir) -> Router {
    app_with(ServerConfig::with_storage_root(temp.path()))
}

// Helper to encode files as a multipart/form-data body
fn multipart_body(field: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (file_name, content) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn post_files(app: &Router, uri: &str, field: &str, files: &[(&str, &[u8])]) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, files)))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, HeaderMap, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

#[tokio::test]
async fn test_index_with_no_uploads() {
    let temp = TempDir::new().unwrap();
    let (status, headers, body) = get(&app(&temp), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("No files yet."));
    assert!(html.contains(r#"name="files""#));
    assert!(html.contains(r#"name="folder""#));
}

#[tokio::test]
async fn test_upload_counts_saved_and_skipped_items() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let (status, html) = post_files(
        &app,
        "/upload",
        "files",
        &[("notes.txt", &b"hello"[..]), ("", &b"ignored"[..])],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("1 files saved to"));
    assert!(html.contains("(1 skipped)"));
    assert_eq!(std::fs::read(temp.path().join("notes.txt")).unwrap(), b"hello");
}

#[tokio::test]
async fn test_listing_shows_exactly_uploaded_names() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    post_files(
        &app,
        "/upload",
        "files",
        &[("one.txt", &b"1"[..]), ("two.txt", &b"2"[..]), ("three.txt", &b"3"[..])],
    )
    .await;

    let (_, _, body) = get(&app, "/").await;
    let html = String::from_utf8(body).unwrap();
    for name in ["one.txt", "two.txt", "three.txt"] {
        assert!(html.contains(&format!(r#"href="/download/{name}""#)), "{name}");
    }
    assert_eq!(html.matches("<li>").count(), 3);
}

#[tokio::test]
async fn test_folder_upload_recreates_nested_paths() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let (status, html) = post_files(
        &app,
        "/upload_folder",
        "folder",
        &[("docs/readme.md", &b"# docs"[..]), ("docs/img/logo.png", &b"\x89PNG\r\n"[..])],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Folder uploaded with 2 files"));
    assert!(temp.path().join("docs").join("readme.md").is_file());
    assert_eq!(
        std::fs::read(temp.path().join("docs").join("img").join("logo.png")).unwrap(),
        b"\x89PNG\r\n"
    );

    let (_, _, body) = get(&app, "/").await;
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("<li>docs/</li>"));
}

#[tokio::test]
async fn test_nested_upload_then_download_round_trips() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);
    let payload: &[u8] = b"binary \x00\x01\x02 payload";

    post_files(&app, "/upload_folder", "folder", &[("a/b/c.txt", payload)]).await;
    let (status, headers, body) = get(&app, "/download/a/b/c.txt").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, payload);
    assert_eq!(headers[header::CONTENT_LENGTH], payload.len().to_string().as_str());
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment;"));
    assert!(disposition.contains("filename=\"c.txt\""));
}

#[tokio::test]
async fn test_download_with_encoded_name() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("my notes.txt"), b"spaced").unwrap();

    let (status, _, body) = get(&app(&temp), "/download/my%20notes.txt").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"spaced");
}

#[tokio::test]
async fn test_download_traversal_is_not_found() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("uploads");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(temp.path().join("passwd"), b"root:x:0:0").unwrap();
    let app = app_with(ServerConfig::with_storage_root(&root));

    for uri in [
        "/download/..%2F..%2Fetc%2Fpasswd",
        "/download/..%2Fpasswd",
        "/download/%2Fetc%2Fpasswd",
    ] {
        let (status, _, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(!String::from_utf8_lossy(&body).contains("root:x"));
    }
}

#[tokio::test]
async fn test_download_missing_file_and_directory_are_not_found() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("docs")).unwrap();
    let app = app(&temp);

    let (status, _, body) = get(&app, "/download/missing.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(String::from_utf8(body).unwrap().contains("File not found"));

    let (status, _, _) = get(&app, "/download/docs").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_escaping_upload_is_skipped() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("uploads");
    std::fs::create_dir(&root).unwrap();
    let app = app_with(ServerConfig::with_storage_root(&root));

    let (status, html) = post_files(&app, "/upload_folder", "folder", &[("../evil.txt", &b"x"[..])]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Folder uploaded with 0 files (1 skipped)"));
    assert!(!temp.path().join("evil.txt").exists());
    assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
}

#[tokio::test]
async fn test_upload_message_names_only_the_folder() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("uploads");
    std::fs::create_dir(&root).unwrap();
    let app = app_with(ServerConfig::with_storage_root(&root));

    let (status, html) = post_files(&app, "/upload", "files", &[("notes.txt", &b"hi"[..])]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("1 files saved to uploads"));
    assert!(!html.contains(&*temp.path().to_string_lossy()));
}

#[tokio::test]
async fn test_fields_with_other_names_are_ignored() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let (status, html) = post_files(&app, "/upload", "folder", &[("stray.txt", &b"x"[..])]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("0 files saved to"));
    assert!(!temp.path().join("stray.txt").exists());
}

#[tokio::test]
async fn test_reupload_overwrites_previous_content() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    post_files(&app, "/upload", "files", &[("same.txt", &b"old content"[..])]).await;
    post_files(&app, "/upload", "files", &[("same.txt", &b"new"[..])]).await;

    let (_, _, body) = get(&app, "/download/same.txt").await;
    assert_eq!(body, b"new");
}

#[tokio::test]
async fn test_oversized_file_is_skipped_and_server_keeps_serving() {
    let temp = TempDir::new().unwrap();
    let mut config = ServerConfig::with_storage_root(temp.path());
    config.max_file_size_mb = 1;
    let app = app_with(config);
    let big = vec![b'x'; 1024 * 1024 + 1];

    let (status, html) = post_files(
        &app,
        "/upload",
        "files",
        &[("big.bin", &big[..]), ("small.txt", &b"ok"[..])],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("1 files saved to"));
    assert!(html.contains("(1 skipped)"));
    assert!(!temp.path().join("big.bin").exists());

    let (status, _, body) = get(&app, "/download/small.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}
