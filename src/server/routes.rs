//! HTTP routes
//!
//! `GET /` lists the storage root, `POST /upload` and `POST /upload_folder`
//! store multipart files, and `GET /download/{path}` streams a stored file.

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Router, middleware};
use futures_util::TryStreamExt;
use log::{info, warn};
use std::io;
use std::sync::Arc;
use tokio_util::io::{ReaderStream, StreamReader};

use crate::config::ServerConfig;
use crate::error::handlers::{error_to_status_code, handle_error, handle_upload_error};
use crate::middleware::log_request;
use crate::server::pages::{encode_path_segment, render_index, render_message};
use crate::storage::StorageDirectory;
use crate::transfer::{DownloadResult, UploadSummary, handle_download, store_item};

/// Multipart field carrying files for `/upload`
pub const FILES_FIELD: &str = "files";
/// Multipart field carrying files for `/upload_folder`
pub const FOLDER_FIELD: &str = "folder";

/// Shared, read-only state handed to every request
#[derive(Debug)]
pub struct AppState {
    pub storage: StorageDirectory,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            storage: StorageDirectory::new(config.storage_root_path()),
            config,
        }
    }
}

/// Builds the application router
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_request_size_bytes();

    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload_files))
        .route("/upload_folder", post(upload_folder))
        .route("/download/*filename", get(download_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> Response {
    match state.storage.list_entries().await {
        Ok(listing) => Html(render_index(&listing.entries)).into_response(),
        Err(e) => {
            handle_error(&e);
            error_page(StatusCode::INTERNAL_SERVER_ERROR, "Could not read the upload folder")
        }
    }
}

async fn upload_files(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let summary = receive_batch(&state, multipart, FILES_FIELD).await;
    let message = format!(
        "{} files saved to {}{}",
        summary.accepted,
        folder_label(state.storage.root()),
        skipped_note(&summary)
    );
    Html(render_message("Upload Successful", &message)).into_response()
}

async fn upload_folder(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let summary = receive_batch(&state, multipart, FOLDER_FIELD).await;
    let message = format!(
        "Folder uploaded with {} files{}",
        summary.accepted,
        skipped_note(&summary)
    );
    Html(render_message("Upload Successful", &message)).into_response()
}

async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    match handle_download(&state.storage, &filename).await {
        Ok(download) => attachment_response(download),
        Err(e) => {
            handle_error(&e);
            match error_to_status_code(&e) {
                StatusCode::NOT_FOUND => error_page(StatusCode::NOT_FOUND, "File not found"),
                status => error_page(status, "Could not read the requested file"),
            }
        }
    }
}

/// Stores each multipart field named `field_name` as it arrives.
///
/// Fields are streamed straight to disk one at a time. A body that breaks
/// off part way ends the batch with whatever was stored so far.
async fn receive_batch(state: &AppState, mut multipart: Multipart, field_name: &str) -> UploadSummary {
    let max_file_bytes = state.config.max_file_size_bytes();
    let mut summary = UploadSummary::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Multipart body ended early: {}", e);
                break;
            }
        };

        if field.name() != Some(field_name) {
            continue;
        }

        let client_path = field.file_name().unwrap_or_default().to_string();
        let reader = StreamReader::new(field.map_err(|e| io::Error::new(io::ErrorKind::Other, e)));
        tokio::pin!(reader);

        let outcome = store_item(&state.storage, &client_path, reader, max_file_bytes).await;
        if let Err(e) = &outcome {
            handle_upload_error(&client_path, e);
        }
        summary.record(&outcome);
    }

    info!(
        "Upload via '{}' finished: {} accepted, {} rejected, {} failed",
        field_name, summary.accepted, summary.rejected, summary.failed
    );

    summary
}

/// Last component of the storage root; the full host path stays private
fn folder_label(root: &std::path::Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "the upload folder".to_string())
}

fn skipped_note(summary: &UploadSummary) -> String {
    match summary.rejected + summary.failed {
        0 => String::new(),
        skipped => format!(" ({skipped} skipped)"),
    }
}

fn attachment_response(download: DownloadResult) -> Response {
    let mime = mime_guess::from_path(&download.file_name).first_or_octet_stream();

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(mime.essence_str()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(download.size));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&download.file_name))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    let body = Body::from_stream(ReaderStream::new(download.file));
    (StatusCode::OK, headers, body).into_response()
}

/// `attachment` disposition with an ASCII fallback name and the exact
/// UTF-8 name in `filename*`
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        encode_path_segment(file_name)
    )
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let title = status.canonical_reason().unwrap_or("Error");
    (status, Html(render_message(title, message))).into_response()
}
