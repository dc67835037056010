//! Logging middleware
//!
//! Writes one access line per request.

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::Response;
use log::{info, warn};
use std::net::SocketAddr;
use std::time::Instant;

/// Log method, path, status, peer, and elapsed time for every request
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        warn!("{peer} {method} {path} -> {} ({elapsed_ms} ms)", status.as_u16());
    } else {
        info!("{peer} {method} {path} -> {} ({elapsed_ms} ms)", status.as_u16());
    }

    response
}
