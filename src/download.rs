// MyPC Gateway - Download Gateway
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Mints shareable download URLs and serves file bytes over HTTP, both
// under the safe-zone policy. Local agent reads are unrestricted, but
// download exposes bytes over the network, so it carries its own zone
// check on top of the (always-allowing) Read gate decision.
//
// KNOWN WEAKNESS, kept deliberately: URLs are unsigned and never
// expire. The absolute path is the only credential, so anyone holding
// a URL can fetch that zone file indefinitely.

use crate::gate::{OperationKind, PathQuery};
use crate::router::AppState;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::io::ReaderStream;
use url::Url;

/// Download gateway failures. HTTP mapping: MissingParameter → 400,
/// NotFound/NotAFile → 404, OutsideSafeZone → 403.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("File does not exist: {0}")]
    NotFound(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("File is not in a safe zone: {0}")]
    OutsideSafeZone(String),

    #[error("Missing 'path' parameter")]
    MissingParameter,

    #[error("Invalid base URL: {0}")]
    BadBaseUrl(#[from] url::ParseError),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Build a shareable URL for a zone-contained file. The absolute path
/// is URL-encoded into the `path` query parameter under /download.
pub fn build_url(state: &AppState, path: &str) -> Result<Url, DownloadError> {
    let target = Path::new(path);
    if !target.exists() {
        return Err(DownloadError::NotFound(path.to_string()));
    }
    if !target.is_file() {
        return Err(DownloadError::NotAFile(path.to_string()));
    }
    if !state.gate.zones().is_in_any_zone(path) {
        return Err(DownloadError::OutsideSafeZone(path.to_string()));
    }

    let url = Url::parse_with_params(
        &format!("{}/download", state.config.base_url()),
        &[("path", path)],
    )?;
    Ok(url)
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub path: Option<String>,
}

fn text_response(status: StatusCode, body: &str) -> Response {
    (status, body.to_string()).into_response()
}

/// GET /download?path=<url-encoded absolute path>
///
/// 400 if the parameter is missing, 404 if the path does not exist,
/// 403 if it exists but lies outside every safe zone. The Read gate
/// decision is consulted first (it always allows; the agent runs with
/// host trust); the explicit zone check below is the network-boundary
/// enforcement and must stay a separate check.
pub async fn serve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DownloadParams>,
) -> Response {
    let Some(path) = params.path else {
        return text_response(StatusCode::BAD_REQUEST, "Error: Missing 'path' parameter.");
    };

    let target = Path::new(&path);
    if !target.exists() {
        return text_response(StatusCode::NOT_FOUND, "Error: File not found.");
    }
    if !target.is_file() {
        return text_response(StatusCode::NOT_FOUND, "Error: Not a file.");
    }

    let read = state.gate.decide(&PathQuery::new(OperationKind::Read, &path));
    debug_assert!(read.allowed, "Read must be unrestricted: {}", read.reason);

    if !state.gate.zones().is_in_any_zone(&path) {
        log::warn!("Download denied (outside safe zones): {}", path);
        return text_response(
            StatusCode::FORBIDDEN,
            "Error: Access denied. File is not in a Safe Zone.",
        );
    }

    let file = match tokio::fs::File::open(target).await {
        Ok(f) => f,
        Err(e) => {
            log::warn!("Download open failed for {}: {}", path, e);
            return text_response(StatusCode::NOT_FOUND, "Error: File not found.");
        }
    };

    let filename = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', "_"));
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"download\""));

    log::info!("Serving download: {}", path);

    let stream = ReaderStream::new(file);
    let mut response = Body::from_stream(stream).into_response();
    response.headers_mut().insert(header::CONTENT_DISPOSITION, disposition);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    response
}

// ============================================================================
// TESTS
// ============================================================================
