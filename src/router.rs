// MyPC Gateway - Combined HTTP Router
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Single-port dispatch: /download and /screenshots are plain HTTP
// surfaces, everything else falls through to the MCP transport. One
// router, one listener, one shared state.

use crate::config::GatewayConfig;
use crate::download;
use crate::gate::PermissionGate;
use crate::mcp;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Shared state for every HTTP surface. The gate and config are
/// immutable after startup, so a plain Arc is all the sharing needed.
pub struct AppState {
    pub gate: PermissionGate,
    pub config: GatewayConfig,
}

/// Rewrite the inbound Host header to the expected local origin before
/// routing. The MCP transport validates Host strictly, which would
/// lock out every non-local client (phones, other machines on the
/// LAN); rewriting upstream makes that validation always pass.
///
/// KNOWN WEAKNESS, kept deliberately: this neutralizes the transport's
/// Host check as a DNS-rebinding defense. The zone gate remains the
/// real enforcement layer.
pub async fn rewrite_host(State(state): State<Arc<AppState>>, mut request: Request) -> Request {
    let expected = state.config.expected_host();
    if let Ok(value) = HeaderValue::from_str(&expected) {
        request.headers_mut().insert(header::HOST, value);
    }
    request
}

/// Build the combined router. Route precedence: exact paths first,
/// the screenshots static mount next, MCP as the fallback for all
/// remaining methods and paths.
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/download", get(download::serve))
        .nest_service(
            "/screenshots",
            ServeDir::new(&state.config.screenshots_dir),
        )
        .fallback(mcp::handle)
        .layer(axum::middleware::map_request_with_state(
            state.clone(),
            rewrite_host,
        ))
        .with_state(state)
}

// ============================================================================
// TESTS
// ============================================================================
