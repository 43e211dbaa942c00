//! Health check handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Active Pay.jp mode (`test` or `live`).
    pub mode: &'static str,
    /// Whether the gateway is enabled and has keys for the active mode.
    pub payments_ready: bool,
}

/// Health check endpoint. Public; reveals no keys.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let settings = state.gateway.settings();
    Json(HealthResponse {
        status: "ok",
        service: "payjp-checkout",
        version: env!("CARGO_PKG_VERSION"),
        mode: settings.mode.as_str(),
        payments_ready: settings.enabled && !settings.active_keys().secret_key.is_empty(),
    })
}
