//! Maintenance handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Purge response.
#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    /// Number of customer records removed.
    pub removed: usize,
}

/// Delete every test-mode customer record.
pub async fn purge_test_data(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
) -> Result<Json<PurgeResponse>, ApiError> {
    tracing::info!(service = %auth.service_name, "Purging test-mode customer records");
    let removed = state.gateway.purge_test_data()?;
    Ok(Json(PurgeResponse { removed }))
}
