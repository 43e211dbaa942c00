//! Checkout form handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use payjp_checkout_core::{OrderId, UserId};
use payjp_checkout_gateway::CheckoutInfo;

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Query for the checkout form configuration.
#[derive(Debug, Deserialize)]
pub struct ConfigQuery {
    /// Signed-in user, if any.
    pub user_id: Option<u64>,
    /// Order being paid on the order pay page.
    pub order_id: Option<u64>,
    /// Order key presented on the order pay page.
    pub order_key: Option<String>,
}

/// Data the checkout form needs to render and tokenize.
pub async fn checkout_config(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Query(query): Query<ConfigQuery>,
) -> Result<Json<CheckoutInfo>, ApiError> {
    let user_id = query.user_id.map(UserId::new);

    let pay_page = match (query.order_id, query.order_key) {
        (Some(order_id), Some(order_key)) => Some((
            state.orders.get_order(OrderId::new(order_id)).await?,
            order_key,
        )),
        _ => None,
    };

    let info = state.gateway.checkout_info(
        user_id.as_ref(),
        pay_page.as_ref().map(|(order, key)| (order, key.as_str())),
    )?;
    Ok(Json(info))
}

/// Query for order availability.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Order key presented on the order pay page.
    pub order_key: Option<String>,
    /// Whether the buyer's request arrived over TLS.
    #[serde(default)]
    pub secure: bool,
}

/// Availability response.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Whether the gateway can be offered for the order.
    pub available: bool,
}

/// Whether the gateway can be offered for an order.
pub async fn order_availability(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(order_id): Path<u64>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let available = state
        .gateway
        .order_availability(
            OrderId::new(order_id),
            query.order_key.as_deref(),
            query.secure,
        )
        .await?;
    Ok(Json(AvailabilityResponse { available }))
}
