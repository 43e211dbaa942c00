//! Payment and refund handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use payjp_checkout_core::{CheckoutSubmission, MinorUnits, OrderId};
use payjp_checkout_gateway::{NoticeBag, PaymentOutcome};

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Result of a payment attempt, as the checkout page consumes it.
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum PaymentResponse {
    /// The order was paid.
    Success {
        /// Provider transaction id.
        transaction_id: String,
    },
    /// The order is unpaid; show the notices and let the buyer retry.
    Failure {
        /// Buyer-facing notices.
        notices: NoticeBag,
    },
}

/// Submit a payment for an order.
pub async fn process_payment(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Path(order_id): Path<u64>,
    Json(submission): Json<CheckoutSubmission>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let order_id = OrderId::new(order_id);
    tracing::debug!(order_id = %order_id, service = %auth.service_name, "Payment submitted");

    let response = match state.gateway.process_payment(order_id, submission).await? {
        PaymentOutcome::Success { transaction_id } => PaymentResponse::Success {
            transaction_id: transaction_id.to_string(),
        },
        PaymentOutcome::Failure { notices, .. } => PaymentResponse::Failure { notices },
    };
    Ok(Json(response))
}

/// Refund request.
#[derive(Debug, Default, Deserialize)]
pub struct RefundBody {
    /// Amount in major units of the order currency; omitted for a full refund.
    #[serde(default)]
    pub amount: Option<String>,
    /// Free-text reason, forwarded as provider metadata.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Refund response.
#[derive(Debug, Serialize)]
pub struct RefundResponse {
    /// The refunded charge.
    pub transaction_id: String,
    /// Total refunded so far in minor units, when reported.
    pub amount_refunded: Option<i64>,
    /// Whether the charge is now fully refunded.
    pub refunded: bool,
}

/// Refund an order's charge.
pub async fn process_refund(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Path(order_id): Path<u64>,
    Json(body): Json<RefundBody>,
) -> Result<Json<RefundResponse>, ApiError> {
    let order_id = OrderId::new(order_id);
    tracing::info!(order_id = %order_id, service = %auth.service_name, "Refund requested");

    let result = state
        .gateway
        .process_refund(order_id, body.amount.as_deref(), body.reason)
        .await?;

    Ok(Json(RefundResponse {
        transaction_id: result.transaction_id.to_string(),
        amount_refunded: result.amount_refunded.map(MinorUnits::get),
        refunded: result.refunded,
    }))
}
