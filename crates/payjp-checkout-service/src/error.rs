//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use payjp_checkout_gateway::{GatewayError, OrderSystemError};

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - the order is not in a state that allows the operation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The gateway is disabled or not configured.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// External service error.
    #[error("external service error: {0}")]
    ExternalService(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            Self::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            Self::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                "external_service_error",
                msg.clone(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Validation(e) => Self::BadRequest(e.to_string()),
            GatewayError::MissingTransaction { order_id } => {
                Self::Conflict(format!("order {order_id} has not been charged"))
            }
            GatewayError::DataInconsistency(msg) => Self::Conflict(msg),
            GatewayError::Provider(_) => Self::ExternalService(err.operator_message()),
            GatewayError::Unavailable(msg) => Self::Unavailable(msg),
            GatewayError::OrderSystem(OrderSystemError::NotFound(order_id)) => {
                Self::NotFound(format!("order not found: {order_id}"))
            }
            GatewayError::OrderSystem(e) => Self::ExternalService(e.to_string()),
            GatewayError::ChargeNotRecorded { .. } | GatewayError::Store(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<OrderSystemError> for ApiError {
    fn from(err: OrderSystemError) -> Self {
        GatewayError::OrderSystem(err).into()
    }
}
