//! Gateway error types.

use payjp_checkout_client::ProviderError;
use payjp_checkout_core::{
    CardChoice, CardField, FieldError, OrderId, TransactionId, ValidationError,
};
use payjp_checkout_store::StoreError;

use crate::orders::OrderSystemError;

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Generic notice for any failure the buyer cannot act on.
pub const GENERIC_TRANSACTION_ERROR: &str = "Transaction Error: Could not complete your payment.";

/// Errors surfaced by the payment flows.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Rejected before any provider call.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The provider refused the call or could not be reached.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Refund requested for an order that was never charged.
    #[error("order {order_id} has no transaction id to refund")]
    MissingTransaction {
        /// The order.
        order_id: OrderId,
    },

    /// A stored customer or card reference no longer matches the provider.
    #[error("stored customer data is inconsistent: {0}")]
    DataInconsistency(String),

    /// The charge went through but the order could not be annotated with it.
    #[error("charge {transaction_id} succeeded but was not recorded on order {order_id}: {source}")]
    ChargeNotRecorded {
        /// The order.
        order_id: OrderId,
        /// The confirmed charge.
        transaction_id: TransactionId,
        /// Why the order system refused.
        #[source]
        source: OrderSystemError,
    },

    /// The gateway cannot be used for this order right now.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),

    /// Customer-record storage failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The order system failed.
    #[error("order system error: {0}")]
    OrderSystem(#[from] OrderSystemError),
}

impl GatewayError {
    /// The single notice shown to the buyer.
    ///
    /// Card errors and validation failures are worth showing verbatim; every
    /// other failure collapses into the generic transaction error so that no
    /// internal detail leaks to the checkout page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::AmountBelowMinimum { .. }) => {
                "Error: The order total is below the minimum amount that can be charged.".into()
            }
            Self::Validation(ValidationError::MissingToken) => {
                format!("Error: {}", FieldError::missing(CardField::CardNumber).message())
            }
            Self::Validation(ValidationError::InvalidCardChoice(_)) => {
                "Error: Please choose a valid saved card.".into()
            }
            Self::ChargeNotRecorded { .. } => "Error: Your payment was received but the order \
                could not be updated. Please contact us before trying again."
                .into(),
            Self::Provider(err) if err.is_card_error() => match err.provider_message() {
                Some(message) => format!("Error: {message}"),
                None => GENERIC_TRANSACTION_ERROR.into(),
            },
            _ => GENERIC_TRANSACTION_ERROR.into(),
        }
    }

    /// The detail recorded in the order notes for operators.
    #[must_use]
    pub fn operator_message(&self) -> String {
        match self {
            Self::Provider(ProviderError::Api {
                status,
                error_type,
                code,
                message,
            }) => match code {
                Some(code) => format!("{message} ({error_type}/{code}, HTTP {status})"),
                None => format!("{message} ({error_type}, HTTP {status})"),
            },
            other => other.to_string(),
        }
    }

    pub(crate) fn stale_card(choice: CardChoice, detail: impl std::fmt::Display) -> Self {
        Self::DataInconsistency(format!("saved card {choice}: {detail}"))
    }
}
