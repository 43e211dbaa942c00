//! The order-system seam.
//!
//! The store front owns orders. The gateway reads them and writes back only
//! the transaction id, notes, metadata and the completion signal; it never
//! touches line items or totals.
//!
//! Callers must serialize payment attempts per order. Nothing here locks.

use async_trait::async_trait;

use payjp_checkout_core::{MinorUnits, Order, OrderId, TransactionId};

/// Order metadata keys written after a confirmed charge.
pub mod meta {
    /// `"true"` when the charge was authorized only and still needs capture.
    pub const CAPTURE_PENDING: &str = "_payjp_capture_pending";

    /// Provider fee in major units, two decimals for decimal currencies.
    pub const FEE: &str = "Pay.jp Fee";

    /// Provider customer the order was charged to.
    pub const CUSTOMER_ID: &str = "Pay.jp Customer Id";
}

/// Errors reported by the order system.
#[derive(Debug, thiserror::Error)]
pub enum OrderSystemError {
    /// No such order.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The order system refused the update.
    #[error("order system rejected the request ({status}): {message}")]
    Rejected {
        /// Status code returned.
        status: u16,
        /// Message returned.
        message: String,
    },

    /// The order system could not be reached or answered garbage.
    #[error("order system unavailable: {0}")]
    Unavailable(String),
}

/// Operations the gateway needs from the order system.
#[async_trait]
pub trait OrderSystem: Send + Sync {
    /// Fetch an order.
    async fn get_order(&self, order_id: OrderId) -> Result<Order, OrderSystemError>;

    /// Order total in minor units.
    async fn get_order_total(&self, order_id: OrderId) -> Result<MinorUnits, OrderSystemError> {
        Ok(self.get_order(order_id).await?.total)
    }

    /// Record the provider transaction id on the order.
    async fn set_transaction_id(
        &self,
        order_id: OrderId,
        transaction_id: &TransactionId,
    ) -> Result<(), OrderSystemError>;

    /// Append an operator-visible note.
    async fn add_order_note(&self, order_id: OrderId, note: &str) -> Result<(), OrderSystemError>;

    /// Set a metadata value on the order.
    async fn set_order_meta(
        &self,
        order_id: OrderId,
        key: &str,
        value: &str,
    ) -> Result<(), OrderSystemError>;

    /// Mark the order paid.
    async fn mark_complete(
        &self,
        order_id: OrderId,
        transaction_id: &TransactionId,
    ) -> Result<(), OrderSystemError>;
}
