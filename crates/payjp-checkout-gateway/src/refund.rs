//! Refund orchestration.

use payjp_checkout_client::PaymentProvider;
use payjp_checkout_core::{MinorUnits, Order, RefundRequest, RefundResult, ValidationError};

use crate::error::{GatewayError, Result};
use crate::persistence::PersistenceBridge;

/// Submits refunds against recorded charges.
pub struct RefundOrchestrator<'a> {
    provider: &'a dyn PaymentProvider,
    bridge: &'a PersistenceBridge<'a>,
}

impl<'a> RefundOrchestrator<'a> {
    /// Create an orchestrator.
    #[must_use]
    pub fn new(provider: &'a dyn PaymentProvider, bridge: &'a PersistenceBridge<'a>) -> Self {
        Self { provider, bridge }
    }

    /// Refund `amount` of the order's charge, or all of it when `None`.
    ///
    /// The reason only travels as provider metadata.
    ///
    /// # Errors
    ///
    /// - `MissingTransaction` when the order was never charged; the provider
    ///   is not contacted
    /// - `Validation` for a zero or negative amount
    /// - `Provider` when the refund is refused; a note is added to the order
    pub async fn refund(
        &self,
        order: &Order,
        amount: Option<MinorUnits>,
        reason: Option<String>,
    ) -> Result<RefundResult> {
        let transaction_id = order
            .transaction_id
            .clone()
            .ok_or(GatewayError::MissingTransaction { order_id: order.id })?;

        if let Some(amount) = amount.filter(|a| a.get() <= 0) {
            return Err(ValidationError::InvalidAmount(amount.to_string()).into());
        }

        let request = RefundRequest {
            transaction_id,
            amount,
            reason: reason.filter(|r| !r.trim().is_empty()),
        };

        match self.provider.create_refund(&request).await {
            Ok(result) => {
                tracing::info!(
                    order_id = %order.id,
                    transaction_id = %result.transaction_id,
                    amount = ?amount.map(MinorUnits::get),
                    refunded = result.refunded,
                    "Pay.jp refund completed"
                );
                self.bridge.record_refund(order, &result, amount).await;
                Ok(result)
            }
            Err(e) => {
                let err = GatewayError::Provider(e);
                tracing::warn!(
                    order_id = %order.id,
                    transaction_id = %request.transaction_id,
                    error = %err,
                    "Pay.jp refund failed"
                );
                self.bridge
                    .record_refund_failure(order.id, &err.operator_message())
                    .await;
                Err(err)
            }
        }
    }
}
