//! Persistence bridge: the only writer of customer records and order
//! annotations.

use payjp_checkout_core::{
    ApiMode, CaptureMode, ChargeResult, CustomerRecord, MinorUnits, Order, OrderId,
    RefundResult, UserId,
};
use payjp_checkout_store::Store;

use crate::error::{GatewayError, Result};
use crate::orders::{meta, OrderSystem, OrderSystemError};

/// Writes customer records and order annotations for one API mode.
pub struct PersistenceBridge<'a> {
    store: &'a dyn Store,
    orders: &'a dyn OrderSystem,
    mode: ApiMode,
}

impl<'a> PersistenceBridge<'a> {
    /// Create a bridge over the given collaborators.
    #[must_use]
    pub fn new(store: &'a dyn Store, orders: &'a dyn OrderSystem, mode: ApiMode) -> Self {
        Self {
            store,
            orders,
            mode,
        }
    }

    /// The customer record of a user, if any.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the lookup fails.
    pub fn load_customer(&self, user_id: &UserId) -> Result<Option<CustomerRecord>> {
        Ok(self.store.get_customer(self.mode, user_id)?)
    }

    /// Insert or replace the customer record of a user.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the write fails.
    pub fn save_customer(&self, user_id: &UserId, record: &CustomerRecord) -> Result<()> {
        self.store.put_customer(self.mode, user_id, record)?;
        tracing::debug!(
            user_id = %user_id,
            customer_id = %record.customer_id,
            cards = record.cards.len(),
            mode = self.mode.as_str(),
            "Saved customer record"
        );
        Ok(())
    }

    /// Annotate an order with a confirmed charge and mark it complete.
    ///
    /// The transaction id is written first; the order is marked complete
    /// last, and only if it is not completed already.
    ///
    /// # Errors
    ///
    /// Returns `ChargeNotRecorded` if the transaction id cannot be written or
    /// the order cannot be completed. Failing to write metadata or notes is
    /// logged and tolerated.
    pub async fn record_charge(
        &self,
        order: &Order,
        result: &ChargeResult,
        capture: CaptureMode,
    ) -> Result<()> {
        let not_recorded = |source: OrderSystemError| {
            tracing::error!(
                order_id = %order.id,
                transaction_id = %result.transaction_id,
                error = %source,
                "Charge confirmed but not recorded on order"
            );
            GatewayError::ChargeNotRecorded {
                order_id: order.id,
                transaction_id: result.transaction_id.clone(),
                source,
            }
        };

        self.orders
            .set_transaction_id(order.id, &result.transaction_id)
            .await
            .map_err(not_recorded)?;

        self.set_meta(
            order.id,
            meta::CAPTURE_PENDING,
            &capture.capture_pending().to_string(),
        )
        .await;
        if let Some(fee) = result.fee {
            self.set_meta(order.id, meta::FEE, &fee.format_major(&order.currency))
                .await;
        }
        if let Some(customer_id) = &result.customer_id {
            self.set_meta(order.id, meta::CUSTOMER_ID, customer_id.as_str())
                .await;
        }

        if order.is_completed() {
            return Ok(());
        }

        self.orders
            .mark_complete(order.id, &result.transaction_id)
            .await
            .map_err(not_recorded)?;
        self.add_note(
            order.id,
            &format!(
                "Pay.jp payment completed with Transaction Id of \"{}\"",
                result.transaction_id
            ),
        )
        .await;

        Ok(())
    }

    /// Note a failed payment attempt on the order.
    pub async fn record_payment_failure(&self, order_id: OrderId, message: &str) {
        self.add_note(
            order_id,
            &format!("Pay.jp payment failed with message: \"{message}\""),
        )
        .await;
    }

    /// Note a completed refund on the order.
    pub async fn record_refund(
        &self,
        order: &Order,
        result: &RefundResult,
        amount: Option<MinorUnits>,
    ) {
        let amount = amount.map_or_else(
            || "the full amount".to_string(),
            |a| {
                format!(
                    "{} {}",
                    a.format_major(&order.currency),
                    order.currency.as_str().to_uppercase()
                )
            },
        );
        self.add_note(
            order.id,
            &format!(
                "Pay.jp refund of {amount} completed for Transaction Id \"{}\"",
                result.transaction_id
            ),
        )
        .await;
    }

    /// Note a failed refund on the order.
    pub async fn record_refund_failure(&self, order_id: OrderId, message: &str) {
        self.add_note(
            order_id,
            &format!("Pay.jp Credit Card Refund Failed with message: \"{message}\""),
        )
        .await;
    }

    async fn set_meta(&self, order_id: OrderId, key: &str, value: &str) {
        if let Err(e) = self.orders.set_order_meta(order_id, key, value).await {
            tracing::warn!(order_id = %order_id, key, error = %e, "Failed to set order metadata");
        }
    }

    async fn add_note(&self, order_id: OrderId, note: &str) {
        if let Err(e) = self.orders.add_order_note(order_id, note).await {
            tracing::warn!(order_id = %order_id, error = %e, "Failed to add order note");
        }
    }
}
