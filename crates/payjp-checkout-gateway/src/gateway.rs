//! The gateway facade used by the HTTP service.

use std::sync::Arc;

use serde::Serialize;

use payjp_checkout_client::PaymentProvider;
use payjp_checkout_core::{
    ApiMode, BillingAddress, CardSummary, CheckoutSubmission, FormData, MinorUnits, Order,
    OrderId, RefundResult, TransactionId, UserId,
};
use payjp_checkout_store::Store;

use crate::charge::ChargeOrchestrator;
use crate::error::{GatewayError, Result};
use crate::hooks::CheckoutHooks;
use crate::notices::NoticeBag;
use crate::orders::OrderSystem;
use crate::persistence::PersistenceBridge;
use crate::refund::RefundOrchestrator;
use crate::settings::{AvailabilityContext, GatewaySettings};

/// What the browser checkout form needs to render and tokenize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutInfo {
    /// Title shown on the checkout page.
    pub title: String,
    /// Description shown on the checkout page.
    pub description: String,
    /// Publishable key of the active mode.
    pub publishable_key: String,
    /// Whether saved cards are offered.
    pub saved_cards_enabled: bool,
    /// Whether the buyer has at least one saved card.
    pub has_card: bool,
    /// Whether name on card and billing ZIP are asked for.
    pub additional_fields: bool,
    /// Saved cards, in selection-index order.
    pub cards: Vec<CardSummary>,
    /// Billing address to forward into tokenization on a verified pay page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<BillingAddress>,
}

/// Outcome of a payment attempt.
#[derive(Debug)]
pub enum PaymentOutcome {
    /// The charge went through and was recorded on the order.
    Success {
        /// Provider transaction id.
        transaction_id: TransactionId,
    },
    /// The attempt failed; the order is left as it was.
    Failure {
        /// Notices for the buyer. Holds at most one transaction notice.
        notices: NoticeBag,
        /// What went wrong.
        error: GatewayError,
    },
}

impl PaymentOutcome {
    /// Whether the payment succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Field-error notices for a submission flagged by client-side validation.
#[must_use]
pub fn validate_fields(submission: &CheckoutSubmission) -> NoticeBag {
    let mut notices = NoticeBag::new();
    for error in &submission.field_errors {
        notices.add_field_error(error);
    }
    if submission.form_errors && notices.is_empty() {
        notices.set_transaction_error(crate::error::GENERIC_TRANSACTION_ERROR);
    }
    notices
}

/// The Pay.jp checkout gateway.
pub struct Gateway {
    settings: GatewaySettings,
    hooks: CheckoutHooks,
    provider: Arc<dyn PaymentProvider>,
    store: Arc<dyn Store>,
    orders: Arc<dyn OrderSystem>,
}

impl Gateway {
    /// Create a gateway.
    #[must_use]
    pub fn new(
        settings: GatewaySettings,
        provider: Arc<dyn PaymentProvider>,
        store: Arc<dyn Store>,
        orders: Arc<dyn OrderSystem>,
    ) -> Self {
        Self {
            settings,
            hooks: CheckoutHooks::default(),
            provider,
            store,
            orders,
        }
    }

    /// Install customisation hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: CheckoutHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Active settings.
    #[must_use]
    pub const fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    fn bridge(&self) -> PersistenceBridge<'_> {
        PersistenceBridge::new(
            self.store.as_ref(),
            self.orders.as_ref(),
            self.settings.mode,
        )
    }

    /// Whether the gateway can be offered in this context.
    #[must_use]
    pub fn is_available(&self, ctx: &AvailabilityContext) -> bool {
        self.settings.is_available(ctx)
    }

    /// Availability for a specific order.
    ///
    /// # Errors
    ///
    /// Returns `OrderSystem` if the order cannot be fetched.
    pub async fn order_availability(
        &self,
        order_id: OrderId,
        order_key: Option<&str>,
        secure: bool,
    ) -> Result<bool> {
        let order = self.orders.get_order(order_id).await?;
        Ok(self.is_available(&AvailabilityContext {
            total: Some(order.total),
            verified_pay_page: order_key.is_some_and(|key| order.verifies_key(key)),
            secure,
        }))
    }

    /// Data for the checkout form.
    ///
    /// `pay_page` is the order being paid on the order pay page together with
    /// the order key from the request; the billing address is only released
    /// when the key matches.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the buyer's saved cards cannot be loaded.
    pub fn checkout_info(
        &self,
        user_id: Option<&UserId>,
        pay_page: Option<(&Order, &str)>,
    ) -> Result<CheckoutInfo> {
        let cards = match user_id {
            Some(user_id) if self.settings.saved_cards => self
                .bridge()
                .load_customer(user_id)?
                .map(|record| record.cards)
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        let billing_address = pay_page
            .filter(|(order, key)| order.verifies_key(key))
            .map(|(order, _)| order.billing.to_address());

        Ok(CheckoutInfo {
            title: self.settings.title.clone(),
            description: self.settings.description.clone(),
            publishable_key: self.settings.active_keys().publishable_key.clone(),
            saved_cards_enabled: self.settings.saved_cards,
            has_card: !cards.is_empty(),
            additional_fields: self.settings.additional_fields,
            cards,
            billing_address,
        })
    }

    /// Run one payment attempt for an order.
    ///
    /// Every failure after the order was loaded comes back as
    /// `PaymentOutcome::Failure` with exactly one transaction notice (or the
    /// field notices of a flagged form) and leaves the order unpaid.
    ///
    /// # Errors
    ///
    /// Returns `OrderSystem` if the order cannot be fetched and `Unavailable`
    /// if the gateway is disabled.
    pub async fn process_payment(
        &self,
        order_id: OrderId,
        submission: CheckoutSubmission,
    ) -> Result<PaymentOutcome> {
        if !self.settings.enabled {
            return Err(GatewayError::Unavailable("gateway is disabled".into()));
        }

        let order = self.orders.get_order(order_id).await?;

        let notices = validate_fields(&submission);
        if !notices.is_empty() {
            tracing::debug!(order_id = %order_id, notices = notices.len(), "Checkout form flagged");
            return Ok(PaymentOutcome::Failure {
                notices,
                error: GatewayError::Validation(
                    payjp_checkout_core::ValidationError::CardFields(submission.field_errors),
                ),
            });
        }

        let form = match FormData::from_submission(&order, submission) {
            Ok(form) => form,
            Err(e) => return Ok(self.fail(&order, e.into()).await),
        };

        let bridge = self.bridge();
        let charger =
            ChargeOrchestrator::new(self.provider.as_ref(), &bridge, &self.settings, &self.hooks);

        let result = match charger.charge(&order, &form).await {
            Ok(result) => result,
            Err(e) => return Ok(self.fail(&order, e).await),
        };

        if let Err(e) = bridge
            .record_charge(&order, &result, self.settings.charge_type)
            .await
        {
            return Ok(self.fail(&order, e).await);
        }

        Ok(PaymentOutcome::Success {
            transaction_id: result.transaction_id,
        })
    }

    async fn fail(&self, order: &Order, error: GatewayError) -> PaymentOutcome {
        tracing::warn!(order_id = %order.id, error = %error, "Payment attempt failed");

        // A confirmed charge is not a failed payment.
        if !matches!(error, GatewayError::ChargeNotRecorded { .. }) {
            self.bridge()
                .record_payment_failure(order.id, &error.operator_message())
                .await;
        }

        let mut notices = NoticeBag::new();
        notices.set_transaction_error(error.user_message());
        PaymentOutcome::Failure { notices, error }
    }

    /// Refund an order's charge.
    ///
    /// `amount` is in major units of the order currency (`"12.50"`); `None`
    /// refunds everything.
    ///
    /// # Errors
    ///
    /// - `OrderSystem` if the order cannot be fetched
    /// - `MissingTransaction` if the order was never charged, whatever the
    ///   amount
    /// - `Validation` for an unparseable or non-positive amount
    /// - `Provider` if Pay.jp refuses the refund
    pub async fn process_refund(
        &self,
        order_id: OrderId,
        amount: Option<&str>,
        reason: Option<String>,
    ) -> Result<RefundResult> {
        let order = self.orders.get_order(order_id).await?;
        if order.transaction_id.is_none() {
            return Err(GatewayError::MissingTransaction { order_id });
        }

        let amount = amount
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(|a| MinorUnits::parse_major(a, &order.currency))
            .transpose()?;

        let bridge = self.bridge();
        RefundOrchestrator::new(self.provider.as_ref(), &bridge)
            .refund(&order, amount, reason)
            .await
    }

    /// Delete every test-mode customer record. Live records are untouched.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the purge fails.
    pub fn purge_test_data(&self) -> Result<usize> {
        let removed = self.store.purge_customers(ApiMode::Test)?;
        tracing::info!(removed, "Purged test-mode customer records");
        Ok(removed)
    }
}
