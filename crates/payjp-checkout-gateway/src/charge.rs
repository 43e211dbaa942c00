//! Charge orchestration.

use payjp_checkout_client::PaymentProvider;
use payjp_checkout_core::{
    check_charge_amount, CardChoice, CardSource, ChargeRequest, ChargeResult, FormData, Order,
    ValidationError,
};

use crate::customer::CustomerResolver;
use crate::error::Result;
use crate::hooks::CheckoutHooks;
use crate::persistence::PersistenceBridge;
use crate::settings::GatewaySettings;

/// Whether the attempt charges a saved customer card rather than the bare
/// token.
///
/// Requires a signed-in buyer, saved cards enabled, and either a request to
/// save the new card or the choice of an existing one. Anonymous and one-time
/// charges never create provider customers.
#[must_use]
pub fn uses_saved_cards(settings: &GatewaySettings, order: &Order, form: &FormData) -> bool {
    order.customer.is_some()
        && settings.saved_cards
        && (form.save_card || form.chosen_card != CardChoice::New)
}

/// "Payment for {first item} (Order: {number})", or "Purchases" for an order
/// without items.
#[must_use]
pub fn default_description(order: &Order) -> String {
    format!(
        "Payment for {} (Order: {})",
        order.first_item_name().unwrap_or("Purchases"),
        order.number
    )
}

/// Builds and submits charges.
pub struct ChargeOrchestrator<'a> {
    provider: &'a dyn PaymentProvider,
    bridge: &'a PersistenceBridge<'a>,
    settings: &'a GatewaySettings,
    hooks: &'a CheckoutHooks,
}

impl<'a> ChargeOrchestrator<'a> {
    /// Create an orchestrator.
    #[must_use]
    pub fn new(
        provider: &'a dyn PaymentProvider,
        bridge: &'a PersistenceBridge<'a>,
        settings: &'a GatewaySettings,
        hooks: &'a CheckoutHooks,
    ) -> Self {
        Self {
            provider,
            bridge,
            settings,
            hooks,
        }
    }

    /// Charge the order.
    ///
    /// The amount is checked before any provider call. Customer resolution,
    /// when it applies, happens before the charge and a customer it creates
    /// is kept even if the charge is then declined. The charge is submitted
    /// once; nothing is retried.
    ///
    /// # Errors
    ///
    /// - `Validation` for an amount below the minimum or a missing token
    /// - `Provider` when the charge (or customer resolution) is refused
    /// - `DataInconsistency` or `Store` from customer resolution
    pub async fn charge(&self, order: &Order, form: &FormData) -> Result<ChargeResult> {
        check_charge_amount(form.amount, form.is_verified_pay_page())?;

        let source = match &order.customer {
            Some(profile) if uses_saved_cards(self.settings, order, form) => {
                let resolved = CustomerResolver::new(self.provider, self.bridge, self.hooks)
                    .resolve(profile, order, form)
                    .await?;
                CardSource::Customer {
                    customer: resolved.customer_id,
                    card: resolved.card_id,
                }
            }
            _ => CardSource::Token(form.token.clone().ok_or(ValidationError::MissingToken)?),
        };

        let request = ChargeRequest {
            amount: form.amount,
            currency: form.currency.clone(),
            capture: self.settings.charge_type,
            description: self
                .hooks
                .charge_description(default_description(order), form, order),
            metadata: self.hooks.charge_data(form, order),
            idempotency_key: form.idempotency_key.clone(),
            source,
        };

        let mut result = self.provider.create_charge(&request).await?;
        if result.customer_id.is_none() {
            result.customer_id = request.source.customer_id().cloned();
        }

        tracing::info!(
            order_id = %order.id,
            transaction_id = %result.transaction_id,
            amount = request.amount.get(),
            currency = %request.currency,
            captured = result.captured,
            "Pay.jp charge confirmed"
        );

        Ok(result)
    }
}
