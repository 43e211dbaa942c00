//! Customer resolution: find or create the provider customer for a signed-in
//! buyer and pick the card to charge.
//!
//! Each call makes at most one provider mutation (create a customer or attach
//! a card). Choosing an already saved card mutates nothing at the provider.

use payjp_checkout_client::{NewCustomer, PaymentProvider, ProviderError};
use payjp_checkout_core::{
    CardChoice, CardId, CustomerId, CustomerProfile, CustomerRecord, FormData, Order,
    PaymentToken, ValidationError,
};

use crate::error::{GatewayError, Result};
use crate::hooks::CheckoutHooks;
use crate::persistence::PersistenceBridge;

/// The customer and card a charge will be drawn against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCustomer {
    /// Provider customer.
    pub customer_id: CustomerId,
    /// Card of that customer.
    pub card_id: CardId,
    /// Whether the customer was created by this call.
    pub created: bool,
}

/// Finds, creates and updates provider customers.
pub struct CustomerResolver<'a> {
    provider: &'a dyn PaymentProvider,
    bridge: &'a PersistenceBridge<'a>,
    hooks: &'a CheckoutHooks,
}

impl<'a> CustomerResolver<'a> {
    /// Create a resolver.
    #[must_use]
    pub fn new(
        provider: &'a dyn PaymentProvider,
        bridge: &'a PersistenceBridge<'a>,
        hooks: &'a CheckoutHooks,
    ) -> Self {
        Self {
            provider,
            bridge,
            hooks,
        }
    }

    /// Resolve the customer and card for `profile`.
    ///
    /// A stored record that no longer matches the provider is not fatal: when
    /// the submission carries a token the attempt continues as a new card (or
    /// a new customer if the old one is gone). Without a token there is
    /// nothing to fall back to and `DataInconsistency` is returned.
    ///
    /// # Errors
    ///
    /// - `Validation` when a new card is chosen without a token
    /// - `Provider` when a provider call fails
    /// - `DataInconsistency` when a saved card cannot be used
    /// - `Store` when the local record cannot be read or written
    pub async fn resolve(
        &self,
        profile: &CustomerProfile,
        order: &Order,
        form: &FormData,
    ) -> Result<ResolvedCustomer> {
        let Some(mut record) = self.bridge.load_customer(&profile.user_id)? else {
            return self.create_customer(profile, order, form).await;
        };

        let live = self.provider.get_customer(&record.customer_id).await?;

        let index = match form.chosen_card {
            CardChoice::New => {
                let token = form.token.as_ref().ok_or(ValidationError::MissingToken)?;
                if live.is_none() {
                    tracing::warn!(
                        user_id = %profile.user_id,
                        customer_id = %record.customer_id,
                        "Stored customer no longer exists at provider; creating a new one"
                    );
                    return self.create_customer(profile, order, form).await;
                }
                return self.attach_card(profile, &mut record, token).await;
            }
            CardChoice::Saved(index) => index,
        };

        let stale = match (record.card_at(index), &live) {
            (None, _) => Some(format!(
                "index out of range, {} card(s) saved",
                record.cards.len()
            )),
            (Some(_), None) => Some(format!("customer {} no longer exists", record.customer_id)),
            (Some(card), Some(live)) if live.card(&card.id).is_none() => Some(format!(
                "card {} is no longer attached to customer {}",
                card.id, record.customer_id
            )),
            _ => None,
        };

        if let Some(detail) = stale {
            let err = GatewayError::stale_card(form.chosen_card, detail);
            tracing::warn!(
                user_id = %profile.user_id,
                customer_id = %record.customer_id,
                error = %err,
                fallback = form.token.is_some(),
                "Stored card reference rejected by provider"
            );
            return match (&form.token, live) {
                (Some(_), None) => self.create_customer(profile, order, form).await,
                (Some(token), Some(_)) => self.attach_card(profile, &mut record, token).await,
                (None, _) => Err(err),
            };
        }

        let Some(card_id) = record.card_at(index).map(|card| card.id.clone()) else {
            return Err(GatewayError::stale_card(form.chosen_card, "index out of range"));
        };
        if record.default_card != card_id {
            record.set_default(&card_id);
            self.bridge.save_customer(&profile.user_id, &record)?;
        }

        Ok(ResolvedCustomer {
            customer_id: record.customer_id,
            card_id,
            created: false,
        })
    }

    async fn attach_card(
        &self,
        profile: &CustomerProfile,
        record: &mut CustomerRecord,
        token: &PaymentToken,
    ) -> Result<ResolvedCustomer> {
        let card = self
            .provider
            .add_card(&record.customer_id, token, true)
            .await?;

        record.add_default_card(card.to_summary());
        self.bridge.save_customer(&profile.user_id, record)?;

        tracing::info!(
            user_id = %profile.user_id,
            customer_id = %record.customer_id,
            card_id = %card.id,
            "Added card to Pay.jp customer"
        );

        Ok(ResolvedCustomer {
            customer_id: record.customer_id.clone(),
            card_id: card.id,
            created: false,
        })
    }

    async fn create_customer(
        &self,
        profile: &CustomerProfile,
        order: &Order,
        form: &FormData,
    ) -> Result<ResolvedCustomer> {
        let token = form.token.clone().ok_or(ValidationError::MissingToken)?;

        let description = format!(
            "{} (#{} - {}) {}",
            profile.login, profile.user_id, profile.email, form.buyer.name
        );
        let new_customer = NewCustomer {
            token,
            email: Some(form.buyer.email.clone()).filter(|email| !email.is_empty()),
            description: self.hooks.customer_description(description, form, order),
            metadata: self.hooks.customer_data(form, order),
        };

        let customer = self.provider.create_customer(&new_customer).await?;
        let card = customer.initial_card().ok_or_else(|| {
            ProviderError::UnexpectedResponse(format!("customer {} has no card", customer.id))
        })?;

        let record = CustomerRecord::new(customer.id.clone(), card.to_summary());
        if let Err(e) = self.bridge.save_customer(&profile.user_id, &record) {
            tracing::error!(
                user_id = %profile.user_id,
                customer_id = %customer.id,
                error = %e,
                "Created Pay.jp customer but could not save the record"
            );
            return Err(e);
        }

        tracing::info!(
            user_id = %profile.user_id,
            customer_id = %customer.id,
            "Created Pay.jp customer"
        );

        Ok(ResolvedCustomer {
            customer_id: record.customer_id,
            card_id: record.default_card,
            created: true,
        })
    }
}
