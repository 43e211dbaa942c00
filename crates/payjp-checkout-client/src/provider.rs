//! The payment-provider seam.
//!
//! Every operation the checkout flow performs against the provider goes
//! through [`PaymentProvider`]. Each method is a single network call; none of
//! them retries.

use std::collections::BTreeMap;

use async_trait::async_trait;

use payjp_checkout_core::{
    CardFields, ChargeRequest, ChargeResult, CustomerId, PaymentToken, RefundRequest,
    RefundResult,
};

use crate::client::PayjpClient;
use crate::error::ProviderError;
use crate::types::{PayjpCard, PayjpCustomer};

/// Data for a new provider customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    /// Token that becomes the customer's first (default) card.
    pub token: PaymentToken,
    /// Customer email.
    pub email: Option<String>,
    /// Dashboard description.
    pub description: String,
    /// Extra metadata.
    pub metadata: BTreeMap<String, String>,
}

/// Operations the checkout gateway needs from a payment provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Exchange validated card fields for a single-use token.
    async fn create_token(&self, card: &CardFields) -> Result<PaymentToken, ProviderError>;

    /// Create a customer whose first card is the given token.
    async fn create_customer(&self, customer: &NewCustomer)
        -> Result<PayjpCustomer, ProviderError>;

    /// Fetch a customer; `None` when the provider no longer has it.
    async fn get_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<PayjpCustomer>, ProviderError>;

    /// Attach a token to an existing customer as a new card.
    async fn add_card(
        &self,
        customer_id: &CustomerId,
        token: &PaymentToken,
        make_default: bool,
    ) -> Result<PayjpCard, ProviderError>;

    /// Submit a charge.
    async fn create_charge(&self, request: &ChargeRequest) -> Result<ChargeResult, ProviderError>;

    /// Refund a charge.
    async fn create_refund(&self, request: &RefundRequest) -> Result<RefundResult, ProviderError>;
}

#[async_trait]
impl PaymentProvider for PayjpClient {
    async fn create_token(&self, card: &CardFields) -> Result<PaymentToken, ProviderError> {
        let token = PayjpClient::create_token(self, card).await?;
        if token.used {
            return Err(ProviderError::UnexpectedResponse(
                "token was already used".into(),
            ));
        }
        Ok(token.id)
    }

    async fn create_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<PayjpCustomer, ProviderError> {
        PayjpClient::create_customer(self, customer).await
    }

    async fn get_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<PayjpCustomer>, ProviderError> {
        PayjpClient::get_customer(self, customer_id).await
    }

    async fn add_card(
        &self,
        customer_id: &CustomerId,
        token: &PaymentToken,
        make_default: bool,
    ) -> Result<PayjpCard, ProviderError> {
        PayjpClient::add_card(self, customer_id, token, make_default).await
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<ChargeResult, ProviderError> {
        let charge = PayjpClient::create_charge(self, request).await?;
        Ok(charge.into_charge_result())
    }

    async fn create_refund(&self, request: &RefundRequest) -> Result<RefundResult, ProviderError> {
        let charge = self.refund_charge(request).await?;
        Ok(charge.into_refund_result())
    }
}
