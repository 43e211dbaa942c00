//! Pay.jp HTTP client implementation.

use reqwest::{Client, Response, StatusCode};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use payjp_checkout_core::{
    CardFields, CardSource, ChargeRequest, CustomerId, PaymentToken, RefundRequest,
};

use crate::error::ProviderError;
use crate::provider::NewCustomer;
use crate::types::{PayjpCard, PayjpCharge, PayjpCustomer, PayjpErrorResponse, PayjpToken};

/// Form parameters as sent to Pay.jp.
type Params = Vec<(String, String)>;

/// Options for [`PayjpClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API base URL, overridable for tests.
    pub base_url: String,
    /// Request timeout in seconds. A timed-out call is a failure.
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: PayjpClient::BASE_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Pay.jp API client.
///
/// Holds the key pair of one API mode. Server-side calls authenticate with the
/// secret key; tokenization uses the publishable key, as the browser would.
#[derive(Clone)]
pub struct PayjpClient {
    client: Client,
    base_url: String,
    secret_key: String,
    publishable_key: String,
}

impl fmt::Debug for PayjpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayjpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PayjpClient {
    /// Pay.jp API base URL.
    pub const BASE_URL: &'static str = "https://api.pay.jp/v1";

    /// Create a client against the public Pay.jp API.
    ///
    /// # Arguments
    ///
    /// * `secret_key` - Secret API key (`sk_test_...` or `sk_live_...`)
    /// * `publishable_key` - Publishable key (`pk_test_...` or `pk_live_...`)
    #[must_use]
    pub fn new(secret_key: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self::with_options(secret_key, publishable_key, ClientOptions::default())
    }

    /// Create a client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with default settings).
    #[must_use]
    pub fn with_options(
        secret_key: impl Into<String>,
        publishable_key: impl Into<String>,
        options: ClientOptions,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
            publishable_key: publishable_key.into(),
        }
    }

    fn secret_key(&self) -> Result<&str, ProviderError> {
        if self.secret_key.is_empty() {
            return Err(ProviderError::Configuration(
                "Pay.jp secret key is not configured".into(),
            ));
        }
        Ok(&self.secret_key)
    }

    fn publishable_key(&self) -> Result<&str, ProviderError> {
        if self.publishable_key.is_empty() {
            return Err(ProviderError::Configuration(
                "Pay.jp publishable key is not configured".into(),
            ));
        }
        Ok(&self.publishable_key)
    }

    /// Exchange card fields for a single-use token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Pay.jp refuses the card.
    pub async fn create_token(&self, card: &CardFields) -> Result<PayjpToken, ProviderError> {
        let key = self.publishable_key()?;

        let mut params: Params = vec![
            ("card[number]".into(), card.normalized_number()),
            (
                "card[exp_month]".into(),
                card.exp_month.map(|m| m.to_string()).unwrap_or_default(),
            ),
            (
                "card[exp_year]".into(),
                card.exp_year.map(|y| y.to_string()).unwrap_or_default(),
            ),
            ("card[cvc]".into(), card.cvc.trim().to_string()),
        ];
        let billing = &card.billing;
        for (name, value) in [
            ("card[name]", &billing.name),
            ("card[address_line1]", &billing.line1),
            ("card[address_line2]", &billing.line2),
            ("card[address_city]", &billing.city),
            ("card[address_state]", &billing.state),
            ("card[address_zip]", &billing.zip),
            ("card[country]", &billing.country),
        ] {
            if !value.trim().is_empty() {
                params.push((name.into(), value.trim().to_string()));
            }
        }

        self.post_form("/tokens", key, &params, None).await
    }

    /// Create a customer with the token as its first card.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Pay.jp rejects it.
    pub async fn create_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<PayjpCustomer, ProviderError> {
        let key = self.secret_key()?;

        let mut params: Params = vec![
            ("card".into(), customer.token.expose().to_string()),
            ("description".into(), customer.description.clone()),
        ];
        if let Some(email) = customer.email.as_deref().filter(|e| !e.is_empty()) {
            params.push(("email".into(), email.to_string()));
        }
        push_metadata(&mut params, &customer.metadata);

        tracing::debug!(
            metadata_keys = customer.metadata.len(),
            "Creating Pay.jp customer"
        );

        self.post_form("/customers", key, &params, None).await
    }

    /// Get a customer by ID. Returns `None` if Pay.jp no longer knows it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<PayjpCustomer>, ProviderError> {
        let key = self.secret_key()?;

        let response = self
            .client
            .get(format!("{}/customers/{}", self.base_url, customer_id))
            .basic_auth(key, Option::<&str>::None)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Self::handle_response(response).await.map(Some)
    }

    /// Attach a new card to an existing customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Pay.jp rejects the card.
    pub async fn add_card(
        &self,
        customer_id: &CustomerId,
        token: &PaymentToken,
        make_default: bool,
    ) -> Result<PayjpCard, ProviderError> {
        let key = self.secret_key()?;

        let params: Params = vec![
            ("card".into(), token.expose().to_string()),
            ("default".into(), make_default.to_string()),
        ];

        self.post_form(
            &format!("/customers/{customer_id}/cards"),
            key,
            &params,
            None,
        )
        .await
    }

    /// Create a charge.
    ///
    /// The capture flag is sent verbatim. The balance transaction is expanded
    /// so that the fee comes back with the charge.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the charge is declined.
    pub async fn create_charge(
        &self,
        request: &ChargeRequest,
    ) -> Result<PayjpCharge, ProviderError> {
        let key = self.secret_key()?;

        let mut params: Params = vec![
            ("amount".into(), request.amount.get().to_string()),
            ("currency".into(), request.currency.as_str().to_string()),
            ("capture".into(), request.capture.capture_flag().to_string()),
            ("description".into(), request.description.clone()),
            ("expand[]".into(), "balance_transaction".into()),
        ];
        match &request.source {
            CardSource::Token(token) => {
                params.push(("card".into(), token.expose().to_string()));
            }
            CardSource::Customer { customer, card } => {
                params.push(("customer".into(), customer.to_string()));
                params.push(("card".into(), card.to_string()));
            }
        }
        push_metadata(&mut params, &request.metadata);

        tracing::debug!(
            amount = request.amount.get(),
            currency = %request.currency,
            capture = request.capture.capture_flag(),
            customer = ?request.source.customer_id(),
            "Creating Pay.jp charge"
        );

        self.post_form(
            "/charges",
            key,
            &params,
            request.idempotency_key.as_deref(),
        )
        .await
    }

    /// Refund a charge, fully when no amount is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Pay.jp rejects the refund.
    pub async fn refund_charge(
        &self,
        request: &RefundRequest,
    ) -> Result<PayjpCharge, ProviderError> {
        let key = self.secret_key()?;

        let mut params: Params = Vec::new();
        if let Some(amount) = request.amount {
            params.push(("amount".into(), amount.get().to_string()));
        }
        if let Some(reason) = request.reason.as_deref().filter(|r| !r.is_empty()) {
            params.push(("metadata[reason]".into(), reason.to_string()));
        }

        self.post_form(
            &format!("/charges/{}/refund", request.transaction_id),
            key,
            &params,
            None,
        )
        .await
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        params: &Params,
        idempotency_key: Option<&str>,
    ) -> Result<T, ProviderError> {
        let mut request = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .basic_auth(key, Option::<&str>::None)
            .form(params);
        if let Some(idempotency_key) = idempotency_key {
            request = request.header("Idempotency-Key", idempotency_key);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }

        let error_body: Result<PayjpErrorResponse, _> = response.json().await;

        match error_body {
            Ok(payjp_error) => Err(ProviderError::Api {
                status: status.as_u16(),
                error_type: payjp_error.error.error_type,
                code: payjp_error.error.code,
                message: payjp_error.error.message,
            }),
            Err(_) => Err(ProviderError::Api {
                status: status.as_u16(),
                error_type: "unknown".to_string(),
                code: None,
                message: format!("HTTP {status}"),
            }),
        }
    }
}

fn push_metadata(params: &mut Params, metadata: &BTreeMap<String, String>) {
    for (key, value) in metadata {
        params.push((format!("metadata[{key}]"), value.clone()));
    }
}
