//! HTTP adapter for the store front's order API.
//!
//! # Endpoints
//!
//! - `GET /orders/{id}` - order snapshot
//! - `PUT /orders/{id}/transaction` - record the transaction id
//! - `POST /orders/{id}/notes` - append a note
//! - `PUT /orders/{id}/meta/{key}` - set a metadata value
//! - `POST /orders/{id}/complete` - mark the order paid

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;

use payjp_checkout_core::{Order, OrderId, TransactionId};
use payjp_checkout_gateway::{OrderSystem, OrderSystemError};

/// Order API client.
#[derive(Debug, Clone)]
pub struct OrderApiClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct TransactionBody<'a> {
    transaction_id: &'a str,
}

#[derive(Serialize)]
struct NoteBody<'a> {
    note: &'a str,
}

#[derive(Serialize)]
struct MetaBody<'a> {
    value: &'a str,
}

impl OrderApiClient {
    /// Create a client for the order API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_seconds: u64,
    ) -> Result<Self, OrderSystemError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| OrderSystemError::Unavailable(format!("invalid order API URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(OrderSystemError::Unavailable(format!(
                "invalid order API URL: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| OrderSystemError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn url(&self, order_id: OrderId, rest: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        let id = order_id.to_string();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("orders").push(&id).extend(rest);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }

    async fn send(
        &self,
        order_id: OrderId,
        request: RequestBuilder,
    ) -> Result<Response, OrderSystemError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| OrderSystemError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(OrderSystemError::NotFound(order_id));
        }

        let message = response.text().await.unwrap_or_default();
        Err(OrderSystemError::Rejected {
            status: status.as_u16(),
            message: if message.is_empty() {
                format!("HTTP {status}")
            } else {
                message
            },
        })
    }
}

#[async_trait]
impl OrderSystem for OrderApiClient {
    async fn get_order(&self, order_id: OrderId) -> Result<Order, OrderSystemError> {
        let response = self
            .send(order_id, self.client.get(self.url(order_id, &[])))
            .await?;
        response
            .json()
            .await
            .map_err(|e| OrderSystemError::Unavailable(format!("invalid order payload: {e}")))
    }

    async fn set_transaction_id(
        &self,
        order_id: OrderId,
        transaction_id: &TransactionId,
    ) -> Result<(), OrderSystemError> {
        let request = self
            .client
            .put(self.url(order_id, &["transaction"]))
            .json(&TransactionBody {
                transaction_id: transaction_id.as_str(),
            });
        self.send(order_id, request).await?;
        Ok(())
    }

    async fn add_order_note(&self, order_id: OrderId, note: &str) -> Result<(), OrderSystemError> {
        let request = self
            .client
            .post(self.url(order_id, &["notes"]))
            .json(&NoteBody { note });
        self.send(order_id, request).await?;
        Ok(())
    }

    async fn set_order_meta(
        &self,
        order_id: OrderId,
        key: &str,
        value: &str,
    ) -> Result<(), OrderSystemError> {
        let request = self
            .client
            .put(self.url(order_id, &["meta", key]))
            .json(&MetaBody { value });
        self.send(order_id, request).await?;
        Ok(())
    }

    async fn mark_complete(
        &self,
        order_id: OrderId,
        transaction_id: &TransactionId,
    ) -> Result<(), OrderSystemError> {
        let request = self
            .client
            .post(self.url(order_id, &["complete"]))
            .json(&TransactionBody {
                transaction_id: transaction_id.as_str(),
            });
        self.send(order_id, request).await?;
        Ok(())
    }
}
