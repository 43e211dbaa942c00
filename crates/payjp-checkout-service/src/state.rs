//! Application state.

use std::sync::Arc;

use payjp_checkout_client::{ClientOptions, PayjpClient, PaymentProvider};
use payjp_checkout_gateway::{Gateway, OrderSystem, OrderSystemError};
use payjp_checkout_store::Store;

use crate::config::ServiceConfig;
use crate::orders::OrderApiClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The payment gateway.
    pub gateway: Arc<Gateway>,

    /// The store front's order system.
    pub orders: Arc<dyn OrderSystem>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create the application state, talking to Pay.jp and the order API
    /// over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the order API client cannot be built.
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Result<Self, OrderSystemError> {
        let keys = config.gateway.active_keys();
        if keys.secret_key.is_empty() {
            tracing::warn!(
                mode = config.gateway.mode.as_str(),
                "Pay.jp secret key not configured - payments will not be available"
            );
        }

        let provider = Arc::new(PayjpClient::with_options(
            keys.secret_key.clone(),
            keys.publishable_key.clone(),
            ClientOptions {
                base_url: config.payjp_api_base.clone(),
                timeout_seconds: config.request_timeout_seconds,
            },
        ));

        let orders = Arc::new(OrderApiClient::new(
            &config.order_api_url,
            config.order_api_key.clone(),
            config.request_timeout_seconds,
        )?);
        tracing::info!(order_api_url = %config.order_api_url, "Order API client configured");

        Ok(Self::with_components(config, provider, store, orders))
    }

    /// Create the application state from ready-made collaborators.
    #[must_use]
    pub fn with_components(
        config: ServiceConfig,
        provider: Arc<dyn PaymentProvider>,
        store: Arc<dyn Store>,
        orders: Arc<dyn OrderSystem>,
    ) -> Self {
        let gateway = Gateway::new(config.gateway.clone(), provider, store, orders.clone());
        Self {
            gateway: Arc::new(gateway),
            orders,
            config,
        }
    }
}
