//! Pay.jp checkout HTTP service.
//!
//! Exposes the gateway to the store front:
//!
//! - Checkout form configuration and gateway availability
//! - Payment submission and refunds for an order
//! - Purging test-mode customer records
//!
//! # Authentication
//!
//! Every `/v1` route requires the service API key in the `x-api-key` header.
//! The store front is the only caller; buyers never talk to this service
//! directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Axum handlers are async even when the work is not

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod orders;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use orders::OrderApiClient;
pub use routes::create_router;
pub use state::AppState;
