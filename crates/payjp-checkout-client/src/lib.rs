//! Pay.jp client for the checkout gateway.
//!
//! Covers exactly the calls the checkout flow makes:
//!
//! - `POST /tokens` (publishable key; card fields to a single-use token)
//! - `POST /customers`, `GET /customers/{id}`, `POST /customers/{id}/cards`
//! - `POST /charges`, `POST /charges/{id}/refund`
//!
//! The gateway talks to the provider through the [`PaymentProvider`] trait so
//! that tests can substitute an in-process fake.
//!
//! # Example
//!
//! ```no_run
//! use payjp_checkout_client::PayjpClient;
//!
//! let client = PayjpClient::new("sk_test_xxx", "pk_test_xxx");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;
pub mod provider;
pub mod types;

pub use client::{ClientOptions, PayjpClient};
pub use error::ProviderError;
pub use provider::{NewCustomer, PaymentProvider};
pub use types::{PayjpCard, PayjpCharge, PayjpCustomer, PayjpToken};
