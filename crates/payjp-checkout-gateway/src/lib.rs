//! Payment orchestration for Pay.jp checkout.
//!
//! A payment attempt runs as one sequential chain:
//!
//! ```text
//! token ─▶ customer resolution (saved cards only) ─▶ charge ─▶ order annotation ─▶ complete
//! ```
//!
//! Refunds run on their own against the transaction id recorded on the order.
//!
//! Collaborators are injected as trait objects:
//!
//! - [`PaymentProvider`](payjp_checkout_client::PaymentProvider) for Pay.jp
//! - [`Store`](payjp_checkout_store::Store) for user-to-customer records
//! - [`OrderSystem`] for the store front's orders
//!
//! # Concurrency
//!
//! Attempts for the same order must not overlap. The order system is expected
//! to serialize them; the gateway holds no locks of its own.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod charge;
pub mod customer;
pub mod error;
pub mod gateway;
pub mod hooks;
pub mod notices;
pub mod orders;
pub mod persistence;
pub mod refund;
pub mod settings;
pub mod tokenize;

pub use charge::{default_description, uses_saved_cards, ChargeOrchestrator};
pub use customer::{CustomerResolver, ResolvedCustomer};
pub use error::{GatewayError, Result, GENERIC_TRANSACTION_ERROR};
pub use gateway::{validate_fields, CheckoutInfo, Gateway, PaymentOutcome};
pub use hooks::CheckoutHooks;
pub use notices::{Notice, NoticeBag, NoticeKind};
pub use orders::{meta, OrderSystem, OrderSystemError};
pub use persistence::PersistenceBridge;
pub use refund::RefundOrchestrator;
pub use settings::{ApiKeys, AvailabilityContext, GatewaySettings};
pub use tokenize::{TokenOutcome, Tokenizer};
