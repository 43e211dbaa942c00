//! Core types for the Pay.jp checkout gateway.
//!
//! This crate holds everything that can be decided without talking to the
//! network:
//!
//! - **Identifiers**: `UserId`, `OrderId`, `CustomerId`, `CardId`,
//!   `TransactionId`, `PaymentToken`
//! - **Money**: `MinorUnits`, `Currency`
//! - **Cards**: brand detection and field validation for token acquisition
//! - **Checkout form**: the client-side state machine up to `TokenReceived`
//! - **Records**: `CustomerRecord`, `CardSummary`, charge/refund requests and results
//! - **Form data**: the typed per-attempt bundle built from a checkout submission
//!
//! # Minor units
//!
//! Every amount is an `i64` count of the currency's smallest unit. For USD
//! `1250` is $12.50; for JPY `1250` is ¥1,250.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod card;
pub mod charge;
pub mod checkout;
pub mod customer;
pub mod error;
pub mod form;
pub mod ids;
pub mod money;
pub mod order;

pub use card::{
    parse_expiry, validate_card_fields, BillingAddress, CardBrand, CardField, CardFields,
    FieldError, FieldErrorKind,
};
pub use charge::{
    check_charge_amount, CaptureMode, CardSource, ChargeRequest, ChargeResult, RefundRequest,
    RefundResult,
};
pub use checkout::{CheckoutForm, CheckoutState, InvalidTransition};
pub use customer::{ApiMode, CardSummary, CustomerRecord};
pub use error::{Result, ValidationError};
pub use form::{BuyerDetails, CardChoice, CheckoutSubmission, FormData};
pub use ids::{CardId, CustomerId, IdError, OrderId, PaymentToken, TransactionId, UserId};
pub use money::{Currency, MinorUnits, MIN_CHARGE_MINOR_UNITS};
pub use order::{BillingDetails, CustomerProfile, Order, OrderItem, OrderStatus};
