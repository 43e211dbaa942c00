//! Validation errors.
//!
//! Everything here is detectable before any provider call is made.

use crate::card::FieldError;
use crate::ids::IdError;

/// Result type for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Errors raised while validating a payment attempt at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The charge amount is below the provider minimum.
    #[error("amount {amount} is below the minimum of {minimum} minor units")]
    AmountBelowMinimum {
        /// Requested amount in minor units.
        amount: i64,
        /// Minimum amount in minor units.
        minimum: i64,
    },

    /// The amount is negative.
    #[error("amount {0} is negative")]
    NegativeAmount(i64),

    /// No currency was supplied.
    #[error("currency is missing")]
    MissingCurrency,

    /// The currency code is malformed.
    #[error("invalid currency: {0}")]
    InvalidCurrency(String),

    /// A major-unit amount string could not be converted.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A new card was chosen but no token was submitted.
    #[error("payment token is missing")]
    MissingToken,

    /// The saved-card selector is neither `new` nor an index.
    #[error("invalid card selection: {0}")]
    InvalidCardChoice(String),

    /// Client-side validation flagged one or more card fields.
    #[error("card details are incomplete or invalid")]
    CardFields(Vec<FieldError>),

    /// An identifier in the submission is malformed.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
