//! Charge and refund requests and their results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::ids::{CardId, CustomerId, PaymentToken, TransactionId};
use crate::money::{Currency, MinorUnits, MIN_CHARGE_MINOR_UNITS};

/// Whether a charge settles immediately or only reserves funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Authorize and capture at checkout.
    #[default]
    Capture,
    /// Authorize only; capture happens later, outside this gateway.
    Authorize,
}

impl CaptureMode {
    /// Value of the provider's `capture` parameter.
    #[must_use]
    pub const fn capture_flag(self) -> bool {
        matches!(self, Self::Capture)
    }

    /// Whether the order still needs a later capture step.
    #[must_use]
    pub const fn capture_pending(self) -> bool {
        matches!(self, Self::Authorize)
    }
}

/// What the charge is drawn against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardSource {
    /// One-time charge against a fresh token. No customer is involved.
    Token(PaymentToken),
    /// A saved card of a provider customer.
    Customer {
        /// Provider customer id.
        customer: CustomerId,
        /// Card of that customer to charge.
        card: CardId,
    },
}

impl CardSource {
    /// Customer id, when charging a saved card.
    #[must_use]
    pub const fn customer_id(&self) -> Option<&CustomerId> {
        match self {
            Self::Token(_) => None,
            Self::Customer { customer, .. } => Some(customer),
        }
    }
}

/// A charge to submit to the provider. Built fresh for every attempt and
/// never persisted; only its [`ChargeResult`] is.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// Amount in minor units.
    pub amount: MinorUnits,
    /// Currency.
    pub currency: Currency,
    /// Capture mode, passed through verbatim.
    pub capture: CaptureMode,
    /// Card or customer reference.
    pub source: CardSource,
    /// Description shown on the provider dashboard.
    pub description: String,
    /// Extra metadata supplied by hooks.
    pub metadata: BTreeMap<String, String>,
    /// Sent as the `Idempotency-Key` header when present.
    pub idempotency_key: Option<String>,
}

/// Check a charge amount.
///
/// The provider minimum applies unless `waive_minimum` is set (verified
/// pay-page orders); negative amounts are always rejected.
///
/// # Errors
///
/// Returns `NegativeAmount` or `AmountBelowMinimum`.
pub fn check_charge_amount(amount: MinorUnits, waive_minimum: bool) -> Result<(), ValidationError> {
    if amount.get() < 0 {
        return Err(ValidationError::NegativeAmount(amount.get()));
    }
    if !waive_minimum && !amount.meets_charge_minimum() {
        return Err(ValidationError::AmountBelowMinimum {
            amount: amount.get(),
            minimum: MIN_CHARGE_MINOR_UNITS,
        });
    }
    Ok(())
}

/// Outcome of a confirmed charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeResult {
    /// Provider charge id; the only handle used for refunds.
    pub transaction_id: TransactionId,
    /// Provider fee, when reported.
    pub fee: Option<MinorUnits>,
    /// Balance-transaction reference, when reported.
    pub balance_transaction: Option<String>,
    /// Whether the provider captured the funds.
    pub captured: bool,
    /// Customer the charge was made against, if any.
    pub customer_id: Option<CustomerId>,
}

/// A refund against a previously confirmed charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    /// Charge to refund.
    pub transaction_id: TransactionId,
    /// Partial amount; `None` refunds the full charge.
    pub amount: Option<MinorUnits>,
    /// Free-text reason, attached as provider metadata only.
    pub reason: Option<String>,
}

/// Outcome of a refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundResult {
    /// Charge that was refunded.
    pub transaction_id: TransactionId,
    /// Total refunded on the charge so far, when reported.
    pub amount_refunded: Option<MinorUnits>,
    /// Whether the charge is now fully refunded.
    pub refunded: bool,
}
