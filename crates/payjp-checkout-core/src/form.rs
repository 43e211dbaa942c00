//! The checkout submission and the per-attempt form data built from it.
//!
//! `CheckoutSubmission` is what the browser posts. `FormData` is the same
//! information validated once against the order; every later step works on
//! `FormData` only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::card::FieldError;
use crate::error::ValidationError;
use crate::ids::PaymentToken;
use crate::money::{Currency, MinorUnits};
use crate::order::Order;

/// Which card to charge: a new one from the token, or a saved card by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CardChoice {
    /// Use the submitted token.
    #[default]
    New,
    /// Use the saved card at this index of the customer record.
    Saved(usize),
}

impl FromStr for CardChoice {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "new" {
            return Ok(Self::New);
        }
        s.parse()
            .map(Self::Saved)
            .map_err(|_| ValidationError::InvalidCardChoice(s.to_string()))
    }
}

impl TryFrom<String> for CardChoice {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CardChoice> for String {
    fn from(choice: CardChoice) -> Self {
        choice.to_string()
    }
}

impl fmt::Display for CardChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("new"),
            Self::Saved(index) => write!(f, "{index}"),
        }
    }
}

/// The raw checkout submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutSubmission {
    /// Token from the tokenization step; absent when a saved card is used.
    #[serde(default)]
    pub token: Option<PaymentToken>,
    /// Saved-card selector, `"new"` when absent.
    #[serde(default)]
    pub chosen_card: CardChoice,
    /// Whether to save the new card for later.
    #[serde(default)]
    pub save_card: bool,
    /// Name on card (additional-fields mode).
    #[serde(default)]
    pub billing_name: Option<String>,
    /// Billing postal code (additional-fields mode).
    #[serde(default)]
    pub billing_zip: Option<String>,
    /// Set by client-side validation when any field failed.
    #[serde(default)]
    pub form_errors: bool,
    /// The failing fields reported by client-side validation.
    #[serde(default)]
    pub field_errors: Vec<FieldError>,
    /// Order key when paying from the order pay page.
    #[serde(default)]
    pub order_key: Option<String>,
    /// Caller-chosen attempt id, turned into an idempotency key.
    #[serde(default)]
    pub attempt_id: Option<String>,
}

/// Buyer details copied from the order's billing section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerDetails {
    /// Billing full name.
    pub name: String,
    /// Billing email.
    pub email: String,
}

/// Validated data for one payment attempt. Never persisted.
#[derive(Debug, Clone)]
pub struct FormData {
    /// Amount to charge, the order total.
    pub amount: MinorUnits,
    /// Order currency.
    pub currency: Currency,
    /// Token for a new card.
    pub token: Option<PaymentToken>,
    /// Card selection.
    pub chosen_card: CardChoice,
    /// Whether the new card should be saved.
    pub save_card: bool,
    /// Buyer details.
    pub buyer: BuyerDetails,
    /// Name on card, when additional fields are enabled.
    pub billing_name: Option<String>,
    /// Billing postal code, when additional fields are enabled.
    pub billing_zip: Option<String>,
    /// Verified pay-page order key.
    pub pay_page_key: Option<String>,
    /// Idempotency key for the charge call.
    pub idempotency_key: Option<String>,
}

impl FormData {
    /// Validate a submission against its order.
    ///
    /// # Errors
    ///
    /// - `CardFields` when client-side validation flagged the form.
    /// - `MissingToken` when a new card is chosen without a token.
    pub fn from_submission(
        order: &Order,
        submission: CheckoutSubmission,
    ) -> Result<Self, ValidationError> {
        if submission.form_errors || !submission.field_errors.is_empty() {
            return Err(ValidationError::CardFields(submission.field_errors));
        }
        if submission.chosen_card == CardChoice::New && submission.token.is_none() {
            return Err(ValidationError::MissingToken);
        }

        let pay_page_key = submission
            .order_key
            .filter(|key| order.verifies_key(key));
        let idempotency_key = submission
            .attempt_id
            .map(|attempt| attempt.trim().to_string())
            .filter(|attempt| !attempt.is_empty())
            .map(|attempt| format!("{}-{attempt}", order.id));

        Ok(Self {
            amount: order.total,
            currency: order.currency.clone(),
            token: submission.token,
            chosen_card: submission.chosen_card,
            save_card: submission.save_card,
            buyer: BuyerDetails {
                name: order.billing.full_name(),
                email: order.billing.email.clone(),
            },
            billing_name: submission.billing_name.filter(|s| !s.trim().is_empty()),
            billing_zip: submission.billing_zip.filter(|s| !s.trim().is_empty()),
            pay_page_key,
            idempotency_key,
        })
    }

    /// Whether the attempt came from a verified pay page.
    #[must_use]
    pub const fn is_verified_pay_page(&self) -> bool {
        self.pay_page_key.is_some()
    }
}
