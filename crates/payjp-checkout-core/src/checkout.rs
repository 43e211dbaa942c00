//! Checkout form state machine.
//!
//! ```text
//! Idle ──validate──▶ Validating ──ok──▶ TokenRequested ──▶ TokenReceived ──▶ Submitting
//!                        │                    │
//!                        └─fail─▶ ValidationFailed   └─rejected─▶ Idle (with message)
//! ```
//!
//! `ValidationFailed` behaves like `Idle`: the buyer corrects the fields and
//! validation starts again. No transition out of `Validating` can reach the
//! tokenization endpoint unless every field passed.

use chrono::NaiveDate;

use crate::card::{validate_card_fields, CardFields, FieldError};
use crate::ids::PaymentToken;

/// States of the checkout form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// Waiting for input. Carries the provider message of a rejected
    /// tokenization, if that is how we got here.
    Idle {
        /// Message from the last rejected tokenization.
        message: Option<String>,
    },
    /// Fields are being checked.
    Validating,
    /// One or more fields failed; the form is editable again.
    ValidationFailed(Vec<FieldError>),
    /// Card data was sent to the tokenization endpoint.
    TokenRequested,
    /// A token came back; terminal success for token acquisition.
    TokenReceived(PaymentToken),
    /// The token was handed to the server-side flow.
    Submitting,
}

impl CheckoutState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "idle",
            Self::Validating => "validating",
            Self::ValidationFailed(_) => "validation_failed",
            Self::TokenRequested => "token_requested",
            Self::TokenReceived(_) => "token_received",
            Self::Submitting => "submitting",
        }
    }
}

/// An event arrived in a state that does not accept it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {event} while {state}")]
pub struct InvalidTransition {
    /// State the form was in.
    pub state: &'static str,
    /// Rejected event.
    pub event: &'static str,
}

/// The checkout form driven through [`CheckoutState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    state: CheckoutState,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutForm {
    /// A fresh form in `Idle`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CheckoutState::Idle { message: None },
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    fn reject(&self, event: &'static str) -> InvalidTransition {
        InvalidTransition {
            state: self.state.name(),
            event,
        }
    }

    /// Validate the card fields.
    ///
    /// On success the form moves to `TokenRequested` and the caller may
    /// contact the tokenization endpoint. On failure it lands in
    /// `ValidationFailed` and the field errors are returned.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the form is `Idle` or `ValidationFailed`.
    pub fn validate(
        &mut self,
        fields: &CardFields,
        today: NaiveDate,
    ) -> Result<Result<(), Vec<FieldError>>, InvalidTransition> {
        match self.state {
            CheckoutState::Idle { .. } | CheckoutState::ValidationFailed(_) => {}
            _ => return Err(self.reject("validate")),
        }

        self.state = CheckoutState::Validating;
        match validate_card_fields(fields, today) {
            Ok(()) => {
                self.state = CheckoutState::TokenRequested;
                Ok(Ok(()))
            }
            Err(errors) => {
                self.state = CheckoutState::ValidationFailed(errors.clone());
                Ok(Err(errors))
            }
        }
    }

    /// Record the token returned by the provider.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless a token was requested.
    pub fn token_received(&mut self, token: PaymentToken) -> Result<(), InvalidTransition> {
        if self.state != CheckoutState::TokenRequested {
            return Err(self.reject("receive a token"));
        }
        self.state = CheckoutState::TokenReceived(token);
        Ok(())
    }

    /// The provider refused to tokenize; go back to `Idle` with its message.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless a token was requested.
    pub fn token_rejected(&mut self, message: impl Into<String>) -> Result<(), InvalidTransition> {
        if self.state != CheckoutState::TokenRequested {
            return Err(self.reject("reject a token"));
        }
        self.state = CheckoutState::Idle {
            message: Some(message.into()),
        };
        Ok(())
    }

    /// Hand the token over for submission. The token leaves the form, so it
    /// can be consumed only once.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless a token has been received.
    pub fn submit(&mut self) -> Result<PaymentToken, InvalidTransition> {
        match std::mem::replace(&mut self.state, CheckoutState::Submitting) {
            CheckoutState::TokenReceived(token) => Ok(token),
            other => {
                self.state = other;
                Err(self.reject("submit"))
            }
        }
    }
}
