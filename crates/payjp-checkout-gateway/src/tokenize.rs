//! Token acquisition.
//!
//! Drives a [`CheckoutForm`] through validation and tokenization. Card data
//! reaches the provider only after every field passed; on any field error the
//! attempt stops locally.

use chrono::NaiveDate;

use payjp_checkout_client::PaymentProvider;
use payjp_checkout_core::{CardFields, CheckoutForm, FieldError, InvalidTransition};

/// Fallback text when the provider refuses without a message.
const TOKENIZATION_FAILED: &str = "Your card could not be verified.";

/// Result of one tokenization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    /// A token was received and is held by the form until submission.
    Received,
    /// Local validation failed; the provider was not contacted.
    Invalid(Vec<FieldError>),
    /// The provider refused the card; the form is idle again.
    Rejected(String),
}

/// Exchanges validated card fields for a token.
pub struct Tokenizer<'a> {
    provider: &'a dyn PaymentProvider,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer.
    #[must_use]
    pub fn new(provider: &'a dyn PaymentProvider) -> Self {
        Self { provider }
    }

    /// Validate `fields` and, if they pass, request a token.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` when the form is not ready for validation.
    pub async fn tokenize(
        &self,
        form: &mut CheckoutForm,
        fields: &CardFields,
        today: NaiveDate,
    ) -> Result<TokenOutcome, InvalidTransition> {
        if let Err(errors) = form.validate(fields, today)? {
            tracing::debug!(failed_fields = errors.len(), "Card fields failed validation");
            return Ok(TokenOutcome::Invalid(errors));
        }

        match self.provider.create_token(fields).await {
            Ok(token) => {
                form.token_received(token)?;
                Ok(TokenOutcome::Received)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Tokenization refused");
                let message = e
                    .provider_message()
                    .unwrap_or(TOKENIZATION_FAILED)
                    .to_string();
                form.token_rejected(message.clone())?;
                Ok(TokenOutcome::Rejected(message))
            }
        }
    }
}
