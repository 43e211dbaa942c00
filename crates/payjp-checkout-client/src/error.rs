//! Provider error types.

/// Errors returned by the payment provider or the transport to it.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Pay.jp returned an error object.
    #[error("Pay.jp API error: {error_type} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error type (`card_error`, `invalid_request_error`, `auth_error`, ...).
        error_type: String,
        /// Error code (e.g. `card_declined`).
        code: Option<String>,
        /// Human-readable message.
        message: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or unusable API key.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The response parsed but did not contain what the call promises.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ProviderError {
    /// Whether the card itself was refused (decline, bad CVC, expired).
    ///
    /// Card errors carry a message meant for the buyer; every other error is
    /// shown to them only as a generic failure.
    #[must_use]
    pub fn is_card_error(&self) -> bool {
        matches!(self, Self::Api { error_type, .. } if error_type == "card_error")
    }

    /// The provider's message, when it sent one.
    #[must_use]
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}
