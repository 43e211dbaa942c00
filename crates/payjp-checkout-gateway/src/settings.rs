//! Gateway settings.
//!
//! An explicit settings value is handed to every component; nothing reads
//! configuration from ambient state.

use std::fmt;

use serde::{Deserialize, Serialize};

use payjp_checkout_core::{ApiMode, CaptureMode, MinorUnits};

/// A Pay.jp key pair for one API mode.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Secret key, server-side only.
    #[serde(default)]
    pub secret_key: String,
    /// Publishable key, handed to the browser for tokenization.
    #[serde(default)]
    pub publishable_key: String,
}

impl ApiKeys {
    /// Whether at least one key is set.
    #[must_use]
    pub fn has_any(&self) -> bool {
        !self.secret_key.is_empty() || !self.publishable_key.is_empty()
    }
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeys")
            .field("secret_key", &if self.secret_key.is_empty() { "" } else { "<redacted>" })
            .field("publishable_key", &self.publishable_key)
            .finish()
    }
}

/// Gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Whether the gateway is offered at checkout.
    pub enabled: bool,
    /// Title shown on the checkout page.
    pub title: String,
    /// Description shown on the checkout page.
    pub description: String,
    /// Test or live environment.
    pub mode: ApiMode,
    /// Test-mode keys.
    pub test_keys: ApiKeys,
    /// Live-mode keys.
    pub live_keys: ApiKeys,
    /// Capture at checkout, or authorize only.
    pub charge_type: CaptureMode,
    /// Ask for name on card and billing ZIP.
    pub additional_fields: bool,
    /// Let signed-in buyers save and reuse cards.
    pub saved_cards: bool,
    /// Refuse live-mode checkout over plain HTTP.
    pub require_tls: bool,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Credit Card Payment".into(),
            description: "Pay with your credit card.".into(),
            mode: ApiMode::Test,
            test_keys: ApiKeys::default(),
            live_keys: ApiKeys::default(),
            charge_type: CaptureMode::Capture,
            additional_fields: false,
            saved_cards: true,
            require_tls: true,
        }
    }
}

/// Facts about the current request needed to decide availability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvailabilityContext {
    /// Order or cart total, when known.
    pub total: Option<MinorUnits>,
    /// The request is for an order pay page with a verified order key.
    pub verified_pay_page: bool,
    /// The request arrived over TLS.
    pub secure: bool,
}

impl GatewaySettings {
    /// Keys of the active mode.
    #[must_use]
    pub const fn active_keys(&self) -> &ApiKeys {
        match self.mode {
            ApiMode::Test => &self.test_keys,
            ApiMode::Live => &self.live_keys,
        }
    }

    /// Whether the gateway can be offered for this request.
    ///
    /// A verified pay page only needs a non-negative total; everywhere else
    /// the total must reach the provider minimum.
    #[must_use]
    pub fn is_available(&self, ctx: &AvailabilityContext) -> bool {
        if !self.enabled || !self.active_keys().has_any() {
            return false;
        }
        if self.require_tls && self.mode == ApiMode::Live && !ctx.secure {
            return false;
        }
        match ctx.total {
            Some(total) if ctx.verified_pay_page => total.get() >= 0,
            Some(total) => total.meets_charge_minimum(),
            None => true,
        }
    }
}
