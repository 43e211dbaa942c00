//! Amounts and currencies.
//!
//! All amounts are carried as integer minor units (cents, or whole yen for
//! zero-decimal currencies). Major-unit strings only appear at the HTTP
//! boundary and in human-readable order annotations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Smallest amount the provider accepts for a charge.
pub const MIN_CHARGE_MINOR_UNITS: i64 = 50;

/// Currencies without a minor unit.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

/// A lowercase ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Parse a currency code, normalising it to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingCurrency` for blank input and
    /// `ValidationError::InvalidCurrency` for anything that is not three letters.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::MissingCurrency);
        }
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    /// The currency code as sent to the provider.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of decimal places between major and minor units.
    #[must_use]
    pub fn exponent(&self) -> u32 {
        if ZERO_DECIMAL_CURRENCIES.contains(&self.0.as_str()) {
            0
        } else {
            2
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An amount in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw minor-unit value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw minor-unit value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Parse a major-unit decimal string such as `"12.50"`.
    ///
    /// More fractional digits than the currency allows are rejected rather
    /// than rounded.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidAmount` for malformed, negative or
    /// over-precise input.
    pub fn parse_major(input: &str, currency: &Currency) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidAmount(input.to_string());
        let trimmed = input.trim();
        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let exponent = currency.exponent();
        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > exponent as usize {
            return Err(invalid());
        }

        let scale = 10_i64.pow(exponent);
        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let mut minor_fraction: i64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse().map_err(|_| invalid())?
        };
        for _ in fraction.len()..exponent as usize {
            minor_fraction *= 10;
        }

        whole
            .checked_mul(scale)
            .and_then(|v| v.checked_add(minor_fraction))
            .map(Self)
            .ok_or_else(invalid)
    }

    /// Format as a major-unit decimal string, e.g. `1250` cents → `"12.50"`.
    #[must_use]
    pub fn format_major(self, currency: &Currency) -> String {
        let exponent = currency.exponent();
        if exponent == 0 {
            return self.0.to_string();
        }
        let scale = 10_i64.pow(exponent);
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = scale.unsigned_abs();
        format!(
            "{sign}{}.{:0width$}",
            abs / scale,
            abs % scale,
            width = exponent as usize
        )
    }

    /// Whether the amount meets the provider's charge minimum.
    #[must_use]
    pub const fn meets_charge_minimum(self) -> bool {
        self.0 >= MIN_CHARGE_MINOR_UNITS
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> Currency {
        Currency::parse("USD").unwrap()
    }

    fn jpy() -> Currency {
        Currency::parse("jpy").unwrap()
    }

    #[test]
    fn currency_is_normalised() {
        assert_eq!(usd().as_str(), "usd");
        assert_eq!(Currency::parse("  "), Err(ValidationError::MissingCurrency));
        assert!(matches!(
            Currency::parse("dollars"),
            Err(ValidationError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn exponents() {
        assert_eq!(usd().exponent(), 2);
        assert_eq!(jpy().exponent(), 0);
    }

    #[test]
    fn parse_major_amounts() {
        assert_eq!(MinorUnits::parse_major("12.50", &usd()).unwrap().get(), 1250);
        assert_eq!(MinorUnits::parse_major("12.5", &usd()).unwrap().get(), 1250);
        assert_eq!(MinorUnits::parse_major("3", &usd()).unwrap().get(), 300);
        assert_eq!(MinorUnits::parse_major("0.07", &usd()).unwrap().get(), 7);
        assert_eq!(MinorUnits::parse_major("500", &jpy()).unwrap().get(), 500);
        assert_eq!(MinorUnits::parse_major("500.00", &jpy()).unwrap().get(), 500);
    }

    #[test]
    fn parse_major_rejects_bad_input() {
        assert!(MinorUnits::parse_major("-1", &usd()).is_err());
        assert!(MinorUnits::parse_major("1.234", &usd()).is_err());
        assert!(MinorUnits::parse_major("500.5", &jpy()).is_err());
        assert!(MinorUnits::parse_major("abc", &usd()).is_err());
        assert!(MinorUnits::parse_major(".5", &usd()).is_err());
    }

    #[test]
    fn format_major_amounts() {
        assert_eq!(MinorUnits::new(1250).format_major(&usd()), "12.50");
        assert_eq!(MinorUnits::new(7).format_major(&usd()), "0.07");
        assert_eq!(MinorUnits::new(-130).format_major(&usd()), "-1.30");
        assert_eq!(MinorUnits::new(500).format_major(&jpy()), "500");
    }

    #[test]
    fn charge_minimum() {
        assert!(!MinorUnits::new(49).meets_charge_minimum());
        assert!(MinorUnits::new(50).meets_charge_minimum());
    }
}
