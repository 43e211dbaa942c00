//! Card-field validation performed before tokenization.
//!
//! Nothing in this module talks to the network. A card-data set that fails
//! here never reaches the tokenization endpoint; the caller reports the
//! returned [`FieldError`]s back to the form instead.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card networks recognised by prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    /// Visa Electron.
    VisaElectron,
    /// Maestro.
    Maestro,
    /// Visa.
    Visa,
    /// Mastercard.
    Mastercard,
    /// American Express.
    Amex,
    /// Diners Club.
    DinersClub,
    /// Discover.
    Discover,
    /// China UnionPay.
    UnionPay,
    /// JCB.
    Jcb,
}

impl CardBrand {
    /// Detect the brand from the leading digits of a card number.
    ///
    /// Earlier entries win, so Visa Electron and Maestro ranges are checked
    /// before the broader Visa and Mastercard ranges.
    #[must_use]
    pub fn detect(number: &str) -> Option<Self> {
        let digits: String = number.chars().filter(char::is_ascii_digit).collect();
        let starts = |prefixes: &[&str]| prefixes.iter().any(|p| digits.starts_with(p));

        if starts(&["4026", "417500", "4405", "4508", "4844", "4913", "4917"]) {
            Some(Self::VisaElectron)
        } else if starts(&["5018", "502", "503", "56", "58", "639", "67"]) {
            Some(Self::Maestro)
        } else if starts(&["4"]) {
            Some(Self::Visa)
        } else if starts(&["51", "52", "53", "54", "55", "22", "23", "24", "25", "26", "27"]) {
            Some(Self::Mastercard)
        } else if starts(&["34", "37"]) {
            Some(Self::Amex)
        } else if starts(&["30", "36", "38", "39"]) {
            Some(Self::DinersClub)
        } else if starts(&["60", "64", "65", "622"]) {
            Some(Self::Discover)
        } else if starts(&["62", "88"]) {
            Some(Self::UnionPay)
        } else if starts(&["35"]) {
            Some(Self::Jcb)
        } else {
            None
        }
    }

    /// Valid card-number lengths for the brand.
    #[must_use]
    pub const fn lengths(self) -> &'static [usize] {
        match self {
            Self::Visa => &[13, 16],
            Self::Maestro => &[12, 13, 14, 15, 16, 17, 18, 19],
            Self::Amex => &[15],
            Self::DinersClub => &[14],
            Self::UnionPay => &[16, 17, 18, 19],
            Self::VisaElectron | Self::Mastercard | Self::Discover | Self::Jcb => &[16],
        }
    }

    /// Valid CVC lengths for the brand.
    #[must_use]
    pub const fn cvc_lengths(self) -> &'static [usize] {
        match self {
            Self::Amex => &[3, 4],
            _ => &[3],
        }
    }

    /// Whether the brand's numbers carry a Luhn check digit.
    #[must_use]
    pub const fn uses_luhn(self) -> bool {
        !matches!(self, Self::UnionPay)
    }
}

/// The card-form fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardField {
    /// Card number.
    CardNumber,
    /// Expiry month and year.
    CardExpiry,
    /// Card verification code.
    CardCvc,
}

impl CardField {
    /// Human-readable field name used in notices.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CardNumber => "Credit Card Number",
            Self::CardExpiry => "Credit Card Expiration",
            Self::CardCvc => "Credit Card CVC",
        }
    }
}

/// Why a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Field left empty.
    Missing,
    /// Field present but malformed.
    Invalid,
}

/// A single failing field, as reported back to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldError {
    /// The failing field.
    pub field: CardField,
    /// The failure kind.
    pub kind: FieldErrorKind,
}

impl FieldError {
    /// Build a `Missing` error for `field`.
    #[must_use]
    pub const fn missing(field: CardField) -> Self {
        Self {
            field,
            kind: FieldErrorKind::Missing,
        }
    }

    /// Build an `Invalid` error for `field`.
    #[must_use]
    pub const fn invalid(field: CardField) -> Self {
        Self {
            field,
            kind: FieldErrorKind::Invalid,
        }
    }

    /// The notice shown to the buyer.
    #[must_use]
    pub fn message(&self) -> String {
        match self.kind {
            FieldErrorKind::Invalid => format!("Please enter a valid {}.", self.field.label()),
            FieldErrorKind::Missing => format!("{} is a required field.", self.field.label()),
        }
    }
}

/// Raw card data collected by the checkout form.
///
/// Only ever handed to the tokenization endpoint. The `Debug` output hides
/// the number and CVC.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardFields {
    /// Card number, possibly with spaces or dashes.
    pub number: String,
    /// Expiry month (1-12).
    pub exp_month: Option<u32>,
    /// Expiry year (four digits).
    pub exp_year: Option<i32>,
    /// Card verification code.
    pub cvc: String,
    /// Billing address used for tokenization.
    pub billing: BillingAddress,
}

impl CardFields {
    /// Card number with separators removed.
    #[must_use]
    pub fn normalized_number(&self) -> String {
        self.number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect()
    }
}

impl fmt::Debug for CardFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = self.normalized_number();
        let last4 = number.get(number.len().saturating_sub(4)..).unwrap_or("");
        f.debug_struct("CardFields")
            .field("number", &format_args!("****{last4}"))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvc", &"***")
            .field("billing", &self.billing)
            .finish()
    }
}

/// Billing details forwarded into tokenization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAddress {
    /// Name on card.
    #[serde(default)]
    pub name: String,
    /// Address line 1.
    #[serde(default)]
    pub line1: String,
    /// Address line 2.
    #[serde(default)]
    pub line2: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// State or prefecture.
    #[serde(default)]
    pub state: String,
    /// Postal code.
    #[serde(default)]
    pub zip: String,
    /// Country code.
    #[serde(default)]
    pub country: String,
}

/// Parse an expiry entry such as `"04 / 27"` or `"4/2027"`.
///
/// Returns `(month, year)` with two-digit years expanded to 20YY; either part
/// is `None` when it cannot be read.
#[must_use]
pub fn parse_expiry(input: &str) -> (Option<u32>, Option<i32>) {
    let Some((month, year)) = input.split_once('/') else {
        return (None, None);
    };

    let month = month.trim().parse::<u32>().ok();
    let year = year.trim();
    let year = match year.len() {
        2 => year.parse::<i32>().ok().map(|y| 2000 + y),
        4 => year.parse::<i32>().ok(),
        _ => None,
    };

    (month, year)
}

/// Luhn checksum over an all-digit string.
#[must_use]
pub fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// Validate a card number: known brand, brand length, and Luhn where the
/// brand uses it.
#[must_use]
pub fn validate_card_number(number: &str) -> bool {
    let digits: String = number.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let Some(brand) = CardBrand::detect(&digits) else {
        return false;
    };
    brand.lengths().contains(&digits.len()) && (!brand.uses_luhn() || luhn_valid(&digits))
}

/// Validate an expiry: the card is usable until the last day of its month.
#[must_use]
pub fn validate_card_expiry(month: u32, year: i32, today: NaiveDate) -> bool {
    if !(1..=12).contains(&month) || year < today.year() - 1 || year >= today.year() + 100 {
        return false;
    }
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .is_some_and(|first_invalid| today < first_invalid)
}

/// Validate a CVC against the brand's expected lengths.
#[must_use]
pub fn validate_card_cvc(cvc: &str, brand: Option<CardBrand>) -> bool {
    let cvc = cvc.trim();
    if cvc.is_empty() || !cvc.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match brand {
        Some(brand) => brand.cvc_lengths().contains(&cvc.len()),
        None => (3..=4).contains(&cvc.len()),
    }
}

/// Validate every card field, collecting one error per failing field.
///
/// # Errors
///
/// Returns the failing fields in form order (number, expiry, CVC).
pub fn validate_card_fields(
    fields: &CardFields,
    today: NaiveDate,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if fields.number.trim().is_empty() {
        errors.push(FieldError::missing(CardField::CardNumber));
    } else if !validate_card_number(&fields.number) {
        errors.push(FieldError::invalid(CardField::CardNumber));
    }

    match (fields.exp_month, fields.exp_year) {
        (Some(month), Some(year)) => {
            if !validate_card_expiry(month, year, today) {
                errors.push(FieldError::invalid(CardField::CardExpiry));
            }
        }
        _ => errors.push(FieldError::missing(CardField::CardExpiry)),
    }

    if fields.cvc.trim().is_empty() {
        errors.push(FieldError::missing(CardField::CardCvc));
    } else if !validate_card_cvc(&fields.cvc, CardBrand::detect(&fields.number)) {
        errors.push(FieldError::invalid(CardField::CardCvc));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn valid_fields() -> CardFields {
        CardFields {
            number: "4242 4242 4242 4242".into(),
            exp_month: Some(12),
            exp_year: Some(2030),
            cvc: "123".into(),
            billing: BillingAddress::default(),
        }
    }

    #[test]
    fn brand_detection() {
        assert_eq!(CardBrand::detect("4242424242424242"), Some(CardBrand::Visa));
        assert_eq!(CardBrand::detect("4026000000000002"), Some(CardBrand::VisaElectron));
        assert_eq!(CardBrand::detect("5555555555554444"), Some(CardBrand::Mastercard));
        assert_eq!(CardBrand::detect("2223003122003222"), Some(CardBrand::Mastercard));
        assert_eq!(CardBrand::detect("378282246310005"), Some(CardBrand::Amex));
        assert_eq!(CardBrand::detect("6011111111111117"), Some(CardBrand::Discover));
        assert_eq!(CardBrand::detect("3530111333300000"), Some(CardBrand::Jcb));
        assert_eq!(CardBrand::detect("30569309025904"), Some(CardBrand::DinersClub));
        assert_eq!(CardBrand::detect("6200000000000005"), Some(CardBrand::UnionPay));
        assert_eq!(CardBrand::detect("9999"), None);
    }

    #[test]
    fn card_numbers() {
        assert!(validate_card_number("4242424242424242"));
        assert!(validate_card_number("4242-4242-4242-4242"));
        assert!(validate_card_number("378282246310005"));
        assert!(!validate_card_number("4242424242424241"));
        assert!(!validate_card_number("424242424242"));
        assert!(!validate_card_number("4242abcd42424242"));
        // UnionPay numbers skip the Luhn check.
        assert!(validate_card_number("6200000000000001"));
    }

    #[test]
    fn expiry_parsing() {
        assert_eq!(parse_expiry("04 / 27"), (Some(4), Some(2027)));
        assert_eq!(parse_expiry("4/2027"), (Some(4), Some(2027)));
        assert_eq!(parse_expiry("04 / 2"), (Some(4), None));
        assert_eq!(parse_expiry("0427"), (None, None));
    }

    #[test]
    fn expiry_is_valid_through_end_of_month() {
        assert!(validate_card_expiry(10, 2026, today()));
        assert!(!validate_card_expiry(9, 2026, today()));
        assert!(validate_card_expiry(12, 2026, today()));
        assert!(!validate_card_expiry(13, 2027, today()));
        assert!(!validate_card_expiry(0, 2027, today()));
    }

    #[test]
    fn expiry_rejects_extreme_years() {
        assert!(!validate_card_expiry(12, i32::MAX, today()));
        assert!(!validate_card_expiry(1, i32::MAX, today()));
        assert!(!validate_card_expiry(12, i32::MIN, today()));
        assert!(!validate_card_expiry(12, 2126, today()));
        assert!(validate_card_expiry(12, 2125, today()));
    }

    #[test]
    fn cvc_lengths_follow_brand() {
        assert!(validate_card_cvc("123", Some(CardBrand::Visa)));
        assert!(!validate_card_cvc("1234", Some(CardBrand::Visa)));
        assert!(validate_card_cvc("1234", Some(CardBrand::Amex)));
        assert!(validate_card_cvc("1234", None));
        assert!(!validate_card_cvc("12a", None));
    }

    #[test]
    fn valid_fields_pass() {
        assert_eq!(validate_card_fields(&valid_fields(), today()), Ok(()));
    }

    #[test]
    fn missing_and_invalid_fields_are_distinguished() {
        let fields = CardFields {
            number: String::new(),
            exp_month: Some(1),
            exp_year: Some(2020),
            cvc: "12".into(),
            ..valid_fields()
        };
        let errors = validate_card_fields(&fields, today()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::missing(CardField::CardNumber),
                FieldError::invalid(CardField::CardExpiry),
                FieldError::invalid(CardField::CardCvc),
            ]
        );
    }

    #[test]
    fn missing_expiry_parts() {
        let fields = CardFields {
            exp_year: None,
            cvc: String::new(),
            ..valid_fields()
        };
        let errors = validate_card_fields(&fields, today()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::missing(CardField::CardExpiry),
                FieldError::missing(CardField::CardCvc),
            ]
        );
    }

    #[test]
    fn field_messages() {
        assert_eq!(
            FieldError::invalid(CardField::CardNumber).message(),
            "Please enter a valid Credit Card Number."
        );
        assert_eq!(
            FieldError::missing(CardField::CardCvc).message(),
            "Credit Card CVC is a required field."
        );
    }

    #[test]
    fn debug_hides_number_and_cvc() {
        let debug = format!("{:?}", valid_fields());
        assert!(!debug.contains("4242 4242 4242 4242"));
        assert!(debug.contains("****4242"));
        assert!(!debug.contains("123"));
    }
}
