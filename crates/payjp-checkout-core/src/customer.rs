//! Saved-customer records.
//!
//! A `CustomerRecord` is the local mirror of a Pay.jp customer: the customer
//! id plus non-sensitive summaries of the cards attached to it. There is at
//! most one record per user and API mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CardId, CustomerId};

/// Whether the gateway talks to the provider's test or live environment.
///
/// Customer records are partitioned by mode so that purging test data never
/// touches live customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiMode {
    /// Test keys, test customers.
    Test,
    /// Live keys, real money.
    Live,
}

impl ApiMode {
    /// Lowercase name, used in storage keys and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Live => "live",
        }
    }
}

/// Non-sensitive summary of a tokenized card. Never holds the PAN or CVC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    /// Provider card id.
    pub id: CardId,
    /// Card brand as reported by the provider (e.g. "Visa").
    pub brand: String,
    /// Last four digits.
    pub last4: String,
    /// Expiry month.
    pub exp_month: u32,
    /// Expiry year.
    pub exp_year: i32,
}

/// Local record of a provider customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Provider customer id.
    pub customer_id: CustomerId,

    /// Saved cards in the order they were added. The checkout form selects
    /// cards by index into this list.
    pub cards: Vec<CardSummary>,

    /// Card used for one-click charges when none is chosen explicitly.
    pub default_card: CardId,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl CustomerRecord {
    /// Create a record for a customer whose first card is also its default.
    #[must_use]
    pub fn new(customer_id: CustomerId, first_card: CardSummary) -> Self {
        let now = Utc::now();
        Self {
            customer_id,
            default_card: first_card.id.clone(),
            cards: vec![first_card],
            created_at: now,
            updated_at: now,
        }
    }

    /// The card at `index`, as chosen on the checkout form.
    #[must_use]
    pub fn card_at(&self, index: usize) -> Option<&CardSummary> {
        self.cards.get(index)
    }

    /// Append a newly attached card and make it the default.
    pub fn add_default_card(&mut self, card: CardSummary) {
        self.default_card = card.id.clone();
        self.cards.push(card);
        self.updated_at = Utc::now();
    }

    /// Make an already saved card the default.
    ///
    /// Returns `false` if the card is not part of this record.
    pub fn set_default(&mut self, card_id: &CardId) -> bool {
        if !self.cards.iter().any(|c| &c.id == card_id) {
            return false;
        }
        if &self.default_card != card_id {
            self.default_card = card_id.clone();
            self.updated_at = Utc::now();
        }
        true
    }

    /// Whether the record holds any card.
    #[must_use]
    pub fn has_cards(&self) -> bool {
        !self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, last4: &str) -> CardSummary {
        CardSummary {
            id: id.parse().unwrap(),
            brand: "Visa".into(),
            last4: last4.into(),
            exp_month: 12,
            exp_year: 2030,
        }
    }

    #[test]
    fn new_record_defaults_to_first_card() {
        let record = CustomerRecord::new("cus_1".parse().unwrap(), card("car_1", "4242"));
        assert_eq!(record.cards.len(), 1);
        assert_eq!(record.default_card.as_str(), "car_1");
        assert!(record.has_cards());
    }

    #[test]
    fn added_card_is_appended_and_default() {
        let mut record = CustomerRecord::new("cus_1".parse().unwrap(), card("car_1", "4242"));
        record.add_default_card(card("car_2", "1881"));
        assert_eq!(record.cards.len(), 2);
        assert_eq!(record.card_at(1).unwrap().last4, "1881");
        assert_eq!(record.default_card.as_str(), "car_2");
    }

    #[test]
    fn set_default_requires_known_card() {
        let mut record = CustomerRecord::new("cus_1".parse().unwrap(), card("car_1", "4242"));
        record.add_default_card(card("car_2", "1881"));
        assert!(record.set_default(&"car_1".parse().unwrap()));
        assert_eq!(record.default_card.as_str(), "car_1");
        assert!(!record.set_default(&"car_9".parse().unwrap()));
        assert_eq!(record.default_card.as_str(), "car_1");
    }
}
