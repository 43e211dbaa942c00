//! Pay.jp API types.

use serde::Deserialize;

use payjp_checkout_core::{
    CardId, CardSummary, ChargeResult, CustomerId, MinorUnits, PaymentToken, RefundResult,
    TransactionId,
};

/// Pay.jp card object.
#[derive(Debug, Clone, Deserialize)]
pub struct PayjpCard {
    /// Card ID (`car_...`).
    pub id: CardId,
    /// Brand name (`Visa`, `MasterCard`, `JCB`, ...).
    #[serde(default)]
    pub brand: String,
    /// Last four digits.
    #[serde(default)]
    pub last4: String,
    /// Expiry month.
    #[serde(default)]
    pub exp_month: u32,
    /// Expiry year.
    #[serde(default)]
    pub exp_year: i32,
    /// Name on card.
    #[serde(default)]
    pub name: Option<String>,
}

impl PayjpCard {
    /// Non-sensitive summary kept in the local customer record.
    #[must_use]
    pub fn to_summary(&self) -> CardSummary {
        CardSummary {
            id: self.id.clone(),
            brand: self.brand.clone(),
            last4: self.last4.clone(),
            exp_month: self.exp_month,
            exp_year: self.exp_year,
        }
    }
}

/// Pay.jp list wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct PayjpList<T> {
    /// Items.
    pub data: Vec<T>,
    /// Total count, when reported.
    #[serde(default)]
    pub count: Option<u64>,
}

impl<T> Default for PayjpList<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            count: None,
        }
    }
}

/// Pay.jp customer object.
#[derive(Debug, Clone, Deserialize)]
pub struct PayjpCustomer {
    /// Customer ID (`cus_...`).
    pub id: CustomerId,
    /// Customer email.
    #[serde(default)]
    pub email: Option<String>,
    /// Dashboard description.
    #[serde(default)]
    pub description: Option<String>,
    /// Default card, if any.
    #[serde(default)]
    pub default_card: Option<CardId>,
    /// Attached cards.
    #[serde(default)]
    pub cards: PayjpList<PayjpCard>,
    /// Metadata attached to the customer.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl PayjpCustomer {
    /// The attached card with `id`.
    #[must_use]
    pub fn card(&self, id: &CardId) -> Option<&PayjpCard> {
        self.cards.data.iter().find(|card| &card.id == id)
    }

    /// The card a freshly created customer was given: the default card, or
    /// the only card when no default is reported.
    #[must_use]
    pub fn initial_card(&self) -> Option<&PayjpCard> {
        match &self.default_card {
            Some(id) => self.card(id),
            None => self.cards.data.first(),
        }
    }
}

/// Pay.jp token object. The token id is redacted in `Debug` output.
#[derive(Debug, Clone, Deserialize)]
pub struct PayjpToken {
    /// Token ID (`tok_...`).
    pub id: PaymentToken,
    /// Tokenized card summary.
    pub card: PayjpCard,
    /// Whether the token has already been consumed.
    #[serde(default)]
    pub used: bool,
}

/// Fee breakdown attached to a charge.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceTransaction {
    /// Balance transaction ID.
    pub id: String,
    /// Fee in minor units.
    #[serde(default)]
    pub fee: Option<i64>,
}

/// A balance transaction, either as a bare ID or expanded.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BalanceTransactionRef {
    /// Expanded object.
    Expanded(BalanceTransaction),
    /// Unexpanded ID.
    Id(String),
}

impl BalanceTransactionRef {
    /// ID of the balance transaction.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Expanded(bt) => &bt.id,
            Self::Id(id) => id,
        }
    }

    /// Fee, only known when expanded.
    #[must_use]
    pub fn fee(&self) -> Option<i64> {
        match self {
            Self::Expanded(bt) => bt.fee,
            Self::Id(_) => None,
        }
    }
}

/// Pay.jp charge object.
#[derive(Debug, Clone, Deserialize)]
pub struct PayjpCharge {
    /// Charge ID (`ch_...`).
    pub id: TransactionId,
    /// Amount in minor units.
    #[serde(default)]
    pub amount: i64,
    /// Currency code.
    #[serde(default)]
    pub currency: String,
    /// Whether the charge was captured.
    #[serde(default)]
    pub captured: bool,
    /// Whether the charge is fully refunded.
    #[serde(default)]
    pub refunded: bool,
    /// Amount refunded so far.
    #[serde(default)]
    pub amount_refunded: i64,
    /// Customer the charge was made against.
    #[serde(default)]
    pub customer: Option<CustomerId>,
    /// Charged card.
    #[serde(default)]
    pub card: Option<PayjpCard>,
    /// Balance transaction (expanded when requested).
    #[serde(default)]
    pub balance_transaction: Option<BalanceTransactionRef>,
}

impl PayjpCharge {
    /// The result recorded on the order.
    #[must_use]
    pub fn into_charge_result(self) -> ChargeResult {
        ChargeResult {
            fee: self
                .balance_transaction
                .as_ref()
                .and_then(BalanceTransactionRef::fee)
                .map(MinorUnits::new),
            balance_transaction: self
                .balance_transaction
                .as_ref()
                .map(|bt| bt.id().to_string()),
            transaction_id: self.id,
            captured: self.captured,
            customer_id: self.customer,
        }
    }

    /// The result of a refund call, which returns the refunded charge.
    #[must_use]
    pub fn into_refund_result(self) -> RefundResult {
        RefundResult {
            transaction_id: self.id,
            amount_refunded: Some(MinorUnits::new(self.amount_refunded)),
            refunded: self.refunded,
        }
    }
}

/// Pay.jp error response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct PayjpErrorResponse {
    /// Error details.
    pub error: PayjpErrorBody,
}

/// Pay.jp error details.
#[derive(Debug, Clone, Deserialize)]
pub struct PayjpErrorBody {
    /// Error type.
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message.
    pub message: String,
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_with_expanded_balance_transaction() {
        let charge: PayjpCharge = serde_json::from_value(serde_json::json!({
            "id": "ch_1",
            "object": "charge",
            "amount": 1000,
            "currency": "jpy",
            "captured": true,
            "customer": null,
            "balance_transaction": {"id": "txn_1", "fee": 36}
        }))
        .unwrap();

        let result = charge.into_charge_result();
        assert_eq!(result.transaction_id.as_str(), "ch_1");
        assert_eq!(result.fee, Some(MinorUnits::new(36)));
        assert_eq!(result.balance_transaction.as_deref(), Some("txn_1"));
        assert!(result.captured);
        assert!(result.customer_id.is_none());
    }

    #[test]
    fn charge_with_unexpanded_balance_transaction() {
        let charge: PayjpCharge = serde_json::from_value(serde_json::json!({
            "id": "ch_2",
            "amount": 500,
            "captured": false,
            "customer": "cus_9",
            "balance_transaction": "txn_2"
        }))
        .unwrap();

        let result = charge.into_charge_result();
        assert_eq!(result.fee, None);
        assert_eq!(result.balance_transaction.as_deref(), Some("txn_2"));
        assert_eq!(result.customer_id.unwrap().as_str(), "cus_9");
    }

    #[test]
    fn customer_initial_card_prefers_default() {
        let customer: PayjpCustomer = serde_json::from_value(serde_json::json!({
            "id": "cus_1",
            "default_card": "car_2",
            "cards": {"object": "list", "count": 2, "data": [
                {"id": "car_1", "brand": "Visa", "last4": "4242", "exp_month": 1, "exp_year": 2030},
                {"id": "car_2", "brand": "JCB", "last4": "0000", "exp_month": 2, "exp_year": 2031}
            ]}
        }))
        .unwrap();

        assert_eq!(customer.initial_card().unwrap().last4, "0000");
        assert!(customer.card(&"car_1".parse().unwrap()).is_some());
        assert!(customer.card(&"car_9".parse().unwrap()).is_none());
    }

    #[test]
    fn token_debug_hides_the_token() {
        let token: PayjpToken = serde_json::from_value(serde_json::json!({
            "id": "tok_secret",
            "card": {"id": "car_1", "brand": "Visa", "last4": "4242", "exp_month": 1, "exp_year": 2030}
        }))
        .unwrap();
        assert!(!format!("{token:?}").contains("tok_secret"));
    }
}
