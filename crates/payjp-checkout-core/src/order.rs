//! Order snapshots supplied by the store front.
//!
//! The order system owns orders; this gateway only reads them and writes
//! annotations back through its collaborator interface.

use serde::{Deserialize, Serialize};

use crate::card::BillingAddress;
use crate::ids::{OrderId, TransactionId, UserId};
use crate::money::{Currency, MinorUnits};

/// Order lifecycle states as reported by the order system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Awaiting payment.
    Pending,
    /// Paid, being fulfilled.
    Processing,
    /// Awaiting manual action.
    OnHold,
    /// Fulfilled.
    Completed,
    /// Cancelled.
    Cancelled,
    /// Refunded.
    Refunded,
    /// Payment failed.
    Failed,
}

/// The signed-in account that placed the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    /// Store-front user id.
    pub user_id: UserId,
    /// Login name.
    pub login: String,
    /// Account email.
    pub email: String,
}

/// Billing details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct BillingDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub address_2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
}

impl BillingDetails {
    /// "First Last", trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// The address in the shape tokenization expects.
    #[must_use]
    pub fn to_address(&self) -> BillingAddress {
        BillingAddress {
            name: self.full_name(),
            line1: self.address_1.clone(),
            line2: self.address_2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip: self.postcode.clone(),
            country: self.country.clone(),
        }
    }
}

/// A line item; only the name is needed for charge descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product name.
    pub name: String,
}

/// Read-only view of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order id.
    pub id: OrderId,
    /// Display number (may differ from the id).
    pub number: String,
    /// Secret key that authorises pay-page access.
    pub order_key: String,
    /// Current status.
    pub status: OrderStatus,
    /// Order currency.
    pub currency: Currency,
    /// Order total in minor units.
    pub total: MinorUnits,
    /// Signed-in customer, `None` for guest checkout.
    #[serde(default)]
    pub customer: Option<CustomerProfile>,
    /// Billing details.
    #[serde(default)]
    pub billing: BillingDetails,
    /// Line items.
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Transaction id recorded after a confirmed charge.
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
}

impl Order {
    /// Name of the first line item, if any.
    #[must_use]
    pub fn first_item_name(&self) -> Option<&str> {
        self.items.first().map(|item| item.name.as_str())
    }

    /// Whether `order_key` matches this order (pay-page verification).
    #[must_use]
    pub fn verifies_key(&self, order_key: &str) -> bool {
        !self.order_key.is_empty() && self.order_key == order_key
    }

    /// Whether the order has already been completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}
