//! Common fakes and fixtures for gateway integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use payjp_checkout_client::types::PayjpList;
use payjp_checkout_client::{NewCustomer, PayjpCard, PayjpCustomer, PaymentProvider, ProviderError};
use payjp_checkout_core::{
    ApiMode, BillingDetails, CaptureMode, CardChoice, CardFields, CardSource, ChargeRequest,
    ChargeResult, CheckoutSubmission, Currency, CustomerId, CustomerProfile, MinorUnits, Order,
    OrderId, OrderItem, OrderStatus, PaymentToken, RefundRequest, RefundResult, TransactionId,
    UserId,
};
use payjp_checkout_gateway::{ApiKeys, Gateway, GatewaySettings, OrderSystem, OrderSystemError};
use payjp_checkout_store::{MemoryStore, Store};

// ============================================================================
// Fake payment provider
// ============================================================================

/// A call received by the fake provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateToken,
    CreateCustomer {
        description: String,
        email: Option<String>,
        metadata: BTreeMap<String, String>,
    },
    GetCustomer(String),
    AddCard {
        customer: String,
    },
    CreateCharge(ChargeCall),
    CreateRefund {
        transaction_id: String,
        amount: Option<i64>,
        reason: Option<String>,
    },
}

/// The parts of a charge request tests look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeCall {
    pub amount: i64,
    pub currency: String,
    pub capture: bool,
    pub token: Option<String>,
    pub customer: Option<String>,
    pub card: Option<String>,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
    pub idempotency_key: Option<String>,
}

#[derive(Default)]
struct ProviderState {
    calls: Vec<Call>,
    customers: HashMap<String, PayjpCustomer>,
    next_id: u32,
    decline_charges: Option<String>,
    fail_refunds: Option<String>,
    reject_tokens: Option<String>,
}

/// In-process stand-in for Pay.jp.
#[derive(Default)]
pub struct FakeProvider {
    state: Mutex<ProviderState>,
}

fn card(id: &str) -> PayjpCard {
    PayjpCard {
        id: id.parse().unwrap(),
        brand: "Visa".into(),
        last4: "4242".into(),
        exp_month: 12,
        exp_year: 2030,
        name: None,
    }
}

fn card_error(message: &str) -> ProviderError {
    ProviderError::Api {
        status: 402,
        error_type: "card_error".into(),
        code: Some("card_declined".into()),
        message: message.into(),
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decline every charge with a card error.
    pub fn decline_charges(&self, message: &str) {
        self.state.lock().unwrap().decline_charges = Some(message.into());
    }

    /// Refuse every refund.
    pub fn fail_refunds(&self, message: &str) {
        self.state.lock().unwrap().fail_refunds = Some(message.into());
    }

    /// Refuse every tokenization.
    pub fn reject_tokens(&self, message: &str) {
        self.state.lock().unwrap().reject_tokens = Some(message.into());
    }

    /// Add a customer that exists only at the provider.
    pub fn insert_customer(&self, customer_id: &str, card_ids: &[&str]) {
        let customer = PayjpCustomer {
            id: customer_id.parse().unwrap(),
            email: None,
            description: None,
            default_card: card_ids.first().map(|id| id.parse().unwrap()),
            cards: PayjpList {
                data: card_ids.iter().map(|id| card(id)).collect(),
                count: None,
            },
            metadata: Default::default(),
        };
        self.state
            .lock()
            .unwrap()
            .customers
            .insert(customer_id.to_string(), customer);
    }

    /// Forget a customer, as if it was deleted on the dashboard.
    pub fn remove_customer(&self, customer_id: &str) {
        self.state.lock().unwrap().customers.remove(customer_id);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn charges(&self) -> Vec<ChargeCall> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateCharge(charge) => Some(charge),
                _ => None,
            })
            .collect()
    }

    /// Calls that create or change provider-side customer state.
    pub fn customer_mutations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::CreateCustomer { .. } | Call::AddCard { .. }))
            .count()
    }

    fn next_id(state: &mut ProviderState) -> u32 {
        state.next_id += 1;
        state.next_id
    }
}

#[async_trait]
impl PaymentProvider for FakeProvider {
    async fn create_token(&self, _card: &CardFields) -> Result<PaymentToken, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateToken);
        if let Some(message) = &state.reject_tokens {
            return Err(card_error(message));
        }
        let n = Self::next_id(&mut state);
        Ok(format!("tok_{n}").parse().unwrap())
    }

    async fn create_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<PayjpCustomer, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateCustomer {
            description: customer.description.clone(),
            email: customer.email.clone(),
            metadata: customer.metadata.clone(),
        });
        let n = Self::next_id(&mut state);
        let card_id = format!("car_{n}");
        let created = PayjpCustomer {
            id: format!("cus_{n}").parse().unwrap(),
            email: customer.email.clone(),
            description: Some(customer.description.clone()),
            default_card: Some(card_id.parse().unwrap()),
            cards: PayjpList {
                data: vec![card(&card_id)],
                count: Some(1),
            },
            metadata: Default::default(),
        };
        state
            .customers
            .insert(created.id.to_string(), created.clone());
        Ok(created)
    }

    async fn get_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<PayjpCustomer>, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetCustomer(customer_id.to_string()));
        Ok(state.customers.get(customer_id.as_str()).cloned())
    }

    async fn add_card(
        &self,
        customer_id: &CustomerId,
        _token: &PaymentToken,
        make_default: bool,
    ) -> Result<PayjpCard, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::AddCard {
            customer: customer_id.to_string(),
        });
        let n = Self::next_id(&mut state);
        let new_card = card(&format!("car_{n}"));
        let Some(customer) = state.customers.get_mut(customer_id.as_str()) else {
            return Err(ProviderError::Api {
                status: 404,
                error_type: "client_error".into(),
                code: Some("invalid_id".into()),
                message: "No such customer".into(),
            });
        };
        customer.cards.data.push(new_card.clone());
        if make_default {
            customer.default_card = Some(new_card.id.clone());
        }
        Ok(new_card)
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<ChargeResult, ProviderError> {
        let mut state = self.state.lock().unwrap();
        let (token, customer, card) = match &request.source {
            CardSource::Token(token) => (Some(token.expose().to_string()), None, None),
            CardSource::Customer { customer, card } => {
                (None, Some(customer.to_string()), Some(card.to_string()))
            }
        };
        state.calls.push(Call::CreateCharge(ChargeCall {
            amount: request.amount.get(),
            currency: request.currency.as_str().to_string(),
            capture: request.capture.capture_flag(),
            token,
            customer,
            card,
            description: request.description.clone(),
            metadata: request.metadata.clone(),
            idempotency_key: request.idempotency_key.clone(),
        }));
        if let Some(message) = &state.decline_charges {
            return Err(card_error(message));
        }
        let n = Self::next_id(&mut state);
        Ok(ChargeResult {
            transaction_id: format!("ch_{n}").parse().unwrap(),
            fee: Some(MinorUnits::new(36)),
            balance_transaction: Some(format!("txn_{n}")),
            captured: request.capture.capture_flag(),
            customer_id: None,
        })
    }

    async fn create_refund(&self, request: &RefundRequest) -> Result<RefundResult, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateRefund {
            transaction_id: request.transaction_id.to_string(),
            amount: request.amount.map(MinorUnits::get),
            reason: request.reason.clone(),
        });
        if let Some(message) = &state.fail_refunds {
            return Err(ProviderError::Api {
                status: 400,
                error_type: "invalid_request_error".into(),
                code: Some("already_refunded".into()),
                message: message.clone(),
            });
        }
        Ok(RefundResult {
            transaction_id: request.transaction_id.clone(),
            amount_refunded: Some(request.amount.unwrap_or(MinorUnits::new(1000))),
            refunded: request.amount.is_none(),
        })
    }
}

// ============================================================================
// Fake order system
// ============================================================================

#[derive(Default)]
struct OrderState {
    orders: HashMap<OrderId, Order>,
    notes: Vec<(OrderId, String)>,
    meta: HashMap<(OrderId, String), String>,
    completed: Vec<(OrderId, TransactionId)>,
    refuse_transaction_id: bool,
}

/// In-process stand-in for the store front's order system.
#[derive(Default)]
pub struct FakeOrders {
    state: Mutex<OrderState>,
}

impl FakeOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, order: Order) {
        self.state.lock().unwrap().orders.insert(order.id, order);
    }

    pub fn order(&self, order_id: OrderId) -> Order {
        self.state.lock().unwrap().orders[&order_id].clone()
    }

    pub fn notes(&self, order_id: OrderId) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .notes
            .iter()
            .filter(|(id, _)| *id == order_id)
            .map(|(_, note)| note.clone())
            .collect()
    }

    pub fn meta(&self, order_id: OrderId, key: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .meta
            .get(&(order_id, key.to_string()))
            .cloned()
    }

    pub fn completed(&self) -> Vec<(OrderId, TransactionId)> {
        self.state.lock().unwrap().completed.clone()
    }

    /// Make `set_transaction_id` fail.
    pub fn refuse_transaction_id(&self) {
        self.state.lock().unwrap().refuse_transaction_id = true;
    }
}

#[async_trait]
impl OrderSystem for FakeOrders {
    async fn get_order(&self, order_id: OrderId) -> Result<Order, OrderSystemError> {
        self.state
            .lock()
            .unwrap()
            .orders
            .get(&order_id)
            .cloned()
            .ok_or(OrderSystemError::NotFound(order_id))
    }

    async fn set_transaction_id(
        &self,
        order_id: OrderId,
        transaction_id: &TransactionId,
    ) -> Result<(), OrderSystemError> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_transaction_id {
            return Err(OrderSystemError::Unavailable("order system timed out".into()));
        }
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or(OrderSystemError::NotFound(order_id))?;
        order.transaction_id = Some(transaction_id.clone());
        Ok(())
    }

    async fn add_order_note(&self, order_id: OrderId, note: &str) -> Result<(), OrderSystemError> {
        self.state
            .lock()
            .unwrap()
            .notes
            .push((order_id, note.to_string()));
        Ok(())
    }

    async fn set_order_meta(
        &self,
        order_id: OrderId,
        key: &str,
        value: &str,
    ) -> Result<(), OrderSystemError> {
        self.state
            .lock()
            .unwrap()
            .meta
            .insert((order_id, key.to_string()), value.to_string());
        Ok(())
    }

    async fn mark_complete(
        &self,
        order_id: OrderId,
        transaction_id: &TransactionId,
    ) -> Result<(), OrderSystemError> {
        let mut state = self.state.lock().unwrap();
        if let Some(order) = state.orders.get_mut(&order_id) {
            order.status = OrderStatus::Processing;
        }
        state.completed.push((order_id, transaction_id.clone()));
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub const USER: u64 = 7;

pub fn settings() -> GatewaySettings {
    GatewaySettings {
        test_keys: ApiKeys {
            secret_key: "sk_test_fake".into(),
            publishable_key: "pk_test_fake".into(),
        },
        ..GatewaySettings::default()
    }
}

pub fn guest_order(id: u64, total: i64) -> Order {
    Order {
        id: OrderId::new(id),
        number: id.to_string(),
        order_key: format!("wc_order_{id}"),
        status: OrderStatus::Pending,
        currency: Currency::parse("usd").unwrap(),
        total: MinorUnits::new(total),
        customer: None,
        billing: BillingDetails {
            first_name: "Aiko".into(),
            last_name: "Tanaka".into(),
            email: "aiko@example.com".into(),
            address_1: "1-2-3 Shibuya".into(),
            city: "Tokyo".into(),
            postcode: "1500002".into(),
            country: "JP".into(),
            ..BillingDetails::default()
        },
        items: vec![OrderItem {
            name: "Green Tea".into(),
        }],
        transaction_id: None,
    }
}

pub fn member_order(id: u64, total: i64) -> Order {
    Order {
        customer: Some(profile()),
        ..guest_order(id, total)
    }
}

pub fn profile() -> CustomerProfile {
    CustomerProfile {
        user_id: UserId::new(USER),
        login: "aiko".into(),
        email: "aiko@example.com".into(),
    }
}

pub fn new_card(token: &str, save_card: bool) -> CheckoutSubmission {
    CheckoutSubmission {
        token: Some(token.parse().unwrap()),
        chosen_card: CardChoice::New,
        save_card,
        ..CheckoutSubmission::default()
    }
}

pub fn saved_card(index: usize) -> CheckoutSubmission {
    CheckoutSubmission {
        chosen_card: CardChoice::Saved(index),
        ..CheckoutSubmission::default()
    }
}

/// A gateway wired to fakes and an in-memory store.
pub struct Harness {
    pub gateway: Gateway,
    pub provider: Arc<FakeProvider>,
    pub orders: Arc<FakeOrders>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(settings())
    }

    pub fn with_settings(settings: GatewaySettings) -> Self {
        let provider = Arc::new(FakeProvider::new());
        let orders = Arc::new(FakeOrders::new());
        let store = Arc::new(MemoryStore::new());
        let gateway = Gateway::new(
            settings,
            provider.clone(),
            store.clone(),
            orders.clone(),
        );
        Self {
            gateway,
            provider,
            orders,
            store,
        }
    }

    pub fn with_authorize() -> Self {
        Self::with_settings(GatewaySettings {
            charge_type: CaptureMode::Authorize,
            ..settings()
        })
    }

    pub fn customer_record(&self) -> Option<payjp_checkout_core::CustomerRecord> {
        self.store
            .get_customer(ApiMode::Test, &UserId::new(USER))
            .unwrap()
    }
}
