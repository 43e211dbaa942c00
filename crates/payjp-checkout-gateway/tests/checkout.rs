//! Checkout form, availability and maintenance tests.

mod common;

use chrono::NaiveDate;

use common::{guest_order, member_order, new_card, Call, Harness, USER};
use payjp_checkout_core::{
    ApiMode, BillingAddress, CardField, CardFields, CheckoutForm, CheckoutState, FieldError,
    OrderId, UserId,
};
use payjp_checkout_gateway::{
    AvailabilityContext, GatewaySettings, TokenOutcome, Tokenizer,
};
use payjp_checkout_store::Store;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn card_fields(number: &str) -> CardFields {
    CardFields {
        number: number.into(),
        exp_month: Some(4),
        exp_year: Some(2030),
        cvc: "123".into(),
        billing: BillingAddress::default(),
    }
}

// ============================================================================
// Tokenization
// ============================================================================

#[tokio::test]
async fn invalid_fields_never_reach_the_provider() {
    let harness = Harness::new();
    let tokenizer = Tokenizer::new(&*harness.provider);
    let mut form = CheckoutForm::new();

    let outcome = tokenizer
        .tokenize(&mut form, &card_fields("4242 4242 4242 4241"), today())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TokenOutcome::Invalid(vec![FieldError::invalid(CardField::CardNumber)])
    );
    assert!(harness.provider.calls().is_empty());
    assert!(matches!(form.state(), CheckoutState::ValidationFailed(_)));
}

#[tokio::test]
async fn received_token_is_submitted_once() {
    let harness = Harness::new();
    let tokenizer = Tokenizer::new(&*harness.provider);
    let mut form = CheckoutForm::new();

    let outcome = tokenizer
        .tokenize(&mut form, &card_fields("4242 4242 4242 4242"), today())
        .await
        .unwrap();

    assert_eq!(outcome, TokenOutcome::Received);
    assert_eq!(harness.provider.calls(), vec![Call::CreateToken]);
    let token = form.submit().unwrap();
    assert!(token.expose().starts_with("tok_"));
    assert!(form.submit().is_err());
}

#[tokio::test]
async fn rejected_token_returns_form_to_idle() {
    let harness = Harness::new();
    harness.provider.reject_tokens("Your card number is incorrect.");
    let tokenizer = Tokenizer::new(&*harness.provider);
    let mut form = CheckoutForm::new();

    let outcome = tokenizer
        .tokenize(&mut form, &card_fields("4242424242424242"), today())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TokenOutcome::Rejected("Your card number is incorrect.".into())
    );
    assert_eq!(
        form.state(),
        &CheckoutState::Idle {
            message: Some("Your card number is incorrect.".into())
        }
    );
}

// ============================================================================
// Checkout info
// ============================================================================

#[tokio::test]
async fn checkout_info_lists_saved_cards() {
    let harness = Harness::new();
    harness.orders.insert(member_order(1, 1000));
    assert!(harness
        .gateway
        .process_payment(OrderId::new(1), new_card("tok_a", true))
        .await
        .unwrap()
        .is_success());

    let info = harness
        .gateway
        .checkout_info(Some(&UserId::new(USER)), None)
        .unwrap();

    assert_eq!(info.publishable_key, "pk_test_fake");
    assert!(info.saved_cards_enabled);
    assert!(info.has_card);
    assert_eq!(info.cards.len(), 1);
    assert_eq!(info.cards[0].last4, "4242");
    assert_eq!(info.billing_address, None);
}

#[test]
fn checkout_info_for_guest_has_no_cards() {
    let harness = Harness::new();
    let info = harness.gateway.checkout_info(None, None).unwrap();
    assert!(!info.has_card);
    assert!(info.cards.is_empty());
    assert_eq!(info.title, "Credit Card Payment");
}

#[test]
fn billing_address_only_released_for_matching_order_key() {
    let harness = Harness::new();
    let order = guest_order(2, 1000);

    let info = harness
        .gateway
        .checkout_info(None, Some((&order, "wc_order_2")))
        .unwrap();
    let address = info.billing_address.unwrap();
    assert_eq!(address.name, "Aiko Tanaka");
    assert_eq!(address.zip, "1500002");

    let info = harness
        .gateway
        .checkout_info(None, Some((&order, "wc_order_guess")))
        .unwrap();
    assert_eq!(info.billing_address, None);
}

// ============================================================================
// Availability
// ============================================================================

#[tokio::test]
async fn order_availability_honours_the_pay_page_carve_out() {
    let harness = Harness::new();
    harness.orders.insert(guest_order(3, 10));

    let gateway = &harness.gateway;
    assert!(!gateway
        .order_availability(OrderId::new(3), None, true)
        .await
        .unwrap());
    assert!(gateway
        .order_availability(OrderId::new(3), Some("wc_order_3"), true)
        .await
        .unwrap());
    assert!(!gateway
        .order_availability(OrderId::new(3), Some("wc_order_x"), true)
        .await
        .unwrap());
}

#[test]
fn disabled_gateway_is_unavailable() {
    let harness = Harness::with_settings(GatewaySettings {
        enabled: false,
        ..common::settings()
    });
    assert!(!harness.gateway.is_available(&AvailabilityContext::default()));
}

// ============================================================================
// Test-data purge
// ============================================================================

#[tokio::test]
async fn purge_removes_test_records_only() {
    let harness = Harness::new();
    harness.orders.insert(member_order(4, 1000));
    assert!(harness
        .gateway
        .process_payment(OrderId::new(4), new_card("tok_a", true))
        .await
        .unwrap()
        .is_success());

    let live = harness.customer_record().unwrap();
    harness
        .store
        .put_customer(ApiMode::Live, &UserId::new(USER), &live)
        .unwrap();

    assert_eq!(harness.gateway.purge_test_data().unwrap(), 1);
    assert!(harness.customer_record().is_none());
    assert!(harness
        .store
        .get_customer(ApiMode::Live, &UserId::new(USER))
        .unwrap()
        .is_some());
}
