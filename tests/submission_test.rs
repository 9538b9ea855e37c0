mod common;

use common::FakeBackend;
use payform_cli::commands::pay::checkout::CheckoutView;
use payform_cli::commands::pay::registry::FieldRegistry;
use payform_cli::commands::pay::rules::validate;
use payform_cli::commands::pay::types::Field;
use payform_cli::commands::pay::utils::submit_payment;
use payform_cli::state::http::HttpClient;
use serde_json::json;

const CHECKOUT_URL: &str = "https://pay.example/abc";

#[tokio::test]
async fn test_payform_submission_shows_checkout() {
    let backend = FakeBackend::checkout(CHECKOUT_URL).await;
    let http = HttpClient::new(Some(backend.url.clone())).unwrap();

    let mut registry = FieldRegistry::payment_form("EUR");
    registry.set_value(Field::Amount, "10").unwrap();

    let request = validate(&registry.values()).unwrap();
    let checkout_url = submit_payment(&http, &request).await.unwrap();

    let mut view = CheckoutView::default();
    view.show(checkout_url);

    assert_eq!(view.checkout_url(), Some(CHECKOUT_URL));

    let requests = backend.requests();

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/pay");
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/json")
    );

    let body = requests[0].body.as_object().unwrap();

    assert_eq!(body.len(), 3);
    assert_eq!(body["amount"].as_f64(), Some(10.0));
    assert_eq!(body["currency"], json!("EUR"));
    assert_eq!(body["paymentMethod"], json!("Payform"));
}

#[tokio::test]
async fn test_s2s_submission_sends_card_details() {
    let backend = FakeBackend::checkout(CHECKOUT_URL).await;
    let http = HttpClient::new(Some(format!("{}/", backend.url))).unwrap();

    let mut registry = FieldRegistry::payment_form("EUR");
    registry.set_value(Field::Amount, "5").unwrap();
    registry.set_value(Field::PaymentMethod, "S2S").unwrap();
    registry.set_value(Field::CardNumber, "4111111111111111").unwrap();
    registry.set_value(Field::CardholderName, "Jane Doe").unwrap();
    registry.set_value(Field::ExpirationDate, "01/29").unwrap();
    registry.set_value(Field::SecurityCode, "321").unwrap();

    let request = validate(&registry.values()).unwrap();

    submit_payment(&http, &request).await.unwrap();

    let requests = backend.requests();

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/pay");
    assert_eq!(requests[0].body["paymentMethod"], json!("S2S"));
    assert_eq!(requests[0].body["cardNumber"], json!("4111111111111111"));
    assert_eq!(requests[0].body["cardholderName"], json!("Jane Doe"));
    assert_eq!(requests[0].body["expirationDate"], json!("01/29"));
    assert_eq!(requests[0].body["securityCode"], json!("321"));
}

#[test]
fn test_invalid_s2s_fails_validation() {
    let mut registry = FieldRegistry::payment_form("EUR");
    registry.set_value(Field::Amount, "5").unwrap();
    registry.set_value(Field::PaymentMethod, "S2S").unwrap();
    registry.set_value(Field::CardNumber, "123").unwrap();
    registry.set_value(Field::CardholderName, "Jane Doe").unwrap();
    registry.set_value(Field::ExpirationDate, "01/29").unwrap();
    registry.set_value(Field::SecurityCode, "321").unwrap();

    let errors = validate(&registry.values()).unwrap_err();

    assert_eq!(
        errors.get(Field::CardNumber),
        Some("Card number must be 16 digits")
    );
}

#[tokio::test]
async fn test_missing_api_url_fails_before_sending() {
    let http = HttpClient::new(None).unwrap();

    let mut registry = FieldRegistry::payment_form("EUR");
    registry.set_value(Field::Amount, "10").unwrap();

    let request = validate(&registry.values()).unwrap();
    let error = submit_payment(&http, &request).await.unwrap_err();

    assert_eq!(error.to_string(), "API URL is not defined");
}

#[tokio::test]
async fn test_backend_error_message_is_reported() {
    let backend = FakeBackend::start(402, r#"{"error":{"message":"Card declined"}}"#).await;
    let http = HttpClient::new(Some(backend.url.clone())).unwrap();

    let mut registry = FieldRegistry::payment_form("EUR");
    registry.set_value(Field::Amount, "10").unwrap();

    let request = validate(&registry.values()).unwrap();
    let error = submit_payment(&http, &request).await.unwrap_err();

    assert_eq!(error.to_string(), "Card declined");
    assert_eq!(backend.requests().len(), 1);

    // the form is untouched and can be sent again
    assert!(submit_payment(&http, &request).await.is_err());
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn test_unexpected_status_without_body() {
    let backend = FakeBackend::start(500, "oops").await;
    let http = HttpClient::new(Some(backend.url.clone())).unwrap();

    let mut registry = FieldRegistry::payment_form("EUR");
    registry.set_value(Field::Amount, "10").unwrap();

    let request = validate(&registry.values()).unwrap();
    let error = submit_payment(&http, &request).await.unwrap_err();

    assert!(error.to_string().contains("500"), "{error}");
}

#[tokio::test]
async fn test_malformed_response_is_an_error() {
    let backend = FakeBackend::start(200, r#"{"checkout_url":"https://pay.example/abc"}"#).await;
    let http = HttpClient::new(Some(backend.url.clone())).unwrap();

    let mut registry = FieldRegistry::payment_form("EUR");
    registry.set_value(Field::Amount, "10").unwrap();

    let request = validate(&registry.values()).unwrap();
    let error = submit_payment(&http, &request).await.unwrap_err();

    assert!(error.to_string().starts_with("Malformed response"), "{error}");

    let view = CheckoutView::default();

    assert_eq!(view.checkout_url(), None);
}
