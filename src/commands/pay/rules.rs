use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::types::{CardDetails, Field, FormValues, PaymentMethod, PaymentRequest};

static CARD_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{16}$").unwrap());
static EXPIRATION_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").unwrap());
static SECURITY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3}$").unwrap());

/// A rule sees the whole record so it can depend on sibling fields.
type Rule = fn(&FormValues) -> Option<&'static str>;

const RULES: [(Field, Rule); 7] = [
    (Field::Amount, amount),
    (Field::Currency, currency),
    (Field::PaymentMethod, payment_method),
    (Field::CardNumber, card_number),
    (Field::CardholderName, cardholder_name),
    (Field::ExpirationDate, expiration_date),
    (Field::SecurityCode, security_code),
];

/// Field name to message, one message per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", render(.0))]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

fn render(errors: &BTreeMap<Field, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs every rule against `values` and builds the request body if none fail.
pub fn validate(values: &FormValues) -> Result<PaymentRequest, ValidationErrors> {
    let errors = RULES
        .iter()
        .filter_map(|(field, rule)| rule(values).map(|message| (*field, message.to_string())))
        .collect::<BTreeMap<_, _>>();

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    // every rule passed, the defaults below are never used
    let payment_method = values.payment_method().unwrap_or_default();

    let card = (payment_method == PaymentMethod::S2S).then(|| CardDetails {
        card_number: present(values, Field::CardNumber).unwrap_or_default().to_string(),
        cardholder_name: present(values, Field::CardholderName)
            .unwrap_or_default()
            .to_string(),
        expiration_date: present(values, Field::ExpirationDate)
            .unwrap_or_default()
            .to_string(),
        security_code: present(values, Field::SecurityCode)
            .unwrap_or_default()
            .to_string(),
    });

    Ok(PaymentRequest {
        amount: parse_amount(values.amount.as_deref().unwrap_or_default()).unwrap_or_default(),
        currency: values.currency.clone().unwrap_or_default(),
        payment_method,
        card,
    })
}

/// Validates a single field in the context of the full record.
pub fn validate_field(values: &FormValues, field: Field) -> Option<&'static str> {
    RULES
        .iter()
        .find(|(f, _)| *f == field)
        .and_then(|(_, rule)| rule(values))
}

fn present(values: &FormValues, field: Field) -> Option<&str> {
    values.get(field).filter(|value| !value.is_empty())
}

fn parse_amount(amount: &str) -> Option<f64> {
    amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

fn is_s2s(values: &FormValues) -> bool {
    values.payment_method() == Some(PaymentMethod::S2S)
}

fn amount(values: &FormValues) -> Option<&'static str> {
    let Some(amount) = values.amount.as_deref().filter(|a| !a.trim().is_empty()) else {
        return Some("Amount is required");
    };

    match parse_amount(amount) {
        None => Some("Amount must be a number"),
        Some(amount) if amount <= 0.0 => Some("Amount must be a positive number"),
        Some(_) => None,
    }
}

fn currency(values: &FormValues) -> Option<&'static str> {
    present(values, Field::Currency)
        .is_none()
        .then_some("Currency is required")
}

fn payment_method(values: &FormValues) -> Option<&'static str> {
    let Some(method) = present(values, Field::PaymentMethod) else {
        return Some("Payment method is required");
    };

    method
        .parse::<PaymentMethod>()
        .is_err()
        .then_some("Invalid payment method")
}

fn card_number(values: &FormValues) -> Option<&'static str> {
    card_rule(
        values,
        Field::CardNumber,
        "Card number is required",
        Some((&*CARD_NUMBER, "Card number must be 16 digits")),
    )
}

fn cardholder_name(values: &FormValues) -> Option<&'static str> {
    card_rule(
        values,
        Field::CardholderName,
        "Cardholder name is required",
        None,
    )
}

fn expiration_date(values: &FormValues) -> Option<&'static str> {
    card_rule(
        values,
        Field::ExpirationDate,
        "Expiration date is required",
        Some((&*EXPIRATION_DATE, "Expiration date must be in MM/YY format")),
    )
}

fn security_code(values: &FormValues) -> Option<&'static str> {
    card_rule(
        values,
        Field::SecurityCode,
        "Security code is required",
        Some((&*SECURITY_CODE, "Security code must be 3 digits")),
    )
}

/// Card fields are only checked for `S2S`, anything goes otherwise.
fn card_rule(
    values: &FormValues,
    field: Field,
    required: &'static str,
    format: Option<(&Regex, &'static str)>,
) -> Option<&'static str> {
    if !is_s2s(values) {
        return None;
    }

    let Some(value) = present(values, field) else {
        return Some(required);
    };

    match format {
        Some((regex, message)) if !regex.is_match(value) => Some(message),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn payform(amount: &str) -> FormValues {
        FormValues {
            amount: Some(amount.to_string()),
            currency: Some("EUR".to_string()),
            payment_method: Some("Payform".to_string()),
            ..Default::default()
        }
    }

    fn s2s() -> FormValues {
        FormValues {
            amount: Some("5".to_string()),
            currency: Some("EUR".to_string()),
            payment_method: Some("S2S".to_string()),
            card_number: Some("4111111111111111".to_string()),
            cardholder_name: Some("Jane Doe".to_string()),
            expiration_date: Some("09/27".to_string()),
            security_code: Some("123".to_string()),
        }
    }

    #[test]
    fn test_payform_passes_with_three_fields() {
        let request = validate(&payform("10")).unwrap();

        assert_eq!(request.amount, 10.0);
        assert_eq!(request.currency, "EUR");
        assert_eq!(request.payment_method, PaymentMethod::Payform);
        assert!(request.card.is_none());
    }

    #[test]
    fn test_payform_ignores_card_fields() {
        let values = FormValues {
            card_number: Some("123".to_string()),
            expiration_date: Some("13/99".to_string()),
            security_code: Some("abcd".to_string()),
            cardholder_name: Some(String::new()),
            ..payform("10")
        };

        let request = validate(&values).unwrap();

        assert!(request.card.is_none());
    }

    #[test]
    fn test_s2s_passes_with_valid_card() {
        let request = validate(&s2s()).unwrap();
        let card = request.card.unwrap();

        assert_eq!(request.payment_method, PaymentMethod::S2S);
        assert_eq!(card.card_number, "4111111111111111");
        assert_eq!(card.expiration_date, "09/27");
    }

    #[test]
    fn test_s2s_short_card_number() {
        let values = FormValues {
            card_number: Some("123".to_string()),
            ..s2s()
        };

        let errors = validate(&values).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(Field::CardNumber),
            Some("Card number must be 16 digits")
        );
    }

    #[test]
    fn test_s2s_missing_card_fields_are_required() {
        let values = FormValues {
            amount: Some("5".to_string()),
            currency: Some("EUR".to_string()),
            payment_method: Some("S2S".to_string()),
            ..Default::default()
        };

        let errors = validate(&values).unwrap_err();

        assert_eq!(errors.get(Field::CardNumber), Some("Card number is required"));
        assert_eq!(
            errors.get(Field::CardholderName),
            Some("Cardholder name is required")
        );
        assert_eq!(
            errors.get(Field::ExpirationDate),
            Some("Expiration date is required")
        );
        assert_eq!(
            errors.get(Field::SecurityCode),
            Some("Security code is required")
        );
    }

    #[test]
    fn test_s2s_formats() {
        for (field, value, message) in [
            (Field::ExpirationDate, "13/25", "Expiration date must be in MM/YY format"),
            (Field::ExpirationDate, "00/25", "Expiration date must be in MM/YY format"),
            (Field::ExpirationDate, "1/25", "Expiration date must be in MM/YY format"),
            (Field::SecurityCode, "12", "Security code must be 3 digits"),
            (Field::SecurityCode, "1234", "Security code must be 3 digits"),
            (Field::CardNumber, "4111 1111 1111 1111", "Card number must be 16 digits"),
        ] {
            let mut values = s2s();
            values.set(field, Some(value.to_string()));

            let errors = validate(&values).unwrap_err();

            assert_eq!(errors.get(field), Some(message), "{field} = {value}");
        }
    }

    #[test]
    fn test_amount_rules() {
        assert_eq!(
            validate(&payform("0")).unwrap_err().get(Field::Amount),
            Some("Amount must be a positive number")
        );
        assert_eq!(
            validate(&payform("-3.5")).unwrap_err().get(Field::Amount),
            Some("Amount must be a positive number")
        );
        assert_eq!(
            validate(&payform("ten")).unwrap_err().get(Field::Amount),
            Some("Amount must be a number")
        );
        assert_eq!(
            validate(&payform("NaN")).unwrap_err().get(Field::Amount),
            Some("Amount must be a number")
        );
        assert_eq!(
            validate(&payform("")).unwrap_err().get(Field::Amount),
            Some("Amount is required")
        );
        assert_eq!(validate(&payform("0.01")).unwrap().amount, 0.01);
    }

    #[test]
    fn test_errors_are_collected_not_short_circuited() {
        let values = FormValues {
            amount: Some("abc".to_string()),
            payment_method: Some("Cash".to_string()),
            ..Default::default()
        };

        let errors = validate(&values).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(Field::Amount), Some("Amount must be a number"));
        assert_eq!(errors.get(Field::Currency), Some("Currency is required"));
        assert_eq!(
            errors.get(Field::PaymentMethod),
            Some("Invalid payment method")
        );
    }

    #[test]
    fn test_missing_payment_method() {
        let values = FormValues {
            payment_method: None,
            ..payform("1")
        };

        assert_eq!(
            validate(&values).unwrap_err().get(Field::PaymentMethod),
            Some("Payment method is required")
        );
    }

    #[test]
    fn test_card_rules_follow_method_changes() {
        let mut values = s2s();
        values.set(Field::CardNumber, Some("1".to_string()));

        assert!(validate(&values).is_err());

        values.set(Field::PaymentMethod, Some("Payform".to_string()));

        assert!(validate(&values).is_ok());
        assert_eq!(validate_field(&values, Field::CardNumber), None);
    }

    #[test]
    fn test_display_lists_every_error() {
        let errors = validate(&FormValues::default()).unwrap_err();

        assert_eq!(
            errors.to_string(),
            "amount: Amount is required\ncurrency: Currency is required\npaymentMethod: Payment method is required"
        );
    }
}
