use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    Payform,
    S2S,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::Payform, PaymentMethod::S2S];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Payform => "Payform",
            PaymentMethod::S2S => "S2S",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = anyhow::Error;

    // exact match only, `s2s` is not a payment method
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| anyhow!("Invalid payment method"))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every input of the payment form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Amount,
    Currency,
    PaymentMethod,
    CardNumber,
    CardholderName,
    ExpirationDate,
    SecurityCode,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Amount,
        Field::Currency,
        Field::PaymentMethod,
        Field::CardNumber,
        Field::CardholderName,
        Field::ExpirationDate,
        Field::SecurityCode,
    ];

    pub const CARD: [Field; 4] = [
        Field::CardNumber,
        Field::CardholderName,
        Field::ExpirationDate,
        Field::SecurityCode,
    ];

    /// Name of the field on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Field::Amount => "amount",
            Field::Currency => "currency",
            Field::PaymentMethod => "paymentMethod",
            Field::CardNumber => "cardNumber",
            Field::CardholderName => "cardholderName",
            Field::ExpirationDate => "expirationDate",
            Field::SecurityCode => "securityCode",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Amount => "Amount",
            Field::Currency => "Currency",
            Field::PaymentMethod => "Payment method",
            Field::CardNumber => "Card number",
            Field::CardholderName => "Cardholder name",
            Field::ExpirationDate => "Expiration date",
            Field::SecurityCode => "Security code",
        }
    }

    pub fn is_card(self) -> bool {
        Self::CARD.contains(&self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw, unvalidated form input as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
    pub card_number: Option<String>,
    pub cardholder_name: Option<String>,
    pub expiration_date: Option<String>,
    pub security_code: Option<String>,
}

impl FormValues {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Amount => self.amount.as_deref(),
            Field::Currency => self.currency.as_deref(),
            Field::PaymentMethod => self.payment_method.as_deref(),
            Field::CardNumber => self.card_number.as_deref(),
            Field::CardholderName => self.cardholder_name.as_deref(),
            Field::ExpirationDate => self.expiration_date.as_deref(),
            Field::SecurityCode => self.security_code.as_deref(),
        }
    }

    pub fn set(&mut self, field: Field, value: Option<String>) {
        let slot = match field {
            Field::Amount => &mut self.amount,
            Field::Currency => &mut self.currency,
            Field::PaymentMethod => &mut self.payment_method,
            Field::CardNumber => &mut self.card_number,
            Field::CardholderName => &mut self.cardholder_name,
            Field::ExpirationDate => &mut self.expiration_date,
            Field::SecurityCode => &mut self.security_code,
        };

        *slot = value;
    }

    /// The payment method if it parses, card rules only apply to `S2S`.
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method.as_deref()?.parse().ok()
    }
}

/// Card details, only ever present for `S2S` payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiration_date: String,
    pub security_code: String,
}

/// Validated body of `POST /pay`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: f64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    #[serde(flatten)]
    pub card: Option<CardDetails>,
}

impl PaymentRequest {
    /// Same body with the card number and security code hidden, for printing.
    pub fn masked(&self) -> Self {
        let card = self.card.as_ref().map(|card| {
            let last4 = &card.card_number[card.card_number.len().saturating_sub(4)..];

            CardDetails {
                card_number: format!("{}{last4}", "*".repeat(card.card_number.len() - last4.len())),
                security_code: "*".repeat(card.security_code.len()),
                ..card.clone()
            }
        });

        Self {
            card,
            ..self.clone()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}
