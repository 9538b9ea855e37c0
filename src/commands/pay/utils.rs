use anyhow::{Context, Result};
use clap::Args;
use console::style;
use tokio::sync::watch;

use super::registry::FieldRegistry;
use super::rules::{validate_field, ValidationErrors};
use super::types::{CheckoutResponse, Field, PaymentMethod, PaymentRequest};
use crate::state::http::HttpClient;
use crate::utils::ask_question_iter;

/// Field values that can be given up front instead of being prompted for.
#[derive(Debug, Args, Default, Clone)]
pub struct FieldArgs {
    #[clap(short, long, help = "Amount to pay, e.g. `10` or `4.99`")]
    pub amount: Option<String>,
    #[clap(short, long, help = "Currency of the payment, defaults to `EUR`")]
    pub currency: Option<String>,
    #[clap(short = 'm', long = "method", help = "Payment method, `Payform` or `S2S`")]
    pub payment_method: Option<String>,
    #[clap(long, help = "Card number, 16 digits (S2S only)")]
    pub card_number: Option<String>,
    #[clap(long, help = "Name on the card (S2S only)")]
    pub cardholder_name: Option<String>,
    #[clap(long, help = "Card expiration date as MM/YY (S2S only)")]
    pub expiration_date: Option<String>,
    #[clap(long, help = "Card security code, 3 digits (S2S only)")]
    pub security_code: Option<String>,
}

impl FieldArgs {
    pub fn apply(self, registry: &mut FieldRegistry) -> Result<()> {
        let values = [
            (Field::Amount, self.amount),
            (Field::Currency, self.currency),
            (Field::PaymentMethod, self.payment_method),
            (Field::CardNumber, self.card_number),
            (Field::CardholderName, self.cardholder_name),
            (Field::ExpirationDate, self.expiration_date),
            (Field::SecurityCode, self.security_code),
        ];

        for (field, value) in values {
            if let Some(value) = value {
                registry.set_value(field, value)?;
            }
        }

        Ok(())
    }
}

/// Prompts every visible field that was not filled in yet or has an error.
///
/// Fields are walked in display order, so picking `S2S` as the payment method
/// makes the card fields show up right after it.
pub fn fill_form(registry: &mut FieldRegistry) -> Result<()> {
    let mut method = registry.subscribe();

    for field in Field::ALL {
        if !registry.is_registered(field) || !registry.is_visible(field) {
            continue;
        }

        if registry.is_touched(field) && registry.error(field).is_none() {
            continue;
        }

        if let Some(error) = registry.error(field) {
            render_error(field, error);
        }

        let value = prompt_field(registry, field)?;

        registry.set_value(field, value)?;

        sync_payment_method(registry, &mut method);
    }

    Ok(())
}

/// Reacts to a new payment method, returning whether it changed since the last call.
pub fn sync_payment_method(
    registry: &mut FieldRegistry,
    method: &mut watch::Receiver<Option<PaymentMethod>>,
) -> bool {
    if !method.has_changed().unwrap_or(false) {
        return false;
    }

    let current = *method.borrow_and_update();

    log::debug!("Payment method is now {current:?}");

    if current == Some(PaymentMethod::S2S) {
        log::info!("Card details are required for S2S payments");
    } else {
        registry.clear_hidden_errors();
    }

    true
}

fn prompt_field(registry: &FieldRegistry, field: Field) -> Result<String> {
    match field {
        Field::PaymentMethod => {
            let current = registry
                .value(Field::PaymentMethod)
                .and_then(|method| method.parse::<PaymentMethod>().ok());

            let method = ask_question_iter(field.label(), &PaymentMethod::ALL, current)?;

            Ok(method.to_string())
        }

        Field::SecurityCode => dialoguer::Password::new()
            .with_prompt(field.label())
            .allow_empty_password(true)
            .interact()
            .context("Failed to read security code"),

        field => {
            let values = registry.values();

            let prompt = match field {
                Field::ExpirationDate => format!("{} (MM/YY)", field.label()),
                field => field.label().to_string(),
            };

            let mut input = dialoguer::Input::<String>::new();

            input
                .with_prompt(prompt)
                .allow_empty(true)
                .validate_with(move |input: &String| -> Result<(), &'static str> {
                    let mut candidate = values.clone();
                    candidate.set(field, Some(input.clone()));

                    match validate_field(&candidate, field) {
                        Some(message) => Err(message),
                        None => Ok(()),
                    }
                });

            if let Some(current) = registry.value(field).filter(|_| registry.error(field).is_none()) {
                input.default(current.to_string());
            }

            input
                .interact_text()
                .with_context(|| format!("Failed to read {}", field.label().to_lowercase()))
        }
    }
}

pub fn render_error(field: Field, message: &str) {
    eprintln!(
        "{} {}",
        style(format!("{}:", field.label())).bold(),
        style(message).red()
    );
}

/// Prints the errors of every visible field, next to the field it belongs to.
pub fn render_errors(registry: &FieldRegistry, errors: &ValidationErrors) {
    for (field, message) in errors.iter() {
        if registry.is_visible(field) {
            render_error(field, message);
        }
    }
}

/// Sends the payment and returns the checkout URL from the response.
///
/// Fails without any network call when no API URL is configured.
pub async fn submit_payment(http: &HttpClient, request: &PaymentRequest) -> Result<String> {
    log::debug!("payment body: {}", serde_json::to_string(&request.masked())?);

    let response = http.post::<_, CheckoutResponse>("/pay", request).await?;

    Ok(response.checkout_url)
}
