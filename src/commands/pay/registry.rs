use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tokio::sync::watch;

use super::rules::ValidationErrors;
use super::types::{Field, FormValues, PaymentMethod};

#[derive(Debug, Clone, Default)]
pub struct FieldState {
    pub value: Option<String>,
    pub default: Option<String>,
    pub touched: bool,
    pub dirty: bool,
    pub error: Option<String>,
}

/// Source of truth for the values of the payment form.
///
/// Fields have to be registered before they can be written. The payment method
/// is mirrored into a `watch` channel so views that depend on it (the card
/// fields) get notified whenever it changes.
#[derive(Debug)]
pub struct FieldRegistry {
    fields: BTreeMap<Field, FieldState>,
    payment_method: watch::Sender<Option<PaymentMethod>>,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRegistry {
    pub fn new() -> Self {
        let (payment_method, _) = watch::channel(None);

        Self {
            fields: BTreeMap::new(),
            payment_method,
        }
    }

    /// Registry with every field of the form bound, using `currency` as the default currency.
    pub fn payment_form(currency: &str) -> Self {
        let mut registry = Self::new();

        registry.register(Field::Amount);
        registry.register_with_default(Field::Currency, currency);
        registry.register_with_default(Field::PaymentMethod, PaymentMethod::default().as_str());

        for field in Field::CARD {
            registry.register(field);
        }

        registry
    }

    pub fn register(&mut self, field: Field) {
        self.fields.entry(field).or_default();
    }

    pub fn register_with_default(&mut self, field: Field, default: &str) {
        let default = Some(default.to_string());

        self.fields.insert(
            field,
            FieldState {
                value: default.clone(),
                default,
                ..Default::default()
            },
        );

        if field == Field::PaymentMethod {
            self.notify();
        }
    }

    pub fn is_registered(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn set_value(&mut self, field: Field, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        let state = self.state_mut(field)?;

        state.dirty = state.default.as_deref() != Some(value.as_str());
        state.touched = true;
        state.error = None;
        state.value = Some(value);

        if field == Field::PaymentMethod {
            self.notify();
        }

        Ok(())
    }

    pub fn touch(&mut self, field: Field) -> Result<()> {
        self.state_mut(field)?.touched = true;

        Ok(())
    }

    pub fn value(&self, field: Field) -> Option<&str> {
        self.fields.get(&field)?.value.as_deref()
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.fields.get(&field)?.error.as_deref()
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.fields.get(&field).is_some_and(|state| state.touched)
    }

    pub fn is_dirty(&self, field: Field) -> bool {
        self.fields.get(&field).is_some_and(|state| state.dirty)
    }

    /// Latest committed payment method, `None` when unset or not a known method.
    pub fn watch_payment_method(&self) -> Option<PaymentMethod> {
        *self.payment_method.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PaymentMethod>> {
        self.payment_method.subscribe()
    }

    /// Card fields are only shown for `S2S` payments.
    pub fn is_visible(&self, field: Field) -> bool {
        !field.is_card() || self.watch_payment_method() == Some(PaymentMethod::S2S)
    }

    pub fn visible_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.is_registered(*field) && self.is_visible(*field))
            .collect()
    }

    pub fn values(&self) -> FormValues {
        let mut values = FormValues::default();

        for (field, state) in &self.fields {
            values.set(*field, state.value.clone());
        }

        values
    }

    /// Replaces every field error with the outcome of a validation run.
    pub fn apply_errors(&mut self, errors: &ValidationErrors) {
        for (field, state) in &mut self.fields {
            state.error = errors.get(*field).map(ToString::to_string);
        }
    }

    /// Drops errors of fields the current payment method hides.
    pub fn clear_hidden_errors(&mut self) {
        let cards_hidden = self.watch_payment_method() != Some(PaymentMethod::S2S);

        for (field, state) in &mut self.fields {
            if field.is_card() && cards_hidden {
                state.error = None;
            }
        }
    }

    pub fn clear_errors(&mut self) {
        for state in self.fields.values_mut() {
            state.error = None;
        }
    }

    pub fn reset(&mut self) {
        for state in self.fields.values_mut() {
            let default = state.default.take();

            *state = FieldState {
                value: default.clone(),
                default,
                ..Default::default()
            };
        }

        self.notify();
    }

    fn state_mut(&mut self, field: Field) -> Result<&mut FieldState> {
        self.fields
            .get_mut(&field)
            .with_context(|| format!("Field `{field}` is not registered"))
    }

    fn notify(&self) {
        let method = self
            .value(Field::PaymentMethod)
            .and_then(|method| method.parse().ok());

        self.payment_method.send_replace(method);
    }
}
