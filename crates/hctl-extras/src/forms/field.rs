#![forbid(unsafe_code)]

//! Field configuration, state, and input shapes.

use std::fmt;

use hctl_core::RequestToken;
use indexmap::IndexMap;

use super::FormValue;
use crate::validation::{AsyncValidator, Validator};

/// Current values keyed by field name, in registration order.
pub type FormValues = IndexMap<String, FormValue>;

/// Read-only view handed to validators.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationContext {
    /// Every field's value at the time validation started.
    pub values: FormValues,
    /// Field being validated.
    pub name: String,
    pub touched: bool,
    pub dirty: bool,
}

impl ValidationContext {
    /// Context for `name` outside any form.
    #[must_use]
    pub fn detached(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Registration parameters for a field.
#[derive(Default)]
pub struct FieldConfig {
    pub initial_value: FormValue,
    pub validators: Vec<Box<dyn Validator>>,
    pub async_validators: Vec<Box<dyn AsyncValidator>>,
    pub described_by: Vec<String>,
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("initial_value", &self.initial_value)
            .field("validators", &self.validators.len())
            .field("async_validators", &self.async_validators.len())
            .field("described_by", &self.described_by)
            .finish()
    }
}

impl FieldConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_initial(mut self, value: impl Into<FormValue>) -> Self {
        self.initial_value = value.into();
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    #[must_use]
    pub fn with_async_validator(mut self, validator: impl AsyncValidator + 'static) -> Self {
        self.async_validators.push(Box::new(validator));
        self
    }

    /// Link an external description element by id.
    #[must_use]
    pub fn described_by(mut self, id: impl Into<String>) -> Self {
        self.described_by.push(id.into());
        self
    }
}

/// Observable per-field state.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    pub name: String,
    /// Element id, `{prefix}-{n}`.
    pub id: String,
    /// Error element id, `{prefix}-{n}-error`.
    pub error_id: String,
    pub value: FormValue,
    pub initial_value: FormValue,
    pub touched: bool,
    /// `value != initial_value`.
    pub dirty: bool,
    pub errors: Vec<String>,
    pub validating: bool,
    /// Linked description ids, insertion order, no duplicates.
    pub described_by: Vec<String>,
    /// Generation of the latest validation pass started for this field.
    pub generation: RequestToken,
}

/// Ids assigned at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHandle {
    pub name: String,
    pub id: String,
    pub error_id: String,
}

/// A change event from a native input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeEvent {
    /// The input's text value.
    pub value: String,
    /// Checked state, for checkboxes and toggles.
    pub checked: Option<bool>,
}

impl ChangeEvent {
    /// Event from a text-like input.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            checked: None,
        }
    }

    /// Event from a checkbox.
    #[must_use]
    pub fn checkbox(checked: bool) -> Self {
        Self {
            value: String::new(),
            checked: Some(checked),
        }
    }

    /// The value this event carries.
    #[must_use]
    pub fn into_value(self) -> FormValue {
        match self.checked {
            Some(checked) => FormValue::Bool(checked),
            None => FormValue::Text(self.value),
        }
    }
}

/// What `set_field_value` receives.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Value(FormValue),
    Event(ChangeEvent),
}

impl FieldInput {
    #[must_use]
    pub fn into_value(self) -> FormValue {
        match self {
            Self::Value(v) => v,
            Self::Event(e) => e.into_value(),
        }
    }
}

impl From<FormValue> for FieldInput {
    fn from(value: FormValue) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for FieldInput {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for FieldInput {
    fn from(value: String) -> Self {
        Self::Value(value.into())
    }
}

impl From<bool> for FieldInput {
    fn from(value: bool) -> Self {
        Self::Value(value.into())
    }
}

impl From<ChangeEvent> for FieldInput {
    fn from(event: ChangeEvent) -> Self {
        Self::Event(event)
    }
}

/// Options for value and touch updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Run validation after the update.
    pub validate: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

impl UpdateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip validation.
    #[must_use]
    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }
}
