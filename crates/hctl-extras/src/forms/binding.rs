#![forbid(unsafe_code)]

//! Input bindings: the attributes a renderer puts on a field's input.

use super::{ChangeEvent, FieldInput, FormOrchestrator, FormValue, PendingValidation, UpdateOptions};

/// Attribute values for one input element.
#[derive(Debug, Clone, PartialEq)]
pub struct InputBinding {
    /// Field name, for the `name` attribute.
    pub name: String,
    /// Element id.
    pub id: String,
    /// Current value.
    pub value: FormValue,
    /// Description ids plus the error id while errors are shown; `None`
    /// when there is nothing to reference.
    pub aria_describedby: Option<String>,
    /// Field has errors.
    pub aria_invalid: bool,
    pub data_dirty: bool,
    pub data_touched: bool,
    /// Id for the element that renders errors.
    pub error_id: String,
}

impl InputBinding {
    /// `(attribute, value)` pairs, omitting absent ones.
    #[must_use]
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![("id", self.id.clone()), ("name", self.name.clone())];
        if let Some(described) = &self.aria_describedby {
            attrs.push(("aria-describedby", described.clone()));
        }
        attrs.push(("aria-invalid", self.aria_invalid.to_string()));
        attrs.push(("data-dirty", self.data_dirty.to_string()));
        attrs.push(("data-touched", self.data_touched.to_string()));
        attrs
    }
}

impl FormOrchestrator {
    /// Binding for `name`, computed from its current state.
    #[must_use]
    pub fn bind_input(&self, name: &str) -> Option<InputBinding> {
        let field = self.field(name)?;
        let has_errors = !field.errors.is_empty();
        let mut ids: Vec<&str> = field.described_by.iter().map(String::as_str).collect();
        if has_errors && !ids.contains(&field.error_id.as_str()) {
            ids.push(&field.error_id);
        }
        Some(InputBinding {
            name: field.name.clone(),
            id: field.id.clone(),
            value: field.value.clone(),
            aria_describedby: (!ids.is_empty()).then(|| ids.join(" ")),
            aria_invalid: has_errors,
            data_dirty: field.dirty,
            data_touched: field.touched,
            error_id: field.error_id.clone(),
        })
    }

    /// Input `change` handler: set the value from the event and validate.
    ///
    /// A returned pass keeps the field `validating` until it is finished.
    pub fn on_change(&mut self, name: &str, event: ChangeEvent) -> Option<PendingValidation> {
        self.set_field_value(name, FieldInput::Event(event), UpdateOptions::default())
    }

    /// Input `blur` handler: mark touched and validate.
    ///
    /// A returned pass keeps the field `validating` until it is finished.
    pub fn on_blur(&mut self, name: &str) -> Option<PendingValidation> {
        self.touch_field(name, true, UpdateOptions::default())
    }
}
