#![forbid(unsafe_code)]

//! Form field lifecycle with sync and async validation.
//!
//! # Validation Pass
//!
//! ```text
//! begin_validation(name)
//!   ├─ issue generation G, store on field
//!   ├─ run every sync validator, collect all messages
//!   ├─ messages or no async validators ─▶ errors = messages   (done, None)
//!   └─ else: errors = [], validating = true ─▶ Some(PendingValidation{G})
//!
//! host drives PendingValidation::run()  (async validators via join_all)
//!
//! finish_validation(outcome)
//!   ├─ field gone or generation != G ─▶ discarded (Ok(false))
//!   ├─ Ok(messages) ─▶ errors = messages, validating = false
//!   └─ Err(failure) ─▶ validating = false, snapshot.failure set, Err
//! ```
//!
//! The `async` conveniences (`validate_field`, `validate_all`, `submit`) run
//! the same two phases back to back.
//!
//! # Invariants
//!
//! 1. `dirty == (value != initial_value)` after every update.
//! 2. A field's errors come from the newest pass started for it; results of
//!    superseded passes are dropped.
//! 3. Element ids are unique per orchestrator: `{prefix}-{n}`.

pub mod binding;
mod field;
mod value;

pub use binding::InputBinding;
pub use field::{
    ChangeEvent, FieldConfig, FieldHandle, FieldInput, FieldState, FormValues, UpdateOptions,
    ValidationContext,
};
pub use value::FormValue;

use std::collections::BTreeSet;
use std::fmt;

use futures::future::join_all;
use hctl_core::{RequestToken, Subscribers, SubscriptionId, TokenSequence};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::validation::{AsyncValidationFuture, AsyncValidator, Validator, ValidatorFailure};

/// Errors surfaced by form operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// An async validator could not complete.
    #[error("validator for field {field:?} failed: {source}")]
    Validator {
        field: String,
        source: ValidatorFailure,
    },
}

/// Orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Prefix for generated element ids.
    pub id_prefix: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            id_prefix: "hctl-field".to_string(),
        }
    }
}

/// Aggregated, observable form state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormSnapshot {
    /// Every field's current value.
    pub values: FormValues,
    /// Fields with at least one message.
    pub errors: IndexMap<String, Vec<String>>,
    /// Names of touched fields.
    pub touched: BTreeSet<String>,
    /// Names of fields whose value differs from the initial one.
    pub dirty: BTreeSet<String>,
    /// A `submit` is awaiting validation.
    pub submitting: bool,
    /// Any field has an async pass in flight.
    pub validating: bool,
    /// Number of `submit` calls since creation or the last reset.
    pub submit_count: u32,
    /// No errors and nothing validating.
    pub valid: bool,
    /// Most recent validator failure, cleared by the next clean pass.
    pub failure: Option<String>,
}

/// What `submit` reports.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResult {
    /// Values validated by this submit.
    pub values: FormValues,
    /// Fields with at least one message.
    pub errors: IndexMap<String, Vec<String>>,
    /// Whether `on_valid` ran.
    pub valid: bool,
    /// Submit count including this one.
    pub submit_count: u32,
}

// ---------------------------------------------------------------------------
// Two-phase validation
// ---------------------------------------------------------------------------

/// Async half of a validation pass, handed to the host.
#[must_use = "a pending validation does nothing until run and finished"]
pub struct PendingValidation {
    field: String,
    generation: RequestToken,
    checks: Vec<AsyncValidationFuture>,
}

impl fmt::Debug for PendingValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingValidation")
            .field("field", &self.field)
            .field("generation", &self.generation)
            .field("checks", &self.checks.len())
            .finish()
    }
}

impl PendingValidation {
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn generation(&self) -> RequestToken {
        self.generation
    }

    /// Run every async validator concurrently and merge their messages.
    ///
    /// The first failure (in registration order) wins over any messages.
    pub async fn run(self) -> ValidationOutcome {
        let results = join_all(self.checks).await;
        let mut messages = Vec::new();
        let mut failure = None;
        for result in results {
            match result {
                Ok(found) => messages.extend(found.into_iter().filter(|m| !m.is_empty())),
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
        }
        ValidationOutcome {
            field: self.field,
            generation: self.generation,
            result: failure.map_or(Ok(messages), Err),
        }
    }
}

/// A finished async pass, ready for `finish_validation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub field: String,
    pub generation: RequestToken,
    pub result: Result<Vec<String>, ValidatorFailure>,
}

impl ValidationOutcome {
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        generation: RequestToken,
        result: Result<Vec<String>, ValidatorFailure>,
    ) -> Self {
        Self {
            field: field.into(),
            generation,
            result,
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

struct FieldEntry {
    state: FieldState,
    validators: Vec<Box<dyn Validator>>,
    async_validators: Vec<Box<dyn AsyncValidator>>,
}

/// Owns every field of one form.
pub struct FormOrchestrator {
    config: FormConfig,
    fields: IndexMap<String, FieldEntry>,
    next_id: u64,
    generations: TokenSequence,
    submitting: bool,
    submit_count: u32,
    failure: Option<String>,
    snapshot: FormSnapshot,
    subscribers: Subscribers<FormSnapshot>,
}

impl fmt::Debug for FormOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormOrchestrator")
            .field("config", &self.config)
            .field("snapshot", &self.snapshot)
            .field("subscribers", &self.subscribers)
            .finish_non_exhaustive()
    }
}

impl Default for FormOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FormConfig::default())
    }

    #[must_use]
    pub fn with_config(config: FormConfig) -> Self {
        let mut form = Self {
            config,
            fields: IndexMap::new(),
            next_id: 0,
            generations: TokenSequence::new(),
            submitting: false,
            submit_count: 0,
            failure: None,
            snapshot: FormSnapshot::default(),
            subscribers: Subscribers::new(),
        };
        form.refresh();
        form
    }

    // --- Observation ---

    #[must_use]
    pub fn snapshot(&self) -> &FormSnapshot {
        &self.snapshot
    }

    /// State of one field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields.get(name).map(|e| &e.state)
    }

    /// Every field, registration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldState> {
        self.fields.values().map(|e| &e.state)
    }

    /// Subscribe; the listener receives the current snapshot immediately.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&FormSnapshot) + Send + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(&self.snapshot, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // --- Registration ---

    /// Register (or replace) a field.
    pub fn register_field(&mut self, name: impl Into<String>, config: FieldConfig) -> FieldHandle {
        let name = name.into();
        self.next_id += 1;
        let id = format!("{}-{}", self.config.id_prefix, self.next_id);
        let error_id = format!("{id}-error");

        let mut described_by: Vec<String> = Vec::with_capacity(config.described_by.len());
        for desc in config.described_by {
            if !described_by.contains(&desc) {
                described_by.push(desc);
            }
        }
        let state = FieldState {
            name: name.clone(),
            id: id.clone(),
            error_id: error_id.clone(),
            value: config.initial_value.clone(),
            initial_value: config.initial_value,
            touched: false,
            dirty: false,
            errors: Vec::new(),
            validating: false,
            described_by,
            generation: RequestToken::NONE,
        };
        let entry = FieldEntry {
            state,
            validators: config.validators,
            async_validators: config.async_validators,
        };
        if self.fields.insert(name.clone(), entry).is_some() {
            debug!(field = %name, %id, "field re-registered");
        } else {
            trace!(field = %name, %id, "field registered");
        }
        self.commit();
        FieldHandle { name, id, error_id }
    }

    /// Remove a field and all its state. In-flight results for it are
    /// discarded on arrival.
    pub fn unregister_field(&mut self, name: &str) -> bool {
        if self.fields.shift_remove(name).is_none() {
            return false;
        }
        trace!(field = name, "field unregistered");
        self.commit();
        true
    }

    // --- Updates ---

    /// Set a field's value and, unless disabled, validate it.
    ///
    /// Returns the async half of the pass when one is needed. The field
    /// stays `validating` (and the form invalid) until that half is run
    /// and handed to [`finish_validation`](Self::finish_validation); a
    /// dropped pass is only superseded by the next one. Use
    /// [`change_field`](Self::change_field) to drive both halves inline.
    pub fn set_field_value(
        &mut self,
        name: &str,
        input: impl Into<FieldInput>,
        opts: UpdateOptions,
    ) -> Option<PendingValidation> {
        let entry = self.fields.get_mut(name)?;
        entry.state.value = input.into().into_value();
        entry.state.dirty = entry.state.value != entry.state.initial_value;
        trace!(field = name, dirty = entry.state.dirty, "field value set");
        if opts.validate {
            self.begin_validation(name)
        } else {
            self.commit();
            None
        }
    }

    /// Set a field's touched flag and, unless disabled, validate it.
    ///
    /// A returned pass must be finished just like one from
    /// [`set_field_value`](Self::set_field_value).
    pub fn touch_field(
        &mut self,
        name: &str,
        touched: bool,
        opts: UpdateOptions,
    ) -> Option<PendingValidation> {
        let entry = self.fields.get_mut(name)?;
        entry.state.touched = touched;
        if opts.validate {
            self.begin_validation(name)
        } else {
            self.commit();
            None
        }
    }

    /// Restore initial values, clear touched/errors/submit count, and
    /// invalidate every in-flight pass.
    pub fn reset(&mut self) {
        for entry in self.fields.values_mut() {
            let state = &mut entry.state;
            state.value = state.initial_value.clone();
            state.touched = false;
            state.dirty = false;
            state.errors.clear();
            state.validating = false;
            state.generation = self.generations.issue();
        }
        self.submitting = false;
        self.submit_count = 0;
        self.failure = None;
        debug!("form reset");
        self.commit();
    }

    /// Add a description id to a field's `aria-describedby` set.
    pub fn link_description(&mut self, name: &str, id: impl Into<String>) -> bool {
        let id = id.into();
        let Some(entry) = self.fields.get_mut(name) else {
            return false;
        };
        if entry.state.described_by.contains(&id) {
            return false;
        }
        entry.state.described_by.push(id);
        self.commit();
        true
    }

    /// Remove a description id.
    pub fn unlink_description(&mut self, name: &str, id: &str) -> bool {
        let Some(entry) = self.fields.get_mut(name) else {
            return false;
        };
        let before = entry.state.described_by.len();
        entry.state.described_by.retain(|d| d != id);
        if entry.state.described_by.len() == before {
            return false;
        }
        self.commit();
        true
    }

    // --- Validation ---

    /// Run the sync pass now and return the async half, if any.
    pub fn begin_validation(&mut self, name: &str) -> Option<PendingValidation> {
        let ctx = self.context_for(name)?;
        let generation = self.generations.issue();
        let entry = self.fields.get_mut(name)?;
        entry.state.generation = generation;

        let messages: Vec<String> = entry
            .validators
            .iter()
            .flat_map(|v| v.validate(&entry.state.value, &ctx))
            .filter(|m| !m.is_empty())
            .collect();

        if !messages.is_empty() || entry.async_validators.is_empty() {
            debug!(field = name, errors = messages.len(), "field validated");
            entry.state.errors = messages;
            entry.state.validating = false;
            self.commit();
            return None;
        }

        let checks: Vec<AsyncValidationFuture> = entry
            .async_validators
            .iter()
            .map(|v| v.validate(&entry.state.value, &ctx))
            .collect();
        entry.state.errors.clear();
        entry.state.validating = true;
        debug!(field = name, %generation, checks = checks.len(), "async field validation started");
        self.commit();
        Some(PendingValidation {
            field: name.to_string(),
            generation,
            checks,
        })
    }

    /// Apply a finished async pass.
    ///
    /// `Ok(false)` means the outcome was stale (or its field is gone) and
    /// nothing changed.
    pub fn finish_validation(&mut self, outcome: ValidationOutcome) -> Result<bool, FormError> {
        let Some(entry) = self.fields.get_mut(&outcome.field) else {
            debug!(field = %outcome.field, "validation for unregistered field discarded");
            return Ok(false);
        };
        if entry.state.generation != outcome.generation {
            debug!(
                field = %outcome.field,
                generation = %outcome.generation,
                current = %entry.state.generation,
                "stale field validation discarded"
            );
            return Ok(false);
        }
        entry.state.validating = false;
        match outcome.result {
            Ok(messages) => {
                debug!(field = %outcome.field, errors = messages.len(), "async field validation finished");
                entry.state.errors = messages;
                self.failure = None;
                self.commit();
                Ok(true)
            }
            Err(source) => {
                warn!(field = %outcome.field, error = %source, "field validator failed");
                self.failure = Some(source.to_string());
                self.commit();
                Err(FormError::Validator {
                    field: outcome.field,
                    source,
                })
            }
        }
    }

    /// Validate one field to completion; `Ok(None)` for unknown names.
    pub async fn validate_field(&mut self, name: &str) -> Result<Option<FieldState>, FormError> {
        if let Some(pending) = self.begin_validation(name) {
            let outcome = pending.run().await;
            self.finish_validation(outcome)?;
        }
        Ok(self.field(name).cloned())
    }

    /// Set a field's value and await the whole validation pass.
    pub async fn change_field(
        &mut self,
        name: &str,
        input: impl Into<FieldInput>,
    ) -> Result<Option<FieldState>, FormError> {
        if let Some(pending) = self.set_field_value(name, input, UpdateOptions::default()) {
            let outcome = pending.run().await;
            self.finish_validation(outcome)?;
        }
        Ok(self.field(name).cloned())
    }

    /// Validate every field concurrently.
    ///
    /// All outcomes are applied before the first failure, if any, is
    /// returned.
    pub async fn validate_all(&mut self) -> Result<FormSnapshot, FormError> {
        let names: Vec<String> = self.fields.keys().cloned().collect();
        let pending: Vec<PendingValidation> = names
            .iter()
            .filter_map(|name| self.begin_validation(name))
            .collect();
        let outcomes = join_all(pending.into_iter().map(PendingValidation::run)).await;

        let mut first_error = None;
        for outcome in outcomes {
            if let Err(err) = self.finish_validation(outcome) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(self.snapshot.clone()),
        }
    }

    /// Validate everything and call `on_valid` with the values if the form
    /// is valid.
    pub async fn submit<F>(&mut self, on_valid: F) -> Result<SubmitResult, FormError>
    where
        F: FnOnce(&FormValues),
    {
        self.submit_count += 1;
        self.submitting = true;
        debug!(submit_count = self.submit_count, "form submit started");
        self.commit();

        let snapshot = match self.validate_all().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.submitting = false;
                self.commit();
                return Err(err);
            }
        };
        if snapshot.valid {
            on_valid(&snapshot.values);
        }
        self.submitting = false;
        debug!(valid = snapshot.valid, "form submit finished");
        self.commit();
        Ok(SubmitResult {
            values: snapshot.values,
            errors: snapshot.errors,
            valid: snapshot.valid,
            submit_count: self.submit_count,
        })
    }

    // --- Internals ---

    fn context_for(&self, name: &str) -> Option<ValidationContext> {
        let entry = self.fields.get(name)?;
        Some(ValidationContext {
            values: self
                .fields
                .iter()
                .map(|(k, e)| (k.clone(), e.state.value.clone()))
                .collect(),
            name: name.to_string(),
            touched: entry.state.touched,
            dirty: entry.state.dirty,
        })
    }

    fn refresh(&mut self) {
        let mut snap = FormSnapshot {
            submitting: self.submitting,
            submit_count: self.submit_count,
            failure: self.failure.clone(),
            ..FormSnapshot::default()
        };
        for (name, entry) in &self.fields {
            let state = &entry.state;
            snap.values.insert(name.clone(), state.value.clone());
            if !state.errors.is_empty() {
                snap.errors.insert(name.clone(), state.errors.clone());
            }
            if state.touched {
                snap.touched.insert(name.clone());
            }
            if state.dirty {
                snap.dirty.insert(name.clone());
            }
            snap.validating |= state.validating;
        }
        snap.valid = snap.errors.is_empty() && !snap.validating;
        self.snapshot = snap;
    }

    fn commit(&mut self) {
        self.refresh();
        self.subscribers.notify(&self.snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{MinLength, Required};
    use futures::FutureExt;
    use futures::executor::block_on;
    use std::sync::{Arc, Mutex};

    fn echo_async(message: &'static str) -> impl AsyncValidator {
        move |value: &FormValue, _: &ValidationContext| -> AsyncValidationFuture {
            let value = value.clone();
            async move {
                if value.to_string().contains('!') {
                    Ok(vec![message.to_string()])
                } else {
                    Ok(Vec::new())
                }
            }
            .boxed()
        }
    }

    #[test]
    fn ids_come_from_a_per_instance_counter() {
        let mut a = FormOrchestrator::new();
        let mut b = FormOrchestrator::with_config(FormConfig {
            id_prefix: "signup".into(),
        });
        let first = a.register_field("email", FieldConfig::new());
        let second = a.register_field("name", FieldConfig::new());
        let other = b.register_field("email", FieldConfig::new());
        assert_eq!(first.id, "hctl-field-1");
        assert_eq!(first.error_id, "hctl-field-1-error");
        assert_eq!(second.id, "hctl-field-2");
        assert_eq!(other.id, "signup-1");
    }

    #[test]
    fn dirty_tracks_initial_value() {
        let mut form = FormOrchestrator::new();
        form.register_field("name", FieldConfig::new().with_initial("ada"));
        let none = UpdateOptions::new().without_validation();
        assert!(form.set_field_value("name", "grace", none).is_none());
        assert!(form.field("name").unwrap().dirty);
        assert!(form.snapshot().dirty.contains("name"));
        let _ = form.set_field_value("name", "ada", none);
        assert!(!form.field("name").unwrap().dirty);
    }

    #[test]
    fn change_events_extract_value() {
        let mut form = FormOrchestrator::new();
        form.register_field("agree", FieldConfig::new().with_initial(false));
        form.register_field("bio", FieldConfig::new());
        let none = UpdateOptions::new().without_validation();
        let _ = form.set_field_value("agree", ChangeEvent::checkbox(true), none);
        let _ = form.set_field_value("bio", ChangeEvent::text("hi"), none);
        assert_eq!(form.field("agree").unwrap().value, FormValue::Bool(true));
        assert_eq!(form.field("bio").unwrap().value, FormValue::from("hi"));
    }

    #[test]
    fn sync_pass_collects_every_message() {
        let mut form = FormOrchestrator::new();
        form.register_field(
            "user",
            FieldConfig::new()
                .with_validator(Required::new())
                .with_validator(MinLength::new(3)),
        );
        assert!(form.set_field_value("user", "", UpdateOptions::new()).is_none());
        assert_eq!(
            form.field("user").unwrap().errors,
            vec!["This field is required", "Must be at least 3 characters"]
        );
        assert!(!form.snapshot().valid);
    }

    #[test]
    fn blank_messages_are_not_errors() {
        let mut form = FormOrchestrator::new();
        form.register_field(
            "user",
            FieldConfig::new()
                .with_validator(|_: &FormValue, _: &ValidationContext| vec![String::new()])
                .with_async_validator(
                    |_: &FormValue, _: &ValidationContext| -> AsyncValidationFuture {
                        async { Ok(vec![String::new(), "taken".to_string()]) }.boxed()
                    },
                ),
        );
        let pending = form
            .set_field_value("user", "hello", UpdateOptions::new())
            .expect("blank sync messages do not block the async pass");
        assert_eq!(form.finish_validation(block_on(pending.run())), Ok(true));
        assert_eq!(form.field("user").unwrap().errors, vec!["taken"]);
    }

    #[test]
    fn blank_messages_leave_field_valid() {
        let mut form = FormOrchestrator::new();
        form.register_field(
            "user",
            FieldConfig::new()
                .with_validator(|_: &FormValue, _: &ValidationContext| vec![String::new()])
                .with_async_validator(
                    |_: &FormValue, _: &ValidationContext| -> AsyncValidationFuture {
                        async { Ok(vec![String::new()]) }.boxed()
                    },
                ),
        );
        let field = block_on(form.change_field("user", "hello")).unwrap().unwrap();
        assert!(field.errors.is_empty());
        assert!(!field.validating);
        assert!(form.snapshot().valid);
    }

    #[test]
    fn dropped_pass_keeps_field_validating() {
        let mut form = FormOrchestrator::new();
        form.register_field("user", FieldConfig::new().with_async_validator(echo_async("bang")));
        drop(form.set_field_value("user", "hey!", UpdateOptions::new()));
        assert!(form.field("user").unwrap().validating);
        assert!(!form.snapshot().valid);

        let field = block_on(form.change_field("user", "hey")).unwrap().unwrap();
        assert!(!field.validating);
        assert!(form.snapshot().valid);
    }

    #[test]
    fn sync_errors_skip_async_validators() {
        let mut form = FormOrchestrator::new();
        form.register_field(
            "user",
            FieldConfig::new()
                .with_validator(Required::new())
                .with_async_validator(echo_async("never")),
        );
        assert!(form.set_field_value("user", " ", UpdateOptions::new()).is_none());
        assert!(!form.field("user").unwrap().validating);
    }

    #[test]
    fn touch_validates_by_default() {
        let mut form = FormOrchestrator::new();
        form.register_field("user", FieldConfig::new().with_validator(Required::new()));
        let _ = form.touch_field("user", true, UpdateOptions::new().without_validation());
        assert!(form.field("user").unwrap().errors.is_empty());
        let _ = form.touch_field("user", true, UpdateOptions::new());
        assert_eq!(form.field("user").unwrap().errors.len(), 1);
        assert!(form.snapshot().touched.contains("user"));
    }

    #[test]
    fn validating_flag_is_observable() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut form = FormOrchestrator::new();
        form.register_field("user", FieldConfig::new().with_async_validator(echo_async("bang")));
        form.subscribe(move |s| sink.lock().unwrap().push(s.validating));

        let pending = form.set_field_value("user", "hey!", UpdateOptions::new()).unwrap();
        assert!(form.field("user").unwrap().validating);
        assert!(!form.snapshot().valid);
        let outcome = block_on(pending.run());
        assert_eq!(form.finish_validation(outcome), Ok(true));
        assert_eq!(form.field("user").unwrap().errors, vec!["bang"]);
        assert_eq!(*seen.lock().unwrap(), vec![false, true, false]);
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut form = FormOrchestrator::new();
        form.register_field("user", FieldConfig::new().with_async_validator(echo_async("bang")));

        let slow = form.set_field_value("user", "old!", UpdateOptions::new()).unwrap();
        let fast = form.set_field_value("user", "new", UpdateOptions::new()).unwrap();
        assert!(fast.generation() > slow.generation());

        assert_eq!(form.finish_validation(block_on(fast.run())), Ok(true));
        assert_eq!(form.finish_validation(block_on(slow.run())), Ok(false));
        assert!(form.field("user").unwrap().errors.is_empty());
        assert!(!form.field("user").unwrap().validating);
    }

    #[test]
    fn reset_invalidates_in_flight_passes() {
        let mut form = FormOrchestrator::new();
        form.register_field(
            "user",
            FieldConfig::new()
                .with_initial("x")
                .with_async_validator(echo_async("bang")),
        );
        let pending = form.set_field_value("user", "y!", UpdateOptions::new()).unwrap();
        form.reset();
        assert_eq!(form.finish_validation(block_on(pending.run())), Ok(false));
        let field = form.field("user").unwrap();
        assert_eq!(field.value, FormValue::from("x"));
        assert!(!field.dirty && !field.validating && field.errors.is_empty());
    }

    #[test]
    fn unknown_fields_are_no_ops() {
        let mut form = FormOrchestrator::new();
        assert!(form.set_field_value("ghost", "x", UpdateOptions::new()).is_none());
        assert!(form.touch_field("ghost", true, UpdateOptions::new()).is_none());
        assert!(!form.unregister_field("ghost"));
        assert!(!form.link_description("ghost", "hint"));
        assert_eq!(block_on(form.validate_field("ghost")), Ok(None));
        assert_eq!(
            form.finish_validation(ValidationOutcome::new("ghost", RequestToken::NONE, Ok(Vec::new()))),
            Ok(false)
        );
    }

    #[test]
    fn descriptions_are_deduplicated() {
        let mut form = FormOrchestrator::new();
        form.register_field("pw", FieldConfig::new().described_by("hint").described_by("hint"));
        assert_eq!(form.field("pw").unwrap().described_by, vec!["hint"]);
        assert!(form.link_description("pw", "rules"));
        assert!(!form.link_description("pw", "rules"));
        assert!(form.unlink_description("pw", "hint"));
        assert!(!form.unlink_description("pw", "hint"));
        assert_eq!(form.field("pw").unwrap().described_by, vec!["rules"]);
    }

    #[test]
    fn validators_see_form_context() {
        let mut form = FormOrchestrator::new();
        form.register_field("password", FieldConfig::new().with_initial("hunter2"));
        form.register_field(
            "confirm",
            FieldConfig::new().with_validator(|v: &FormValue, ctx: &ValidationContext| {
                if ctx.values.get("password") == Some(v) {
                    Vec::new()
                } else {
                    vec![format!("{} must match password", ctx.name)]
                }
            }),
        );
        let _ = form.set_field_value("confirm", "hunter3", UpdateOptions::new());
        assert_eq!(form.field("confirm").unwrap().errors, vec!["confirm must match password"]);
        let _ = form.set_field_value("confirm", "hunter2", UpdateOptions::new());
        assert!(form.field("confirm").unwrap().errors.is_empty());
    }
}
