#![forbid(unsafe_code)]

//! Field validator traits and built-in validators.
//!
//! Sync validators return messages; an empty `Vec` means valid. Every
//! registered validator runs, so a field can carry several messages at once.
//! Async validators return a future resolving to messages, or to a
//! [`ValidatorFailure`] when the check itself could not run.
//!
//! # Example
//!
//! ```rust
//! use hctl_extras::forms::{FormValue, ValidationContext};
//! use hctl_extras::validation::{MinLength, Required, Validator};
//!
//! let ctx = ValidationContext::detached("username");
//! assert!(Required::new().validate(&FormValue::from("alice"), &ctx).is_empty());
//! assert_eq!(
//!     MinLength::new(3).validate(&FormValue::from("ab"), &ctx),
//!     vec!["Must be at least 3 characters".to_string()]
//! );
//! ```

mod validators;

use futures::future::BoxFuture;

use crate::forms::{FormValue, ValidationContext};

pub use validators::{Contains, Email, MaxLength, MinLength, Required, interpolate};

/// A check that could not complete (transport error, timeout, bug).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidatorFailure {
    pub message: String,
}

impl ValidatorFailure {
    /// Create a failure with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Synchronous field validator.
pub trait Validator: Send + Sync {
    /// Messages for `value`; empty when valid.
    fn validate(&self, value: &FormValue, ctx: &ValidationContext) -> Vec<String>;
}

impl<F> Validator for F
where
    F: Fn(&FormValue, &ValidationContext) -> Vec<String> + Send + Sync,
{
    fn validate(&self, value: &FormValue, ctx: &ValidationContext) -> Vec<String> {
        self(value, ctx)
    }
}

/// Future produced by an async validator.
pub type AsyncValidationFuture = BoxFuture<'static, Result<Vec<String>, ValidatorFailure>>;

/// Asynchronous field validator.
///
/// The future must own what it needs; clone from `value` and `ctx`.
pub trait AsyncValidator: Send + Sync {
    /// Start validating `value`.
    fn validate(&self, value: &FormValue, ctx: &ValidationContext) -> AsyncValidationFuture;
}

impl<F> AsyncValidator for F
where
    F: Fn(&FormValue, &ValidationContext) -> AsyncValidationFuture + Send + Sync,
{
    fn validate(&self, value: &FormValue, ctx: &ValidationContext) -> AsyncValidationFuture {
        self(value, ctx)
    }
}
