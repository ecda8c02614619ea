#![forbid(unsafe_code)]

//! Built-in validators.
//!
//! Messages are templates; `{name}` placeholders are filled from the
//! validator's parameters, so a custom message may reuse them:
//! `MinLength::new(8).with_message("Use {min}+ characters")`.

use super::Validator;
use crate::forms::{FormValue, ValidationContext};

/// Replace `{key}` placeholders in `template`.
#[must_use]
pub fn interpolate(template: &str, params: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in params {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

fn one(message: String) -> Vec<String> {
    vec![message]
}

// ---------------------------------------------------------------------------
// Required
// ---------------------------------------------------------------------------

/// Rejects blank values (see [`FormValue::is_blank`]).
#[derive(Debug, Clone)]
pub struct Required {
    message: String,
}

impl Default for Required {
    fn default() -> Self {
        Self {
            message: "This field is required".to_string(),
        }
    }
}

impl Required {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Validator for Required {
    fn validate(&self, value: &FormValue, _ctx: &ValidationContext) -> Vec<String> {
        if value.is_blank() {
            one(self.message.clone())
        } else {
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Length
// ---------------------------------------------------------------------------

/// Requires at least `min` characters (or list elements).
#[derive(Debug, Clone)]
pub struct MinLength {
    pub min: usize,
    message: String,
}

impl MinLength {
    #[must_use]
    pub fn new(min: usize) -> Self {
        Self {
            min,
            message: "Must be at least {min} characters".to_string(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Validator for MinLength {
    fn validate(&self, value: &FormValue, _ctx: &ValidationContext) -> Vec<String> {
        let len = value.length();
        if len >= self.min {
            return Vec::new();
        }
        one(interpolate(
            &self.message,
            &[("min", self.min.to_string()), ("actual", len.to_string())],
        ))
    }
}

/// Allows at most `max` characters (or list elements).
#[derive(Debug, Clone)]
pub struct MaxLength {
    pub max: usize,
    message: String,
}

impl MaxLength {
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            max,
            message: "Must be at most {max} characters".to_string(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Validator for MaxLength {
    fn validate(&self, value: &FormValue, _ctx: &ValidationContext) -> Vec<String> {
        let len = value.length();
        if len <= self.max {
            return Vec::new();
        }
        one(interpolate(
            &self.message,
            &[("max", self.max.to_string()), ("actual", len.to_string())],
        ))
    }
}

// ---------------------------------------------------------------------------
// Contains
// ---------------------------------------------------------------------------

/// Requires the value's text to contain `needle`. Blank values pass.
#[derive(Debug, Clone)]
pub struct Contains {
    pub needle: String,
    message: String,
}

impl Contains {
    #[must_use]
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
            message: "Must include {needle}".to_string(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Validator for Contains {
    fn validate(&self, value: &FormValue, _ctx: &ValidationContext) -> Vec<String> {
        if value.is_blank() || value.to_string().contains(&self.needle) {
            return Vec::new();
        }
        one(interpolate(&self.message, &[("needle", self.needle.clone())]))
    }
}

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

/// Heuristic address check: `local@domain.tld` with a TLD of two or more
/// characters and no empty domain labels. Blank values pass.
#[derive(Debug, Clone)]
pub struct Email {
    message: String,
}

impl Default for Email {
    fn default() -> Self {
        Self {
            message: "Invalid email address".to_string(),
        }
    }
}

impl Email {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Whether `address` passes the heuristic.
    #[must_use]
    pub fn is_plausible(address: &str) -> bool {
        let Some((local, domain)) = address.trim().split_once('@') else {
            return false;
        };
        if local.is_empty() || domain.contains('@') {
            return false;
        }
        let labels: Vec<&str> = domain.split('.').collect();
        labels.len() >= 2
            && labels.iter().all(|l| !l.is_empty())
            && labels.last().is_some_and(|tld| tld.chars().count() >= 2)
    }
}

impl Validator for Email {
    fn validate(&self, value: &FormValue, _ctx: &ValidationContext) -> Vec<String> {
        if value.is_blank() || Self::is_plausible(&value.to_string()) {
            Vec::new()
        } else {
            one(self.message.clone())
        }
    }
}
