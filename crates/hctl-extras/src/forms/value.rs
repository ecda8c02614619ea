#![forbid(unsafe_code)]

//! Field values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value held by a form field.
///
/// Serializes untagged: `null`, `true`, `3.5`, `"text"`,
/// `{"index": 1, "label": "Blue"}`, `[...]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    Choice { index: usize, label: String },
    List(Vec<FormValue>),
}

impl FormValue {
    /// Text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content, if this is a bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether the value counts as "not filled in": empty, blank text, or an
    /// empty list.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Length used by length validators: chars for text-like values,
    /// element count for lists.
    #[must_use]
    pub fn length(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Text(s) => s.chars().count(),
            Self::Choice { label, .. } => label.chars().count(),
            Self::List(items) => items.len(),
            other => other.to_string().chars().count(),
        }
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Choice { label, .. } => f.write_str(label),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FormValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for FormValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for FormValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl<T: Into<FormValue>> From<Vec<T>> for FormValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values() {
        assert!(FormValue::Empty.is_blank());
        assert!(FormValue::from("   ").is_blank());
        assert!(FormValue::List(Vec::new()).is_blank());
        assert!(!FormValue::from(false).is_blank());
        assert!(!FormValue::from(0).is_blank());
    }

    #[test]
    fn lengths() {
        assert_eq!(FormValue::from("héllo").length(), 5);
        assert_eq!(FormValue::from(vec!["a", "b"]).length(), 2);
        assert_eq!(FormValue::from(12).length(), 2);
        assert_eq!(FormValue::Empty.length(), 0);
    }

    #[test]
    fn untagged_json() {
        let values: Vec<FormValue> =
            serde_json::from_str(r#"[null, true, 2.5, "hi", {"index": 1, "label": "Blue"}, ["x"]]"#)
                .unwrap();
        assert_eq!(
            values,
            vec![
                FormValue::Empty,
                FormValue::Bool(true),
                FormValue::Number(2.5),
                FormValue::from("hi"),
                FormValue::Choice {
                    index: 1,
                    label: "Blue".into()
                },
                FormValue::from(vec!["x"]),
            ]
        );
    }

    #[test]
    fn display_joins_lists() {
        assert_eq!(FormValue::from(vec!["a", "b"]).to_string(), "a, b");
        assert_eq!(FormValue::Empty.to_string(), "");
    }
}
