#![forbid(unsafe_code)]

//! Declarative keymaps.
//!
//! A keymap is `{scope: {action: combos}}`, where `combos` is a single
//! string or a list:
//!
//! ```json
//! {
//!   "global":  { "palette.open": ["Mod+K", "Mod+Shift+P"] },
//!   "palette": { "palette.close": "Esc" }
//! }
//! ```
//!
//! `register_keymap` asks a factory for each action's handler and binds the
//! combos with the action name as the cheat-sheet description.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{BindingHandle, HotkeyError, HotkeyHandler, HotkeyManager, HotkeyOptions};

/// One or more combos for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComboList {
    One(String),
    Many(Vec<String>),
}

impl ComboList {
    /// The combos as a slice-like list.
    #[must_use]
    pub fn combos(&self) -> Vec<&str> {
        match self {
            Self::One(c) => vec![c.as_str()],
            Self::Many(cs) => cs.iter().map(String::as_str).collect(),
        }
    }
}

/// Scope → action → combos, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keymap {
    scopes: IndexMap<String, IndexMap<String, ComboList>>,
}

impl Keymap {
    /// Empty keymap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON keymap.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Add or replace an action's combos.
    #[must_use]
    pub fn bind<I, S>(mut self, scope: impl Into<String>, action: impl Into<String>, combos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes.entry(scope.into()).or_default().insert(
            action.into(),
            ComboList::Many(combos.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// `(scope, action, combos)` in declaration order.
    pub fn actions(&self) -> impl Iterator<Item = (&str, &str, &ComboList)> {
        self.scopes.iter().flat_map(|(scope, actions)| {
            actions
                .iter()
                .map(move |(action, combos)| (scope.as_str(), action.as_str(), combos))
        })
    }

    /// Whether no action is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.values().all(IndexMap::is_empty)
    }
}

/// A binding created from a keymap action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapBinding {
    pub scope: String,
    pub action: String,
    pub handle: BindingHandle,
}

impl HotkeyManager {
    /// Bind every action `factory` knows a handler for.
    ///
    /// Actions the factory returns `None` for are skipped. On a parse error
    /// every binding made by this call is removed again.
    pub fn register_keymap<F>(
        &mut self,
        keymap: &Keymap,
        mut factory: F,
    ) -> Result<Vec<KeymapBinding>, HotkeyError>
    where
        F: FnMut(&str) -> Option<HotkeyHandler>,
    {
        let mut bound: Vec<KeymapBinding> = Vec::new();
        for (scope, action, combos) in keymap.actions() {
            let Some(handler) = factory(action) else {
                trace!(scope, action, "keymap action has no handler");
                continue;
            };
            let options = HotkeyOptions::new()
                .in_scope(scope)
                .with_description(action);
            let handle = match self.register_boxed(combos.combos(), handler, options) {
                Ok(handle) => handle,
                Err(err) => {
                    for binding in &bound {
                        self.unregister(&binding.handle);
                    }
                    return Err(err);
                }
            };
            bound.push(KeymapBinding {
                scope: scope.to_string(),
                action: action.to_string(),
                handle,
            });
        }
        Ok(bound)
    }
}
