#![forbid(unsafe_code)]

//! Scoped hotkey dispatch.
//!
//! Bindings live in scopes; within a scope they are bucketed by canonical
//! combo (see [`combo`]). `handle_keydown` searches the requested scope and
//! then [`GLOBAL_SCOPE`]:
//!
//! ```text
//! scope "palette"  ─┬─ "escape"  [b3, b1]   (newest first)
//!                   └─ "enter"   [b2]
//! scope "global"   ─── "ctrl+k"  [b0]
//! ```
//!
//! The first matching binding whose handler returns
//! [`Propagation::Handled`] ends dispatch.
//!
//! # Invariants
//!
//! 1. Buckets are visited in first-registration order, bindings within a
//!    bucket newest-first.
//! 2. A registration is atomic: either every combo parses and all are bound,
//!    or nothing is.
//! 3. `unregister` removes every binding created by that registration and
//!    drops empty buckets and scopes.

pub mod combo;
pub mod keymap;

use std::collections::HashMap;
use std::fmt;

use hctl_core::KeyboardEvent;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use combo::{Combo, ComboModifier, normalize_key};
pub use keymap::Keymap;

/// Scope searched after the caller's scope on every dispatch.
pub const GLOBAL_SCOPE: &str = "global";

/// Errors from binding registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HotkeyError {
    /// The combo string was blank.
    #[error("hotkey combo is empty")]
    EmptyCombo,
    /// A `+`-separated token was blank (e.g. `"Ctrl++K"`).
    #[error("hotkey combo {combo:?} contains an empty token")]
    EmptyToken { combo: String },
    /// More than one non-modifier key.
    #[error("hotkey combo {combo:?} names two keys: {first:?} and {second:?}")]
    MultipleKeys {
        combo: String,
        first: String,
        second: String,
    },
    /// `register` was called with no combos.
    #[error("no combos supplied")]
    NoCombos,
}

/// Whether dispatch continues after a handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Stop; the event is consumed.
    #[default]
    Handled,
    /// Keep searching lower-precedence bindings.
    Continue,
}

/// What a handler learns about the binding that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyContext<'a> {
    /// Canonical combo, e.g. `"ctrl+k"`.
    pub combo: &'a str,
    /// Display combo, e.g. `"Ctrl + K"`.
    pub printable: &'a str,
    /// Scope the binding was found in.
    pub scope: &'a str,
    /// Whether that scope is [`GLOBAL_SCOPE`].
    pub global: bool,
}

/// Handler invoked on a matching keydown.
pub type HotkeyHandler =
    Box<dyn FnMut(&dyn KeyboardEvent, &HotkeyContext<'_>) -> Propagation + Send>;

fn default_true() -> bool {
    true
}

/// Per-registration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyOptions {
    /// Scope to bind in; `None` means [`GLOBAL_SCOPE`].
    pub scope: Option<String>,
    /// Call `prevent_default` on a match.
    #[serde(default = "default_true")]
    pub prevent_default: bool,
    /// Skip (and hide from the cheat sheet) while focus is trapped.
    pub hide_when_focus_trapped: bool,
    /// Cheat-sheet description.
    pub description: Option<String>,
}

impl Default for HotkeyOptions {
    fn default() -> Self {
        Self {
            scope: None,
            prevent_default: true,
            hide_when_focus_trapped: false,
            description: None,
        }
    }
}

impl HotkeyOptions {
    /// Global-scope options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind in `scope`.
    #[must_use]
    pub fn in_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set the cheat-sheet description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Leave the event's default action alone.
    #[must_use]
    pub fn allow_default(mut self) -> Self {
        self.prevent_default = false;
        self
    }

    /// Disable while focus is trapped.
    #[must_use]
    pub fn hide_when_focus_trapped(mut self) -> Self {
        self.hide_when_focus_trapped = true;
        self
    }

    fn scope_name(&self) -> &str {
        self.scope.as_deref().unwrap_or(GLOBAL_SCOPE)
    }
}

/// Handle returned by `register`, used to remove the bindings again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingHandle(u64);

impl BindingHandle {
    /// Raw registration number.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Read-only view of one binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyBinding {
    /// Scope the binding lives in.
    pub scope: String,
    /// Canonical combo, e.g. `ctrl+shift+k`.
    pub combo: String,
    /// Display form, e.g. `Ctrl + Shift + K`.
    pub printable: String,
    /// Parsed modifiers and key.
    pub parts: Combo,
    /// Options given at registration.
    pub options: HotkeyOptions,
}

/// Cheat-sheet query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheatSheetOptions {
    /// Scopes to list, in order. Empty lists every scope.
    pub scopes: Vec<String>,
    /// Append [`GLOBAL_SCOPE`] when not already listed.
    #[serde(default = "default_true")]
    pub include_global: bool,
}

impl Default for CheatSheetOptions {
    fn default() -> Self {
        Self {
            scopes: Vec::new(),
            include_global: true,
        }
    }
}

impl CheatSheetOptions {
    /// List only `scopes` (plus global).
    #[must_use]
    pub fn for_scopes<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
            include_global: true,
        }
    }

    /// Leave global bindings out.
    #[must_use]
    pub fn without_global(mut self) -> Self {
        self.include_global = false;
        self
    }
}

/// One cheat-sheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheatSheetEntry {
    /// Scope the binding lives in.
    pub scope: String,
    /// Canonical combo.
    pub combo: String,
    /// Display form.
    pub printable: String,
    /// Registration description, if any.
    pub description: Option<String>,
    /// Currently disabled by the focus trap.
    pub hidden: bool,
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

struct Registration {
    handler: HotkeyHandler,
    options: HotkeyOptions,
}

struct BindingSlot {
    registration: u64,
    combo: Combo,
    printable: String,
}

type Buckets = IndexMap<String, Vec<BindingSlot>>;

/// Scoped hotkey registry and dispatcher.
#[derive(Default)]
pub struct HotkeyManager {
    scopes: IndexMap<String, Buckets>,
    registrations: HashMap<u64, Registration>,
    next_registration: u64,
    focus_trapped: bool,
}

impl fmt::Debug for HotkeyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotkeyManager")
            .field("scopes", &self.scopes.keys().collect::<Vec<_>>())
            .field("registrations", &self.registrations.len())
            .field("focus_trapped", &self.focus_trapped)
            .finish()
    }
}

impl HotkeyManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to every combo in `combos`.
    pub fn register<I, S, F>(
        &mut self,
        combos: I,
        handler: F,
        options: HotkeyOptions,
    ) -> Result<BindingHandle, HotkeyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&dyn KeyboardEvent, &HotkeyContext<'_>) -> Propagation + Send + 'static,
    {
        self.register_boxed(combos, Box::new(handler), options)
    }

    /// `register` for an already boxed handler.
    pub fn register_boxed<I, S>(
        &mut self,
        combos: I,
        handler: HotkeyHandler,
        options: HotkeyOptions,
    ) -> Result<BindingHandle, HotkeyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = combos
            .into_iter()
            .map(|c| Combo::parse(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if parsed.is_empty() {
            return Err(HotkeyError::NoCombos);
        }

        self.next_registration += 1;
        let id = self.next_registration;
        let scope = options.scope_name().to_string();
        let buckets = self.scopes.entry(scope.clone()).or_default();
        for combo in parsed {
            let canonical = combo.canonical();
            debug!(scope = %scope, combo = %canonical, "hotkey registered");
            let printable = combo.printable();
            buckets.entry(canonical).or_default().push(BindingSlot {
                registration: id,
                combo,
                printable,
            });
        }
        self.registrations
            .insert(id, Registration { handler, options });
        Ok(BindingHandle(id))
    }

    /// Remove every binding from `handle`'s registration.
    ///
    /// Returns `false` if it was already removed.
    pub fn unregister(&mut self, handle: &BindingHandle) -> bool {
        let Some(registration) = self.registrations.remove(&handle.0) else {
            return false;
        };
        let scope = registration.options.scope_name();
        if let Some(buckets) = self.scopes.get_mut(scope) {
            for slots in buckets.values_mut() {
                slots.retain(|slot| slot.registration != handle.0);
            }
            buckets.retain(|_, slots| !slots.is_empty());
            if buckets.is_empty() {
                self.scopes.shift_remove(scope);
            }
        }
        debug!(scope, registration = handle.0, "hotkey unregistered");
        true
    }

    /// Dispatch a keydown. Returns whether a handler consumed it.
    pub fn handle_keydown(&mut self, event: &mut dyn KeyboardEvent, scope: Option<&str>) -> bool {
        let key = normalize_key(event.key());
        let held = event.modifiers();
        let mut order: Vec<&str> = Vec::with_capacity(2);
        if let Some(s) = scope.filter(|s| *s != GLOBAL_SCOPE) {
            order.push(s);
        }
        order.push(GLOBAL_SCOPE);

        for scope_name in order {
            let Some(buckets) = self.scopes.get(scope_name) else {
                continue;
            };
            for (canonical, slots) in buckets {
                for slot in slots.iter().rev() {
                    let Some(reg) = self.registrations.get_mut(&slot.registration) else {
                        continue;
                    };
                    if self.focus_trapped && reg.options.hide_when_focus_trapped {
                        continue;
                    }
                    if !slot.combo.matches(&key, held) {
                        continue;
                    }
                    let ctx = HotkeyContext {
                        combo: canonical,
                        printable: &slot.printable,
                        scope: scope_name,
                        global: scope_name == GLOBAL_SCOPE,
                    };
                    let propagation = (reg.handler)(&*event, &ctx);
                    if reg.options.prevent_default {
                        event.prevent_default();
                    }
                    debug!(scope = scope_name, combo = %canonical, ?propagation, "hotkey fired");
                    if propagation == Propagation::Handled {
                        return true;
                    }
                }
            }
        }
        trace!(key = %key, "no hotkey consumed keydown");
        false
    }

    /// Enable or disable the focus trap.
    pub fn set_focus_trapped(&mut self, trapped: bool) {
        self.focus_trapped = trapped;
    }

    /// Whether the focus trap is active.
    #[must_use]
    pub fn focus_trapped(&self) -> bool {
        self.focus_trapped
    }

    /// Registered scope names, in first-registration order.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }

    /// Bindings in `scope`, bucket order then registration order.
    #[must_use]
    pub fn bindings(&self, scope: &str) -> Vec<HotkeyBinding> {
        let Some(buckets) = self.scopes.get(scope) else {
            return Vec::new();
        };
        buckets
            .iter()
            .flat_map(|(canonical, slots)| {
                slots.iter().filter_map(move |slot| {
                    let reg = self.registrations.get(&slot.registration)?;
                    Some(HotkeyBinding {
                        scope: scope.to_string(),
                        combo: canonical.clone(),
                        printable: slot.printable.clone(),
                        parts: slot.combo.clone(),
                        options: reg.options.clone(),
                    })
                })
            })
            .collect()
    }

    /// Flatten bindings into cheat-sheet rows.
    #[must_use]
    pub fn cheat_sheet(&self, options: &CheatSheetOptions) -> Vec<CheatSheetEntry> {
        let mut scopes: Vec<&str> = if options.scopes.is_empty() {
            self.scopes
                .keys()
                .map(String::as_str)
                .filter(|s| *s != GLOBAL_SCOPE)
                .collect()
        } else {
            options.scopes.iter().map(String::as_str).collect()
        };
        if options.include_global && !scopes.contains(&GLOBAL_SCOPE) {
            scopes.push(GLOBAL_SCOPE);
        }

        scopes
            .into_iter()
            .flat_map(|scope| self.bindings(scope))
            .map(|binding| CheatSheetEntry {
                hidden: self.focus_trapped && binding.options.hide_when_focus_trapped,
                description: binding.options.description,
                scope: binding.scope,
                combo: binding.combo,
                printable: binding.printable,
            })
            .collect()
    }
}
