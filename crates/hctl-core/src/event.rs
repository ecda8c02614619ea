#![forbid(unsafe_code)]

//! Structural keyboard and pointer inputs.
//!
//! Controllers never require a concrete event type. Anything that can report a
//! key name, the four modifier flags, and accept `prevent_default()` is a
//! [`KeyboardEvent`]. [`KeyInput`] is the stock implementation used by tests
//! and by hosts that translate their own native events.
//!
//! # Design Notes
//!
//! - Key names follow the DOM `KeyboardEvent.key` vocabulary (`"ArrowDown"`,
//!   `"Enter"`, `" "`, `"k"`), see [`keys`].
//! - [`Modifiers`] doubles as the pointer-modifier input for selection.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a key or pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Meta/Command/Super key.
        const META  = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl Modifiers {
    /// Ctrl or Meta held (the platform "command" modifier).
    #[must_use]
    pub const fn command(self) -> bool {
        self.intersects(Self::CTRL.union(Self::META))
    }

    /// Shift held.
    #[must_use]
    pub const fn shift(self) -> bool {
        self.contains(Self::SHIFT)
    }
}

/// Well-known key names, as reported in `KeyboardEvent.key`.
pub mod keys {
    pub const ARROW_UP: &str = "ArrowUp";
    pub const ARROW_DOWN: &str = "ArrowDown";
    pub const ARROW_LEFT: &str = "ArrowLeft";
    pub const ARROW_RIGHT: &str = "ArrowRight";
    pub const HOME: &str = "Home";
    pub const END: &str = "End";
    pub const PAGE_UP: &str = "PageUp";
    pub const PAGE_DOWN: &str = "PageDown";
    pub const ENTER: &str = "Enter";
    pub const ESCAPE: &str = "Escape";
    pub const SPACE: &str = " ";
    pub const TAB: &str = "Tab";
}

/// Anything shaped like a keyboard event.
///
/// The trait is object safe; hotkey handlers receive `&dyn KeyboardEvent`.
pub trait KeyboardEvent {
    /// Key name (DOM `key` vocabulary).
    fn key(&self) -> &str;

    /// Control key held.
    fn ctrl_key(&self) -> bool;

    /// Meta/Command key held.
    fn meta_key(&self) -> bool;

    /// Alt/Option key held.
    fn alt_key(&self) -> bool;

    /// Shift key held.
    fn shift_key(&self) -> bool;

    /// Ask the host to suppress its default action for this event.
    fn prevent_default(&mut self);

    /// Collapse the four flags into [`Modifiers`].
    fn modifiers(&self) -> Modifiers {
        let mut mods = Modifiers::NONE;
        mods.set(Modifiers::CTRL, self.ctrl_key());
        mods.set(Modifiers::META, self.meta_key());
        mods.set(Modifiers::ALT, self.alt_key());
        mods.set(Modifiers::SHIFT, self.shift_key());
        mods
    }
}

/// A plain keyboard event value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// Key name.
    pub key: String,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
    default_prevented: bool,
}

impl KeyInput {
    /// Create a key event with no modifiers.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::NONE,
            default_prevented: false,
        }
    }

    /// Set modifiers (builder).
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Add Ctrl (builder).
    #[must_use]
    pub fn ctrl(mut self) -> Self {
        self.modifiers |= Modifiers::CTRL;
        self
    }

    /// Add Meta (builder).
    #[must_use]
    pub fn meta(mut self) -> Self {
        self.modifiers |= Modifiers::META;
        self
    }

    /// Add Alt (builder).
    #[must_use]
    pub fn alt(mut self) -> Self {
        self.modifiers |= Modifiers::ALT;
        self
    }

    /// Add Shift (builder).
    #[must_use]
    pub fn shift(mut self) -> Self {
        self.modifiers |= Modifiers::SHIFT;
        self
    }

    /// Whether `prevent_default()` was called.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl KeyboardEvent for KeyInput {
    fn key(&self) -> &str {
        &self.key
    }

    fn ctrl_key(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    fn meta_key(&self) -> bool {
        self.modifiers.contains(Modifiers::META)
    }

    fn alt_key(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    fn shift_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}
