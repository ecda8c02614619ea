#![forbid(unsafe_code)]

//! hctl public facade crate.
//!
//! Re-exports the four controllers and their common types, plus a prelude
//! for day-to-day usage. Controllers are independent; pull in only the ones
//! a screen needs.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use hctl_core::{
    KeyInput, KeyboardEvent, Modifiers, RequestToken, SubscriptionId, TokenSequence, keys,
};

// --- Controller re-exports -------------------------------------------------

pub use hctl_widgets::command_palette::{
    CommandItem, CommandPalette, CommandPaletteState, CommandResultItem, CommandSection,
    PaletteConfig, RemoteOutcome, RemoteRequest, ResolveError, SharedCommandPalette,
};
pub use hctl_widgets::hotkey::{
    CheatSheetEntry, CheatSheetOptions, GLOBAL_SCOPE, HotkeyContext, HotkeyError, HotkeyManager,
    HotkeyOptions, Keymap, Propagation,
};
pub use hctl_widgets::selection::{SelectionEngine, SelectionState};

#[cfg(feature = "extras")]
pub use hctl_extras::forms::{
    ChangeEvent, FieldConfig, FieldInput, FormConfig, FormError, FormOrchestrator, FormSnapshot,
    FormValue, InputBinding, SubmitResult, UpdateOptions,
};

// --- Errors ---------------------------------------------------------------

/// Any error an hctl controller can return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid hotkey combo.
    Hotkey(HotkeyError),
    /// Palette resolver failure.
    Resolve(ResolveError),
    /// Form validator failure.
    #[cfg(feature = "extras")]
    Form(FormError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hotkey(err) => write!(f, "{err}"),
            Self::Resolve(err) => write!(f, "{err}"),
            #[cfg(feature = "extras")]
            Self::Form(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Hotkey(err) => Some(err),
            Self::Resolve(err) => Some(err),
            #[cfg(feature = "extras")]
            Self::Form(err) => Some(err),
        }
    }
}

impl From<HotkeyError> for Error {
    fn from(err: HotkeyError) -> Self {
        Self::Hotkey(err)
    }
}

impl From<ResolveError> for Error {
    fn from(err: ResolveError) -> Self {
        Self::Resolve(err)
    }
}

#[cfg(feature = "extras")]
impl From<FormError> for Error {
    fn from(err: FormError) -> Self {
        Self::Form(err)
    }
}

/// Standard result type for hctl APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CommandItem, CommandPalette, Error, HotkeyManager, HotkeyOptions, KeyInput,
        KeyboardEvent, Modifiers, Propagation, Result, SelectionEngine,
    };

    #[cfg(feature = "extras")]
    pub use crate::{FieldConfig, FormOrchestrator, FormValue, UpdateOptions};

    pub use crate::{core, widgets};

    #[cfg(feature = "extras")]
    pub use crate::extras;
}

pub use hctl_core as core;
#[cfg(feature = "extras")]
pub use hctl_extras as extras;
pub use hctl_widgets as widgets;
