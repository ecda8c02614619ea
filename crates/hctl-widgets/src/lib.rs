#![forbid(unsafe_code)]

//! Interaction controllers: command palette, selection, and hotkeys.
//!
//! Each controller is an independent state machine. None of them render;
//! hosts read state through `state()`/`subscribe` and feed events back in.

pub mod command_palette;
pub mod hotkey;
pub mod selection;

pub use command_palette::{
    CommandItem, CommandPalette, CommandPaletteState, CommandResultItem, CommandSection,
    PaletteConfig, RemoteOutcome, RemoteRequest, ResolveError, SectionRef, SharedCommandPalette,
};
pub use hotkey::{
    BindingHandle, CheatSheetEntry, CheatSheetOptions, GLOBAL_SCOPE, HotkeyContext, HotkeyError,
    HotkeyManager, HotkeyOptions, Keymap, Propagation,
};
pub use selection::{SelectionEngine, SelectionState};
