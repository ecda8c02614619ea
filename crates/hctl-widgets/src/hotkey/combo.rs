#![forbid(unsafe_code)]

//! Key combo parsing, canonical form, and matching.
//!
//! # String Format
//!
//! `[modifier+]*key`, case-insensitive, e.g. `"Ctrl+K"`, `"Mod+Shift+P"`,
//! `"Esc"`, `"Ctrl++"`. Aliases are folded before classification:
//!
//! | written                               | canonical     |
//! |---------------------------------------|---------------|
//! | `cmd`, `command`, `super`, `win`      | `meta`        |
//! | `control`                             | `ctrl`        |
//! | `option`, `opt`                       | `alt`         |
//! | `cmdorctrl`                           | `mod`         |
//! | `esc` / `return`                      | `escape` / `enter` |
//! | `up`, `down`, `left`, `right`         | `arrowup` ... |
//! | `spacebar`, `" "`                     | `space`       |
//! | `del`, `ins`, `pgup`, `pgdn`, `plus`  | `delete`, `insert`, `pageup`, `pagedown`, `+` |
//!
//! `mod` is kept as its own modifier and resolved at match time: it is
//! satisfied by either Ctrl or Meta.
//!
//! The canonical string lists modifiers in the order
//! `ctrl, meta, mod, alt, shift`, then the key: `"ctrl+shift+p"`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use hctl_core::Modifiers;

use super::HotkeyError;

/// A modifier in a combo. Declaration order is the canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComboModifier {
    Ctrl,
    Meta,
    /// Ctrl or Meta, decided per event.
    Mod,
    Alt,
    Shift,
}

impl ComboModifier {
    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ctrl => "ctrl",
            Self::Meta => "meta",
            Self::Mod => "mod",
            Self::Alt => "alt",
            Self::Shift => "shift",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ctrl => "Ctrl",
            Self::Meta => "Meta",
            Self::Mod => "Mod",
            Self::Alt => "Alt",
            Self::Shift => "Shift",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ctrl" => Some(Self::Ctrl),
            "meta" => Some(Self::Meta),
            "mod" => Some(Self::Mod),
            "alt" => Some(Self::Alt),
            "shift" => Some(Self::Shift),
            _ => None,
        }
    }
}

/// Fold a key or modifier name to its canonical lowercase spelling.
///
/// Used for both combo tokens and `KeyboardEvent::key()` values.
#[must_use]
pub fn normalize_key(name: &str) -> String {
    if name == " " {
        return "space".to_string();
    }
    let lower = name.trim().to_lowercase();
    let folded = match lower.as_str() {
        "esc" => "escape",
        "cmd" | "command" | "super" | "win" | "os" => "meta",
        "control" => "ctrl",
        "option" | "opt" => "alt",
        "cmdorctrl" | "commandorcontrol" => "mod",
        "return" => "enter",
        "up" => "arrowup",
        "down" => "arrowdown",
        "left" => "arrowleft",
        "right" => "arrowright",
        "spacebar" => "space",
        "del" => "delete",
        "ins" => "insert",
        "pgup" => "pageup",
        "pgdn" | "pgdown" => "pagedown",
        "plus" => "+",
        _ => return lower,
    };
    folded.to_string()
}

fn key_label(key: &str) -> String {
    let named = match key {
        "escape" => "Esc",
        "enter" => "Enter",
        "space" => "Space",
        "arrowup" => "Up",
        "arrowdown" => "Down",
        "arrowleft" => "Left",
        "arrowright" => "Right",
        "pageup" => "PageUp",
        "pagedown" => "PageDown",
        "backspace" => "Backspace",
        _ => "",
    };
    if !named.is_empty() {
        return named.to_string();
    }
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A parsed key combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combo {
    modifiers: BTreeSet<ComboModifier>,
    key: Option<String>,
}

impl Combo {
    /// Parse a combo string.
    pub fn parse(input: &str) -> Result<Self, HotkeyError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(HotkeyError::EmptyCombo);
        }

        let mut tokens: Vec<String> = Vec::new();
        let body = if trimmed == "+" {
            tokens.push("+".to_string());
            ""
        } else if let Some(rest) = trimmed.strip_suffix("++") {
            tokens.push("+".to_string());
            rest
        } else {
            trimmed
        };
        if !body.is_empty() {
            for raw in body.split('+') {
                if raw.trim().is_empty() && raw != " " {
                    return Err(HotkeyError::EmptyToken {
                        combo: input.to_string(),
                    });
                }
                tokens.push(normalize_key(raw));
            }
        }

        let mut modifiers = BTreeSet::new();
        let mut key: Option<String> = None;
        for token in tokens {
            if let Some(m) = ComboModifier::from_name(&token) {
                modifiers.insert(m);
                continue;
            }
            if let Some(first) = &key {
                return Err(HotkeyError::MultipleKeys {
                    combo: input.to_string(),
                    first: first.clone(),
                    second: token,
                });
            }
            key = Some(token);
        }
        Ok(Self { modifiers, key })
    }

    /// Declared modifiers, in canonical order.
    pub fn modifiers(&self) -> impl Iterator<Item = ComboModifier> + '_ {
        self.modifiers.iter().copied()
    }

    /// Whether `m` is declared.
    #[must_use]
    pub fn has(&self, m: ComboModifier) -> bool {
        self.modifiers.contains(&m)
    }

    /// Literal key; `None` for modifier-only combos.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Canonical storage key, e.g. `"ctrl+shift+p"`.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.modifiers
            .iter()
            .map(|m| m.name().to_string())
            .chain(self.key.iter().cloned())
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Human-readable form, e.g. `"Ctrl + Shift + P"`.
    #[must_use]
    pub fn printable(&self) -> String {
        self.modifiers
            .iter()
            .map(|m| m.label().to_string())
            .chain(self.key.as_deref().map(key_label))
            .collect::<Vec<_>>()
            .join(" + ")
    }

    /// Match against a normalized event key and held modifiers.
    ///
    /// Every declared modifier must be held and no undeclared one may be;
    /// `mod` accounts for Ctrl and Meta. A modifier-only combo needs at least
    /// one modifier held.
    #[must_use]
    pub fn matches(&self, key: &str, held: Modifiers) -> bool {
        match &self.key {
            Some(k) if k != key => return false,
            None if held.is_empty() => return false,
            _ => {}
        }
        let wants_mod = self.has(ComboModifier::Mod);
        let required = [
            (ComboModifier::Ctrl, held.contains(Modifiers::CTRL)),
            (ComboModifier::Meta, held.contains(Modifiers::META)),
            (ComboModifier::Alt, held.contains(Modifiers::ALT)),
            (ComboModifier::Shift, held.contains(Modifiers::SHIFT)),
            (ComboModifier::Mod, held.command()),
        ];
        if required.iter().any(|(m, pressed)| self.has(*m) && !pressed) {
            return false;
        }
        let stray = (held.contains(Modifiers::CTRL) && !(self.has(ComboModifier::Ctrl) || wants_mod))
            || (held.contains(Modifiers::META) && !(self.has(ComboModifier::Meta) || wants_mod))
            || (held.contains(Modifiers::ALT) && !self.has(ComboModifier::Alt))
            || (held.contains(Modifiers::SHIFT) && !self.has(ComboModifier::Shift));
        !stray
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for Combo {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
