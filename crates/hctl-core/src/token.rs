#![forbid(unsafe_code)]

//! Monotonic request tokens for stale-result discard.
//!
//! Each asynchronous request a controller hands out is tagged with the next
//! token from its [`TokenSequence`]. When the result comes back, the
//! controller applies it only if the token is still the sequence's current
//! one. In-flight work is never cancelled; late results are simply dropped
//! (last request wins).
//!
//! # Invariants
//!
//! - Tokens are strictly monotonic: `token_n < token_{n+1}`.
//! - [`RequestToken::NONE`] is never issued.

use std::fmt;

/// A monotonically increasing request version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
    /// The null token ("no request issued yet").
    pub const NONE: Self = Self(0);

    /// Create a token from a raw value (for testing).
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Raw token value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this is the null token.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.0)
    }
}

/// Issues tokens and remembers the latest one.
#[derive(Debug, Clone, Default)]
pub struct TokenSequence {
    current: RequestToken,
}

impl TokenSequence {
    /// Fresh sequence; nothing issued.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: RequestToken::NONE,
        }
    }

    /// Issue the next token, superseding every earlier one.
    pub fn issue(&mut self) -> RequestToken {
        self.current = RequestToken(self.current.0 + 1);
        self.current
    }

    /// The most recently issued token.
    #[must_use]
    pub const fn current(&self) -> RequestToken {
        self.current
    }

    /// Whether `token` is the most recently issued one.
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        !token.is_none() && token == self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_zero() {
        assert_eq!(RequestToken::NONE.raw(), 0);
        assert!(RequestToken::NONE.is_none());
        assert!(!TokenSequence::new().is_current(RequestToken::NONE));
    }

    #[test]
    fn issue_is_monotonic() {
        let mut seq = TokenSequence::new();
        let tokens: Vec<_> = (0..10).map(|_| seq.issue()).collect();
        for pair in tokens.windows(2) {
            assert!(pair[1] > pair[0], "{} should follow {}", pair[1], pair[0]);
        }
    }

    #[test]
    fn only_latest_is_current() {
        let mut seq = TokenSequence::new();
        let first = seq.issue();
        let second = seq.issue();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
        assert_eq!(seq.current(), second);
    }

    #[test]
    fn display() {
        assert_eq!(RequestToken::from_raw(12).to_string(), "Token(12)");
    }
}
