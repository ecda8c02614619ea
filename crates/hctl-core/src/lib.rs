#![forbid(unsafe_code)]

//! Core: event shapes, observer lists, and request tokens.

pub mod debug_trace;
pub mod event;
pub mod observer;
pub mod token;

pub use event::{KeyInput, KeyboardEvent, Modifiers, keys};
pub use observer::{Listener, Subscribers, SubscriptionId};
pub use token::{RequestToken, TokenSequence};
