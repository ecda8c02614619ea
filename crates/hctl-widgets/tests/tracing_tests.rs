#![forbid(unsafe_code)]

//! Structured logging integration tests.
//!
//! A capture layer records every event emitted while a controller runs and
//! the tests assert on messages and fields.
//!
//!   cargo test -p hctl-widgets --test tracing_tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hctl_core::KeyInput;
use hctl_widgets::command_palette::{CommandItem, CommandPalette, RemoteOutcome, ResolveError};
use hctl_widgets::hotkey::{HotkeyManager, HotkeyOptions, Propagation};

use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured event: level, message, and the remaining fields.
#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let mut fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.remove("message").unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
        });
    }
}

fn capture<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCapture {
        events: Arc::clone(&events),
    });
    tracing::subscriber::with_default(subscriber, f);
    let out = events.lock().unwrap().clone();
    out
}

fn find<'a>(events: &'a [CapturedEvent], message: &str) -> Vec<&'a CapturedEvent> {
    events.iter().filter(|e| e.message == message).collect()
}

// ============================================================================
// Hotkeys
// ============================================================================

#[test]
fn hotkey_dispatch_is_logged_with_combo_and_scope() {
    let events = capture(|| {
        let mut mgr = HotkeyManager::new();
        mgr.register(
            ["Ctrl+K"],
            |_: &dyn hctl_core::KeyboardEvent, _: &hctl_widgets::hotkey::HotkeyContext<'_>| {
                Propagation::Handled
            },
            HotkeyOptions::new(),
        )
        .unwrap();
        mgr.handle_keydown(&mut KeyInput::new("k").ctrl(), None);
    });

    let registered = find(&events, "hotkey registered");
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].fields.get("combo").map(String::as_str), Some("ctrl+k"));

    let fired = find(&events, "hotkey fired");
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].level, tracing::Level::DEBUG);
    assert_eq!(fired[0].fields.get("scope").map(String::as_str), Some("global"));
    assert_eq!(fired[0].fields.get("propagation").map(String::as_str), Some("Handled"));
}

#[test]
fn unmatched_keydown_logs_at_trace() {
    let events = capture(|| {
        let mut mgr = HotkeyManager::new();
        mgr.handle_keydown(&mut KeyInput::new("x"), None);
    });
    let missed = find(&events, "no hotkey consumed keydown");
    assert_eq!(missed.len(), 1);
    assert_eq!(missed[0].level, tracing::Level::TRACE);
    assert_eq!(missed[0].fields.get("key").map(String::as_str), Some("x"));
}

// ============================================================================
// Palette
// ============================================================================

#[test]
fn stale_resolution_discard_is_logged() {
    let events = capture(|| {
        let resolver = |_: &str| -> hctl_widgets::command_palette::ResolveFuture {
            Box::pin(async { Ok::<Vec<CommandItem>, ResolveError>(Vec::new()) })
        };
        let mut palette =
            CommandPalette::new(vec![CommandItem::new("open", "Open File")]).with_resolver(resolver);
        let first = palette.set_query("o").unwrap();
        let _second = palette.set_query("op").unwrap();
        let applied = palette.complete_remote(RemoteOutcome::new(first.token(), "o", Ok(Vec::new())));
        assert!(!applied);
    });

    let discarded = find(&events, "stale palette resolution discarded");
    assert_eq!(discarded.len(), 1);
    assert_eq!(discarded[0].fields.get("token").map(String::as_str), Some("Token(1)"));
    assert_eq!(discarded[0].fields.get("current").map(String::as_str), Some("Token(2)"));
}

#[test]
fn query_updates_carry_result_count() {
    let events = capture(|| {
        let mut palette = CommandPalette::new(vec![
            CommandItem::new("open", "Open File"),
            CommandItem::new("close", "Close File"),
        ]);
        let _ = palette.set_query("fi");
    });
    let updates = find(&events, "palette query updated");
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].fields.get("query").map(String::as_str), Some("fi"));
    assert_eq!(updates[0].fields.get("results").map(String::as_str), Some("2"));
}
