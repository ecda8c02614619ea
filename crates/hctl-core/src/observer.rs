#![forbid(unsafe_code)]

//! Synchronous observer lists.
//!
//! Every controller owns a [`Subscribers`] list for its state type. A new
//! listener is replayed the current state immediately, then invoked after
//! each mutation, in subscription order, on the calling thread.
//!
//! # Invariants
//!
//! 1. `subscribe` invokes the listener exactly once before returning.
//! 2. `notify` reaches every live listener exactly once.
//! 3. Ids are never reused within one list.

use std::fmt;

/// Handle returned by `subscribe`; pass it back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Boxed state listener.
pub type Listener<S> = Box<dyn FnMut(&S) + Send>;

/// An ordered list of state listeners.
pub struct Subscribers<S> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<S>)>,
}

impl<S> fmt::Debug for Subscribers<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.listeners.len())
            .finish()
    }
}

impl<S> Default for Subscribers<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Subscribers<S> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            listeners: Vec::new(),
        }
    }

    /// Add a listener and replay `current` to it.
    pub fn subscribe<F>(&mut self, current: &S, listener: F) -> SubscriptionId
    where
        F: FnMut(&S) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let mut listener: Listener<S> = Box::new(listener);
        listener(current);
        self.listeners.push((id, listener));
        tracing::trace!(subscription = id.raw(), "listener subscribed");
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Invoke every listener with `state`.
    pub fn notify(&mut self, state: &S) {
        for (_, listener) in &mut self.listeners {
            listener(state);
        }
    }

    /// Number of live listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
