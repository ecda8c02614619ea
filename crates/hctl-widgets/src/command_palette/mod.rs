#![forbid(unsafe_code)]

//! Headless command palette controller.
//!
//! This module provides a fuzzy-search command palette with:
//! - Subsequence scoring with contiguous-run and leading-match bonuses
//! - Optional pluggable scorers (best score wins)
//! - Optional async resolver merged with the static command list
//! - Section grouping computed at search time
//! - Keyboard navigation that never lands on a disabled command
//!
//! # Usage
//!
//! ```ignore
//! let mut palette = CommandPalette::new(vec![
//!     CommandItem::new("open", "Open File").with_section("File"),
//!     CommandItem::new("save", "Save Workspace").with_section("File"),
//! ])
//! .on_select(|item| println!("run {}", item.id));
//!
//! palette.open();
//! palette.set_query("op");
//! palette.handle_key(&mut KeyInput::new("Enter"));
//! ```
//!
//! # Submodules
//!
//! - [`scorer`]: the built-in fuzzy scorer and the [`Scorer`] trait
//! - [`remote`]: resolver futures and request tokens

pub mod remote;
pub mod scorer;

pub use remote::{RemoteOutcome, RemoteRequest, ResolveError, ResolveFuture, Resolver};
pub use scorer::{FuzzyScorer, Scorer, score_subsequence};

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hctl_core::{KeyboardEvent, Subscribers, SubscriptionId, TokenSequence, keys};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Command Item
// ---------------------------------------------------------------------------

/// Section reference on a command: a bare id, or an id with a display label.
///
/// Both forms resolve to the same grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionRef {
    /// Shorthand; the id doubles as the label.
    Id(String),
    /// Explicit id and label.
    Labeled { id: String, label: String },
}

impl SectionRef {
    /// Grouping key.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Labeled { id, .. } => id,
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Labeled { label, .. } => label,
        }
    }
}

impl From<&str> for SectionRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for SectionRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

/// A single command that can be invoked from the palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandItem {
    /// Unique identifier.
    pub id: String,
    /// Display label (searched by the scorer).
    pub label: String,
    /// Extra search terms.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Optional section for grouping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionRef>,
    /// Opaque host payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Disabled commands are listed but never highlighted or selected.
    #[serde(default)]
    pub disabled: bool,
}

impl CommandItem {
    /// Create an enabled command with no keywords or section.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            keywords: Vec::new(),
            section: None,
            data: None,
            disabled: false,
        }
    }

    /// Set keywords (builder).
    #[must_use]
    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Set section by id (builder).
    #[must_use]
    pub fn with_section(mut self, section: impl Into<SectionRef>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Set section with an explicit label (builder).
    #[must_use]
    pub fn with_section_label(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.section = Some(SectionRef::Labeled {
            id: id.into(),
            label: label.into(),
        });
        self
    }

    /// Attach a payload (builder).
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set disabled flag (builder).
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

// ---------------------------------------------------------------------------
// Results & State
// ---------------------------------------------------------------------------

/// A ranked command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResultItem {
    /// The command.
    pub item: CommandItem,
    /// Best score across scorers.
    pub score: f64,
    /// Position in the flat result list.
    pub index: usize,
    /// Resolved section key.
    pub section_id: Option<String>,
}

/// Result items sharing a section, in ranked order.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSection {
    /// Section key (`None` for unsectioned commands).
    pub id: Option<String>,
    /// Display label (`None` for unsectioned commands).
    pub label: Option<String>,
    /// Members, in flat-list order.
    pub items: Vec<CommandResultItem>,
}

/// Observable palette state.
///
/// # Invariants
///
/// 1. `results` are sorted by descending score, then insertion order, then label.
/// 2. `highlighted_index`, when set, addresses a non-disabled result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandPaletteState {
    /// Whether the palette is open.
    pub open: bool,
    /// Current query text.
    pub query: String,
    /// A remote resolution is in flight.
    pub loading: bool,
    /// Message from the last failed resolution, cleared on success.
    pub error: Option<String>,
    /// Results grouped by section, in order of first appearance.
    pub sections: Vec<CommandSection>,
    /// Flat ranked results.
    pub results: Vec<CommandResultItem>,
    /// Highlighted result, if any enabled result exists.
    pub highlighted_index: Option<usize>,
}

impl CommandPaletteState {
    /// The highlighted result.
    #[must_use]
    pub fn highlighted(&self) -> Option<&CommandResultItem> {
        self.highlighted_index.and_then(|i| self.results.get(i))
    }
}

/// Palette configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Cap on ranked results (`None` for unlimited).
    pub max_results: Option<usize>,
    /// Rows moved by PageUp/PageDown.
    pub page_size: usize,
    /// Close the palette after a successful `select`.
    pub close_on_select: bool,
    /// Prefix for generated option element ids.
    pub id_prefix: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            max_results: None,
            page_size: 5,
            close_on_select: false,
            id_prefix: "hctl-palette".to_string(),
        }
    }
}

/// Callback invoked with the selected command.
pub type SelectHandler = Box<dyn FnMut(&CommandItem) + Send>;

// ---------------------------------------------------------------------------
// Command Palette Controller
// ---------------------------------------------------------------------------

enum PaletteKey {
    Move(isize),
    First,
    Last,
    Select,
    Dismiss,
}

/// Command palette controller.
///
/// Owns the query, ranked results and highlight; renders nothing.
pub struct CommandPalette {
    items: Vec<CommandItem>,
    remote: Vec<CommandItem>,
    scorers: Vec<Box<dyn Scorer>>,
    resolver: Option<Box<dyn Resolver>>,
    on_select: Option<SelectHandler>,
    config: PaletteConfig,
    state: CommandPaletteState,
    tokens: TokenSequence,
    subscribers: Subscribers<CommandPaletteState>,
}

impl std::fmt::Debug for CommandPalette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandPalette")
            .field("items", &self.items.len())
            .field("remote", &self.remote.len())
            .field("scorers", &self.scorers.len())
            .field("has_resolver", &self.resolver.is_some())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for CommandPalette {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CommandPalette {
    /// Create a closed palette over `items`, scored by [`FuzzyScorer`].
    pub fn new(items: Vec<CommandItem>) -> Self {
        let mut palette = Self {
            items,
            remote: Vec::new(),
            scorers: vec![Box::new(FuzzyScorer)],
            resolver: None,
            on_select: None,
            config: PaletteConfig::default(),
            state: CommandPaletteState::default(),
            tokens: TokenSequence::new(),
            subscribers: Subscribers::new(),
        };
        palette.rerank(false);
        palette
    }

    /// Add a scorer alongside the existing ones (builder).
    #[must_use]
    pub fn with_scorer(mut self, scorer: impl Scorer + 'static) -> Self {
        self.scorers.push(Box::new(scorer));
        self.rerank(false);
        self
    }

    /// Replace the scorer set (builder). An empty set restores [`FuzzyScorer`].
    #[must_use]
    pub fn with_scorers(mut self, scorers: Vec<Box<dyn Scorer>>) -> Self {
        self.scorers = if scorers.is_empty() {
            vec![Box::new(FuzzyScorer)]
        } else {
            scorers
        };
        self.rerank(false);
        self
    }

    /// Set the async resolver (builder).
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Cap the ranked results (builder).
    #[must_use]
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.config.max_results = Some(max);
        self.rerank(false);
        self
    }

    /// Replace the configuration (builder).
    #[must_use]
    pub fn with_config(mut self, config: PaletteConfig) -> Self {
        self.config = config;
        self.rerank(false);
        self
    }

    /// Set the selection callback (builder).
    #[must_use]
    pub fn on_select(mut self, handler: impl FnMut(&CommandItem) + Send + 'static) -> Self {
        self.on_select = Some(Box::new(handler));
        self
    }

    // --- Observation ---

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &CommandPaletteState {
        &self.state
    }

    /// Whether the palette is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.open
    }

    /// Current query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.state.query
    }

    /// Ranked results.
    #[must_use]
    pub fn results(&self) -> &[CommandResultItem] {
        &self.state.results
    }

    /// Subscribe to state changes; the listener sees the current state at once.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&CommandPaletteState) + Send + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(&self.state, listener)
    }

    /// Remove a listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn notify(&mut self) {
        self.subscribers.notify(&self.state);
    }

    // --- Visibility ---

    /// Open the palette.
    ///
    /// With a resolver configured and an empty query, this starts a
    /// resolution for `""`.
    pub fn open(&mut self) -> Option<RemoteRequest> {
        self.state.open = true;
        let request = if self.state.query.is_empty() {
            self.begin_remote(String::new())
        } else {
            None
        };
        self.notify();
        request
    }

    /// Close the palette. In-flight resolutions still land when they finish.
    pub fn close(&mut self) {
        self.state.open = false;
        self.notify();
    }

    /// Toggle visibility.
    pub fn toggle(&mut self) -> Option<RemoteRequest> {
        if self.state.open {
            self.close();
            None
        } else {
            self.open()
        }
    }

    // --- Query & commands ---

    /// Replace the query and re-rank synchronously.
    ///
    /// Returns the remote request to drive when a resolver is configured.
    pub fn set_query(&mut self, query: impl Into<String>) -> Option<RemoteRequest> {
        self.state.query = query.into();
        self.rerank(false);
        tracing::debug!(
            query = %self.state.query,
            results = self.state.results.len(),
            "palette query updated"
        );
        hctl_core::debug_trace!(
            "palette query={:?} results={}",
            self.state.query,
            self.state.results.len()
        );
        let request = self.begin_remote(self.state.query.clone());
        self.notify();
        request
    }

    /// Replace the static command list and re-rank, keeping the highlight
    /// when its command survives.
    pub fn set_items(&mut self, items: Vec<CommandItem>) {
        self.items = items;
        self.rerank(true);
        self.notify();
    }

    /// Start a resolution for `query`, superseding any in flight.
    ///
    /// Returns `None` when no resolver is configured.
    pub fn resolve_remote(&mut self, query: impl Into<String>) -> Option<RemoteRequest> {
        let request = self.begin_remote(query.into());
        if request.is_some() {
            self.notify();
        }
        request
    }

    fn begin_remote(&mut self, query: String) -> Option<RemoteRequest> {
        let resolver = self.resolver.as_ref()?;
        let token = self.tokens.issue();
        let future = resolver.resolve(&query);
        self.state.loading = true;
        tracing::trace!(%token, query = %query, "palette resolution started");
        Some(RemoteRequest::new(token, query, future))
    }

    /// Apply a finished resolution.
    ///
    /// Returns `false` (and changes nothing) when a newer request has been
    /// issued since `outcome` started.
    pub fn complete_remote(&mut self, outcome: RemoteOutcome) -> bool {
        if !self.tokens.is_current(outcome.token) {
            tracing::debug!(
                token = %outcome.token,
                current = %self.tokens.current(),
                "stale palette resolution discarded"
            );
            return false;
        }
        self.state.loading = false;
        match outcome.result {
            Ok(items) => {
                self.remote = items;
                self.state.error = None;
            }
            Err(err) => {
                tracing::warn!(query = %outcome.query, error = %err, "palette resolver failed");
                self.remote.clear();
                self.state.error = Some(err.message);
            }
        }
        self.rerank(true);
        self.notify();
        true
    }

    // --- Selection ---

    /// Invoke the select callback for the result at `index`.
    ///
    /// Missing and disabled results are ignored.
    pub fn select(&mut self, index: usize) -> Option<CommandItem> {
        let item = self
            .state
            .results
            .get(index)
            .filter(|r| !r.item.disabled)
            .map(|r| r.item.clone())?;
        tracing::debug!(id = %item.id, index, "palette command selected");
        if let Some(handler) = self.on_select.as_mut() {
            handler(&item);
        }
        if self.config.close_on_select {
            self.close();
        }
        Some(item)
    }

    /// Handle a key press.
    ///
    /// Returns the highlighted result after the key (the selected one for
    /// `Enter`, `None` after `Escape`).
    pub fn handle_key<E: KeyboardEvent + ?Sized>(
        &mut self,
        event: &mut E,
    ) -> Option<CommandResultItem> {
        let page = self.config.page_size.max(1) as isize;
        let action = match event.key() {
            keys::ARROW_DOWN => PaletteKey::Move(1),
            keys::ARROW_UP => PaletteKey::Move(-1),
            keys::PAGE_DOWN => PaletteKey::Move(page),
            keys::PAGE_UP => PaletteKey::Move(-page),
            keys::HOME => PaletteKey::First,
            keys::END => PaletteKey::Last,
            keys::ENTER => PaletteKey::Select,
            keys::ESCAPE => PaletteKey::Dismiss,
            _ => return self.state.highlighted().cloned(),
        };
        event.prevent_default();

        match action {
            PaletteKey::Move(delta) => {
                let target = self.step(delta);
                self.set_highlight(target);
            }
            PaletteKey::First => {
                let target = self.first_enabled();
                self.set_highlight(target);
            }
            PaletteKey::Last => {
                let target = self.last_enabled();
                self.set_highlight(target);
            }
            PaletteKey::Select => {
                let index = self.state.highlighted_index?;
                let result = self.state.results.get(index).cloned()?;
                return self.select(index).map(|_| result);
            }
            PaletteKey::Dismiss => {
                self.close();
                return None;
            }
        }
        self.state.highlighted().cloned()
    }

    fn set_highlight(&mut self, target: Option<usize>) {
        if target != self.state.highlighted_index {
            self.state.highlighted_index = target;
            self.notify();
        }
    }

    // --- ARIA values ---

    /// Element id for the option at `index`.
    #[must_use]
    pub fn option_id(&self, index: usize) -> String {
        format!("{}-option-{index}", self.config.id_prefix)
    }

    /// Value for `aria-activedescendant` on the query input.
    #[must_use]
    pub fn active_descendant(&self) -> Option<String> {
        self.state.highlighted_index.map(|i| self.option_id(i))
    }

    // --- Ranking ---

    fn first_enabled(&self) -> Option<usize> {
        self.state.results.iter().position(|r| !r.item.disabled)
    }

    fn last_enabled(&self) -> Option<usize> {
        self.state.results.iter().rposition(|r| !r.item.disabled)
    }

    /// Target for a highlight move of `delta`, clamped and skipping disabled
    /// results. Stays put when nothing enabled lies in that direction.
    fn step(&self, delta: isize) -> Option<usize> {
        let results = &self.state.results;
        let Some(from) = self.state.highlighted_index else {
            return self.first_enabled();
        };
        let last = results.len().checked_sub(1)?;
        let target = (from as isize + delta).clamp(0, last as isize) as usize;
        let enabled = |i: &usize| !results[*i].item.disabled;
        let found = if delta >= 0 {
            (target..=last)
                .find(enabled)
                .or_else(|| (from + 1..target).rev().find(enabled))
        } else {
            (0..=target)
                .rev()
                .find(enabled)
                .or_else(|| (target + 1..from).find(enabled))
        };
        Some(found.unwrap_or(from))
    }

    fn rerank(&mut self, preserve_highlight: bool) {
        let previous = preserve_highlight
            .then(|| self.state.highlighted().map(|r| r.item.id.clone()))
            .flatten();

        let query = self.state.query.as_str();
        let mut seen = HashSet::new();
        let mut scored: Vec<(usize, f64, &CommandItem)> = self
            .items
            .iter()
            .chain(self.remote.iter())
            .filter(|item| seen.insert(item.id.as_str()))
            .enumerate()
            .filter_map(|(order, item)| {
                let score = scorer::best_score(&self.scorers, query, item);
                (score != f64::NEG_INFINITY && !score.is_nan()).then_some((order, score, item))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then(a.0.cmp(&b.0))
                .then_with(|| a.2.label.cmp(&b.2.label))
        });
        if let Some(max) = self.config.max_results {
            scored.truncate(max);
        }

        let results: Vec<CommandResultItem> = scored
            .into_iter()
            .enumerate()
            .map(|(index, (_, score, item))| CommandResultItem {
                item: item.clone(),
                score,
                index,
                section_id: item.section.as_ref().map(|s| s.id().to_string()),
            })
            .collect();

        let mut sections: Vec<CommandSection> = Vec::new();
        for result in &results {
            match sections.iter_mut().find(|s| s.id == result.section_id) {
                Some(section) => {
                    // An explicit label beats the shorthand id fallback.
                    if let Some(SectionRef::Labeled { label, .. }) = &result.item.section {
                        if section.label.as_deref() == section.id.as_deref() {
                            section.label = Some(label.clone());
                        }
                    }
                    section.items.push(result.clone());
                }
                None => sections.push(CommandSection {
                    id: result.section_id.clone(),
                    label: result.item.section.as_ref().map(|s| s.label().to_string()),
                    items: vec![result.clone()],
                }),
            }
        }

        self.state.results = results;
        self.state.sections = sections;
        self.state.highlighted_index = previous
            .and_then(|id| {
                self.state
                    .results
                    .iter()
                    .position(|r| r.item.id == id && !r.item.disabled)
            })
            .or_else(|| self.first_enabled());
    }
}

// ---------------------------------------------------------------------------
// Shared Palette
// ---------------------------------------------------------------------------

/// A cloneable, lockable palette that drives its own resolutions.
///
/// Each async method starts a request under the lock, awaits the resolver
/// with the lock released, then applies the outcome. Overlapping calls race
/// safely: only the latest request's outcome is applied.
#[derive(Debug, Clone)]
pub struct SharedCommandPalette {
    inner: Arc<Mutex<CommandPalette>>,
}

impl SharedCommandPalette {
    /// Wrap a palette.
    #[must_use]
    pub fn new(palette: CommandPalette) -> Self {
        Self {
            inner: Arc::new(Mutex::new(palette)),
        }
    }

    /// Lock the palette for synchronous calls.
    pub fn lock(&self) -> MutexGuard<'_, CommandPalette> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> CommandPaletteState {
        self.lock().state().clone()
    }

    /// Set the query and await its resolution. Returns whether the
    /// resolution was applied.
    pub async fn set_query(&self, query: impl Into<String>) -> bool {
        let request = self.lock().set_query(query);
        self.drive(request).await
    }

    /// Open the palette and await the initial resolution, if any.
    pub async fn open(&self) -> bool {
        let request = self.lock().open();
        self.drive(request).await
    }

    async fn drive(&self, request: Option<RemoteRequest>) -> bool {
        let Some(request) = request else {
            return false;
        };
        let outcome = request.run().await;
        self.lock().complete_remote(outcome)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
