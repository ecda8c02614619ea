#![forbid(unsafe_code)]

//! Multi-selection over an ordered collection.
//!
//! This is a pure data/logic layer: no focus handling, no rendering. Items
//! are opaque ids; the engine tracks which are selected, which one is active
//! (holds the roving tab stop), and the anchor that shift-extended ranges are
//! measured from.
//!
//! Pointer semantics:
//!
//! | modifiers        | effect                                              |
//! |------------------|-----------------------------------------------------|
//! | none             | select only the target; anchor and active move      |
//! | ctrl/meta        | toggle the target; anchor moves only when adding    |
//! | shift            | select anchor..=target, replacing the selection     |
//! | shift+ctrl/meta  | union anchor..=target into the selection            |
//!
//! # Invariants
//!
//! 1. `selected ⊆ items`.
//! 2. `active` and `anchor`, when set, are members of `items`.
//! 3. Ranges are inclusive and direction-independent.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use hctl_core::{KeyboardEvent, Modifiers, Subscribers, SubscriptionId, keys};

/// Observable selection state. `selected` is listed in item order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState<Id> {
    /// Ordered item ids.
    pub items: Vec<Id>,
    /// Selected ids, in item order.
    pub selected: Vec<Id>,
    /// Holder of the roving tab stop.
    pub active_id: Option<Id>,
    /// Start of shift-extended ranges.
    pub anchor_id: Option<Id>,
}

impl<Id> Default for SelectionState<Id> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: Vec::new(),
            active_id: None,
            anchor_id: None,
        }
    }
}

enum Movement {
    By(isize),
    First,
    Last,
}

/// Selection engine over ids of type `Id`.
pub struct SelectionEngine<Id> {
    items: Vec<Id>,
    positions: HashMap<Id, usize>,
    selected: HashSet<Id>,
    active: Option<Id>,
    anchor: Option<Id>,
    state: SelectionState<Id>,
    subscribers: Subscribers<SelectionState<Id>>,
}

impl<Id> std::fmt::Debug for SelectionEngine<Id>
where
    Id: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionEngine")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

impl<Id> Default for SelectionEngine<Id>
where
    Id: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<Id> SelectionEngine<Id>
where
    Id: Clone + Eq + Hash,
{
    /// Create an engine over `items` with nothing selected.
    pub fn new(items: Vec<Id>) -> Self {
        let mut engine = Self {
            items: Vec::new(),
            positions: HashMap::new(),
            selected: HashSet::new(),
            active: None,
            anchor: None,
            state: SelectionState::default(),
            subscribers: Subscribers::new(),
        };
        engine.replace_items(items);
        engine.refresh();
        engine
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &SelectionState<Id> {
        &self.state
    }

    /// Subscribe to state changes; the listener sees the current state at once.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&SelectionState<Id>) + Send + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(&self.state, listener)
    }

    /// Remove a listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // --- Items ---

    /// Replace the ordered item list.
    ///
    /// Selected ids that disappeared are dropped. An active or anchor id
    /// that disappeared falls back to the first selected item, or the first
    /// item when nothing is selected.
    pub fn set_items(&mut self, items: Vec<Id>) {
        self.replace_items(items);
        self.commit();
    }

    fn replace_items(&mut self, items: Vec<Id>) {
        self.positions = items
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        self.items = items;
        let positions = &self.positions;
        self.selected.retain(|id| positions.contains_key(id));

        let fallback = self
            .items
            .iter()
            .find(|id| self.selected.contains(*id))
            .or_else(|| self.items.first())
            .cloned();
        if !self.is_member(self.active.as_ref()) {
            self.active = fallback.clone();
        }
        if !self.is_member(self.anchor.as_ref()) {
            self.anchor = fallback;
        }
    }

    fn is_member(&self, id: Option<&Id>) -> bool {
        id.is_some_and(|id| self.positions.contains_key(id))
    }

    // --- Queries ---

    /// Whether `id` is selected (the `aria-selected` value).
    #[must_use]
    pub fn is_selected(&self, id: &Id) -> bool {
        self.selected.contains(id)
    }

    /// Roving tab index: `0` for the active item, `-1` otherwise.
    #[must_use]
    pub fn roving_tab_index(&self, id: &Id) -> i32 {
        if self.active.as_ref() == Some(id) { 0 } else { -1 }
    }

    /// Active item.
    #[must_use]
    pub fn active(&self) -> Option<&Id> {
        self.active.as_ref()
    }

    /// Anchor item.
    #[must_use]
    pub fn anchor(&self) -> Option<&Id> {
        self.anchor.as_ref()
    }

    // --- Direct mutation ---

    /// Select every item.
    pub fn select_all(&mut self) {
        self.selected = self.items.iter().cloned().collect();
        self.commit();
    }

    /// Deselect everything; active and anchor stay.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.commit();
    }

    /// Move the active item without touching the selection.
    ///
    /// Returns `false` for ids outside the collection.
    pub fn set_active(&mut self, id: &Id) -> bool {
        if !self.positions.contains_key(id) {
            return false;
        }
        self.active = Some(id.clone());
        self.commit();
        true
    }

    // --- Pointer ---

    /// Apply a click on `id` with the given modifiers.
    ///
    /// Returns `false` (no-op) for ids outside the collection.
    pub fn handle_pointer(&mut self, id: &Id, modifiers: Modifiers) -> bool {
        let Some(&target) = self.positions.get(id) else {
            return false;
        };
        self.apply_pointer(target, modifiers);
        self.commit();
        true
    }

    fn apply_pointer(&mut self, target: usize, modifiers: Modifiers) {
        let id = self.items[target].clone();
        if modifiers.shift() {
            let anchor = self.anchor_index().unwrap_or(target);
            self.select_range(anchor, target, modifiers.command());
            if self.anchor.is_none() {
                self.anchor = Some(id.clone());
            }
        } else if modifiers.command() {
            if self.selected.remove(&id) {
                tracing::trace!("selection toggled off");
            } else {
                self.selected.insert(id.clone());
                self.anchor = Some(id.clone());
            }
        } else {
            self.selected.clear();
            self.selected.insert(id.clone());
            self.anchor = Some(id.clone());
        }
        self.active = Some(id);
    }

    // --- Keyboard ---

    /// Handle a key press. Returns whether the key was consumed; consumed
    /// keys call `prevent_default()`.
    pub fn handle_key<E: KeyboardEvent + ?Sized>(&mut self, event: &mut E) -> bool {
        let modifiers = event.modifiers();
        let key = event.key();

        if modifiers.command() && key.eq_ignore_ascii_case("a") {
            event.prevent_default();
            self.select_all();
            return true;
        }

        let movement = match key {
            keys::ARROW_UP => Some(Movement::By(-1)),
            keys::ARROW_DOWN => Some(Movement::By(1)),
            keys::HOME => Some(Movement::First),
            keys::END => Some(Movement::Last),
            _ => None,
        };
        let activates = matches!(key, keys::SPACE | keys::ENTER);

        if let Some(movement) = movement {
            event.prevent_default();
            self.move_active(movement, modifiers);
            return true;
        }
        if activates {
            event.prevent_default();
            let Some(target) = self.active_index() else {
                return true;
            };
            self.apply_pointer(target, modifiers);
            self.commit();
            return true;
        }
        false
    }

    fn move_active(&mut self, movement: Movement, modifiers: Modifiers) {
        let Some(last) = self.items.len().checked_sub(1) else {
            return;
        };
        let current = self.active_index();
        let target = match (movement, current) {
            (Movement::First, _) => 0,
            (Movement::Last, _) => last,
            (Movement::By(_), None) => 0,
            (Movement::By(delta), Some(from)) => {
                (from as isize + delta).clamp(0, last as isize) as usize
            }
        };
        let id = self.items[target].clone();

        if modifiers.shift() {
            let anchor = self.anchor_index().or(current).unwrap_or(target);
            if self.anchor.is_none() {
                self.anchor = Some(self.items[anchor].clone());
            }
            self.select_range(anchor, target, modifiers.command());
        } else if !modifiers.command() {
            self.selected.clear();
            self.selected.insert(id.clone());
            self.anchor = Some(id.clone());
        }
        self.active = Some(id);
        self.commit();
    }

    // --- Internals ---

    fn active_index(&self) -> Option<usize> {
        self.active.as_ref().and_then(|id| self.positions.get(id).copied())
    }

    fn anchor_index(&self) -> Option<usize> {
        self.anchor.as_ref().and_then(|id| self.positions.get(id).copied())
    }

    fn select_range(&mut self, a: usize, b: usize, additive: bool) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if !additive {
            self.selected.clear();
        }
        self.selected.extend(self.items[lo..=hi].iter().cloned());
    }

    fn refresh(&mut self) {
        self.state = SelectionState {
            items: self.items.clone(),
            selected: self
                .items
                .iter()
                .filter(|id| self.selected.contains(*id))
                .cloned()
                .collect(),
            active_id: self.active.clone(),
            anchor_id: self.anchor.clone(),
        };
    }

    fn commit(&mut self) {
        self.refresh();
        self.subscribers.notify(&self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hctl_core::KeyInput;

    fn engine() -> SelectionEngine<&'static str> {
        SelectionEngine::new(vec!["a", "b", "c", "d"])
    }

    fn selected(e: &SelectionEngine<&'static str>) -> Vec<&'static str> {
        e.state().selected.clone()
    }

    #[test]
    fn click_shift_ctrl_sequence() {
        let mut e = engine();
        e.handle_pointer(&"b", Modifiers::NONE);
        assert_eq!(selected(&e), vec!["b"]);
        e.handle_pointer(&"d", Modifiers::SHIFT);
        assert_eq!(selected(&e), vec!["b", "c", "d"]);
        e.handle_pointer(&"c", Modifiers::CTRL);
        assert_eq!(selected(&e), vec!["b", "d"]);
    }

    #[test]
    fn range_is_direction_independent() {
        let mut e = engine();
        e.handle_pointer(&"c", Modifiers::NONE);
        e.handle_pointer(&"a", Modifiers::SHIFT);
        assert_eq!(selected(&e), vec!["a", "b", "c"]);
        assert_eq!(e.anchor(), Some(&"c"));
        assert_eq!(e.active(), Some(&"a"));
    }

    #[test]
    fn shift_ctrl_range_is_additive() {
        let mut e = engine();
        e.handle_pointer(&"a", Modifiers::NONE);
        e.handle_pointer(&"d", Modifiers::META);
        assert_eq!(e.anchor(), Some(&"d"));
        e.handle_pointer(&"c", Modifiers::SHIFT | Modifiers::CTRL);
        assert_eq!(selected(&e), vec!["a", "c", "d"]);
    }

    #[test]
    fn ctrl_toggle_off_keeps_anchor() {
        let mut e = engine();
        e.handle_pointer(&"a", Modifiers::NONE);
        e.handle_pointer(&"c", Modifiers::CTRL);
        assert_eq!(e.anchor(), Some(&"c"));
        e.handle_pointer(&"a", Modifiers::CTRL);
        assert_eq!(selected(&e), vec!["c"]);
        assert_eq!(e.anchor(), Some(&"c"));
        assert_eq!(e.active(), Some(&"a"));
    }

    #[test]
    fn unknown_id_is_noop() {
        let mut e = engine();
        assert!(!e.handle_pointer(&"zz", Modifiers::NONE));
        assert!(selected(&e).is_empty());
    }

    #[test]
    fn set_items_prunes_and_reclamps() {
        let mut e = engine();
        e.handle_pointer(&"b", Modifiers::NONE);
        e.handle_pointer(&"c", Modifiers::CTRL);
        e.set_items(vec!["a", "c", "d"]);
        assert_eq!(selected(&e), vec!["c"]);
        assert_eq!(e.active(), Some(&"c"));
        assert_eq!(e.anchor(), Some(&"c"));

        e.clear_selection();
        e.set_items(vec!["x", "y"]);
        assert_eq!(e.active(), Some(&"x"));
        assert_eq!(e.anchor(), Some(&"x"));

        e.set_items(Vec::new());
        assert_eq!(e.active(), None);
        assert_eq!(e.anchor(), None);
    }

    #[test]
    fn arrows_move_and_select() {
        let mut e = engine();
        assert!(e.handle_key(&mut KeyInput::new("ArrowDown")));
        assert_eq!(e.active(), Some(&"b"));
        assert_eq!(selected(&e), vec!["b"]);
        e.handle_key(&mut KeyInput::new("ArrowUp"));
        e.handle_key(&mut KeyInput::new("ArrowUp"));
        assert_eq!(e.active(), Some(&"a"));
    }

    #[test]
    fn shift_arrow_extends_from_anchor() {
        let mut e = engine();
        e.handle_pointer(&"b", Modifiers::NONE);
        e.handle_key(&mut KeyInput::new("ArrowDown").shift());
        e.handle_key(&mut KeyInput::new("ArrowDown").shift());
        assert_eq!(selected(&e), vec!["b", "c", "d"]);
        e.handle_key(&mut KeyInput::new("ArrowUp").shift());
        assert_eq!(selected(&e), vec!["b", "c"]);
    }

    #[test]
    fn shift_ctrl_arrow_extends_additively() {
        let mut e = SelectionEngine::new(vec!["a", "b", "c", "d", "e"]);
        e.handle_pointer(&"a", Modifiers::NONE);
        e.handle_pointer(&"d", Modifiers::CTRL);
        assert_eq!(selected(&e), vec!["a", "d"]);

        let mut down = KeyInput::new("ArrowDown").shift().ctrl();
        assert!(e.handle_key(&mut down));
        assert!(down.default_prevented());
        assert_eq!(selected(&e), vec!["a", "d", "e"]);
        assert_eq!(e.active(), Some(&"e"));
        assert_eq!(e.anchor(), Some(&"d"));

        e.handle_key(&mut KeyInput::new("Home").shift().meta());
        assert_eq!(selected(&e), vec!["a", "b", "c", "d", "e"]);

        e.handle_key(&mut KeyInput::new("End").shift());
        assert_eq!(selected(&e), vec!["d", "e"]);
    }

    #[test]
    fn ctrl_arrow_is_roving_move() {
        let mut e = engine();
        e.handle_pointer(&"a", Modifiers::NONE);
        e.handle_key(&mut KeyInput::new("ArrowDown").ctrl());
        e.handle_key(&mut KeyInput::new("ArrowDown").ctrl());
        assert_eq!(e.active(), Some(&"c"));
        assert_eq!(selected(&e), vec!["a"]);

        let mut space = KeyInput::new(" ").ctrl();
        assert!(e.handle_key(&mut space));
        assert!(space.default_prevented());
        assert_eq!(selected(&e), vec!["a", "c"]);
    }

    #[test]
    fn home_end_with_shift() {
        let mut e = engine();
        e.handle_pointer(&"b", Modifiers::NONE);
        e.handle_key(&mut KeyInput::new("End").shift());
        assert_eq!(selected(&e), vec!["b", "c", "d"]);
        e.handle_key(&mut KeyInput::new("Home"));
        assert_eq!(selected(&e), vec!["a"]);
    }

    #[test]
    fn ctrl_a_selects_all() {
        let mut e = engine();
        let mut ev = KeyInput::new("a").meta();
        assert!(e.handle_key(&mut ev));
        assert!(ev.default_prevented());
        assert_eq!(selected(&e), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn enter_reapplies_pointer_semantics() {
        let mut e = engine();
        e.handle_pointer(&"a", Modifiers::NONE);
        e.handle_key(&mut KeyInput::new("End").ctrl());
        e.handle_key(&mut KeyInput::new("Enter").shift());
        assert_eq!(selected(&e), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn unhandled_key() {
        let mut e = engine();
        let mut ev = KeyInput::new("x");
        assert!(!e.handle_key(&mut ev));
        assert!(!ev.default_prevented());
    }

    #[test]
    fn roving_tab_index_marks_only_active() {
        let mut e = engine();
        e.set_active(&"c");
        let indices: Vec<i32> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| e.roving_tab_index(id))
            .collect();
        assert_eq!(indices, vec![-1, -1, 0, -1]);
        assert!(!e.set_active(&"nope"));
    }

    #[test]
    fn subscribers_see_every_mutation() {
        use std::sync::{Arc, Mutex};
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let mut e = engine();
        e.subscribe(move |s| sink.lock().unwrap().push(s.selected.len()));
        e.handle_pointer(&"a", Modifiers::NONE);
        e.select_all();
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 4]);
    }
}
