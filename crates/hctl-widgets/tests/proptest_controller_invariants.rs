//! Property-based invariant tests for the palette and selection engine.
//!
//! 1. Palette results are sorted by score, descending.
//! 2. No excluded (`-inf`) item ever appears in results.
//! 3. The highlight, when present, indexes an enabled result.
//! 4. Results never exceed `max_results`.
//! 5. Selection stays a subset of items, reported in item order.
//! 6. Roving tab index yields exactly one `0` for non-empty items.

use hctl_core::{KeyInput, Modifiers, keys};
use hctl_widgets::command_palette::{CommandItem, CommandPalette};
use hctl_widgets::selection::SelectionEngine;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn item_strategy() -> impl Strategy<Value = (String, bool)> {
    ("[a-e ]{1,8}", any::<bool>())
}

fn palette_from(labels: &[(String, bool)]) -> CommandPalette {
    let items = labels
        .iter()
        .enumerate()
        .map(|(i, (label, disabled))| {
            CommandItem::new(format!("cmd-{i}"), label.clone()).with_disabled(*disabled)
        })
        .collect();
    CommandPalette::new(items)
}

#[derive(Debug, Clone)]
enum SelOp {
    Click(usize, u8),
    Key(usize, u8),
}

fn sel_op_strategy() -> impl Strategy<Value = SelOp> {
    prop_oneof![
        (0usize..8, 0u8..16).prop_map(|(i, m)| SelOp::Click(i, m)),
        (0usize..6, 0u8..16).prop_map(|(k, m)| SelOp::Key(k, m)),
    ]
}

const SEL_KEYS: [&str; 6] = [
    keys::ARROW_DOWN,
    keys::ARROW_UP,
    keys::HOME,
    keys::END,
    keys::SPACE,
    "a",
];

// ═════════════════════════════════════════════════════════════════════════
// Palette ranking
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn palette_results_sorted_and_finite(
        labels in prop::collection::vec(item_strategy(), 0..12),
        query in "[a-e]{0,3}",
    ) {
        let mut palette = palette_from(&labels);
        let _ = palette.set_query(query.clone());
        let results = palette.results();
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score, "unsorted: {:?}", query);
        }
        for (i, r) in results.iter().enumerate() {
            prop_assert!(r.score.is_finite());
            prop_assert_eq!(r.index, i);
        }
    }

    #[test]
    fn palette_highlight_is_enabled(
        labels in prop::collection::vec(item_strategy(), 0..12),
        query in "[a-e]{0,2}",
        moves in prop::collection::vec(0usize..6, 0..10),
    ) {
        let mut palette = palette_from(&labels);
        let _ = palette.set_query(query);
        let nav = [
            keys::ARROW_DOWN,
            keys::ARROW_UP,
            keys::PAGE_DOWN,
            keys::PAGE_UP,
            keys::HOME,
            keys::END,
        ];
        for m in moves {
            let _ = palette.handle_key(&mut KeyInput::new(nav[m]));
            let state = palette.state();
            match state.highlighted_index {
                Some(i) => prop_assert!(!state.results[i].item.disabled),
                None => prop_assert!(state.results.iter().all(|r| r.item.disabled)),
            }
        }
    }

    #[test]
    fn palette_respects_max_results(
        labels in prop::collection::vec(item_strategy(), 0..20),
        max in 1usize..6,
    ) {
        let mut palette = palette_from(&labels).with_max_results(max);
        let _ = palette.set_query("");
        prop_assert!(palette.results().len() <= max);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Selection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn selection_stays_consistent(
        n in 0usize..8,
        ops in prop::collection::vec(sel_op_strategy(), 0..24),
    ) {
        let items: Vec<usize> = (0..n).collect();
        let mut engine = SelectionEngine::new(items.clone());
        for op in ops {
            match op {
                SelOp::Click(i, m) => {
                    let _ = engine.handle_pointer(&i, Modifiers::from_bits_truncate(m));
                }
                SelOp::Key(k, m) => {
                    let mut ev = KeyInput::new(SEL_KEYS[k])
                        .with_modifiers(Modifiers::from_bits_truncate(m));
                    let _ = engine.handle_key(&mut ev);
                }
            }

            let state = engine.state();
            let mut last = None;
            for id in &state.selected {
                prop_assert!(items.contains(id));
                prop_assert!(last < Some(*id), "selection out of item order");
                last = Some(*id);
            }
            if let Some(active) = &state.active_id {
                prop_assert!(items.contains(active));
            }
            if let Some(anchor) = &state.anchor_id {
                prop_assert!(items.contains(anchor));
            }

            let zeros = items.iter().filter(|id| engine.roving_tab_index(id) == 0).count();
            prop_assert_eq!(zeros, usize::from(!items.is_empty()));
        }
    }
}
