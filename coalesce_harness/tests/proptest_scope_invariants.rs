// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-based invariant tests for mutation scopes.
//!
//! 1. Cached child indices are live after any edit sequence
//! 2. Processing delivers at most one reorder and leaves the forest empty
//! 3. Text deltas of a paragraph never start past its final text

use coalesce_core::config::BatchConfig;
use coalesce_core::event::AccEvent;
use coalesce_core::id::AccessibleId;
use coalesce_core::tree::{AccessibleTree, Role};
use coalesce_harness::driver::{Driver, Mutation};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

/// One child edit inside a scope. Positions are reduced modulo the live
/// child count when applied.
#[derive(Clone, Debug)]
enum Edit {
    Insert(usize),
    Remove(usize),
    RemoveKeep(usize),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..16).prop_map(Edit::Insert),
        (0usize..16).prop_map(Edit::Remove),
        (0usize..16).prop_map(Edit::RemoveKeep),
    ]
}

fn edits_strategy() -> impl Strategy<Value = Vec<Edit>> {
    prop::collection::vec(edit_strategy(), 1..12)
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// A document holding `p` (of the given role) with `initial` children.
fn container(config: BatchConfig, role: Role, initial: usize) -> (Driver<'static>, AccessibleId) {
    let mut driver = Driver::new(config);
    let store = driver.store_mut();
    let doc = store.create_document("doc");
    let p = store.create(doc, role, "p");
    store.append_child(doc, p);
    for n in 0..initial {
        let child = store.create_text(doc, &format!("k{n}"));
        store.append_child(p, child);
    }
    (driver, p)
}

/// Applies `edits` to the children of `m`'s parent.
///
/// A subtree removed with [`Mutation::remove_keep`] stays alive, so it is
/// put back at the end before the scope closes.
fn apply(m: &mut Mutation<'_, '_>, edits: &[Edit]) {
    let parent = m.parent();
    let mut kept = Vec::new();
    for (n, edit) in edits.iter().enumerate() {
        let count = m.store().child_count(parent);
        match *edit {
            Edit::Insert(at) => {
                let child = m.create_text(&format!("n{n}"));
                m.insert(at % (count + 1), child);
            }
            Edit::Remove(at) | Edit::RemoveKeep(at) if count > 0 => {
                let Some(child) = m.store().child_at(parent, at % count) else {
                    unreachable!("position is in range");
                };
                if matches!(edit, Edit::Remove(_)) {
                    m.remove(child);
                } else {
                    m.remove_keep(child);
                    kept.push(child);
                }
            }
            Edit::Remove(_) | Edit::RemoveKeep(_) => {}
        }
    }
    for child in kept {
        m.append(child);
    }
}

fn text_len(driver: &Driver<'_>, id: AccessibleId) -> usize {
    let mut text = String::new();
    let store = driver.store();
    for child in store.children(id) {
        store.append_text_to(child, &mut text);
    }
    text.chars().count()
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Cached indices are live
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn indices_match_positions_after_any_edits(
        initial in 0usize..6,
        edits in edits_strategy(),
    ) {
        let (mut driver, p) = container(BatchConfig::structural(), Role::Section, initial);
        driver.mutate(p, |m| apply(m, &edits));

        let store = driver.store();
        for (pos, child) in store.children(p).enumerate() {
            prop_assert_eq!(store.index_in_parent(child), Some(pos));
        }
        prop_assert!(!store.state_flags(p).kids_mutating);
    }

    #[test]
    fn indices_stay_live_across_several_scopes(
        initial in 0usize..6,
        rounds in prop::collection::vec(edits_strategy(), 1..4),
    ) {
        let (mut driver, p) = container(BatchConfig::structural(), Role::Section, initial);
        for edits in &rounds {
            driver.mutate(p, |m| apply(m, edits));
        }

        let store = driver.store();
        for (pos, child) in store.children(p).enumerate() {
            prop_assert_eq!(store.index_in_parent(child), Some(pos));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Delivery
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn one_reorder_at_most_and_forest_drained(
        initial in 0usize..6,
        edits in edits_strategy(),
    ) {
        let (mut driver, p) = container(BatchConfig::structural(), Role::Section, initial);
        driver.mutate(p, |m| apply(m, &edits));

        let events = driver.process();
        let reorders = events
            .iter()
            .filter(|e| matches!(e, AccEvent::Reorder { .. }))
            .count();
        prop_assert!(reorders <= 1);
        if let Some(AccEvent::Reorder { container }) = events.last() {
            prop_assert_eq!(*container, p);
        }
        prop_assert!(driver.batch().forest().is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Text deltas stay in range
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn inserted_text_starts_inside_final_text(
        initial in 0usize..4,
        edits in prop::collection::vec((0usize..16).prop_map(Edit::Insert), 1..8),
    ) {
        let (mut driver, p) = container(BatchConfig::new(), Role::Paragraph, initial);
        driver.mutate(p, |m| apply(m, &edits));

        let total = text_len(&driver, p);
        for event in driver.process() {
            if let AccEvent::TextChange(change) = event {
                prop_assert!(change.inserted);
                prop_assert!(change.start + change.len() <= total);
            }
        }
    }
}
