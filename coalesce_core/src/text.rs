// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text-delta coalescing for consecutive shows or hides.
//!
//! When two children of the same hypertext container are shown (or hidden)
//! back to back and they sit next to each other, listeners should see one
//! contiguous text change rather than two. The forest decides *whether* two
//! records are adjacent with [`hide_adjacency`] / [`show_adjacency`] and then
//! grows the earlier delta with [`absorb`].
//!
//! Both checks work on sibling links rather than cached position indices:
//! removed children carry the siblings captured at removal time, and a shown
//! child is compared through its live siblings, whose cached indices may not
//! have been renumbered yet.
//!
//! Offsets and lengths are in chars.

use crate::event::{SiblingContext, TextChange};
use crate::id::AccessibleId;

/// Where newly absorbed text lands relative to an existing delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Adjacency {
    /// The new text directly follows the existing delta.
    After,
    /// The new text directly precedes the existing delta.
    Before,
}

/// Decides whether `target`, hidden right after the accessible whose removal
/// captured `prev_siblings`, was adjacent to it.
#[must_use]
pub fn hide_adjacency(prev_siblings: &SiblingContext, target: AccessibleId) -> Option<Adjacency> {
    if prev_siblings.next == Some(target) {
        Some(Adjacency::After)
    } else if prev_siblings.prev == Some(target) {
        Some(Adjacency::Before)
    } else {
        None
    }
}

/// Decides whether a child with live siblings `siblings` sits next to
/// `prev_shown`, the child shown just before it.
///
/// A child right after `prev_shown` has the next position index, one right
/// before it the previous.
#[must_use]
pub fn show_adjacency(prev_shown: AccessibleId, siblings: &SiblingContext) -> Option<Adjacency> {
    if siblings.prev == Some(prev_shown) {
        Some(Adjacency::After)
    } else if siblings.next == Some(prev_shown) {
        Some(Adjacency::Before)
    } else {
        None
    }
}

/// Grows `change` by `text` on the given side.
///
/// Text absorbed in front of the delta moves its start back by the absorbed
/// length in chars. Inserted deltas clamp at offset zero.
///
/// # Panics
///
/// In debug builds, panics if a removed delta would start before offset zero.
pub fn absorb(change: &mut TextChange, text: &str, side: Adjacency) {
    match side {
        Adjacency::After => change.text.push_str(text),
        Adjacency::Before => {
            let old_len = change.len();
            change.text.insert_str(0, text);
            let shift = change.len() - old_len;
            if change.inserted {
                change.start = change.start.saturating_sub(shift);
            } else {
                debug_assert!(
                    shift <= change.start,
                    "removed text of {shift} chars lies before offset {}",
                    change.start
                );
                change.start -= shift;
            }
        }
    }
}
