// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Labelled one-line descriptions of delivered events.
//!
//! ```text
//!   show x in p
//!   hide y in p (user)
//!   insert "ab" at 3 in p
//!   popup-end menu
//!   reorder p
//! ```

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use coalesce_core::event::AccEvent;

use crate::store::AccessibleStore;

/// Describes one event using the labels stored in `store`.
#[must_use]
pub fn describe(store: &AccessibleStore, event: &AccEvent) -> String {
    let user = |from_user_input: bool| if from_user_input { " (user)" } else { "" };
    match event {
        AccEvent::Show {
            target,
            container,
            from_user_input,
        } => format!(
            "show {} in {}{}",
            store.label(*target),
            store.label(*container),
            user(*from_user_input)
        ),
        AccEvent::Hide {
            target,
            container,
            from_user_input,
        } => format!(
            "hide {} in {}{}",
            store.label(*target),
            store.label(*container),
            user(*from_user_input)
        ),
        AccEvent::TextChange(change) => format!(
            "{} {:?} at {} in {}{}",
            if change.inserted { "insert" } else { "remove" },
            change.text,
            change.start,
            store.label(change.container),
            user(change.from_user_input)
        ),
        AccEvent::MenuPopupEnd { target } => format!("popup-end {}", store.label(*target)),
        AccEvent::Reorder { container } => format!("reorder {}", store.label(*container)),
    }
}

/// Describes every event, in order.
#[must_use]
pub fn describe_all(store: &AccessibleStore, events: &[AccEvent]) -> Vec<String> {
    events.iter().map(|e| describe(store, e)).collect()
}
