// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batch configuration.

/// Configuration for a [`MutationBatch`](crate::batch::MutationBatch).
///
/// The defaults produce the full notification set: text deltas for
/// hypertext containers, merged when adjacent, and a menu-popup-end
/// announcement before a popup's hide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BatchConfig {
    /// Attach a text delta to shows and hides under hypertext containers.
    pub text_changes: bool,
    /// Merge the deltas of adjacent consecutive shows or hides.
    pub coalesce_text: bool,
    /// Fire a menu-popup-end notification before hiding a popup menu.
    pub menu_popup_end: bool,
}

impl BatchConfig {
    /// The default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text_changes: true,
            coalesce_text: true,
            menu_popup_end: true,
        }
    }

    /// Structural notifications only: no text deltas.
    #[must_use]
    pub const fn structural() -> Self {
        Self {
            text_changes: false,
            coalesce_text: false,
            menu_popup_end: true,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new()
    }
}
