// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accessible and forest-node identity types.

use core::fmt;

/// Sentinel value indicating "no node" in forest link fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to an accessible in an external [`AccessibleTree`](crate::tree::AccessibleTree).
///
/// Contains both a slot index and a generation counter so that a tree can
/// detect handles that outlived the accessible they named. The core only
/// compares handles; it never interprets the fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessibleId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl AccessibleId {
    /// Creates a handle from a slot index and generation.
    ///
    /// Tree implementations mint handles with this; the core never does.
    #[inline]
    #[must_use]
    pub const fn new(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Returns the raw slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for AccessibleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Acc({}@gen{})", self.idx, self.generation)
    }
}

/// Index of a node in an [`EventForest`](crate::forest::EventForest).
///
/// Node ids are only meaningful within the batch that produced them: a
/// processed or cleared forest recycles its slots.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForestNodeId(pub(crate) u32);

impl ForestNodeId {
    /// The synthetic root of every forest. It carries no container and no
    /// events.
    pub const ROOT: Self = Self(0);

    /// Returns the raw arena index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ForestNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForestNodeId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn debug_shows_slot_and_generation() {
        let id = AccessibleId::new(4, 2);
        assert_eq!(format!("{id:?}"), "Acc(4@gen2)");
        assert_eq!(id.index(), 4);
        assert_eq!(id.generation(), 2);
    }

    #[test]
    fn generation_distinguishes_reused_slots() {
        assert_ne!(AccessibleId::new(1, 0), AccessibleId::new(1, 1));
    }
}
