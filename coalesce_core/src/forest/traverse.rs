// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forest traversal utilities.

use crate::id::{ForestNodeId, INVALID};

use super::store::EventForest;

/// An iterator over the nodes directly nested in a forest node.
///
/// Created by [`EventForest::children`] and [`EventForest::top_level`].
#[derive(Debug)]
pub struct Children<'a> {
    forest: &'a EventForest,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(forest: &'a EventForest, first: u32) -> Self {
        Self {
            forest,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = ForestNodeId;

    fn next(&mut self) -> Option<ForestNodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.forest.next_sibling[idx as usize];
        Some(ForestNodeId(idx))
    }
}
