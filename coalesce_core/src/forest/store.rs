// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays forest storage with node allocation and lookup.

use alloc::vec::Vec;

use crate::config::BatchConfig;
use crate::event::MutationEvent;
use crate::id::{AccessibleId, ForestNodeId, INVALID};
use crate::tree::AccessibleTree;

use super::traverse::Children;

const ROOT: u32 = ForestNodeId::ROOT.0;

/// Forest of containers with pending show/hide events.
///
/// Nodes are addressed by [`ForestNodeId`]. Internally, each node occupies a
/// slot in parallel arrays; slot 0 is the synthetic root, which owns the
/// top-level sibling chain and carries no container. Slots of discarded
/// subtrees are recycled via a free list.
///
/// Each node exclusively owns its first-child chain: discarding a node drops
/// its whole subtree.
#[derive(Debug)]
pub struct EventForest {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,

    // -- Per-node payload --
    pub(crate) container: Vec<Option<AccessibleId>>,
    pub(crate) fire_reorder: Vec<bool>,
    pub(crate) events: Vec<Vec<MutationEvent>>,

    // -- Allocation --
    pub(crate) free_list: Vec<u32>,
    pub(crate) live: u32,

    // -- Teardowns owed by discarded hide events: (document, root) --
    pub(crate) orphaned_shutdowns: Vec<(AccessibleId, AccessibleId)>,

    pub(crate) config: BatchConfig,
}

impl Default for EventForest {
    fn default() -> Self {
        Self::new()
    }
}

impl EventForest {
    /// Creates an empty forest with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BatchConfig::new())
    }

    /// Creates an empty forest.
    #[must_use]
    pub fn with_config(config: BatchConfig) -> Self {
        Self {
            parent: alloc::vec![INVALID],
            first_child: alloc::vec![INVALID],
            next_sibling: alloc::vec![INVALID],
            container: alloc::vec![None],
            fire_reorder: alloc::vec![false],
            events: alloc::vec![Vec::new()],
            free_list: Vec::new(),
            live: 0,
            orphaned_shutdowns: Vec::new(),
            config,
        }
    }

    /// Returns the configuration the forest was created with.
    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Returns `true` if no container has pending events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_child[ROOT as usize] == INVALID
    }

    /// Returns the number of container nodes (the root is not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.live as usize
    }

    // -- Node queries --

    /// Returns the container a node tracks, or `None` for the root.
    #[must_use]
    pub fn container(&self, node: ForestNodeId) -> Option<AccessibleId> {
        self.validate(node);
        self.container[node.0 as usize]
    }

    /// Returns the pending show/hide records of a node, in the order they
    /// occurred.
    #[must_use]
    pub fn events(&self, node: ForestNodeId) -> &[MutationEvent] {
        self.validate(node);
        &self.events[node.0 as usize]
    }

    /// Returns whether processing the node ends with a reorder notification.
    #[must_use]
    pub fn fire_reorder(&self, node: ForestNodeId) -> bool {
        self.validate(node);
        self.fire_reorder[node.0 as usize]
    }

    /// Returns the node that owns `node`, or `None` for the root.
    ///
    /// Top-level nodes return [`ForestNodeId::ROOT`].
    #[must_use]
    pub fn parent(&self, node: ForestNodeId) -> Option<ForestNodeId> {
        self.validate(node);
        let p = self.parent[node.0 as usize];
        (p != INVALID).then_some(ForestNodeId(p))
    }

    /// Returns an iterator over the nodes directly nested in `node`.
    #[must_use]
    pub fn children(&self, node: ForestNodeId) -> Children<'_> {
        self.validate(node);
        Children::new(self, self.first_child[node.0 as usize])
    }

    /// Returns an iterator over the top-level nodes.
    #[must_use]
    pub fn top_level(&self) -> Children<'_> {
        self.children(ForestNodeId::ROOT)
    }

    /// Finds the node tracking `container`, searching the whole forest.
    #[must_use]
    pub fn find(&self, container: AccessibleId) -> Option<ForestNodeId> {
        let mut stack = Vec::new();
        stack.push(self.first_child[ROOT as usize]);
        while let Some(mut node) = stack.pop() {
            while node != INVALID {
                if self.container[node as usize] == Some(container) {
                    return Some(ForestNodeId(node));
                }
                let child = self.first_child[node as usize];
                if child != INVALID {
                    stack.push(child);
                }
                node = self.next_sibling[node as usize];
            }
        }
        None
    }

    /// Drops every node and pending record, tearing down the subtrees of any
    /// hide that still owes a shutdown.
    ///
    /// Afterwards the forest behaves exactly like a freshly created one.
    pub fn clear<T: AccessibleTree + ?Sized>(&mut self, tree: &mut T) {
        for node in self.post_order() {
            for event in &self.events[node as usize] {
                if event.needs_shutdown() {
                    tree.shutdown_subtree(event.document, event.target);
                }
            }
        }
        for (document, root) in self.orphaned_shutdowns.drain(..) {
            tree.shutdown_subtree(document, root);
        }
        self.reset();
    }

    // -- Internal helpers --

    /// Panics if the handle does not name a live node.
    pub(crate) fn validate(&self, node: ForestNodeId) {
        let idx = node.0 as usize;
        assert!(
            idx == ROOT as usize || (idx < self.container.len() && self.container[idx].is_some()),
            "stale ForestNodeId: {node:?}"
        );
    }

    /// Returns the container of a non-root node.
    pub(crate) fn container_at(&self, node: u32) -> AccessibleId {
        match self.container[node as usize] {
            Some(container) => container,
            None => panic!("forest node {node} has no container"),
        }
    }

    /// Allocates a detached node for `container`.
    pub(crate) fn alloc_node(&mut self, container: AccessibleId, fire_reorder: bool) -> u32 {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.parent[idx as usize] = INVALID;
            self.first_child[idx as usize] = INVALID;
            self.next_sibling[idx as usize] = INVALID;
            self.container[idx as usize] = Some(container);
            self.fire_reorder[idx as usize] = fire_reorder;
            self.events[idx as usize].clear();
            idx
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "forest size is bounded by the number of mutated containers"
            )]
            let idx = self.container.len() as u32;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.container.push(Some(container));
            self.fire_reorder.push(fire_reorder);
            self.events.push(Vec::new());
            idx
        };
        self.live += 1;
        idx
    }

    /// Removes `node` from its owner's child chain without touching its
    /// subtree.
    pub(crate) fn unlink(&mut self, node: u32) {
        let owner = self.parent[node as usize];
        let next = self.next_sibling[node as usize];
        if self.first_child[owner as usize] == node {
            self.first_child[owner as usize] = next;
        } else {
            let mut prev = self.first_child[owner as usize];
            while self.next_sibling[prev as usize] != node {
                prev = self.next_sibling[prev as usize];
                assert!(prev != INVALID, "forest node {node} missing from its owner's chain");
            }
            self.next_sibling[prev as usize] = next;
        }
        self.parent[node as usize] = INVALID;
        self.next_sibling[node as usize] = INVALID;
    }

    /// Frees an unlinked node and its whole subtree, keeping the teardowns
    /// their hide events still owe. Returns the number of freed nodes.
    pub(crate) fn free_subtree(&mut self, node: u32) -> u32 {
        let mut freed = 0;
        let mut stack = alloc::vec![node];
        while let Some(idx) = stack.pop() {
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
            for event in self.events[idx as usize].drain(..) {
                if event.needs_shutdown() {
                    self.orphaned_shutdowns.push((event.document, event.target));
                }
            }
            self.container[idx as usize] = None;
            self.first_child[idx as usize] = INVALID;
            self.parent[idx as usize] = INVALID;
            self.free_list.push(idx);
            self.live -= 1;
            freed += 1;
        }
        freed
    }

    /// Returns every non-root node, children before their owner and siblings
    /// left to right.
    pub(crate) fn post_order(&self) -> Vec<u32> {
        let mut order = Vec::with_capacity(self.live as usize);
        let mut stack: Vec<(u32, bool)> = Vec::new();
        self.push_chain_reversed(ROOT, &mut stack);
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
            } else {
                stack.push((node, true));
                self.push_chain_reversed(node, &mut stack);
            }
        }
        order
    }

    fn push_chain_reversed(&self, owner: u32, stack: &mut Vec<(u32, bool)>) {
        let mark = stack.len();
        let mut child = self.first_child[owner as usize];
        while child != INVALID {
            stack.push((child, false));
            child = self.next_sibling[child as usize];
        }
        stack[mark..].reverse();
    }

    /// Returns the forest to its freshly created state.
    pub(crate) fn reset(&mut self) {
        self.parent.truncate(1);
        self.first_child.truncate(1);
        self.next_sibling.truncate(1);
        self.container.truncate(1);
        self.fire_reorder.truncate(1);
        self.events.truncate(1);
        self.first_child[ROOT as usize] = INVALID;
        self.free_list.clear();
        self.orphaned_shutdowns.clear();
        self.live = 0;
    }
}
