// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Locating or creating the forest node for a mutated container.
//!
//! The forest mirrors containment: a node nested under another tracks a
//! container strictly inside the outer node's container. Placement scans a
//! sibling chain in order and, for each node, checks three relations:
//!
//! 1. **Same container**: return the node.
//! 2. **Node contains the target**: the node's container is an ancestor.
//!    Remember the match and restart the scan inside the node's own chain, so
//!    the innermost mutated ancestor wins.
//! 3. **Target contains the node**: splice a new node into this slot, adopt
//!    the node and every later sibling that is also inside the target.
//!    Unrelated siblings keep their place in the chain.
//!
//! If the scan ends without a decision the new node is appended to the chain
//! that was being scanned.
//!
//! Before anything is created under a matched ancestor, the ancestor's events
//! are consulted for the child on the path to the target. A show there means
//! the target's changes are already part of a freshly shown subtree, so the
//! mutation is ignored. A hide there means the tree was mutated below
//! something already removed, which is a bug in the caller.

use crate::id::{AccessibleId, ForestNodeId, INVALID};
use crate::trace::{IgnoredEvent, Placement, PlacementEvent, Tracer};
use crate::tree::AccessibleTree;

use super::store::EventForest;

const ROOT: u32 = ForestNodeId::ROOT.0;

impl EventForest {
    /// Returns the node responsible for `container`'s direct-child events,
    /// creating or restructuring nodes as needed.
    ///
    /// Returns `None` when the container lies inside a subtree that was
    /// shown earlier in the batch: its changes are already covered and need
    /// no tracking.
    ///
    /// # Panics
    ///
    /// Panics if the container lies inside a subtree whose removal was
    /// already recorded, or if walking up from the container does not reach
    /// its document.
    pub fn find_or_insert<T: AccessibleTree + ?Sized>(
        &mut self,
        tree: &T,
        container: AccessibleId,
        tracer: &mut Tracer<'_>,
    ) -> Option<ForestNodeId> {
        let mut owner = ROOT;
        let mut scope_root = tree.document(container);
        let mut matched: Option<(u32, AccessibleId)> = None;
        let mut prev = INVALID;
        let mut node = self.first_child[ROOT as usize];

        while node != INVALID {
            let candidate = self.container_at(node);
            if candidate == container {
                tracer.placement(&PlacementEvent {
                    container,
                    node: ForestNodeId(node),
                    placement: Placement::Existing,
                });
                return Some(ForestNodeId(node));
            }

            if let Some(via) = child_on_path(tree, container, candidate, scope_root) {
                matched = Some((node, via));
                owner = node;
                scope_root = candidate;
                prev = INVALID;
                node = self.first_child[node as usize];
                continue;
            }

            if contains(tree, container, candidate) {
                if let Some((ancestor, via)) = matched {
                    if self.implied_by_show(ancestor, via, container, tracer) {
                        return None;
                    }
                }
                let (spliced, adopted) = self.splice(tree, owner, prev, node, container);
                tracer.placement(&PlacementEvent {
                    container,
                    node: ForestNodeId(spliced),
                    placement: Placement::Spliced { adopted },
                });
                return Some(ForestNodeId(spliced));
            }

            prev = node;
            node = self.next_sibling[node as usize];
        }

        let placement = match matched {
            Some((ancestor, via)) => {
                if self.implied_by_show(ancestor, via, container, tracer) {
                    return None;
                }
                Placement::Nested {
                    under: self.container_at(ancestor),
                }
            }
            None => Placement::Appended,
        };

        // Nested nodes stay quiet: the enclosing node's reorder already
        // announces the structural change.
        let new = self.alloc_node(container, owner == ROOT);
        self.parent[new as usize] = owner;
        if prev == INVALID {
            self.first_child[owner as usize] = new;
        } else {
            self.next_sibling[prev as usize] = new;
        }
        tracer.placement(&PlacementEvent {
            container,
            node: ForestNodeId(new),
            placement,
        });
        Some(ForestNodeId(new))
    }

    /// Checks the earliest event of `ancestor` targeting `via`.
    ///
    /// Returns `true` if it was a show.
    fn implied_by_show(
        &self,
        ancestor: u32,
        via: AccessibleId,
        container: AccessibleId,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        let Some(event) = self.events[ancestor as usize]
            .iter()
            .find(|event| event.target == via)
        else {
            return false;
        };
        assert!(
            !event.kind.is_hide(),
            "accessible tree was modified after it was removed: {container:?} lies under hidden {via:?}"
        );
        tracer.ignored(&IgnoredEvent {
            container,
            shown: via,
        });
        true
    }

    /// Puts a new node for `container` in the slot of `node`, which follows
    /// `prev` in `owner`'s chain, and moves `node` plus every later sibling
    /// inside `container` under it, in chain order.
    ///
    /// Returns the new node and the number of adopted nodes.
    fn splice<T: AccessibleTree + ?Sized>(
        &mut self,
        tree: &T,
        owner: u32,
        prev: u32,
        node: u32,
        container: AccessibleId,
    ) -> (u32, u32) {
        let new = self.alloc_node(container, owner == ROOT);
        self.parent[new as usize] = owner;
        if prev == INVALID {
            self.first_child[owner as usize] = new;
        } else {
            self.next_sibling[prev as usize] = new;
        }
        self.next_sibling[new as usize] = self.next_sibling[node as usize];

        self.first_child[new as usize] = node;
        self.parent[node as usize] = new;
        self.next_sibling[node as usize] = INVALID;
        self.fire_reorder[node as usize] = false;

        let mut adopted = 1;
        let mut last = node;
        let mut kept = new;
        let mut next = self.next_sibling[new as usize];
        while next != INVALID {
            let following = self.next_sibling[next as usize];
            if contains(tree, container, self.container_at(next)) {
                self.next_sibling[kept as usize] = following;
                self.next_sibling[last as usize] = next;
                self.next_sibling[next as usize] = INVALID;
                self.parent[next as usize] = new;
                self.fire_reorder[next as usize] = false;
                last = next;
                adopted += 1;
            } else {
                kept = next;
            }
            next = following;
        }
        (new, adopted)
    }
}

/// Walks up from `container` towards `scope_root`. If `ancestor` is found on
/// the way, returns its child on the path.
fn child_on_path<T: AccessibleTree + ?Sized>(
    tree: &T,
    container: AccessibleId,
    ancestor: AccessibleId,
    scope_root: AccessibleId,
) -> Option<AccessibleId> {
    let mut tail = container;
    while tail != scope_root {
        let Some(parent) = tree.parent(tail) else {
            panic!("{container:?} is not connected to its document");
        };
        if parent == ancestor {
            return Some(tail);
        }
        tail = parent;
    }
    None
}

/// Returns whether `ancestor` is a strict ancestor of `descendant` within its
/// document.
fn contains<T: AccessibleTree + ?Sized>(
    tree: &T,
    ancestor: AccessibleId,
    descendant: AccessibleId,
) -> bool {
    let mut current = tree.parent(descendant);
    while let Some(parent) = current {
        if parent == ancestor {
            return true;
        }
        if tree.is_document(parent) {
            return false;
        }
        current = tree.parent(parent);
    }
    false
}
