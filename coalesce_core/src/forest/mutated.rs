// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attaching show/hide records to a forest node.

use crate::event::{MutationEvent, MutationKind, SiblingContext, TextChange};
use crate::id::{AccessibleId, ForestNodeId, INVALID};
use crate::text;
use crate::trace::{CoalescedEvent, DiscardedEvent, Tracer};
use crate::tree::{self, AccessibleTree};

use super::store::EventForest;

impl EventForest {
    /// Records a show or hide of a direct child of `node`'s container.
    ///
    /// Nested nodes tracking the event's target, or anything beneath it, are
    /// dropped first: a subtree that is now shown or hidden as a whole has
    /// nothing left to report about its insides. Any subtree teardown their
    /// hides owed still happens on the next [`process`](Self::process) or
    /// [`clear`](Self::clear).
    ///
    /// The record then picks up a text delta. If the preceding record of the
    /// node is of the same kind, carries a delta, and its target is adjacent
    /// to this one, the delta is grown and moves to the new record.
    /// Otherwise, for a hypertext container, a fresh delta is computed from
    /// the target's flattened text.
    ///
    /// Hides must be recorded while the target is still linked under its
    /// container, shows after it has been linked.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale, is the root, or tracks a container other
    /// than `event.container`.
    pub fn mutated<T: AccessibleTree + ?Sized>(
        &mut self,
        tree: &T,
        node: ForestNodeId,
        mut event: MutationEvent,
        tracer: &mut Tracer<'_>,
    ) {
        self.validate(node);
        assert!(
            self.container[node.0 as usize] == Some(event.container),
            "{node:?} does not track {:?}",
            event.container
        );

        self.discard_covered(tree, node.0, event.target, tracer);

        if self.config.coalesce_text {
            self.coalesce(tree, node.0, &mut event, tracer);
        }

        if event.text_change.is_none()
            && self.config.text_changes
            && tree.is_hyper_text(event.container)
        {
            event.text_change = text_change_for(tree, &event);
        }

        self.events[node.0 as usize].push(event);
    }

    /// Drops the nested nodes of `node` whose container is `target` or lies
    /// beneath it.
    fn discard_covered<T: AccessibleTree + ?Sized>(
        &mut self,
        tree: &T,
        node: u32,
        target: AccessibleId,
        tracer: &mut Tracer<'_>,
    ) {
        let owner_container = self.container_at(node);
        let mut child = self.first_child[node as usize];
        while child != INVALID {
            let next = self.next_sibling[child as usize];
            let container = self.container_at(child);
            if is_at_or_under(tree, container, target, owner_container) {
                self.unlink(child);
                let nodes = self.free_subtree(child);
                tracer.discarded(&DiscardedEvent {
                    container,
                    cause: target,
                    nodes,
                });
            }
            child = next;
        }
    }

    /// Tries to merge the new record's text into the delta of the node's last
    /// record. On success the grown delta is moved onto `event`.
    fn coalesce<T: AccessibleTree + ?Sized>(
        &mut self,
        tree: &T,
        node: u32,
        event: &mut MutationEvent,
        tracer: &mut Tracer<'_>,
    ) {
        let Some(prev) = self.events[node as usize].last_mut() else {
            return;
        };
        if !prev.kind.same_kind(&event.kind) || prev.text_change.is_none() {
            return;
        }

        let side = match (&prev.kind, &event.kind) {
            (MutationKind::Hide { siblings, .. }, MutationKind::Hide { .. }) => {
                text::hide_adjacency(siblings, event.target)
            }
            _ => {
                let siblings = SiblingContext {
                    prev: tree.prev_sibling(event.target),
                    next: tree.next_sibling(event.target),
                };
                text::show_adjacency(prev.target, &siblings)
            }
        };
        let Some(side) = side else {
            return;
        };

        let Some(mut change) = prev.text_change.take() else {
            return;
        };
        text::absorb(&mut change, &tree::text_of(tree, event.target), side);
        event.text_change = Some(change);
        tracer.coalesced(&CoalescedEvent {
            container: event.container,
            target: event.target,
            side,
        });
    }
}

/// Computes the standalone text delta of a record, or `None` if the target
/// contributes no text.
fn text_change_for<T: AccessibleTree + ?Sized>(
    tree: &T,
    event: &MutationEvent,
) -> Option<TextChange> {
    let text = tree::text_of(tree, event.target);
    if text.is_empty() {
        return None;
    }
    let start = tree.child_offset(event.container, event.target)?;
    Some(TextChange {
        container: event.container,
        start,
        text,
        inserted: event.kind.is_show(),
        from_user_input: event.from_user_input,
    })
}

/// Returns whether `id` is `target` or a descendant of it, looking no higher
/// than `stop`.
fn is_at_or_under<T: AccessibleTree + ?Sized>(
    tree: &T,
    id: AccessibleId,
    target: AccessibleId,
    stop: AccessibleId,
) -> bool {
    let mut current = Some(id);
    while let Some(cur) = current {
        if cur == target {
            return true;
        }
        if cur == stop {
            return false;
        }
        current = tree.parent(cur);
    }
    false
}
