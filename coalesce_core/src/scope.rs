// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-parent mutation scopes.
//!
//! A [`MutationScope`] brackets one parent's run of child insertions and
//! removals. While it is open the parent carries the `kids_mutating` flag,
//! every registered child is reported to the batch, and the scope remembers
//! the lowest child position that was touched. [`finish`](MutationScope::finish)
//! renumbers the cached position indices from that point on and invalidates
//! the caches that depend on them.
//!
//! ```text
//!   let scope = MutationScope::new(tree, batch, parent);
//!   tree.insert(parent, 2, x);   scope.register_insertion(tree, batch, x);
//!   scope.register_removal(tree, batch, y, false);   tree.unlink(y);
//!   scope.finish(tree, batch);
//! ```
//!
//! Removals are registered while the child is still linked (its siblings and
//! text offset are captured), insertions once it has been linked.

use crate::batch::MutationBatch;
use crate::dirty;
use crate::event::{MutationEvent, MutationKind, SiblingContext};
use crate::id::{AccessibleId, ForestNodeId};
use crate::trace::{ScopeBeginEvent, ScopeEndEvent};
use crate::tree::{AccessibleTree, StateFlags};

/// Where registered events go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    /// No event registered yet; the forest node is looked up on first use.
    Pending,
    /// Events are recorded on this node.
    Node(ForestNodeId),
    /// Events are dropped for the rest of the scope.
    Disabled,
}

/// An open batch of child insertions and removals on one parent.
///
/// Must be consumed with [`finish`](Self::finish). Dropping an unfinished
/// scope trips a debug assertion.
#[must_use = "a mutation scope must be closed with `finish`"]
#[derive(Debug)]
pub struct MutationScope {
    parent: AccessibleId,
    start_index: Option<usize>,
    saved_flags: StateFlags,
    target: Target,
    from_user_input: bool,
    finished: bool,
}

impl MutationScope {
    /// Opens a scope on `parent` that reports its changes to `batch`.
    pub fn new<T: AccessibleTree + ?Sized>(
        tree: &mut T,
        batch: &mut MutationBatch<'_>,
        parent: AccessibleId,
    ) -> Self {
        Self::open(tree, batch, parent, Target::Pending)
    }

    /// Opens a scope on `parent` that only keeps indices and caches in order
    /// and records no events.
    pub fn without_events<T: AccessibleTree + ?Sized>(
        tree: &mut T,
        batch: &mut MutationBatch<'_>,
        parent: AccessibleId,
    ) -> Self {
        Self::open(tree, batch, parent, Target::Disabled)
    }

    fn open<T: AccessibleTree + ?Sized>(
        tree: &mut T,
        batch: &mut MutationBatch<'_>,
        parent: AccessibleId,
        target: Target,
    ) -> Self {
        let saved_flags = tree.state_flags(parent);
        tree.set_state_flags(
            parent,
            StateFlags {
                kids_mutating: true,
                ..saved_flags
            },
        );
        batch.trace_scope_begin(&ScopeBeginEvent {
            parent,
            events_enabled: target != Target::Disabled,
            nested: saved_flags.kids_mutating,
        });
        Self {
            parent,
            start_index: None,
            saved_flags,
            target,
            from_user_input: false,
            finished: false,
        }
    }

    /// Marks every change registered through this scope as caused by user
    /// input.
    pub fn from_user_input(mut self, from_user_input: bool) -> Self {
        self.from_user_input = from_user_input;
        self
    }

    /// Returns the parent whose children are changing.
    #[must_use]
    pub fn parent(&self) -> AccessibleId {
        self.parent
    }

    /// Returns the lowest child position that needs renumbering, or `None`
    /// if nothing was registered yet.
    #[must_use]
    pub fn start_index(&self) -> Option<usize> {
        self.start_index
    }

    /// Registers `child`, already linked at its final position, as inserted.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not linked under the scope's parent.
    pub fn register_insertion<T: AccessibleTree + ?Sized>(
        &mut self,
        tree: &mut T,
        batch: &mut MutationBatch<'_>,
        child: AccessibleId,
    ) {
        let index = self.checked_index(tree, child);
        self.lower_start(index + 1);
        let Some(node) = self.target_node(tree, batch) else {
            return;
        };
        let event = MutationEvent {
            target: child,
            container: self.parent,
            document: tree.document(self.parent),
            kind: MutationKind::Show,
            from_user_input: self.from_user_input,
            text_change: None,
        };
        batch.record(tree, node, event);
        batch.queue_name_change(tree, child);
    }

    /// Registers `child`, still linked under the parent, as about to be
    /// removed.
    ///
    /// Unless `skip_shutdown` is set, the removed subtree is torn down after
    /// its hide has fired.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not linked under the scope's parent.
    pub fn register_removal<T: AccessibleTree + ?Sized>(
        &mut self,
        tree: &mut T,
        batch: &mut MutationBatch<'_>,
        child: AccessibleId,
        skip_shutdown: bool,
    ) {
        let index = self.checked_index(tree, child);
        self.lower_start(index);
        let Some(node) = self.target_node(tree, batch) else {
            return;
        };
        let siblings = SiblingContext {
            prev: tree.prev_sibling(child),
            next: tree.next_sibling(child),
        };
        let event = MutationEvent {
            target: child,
            container: self.parent,
            document: tree.document(self.parent),
            kind: MutationKind::Hide {
                needs_shutdown: !skip_shutdown,
                siblings,
            },
            from_user_input: self.from_user_input,
            text_change: None,
        };
        batch.record(tree, node, event);
        batch.queue_name_change(tree, child);
    }

    /// Closes the scope.
    ///
    /// Rewrites the cached position index of every child from
    /// [`start_index`](Self::start_index) on, marking each one's group info
    /// dirty, and drops the parent's embedded-object listing unless only the
    /// last child was touched. The parent's `kids_mutating` flag returns to
    /// what it was when the scope opened.
    pub fn finish<T: AccessibleTree + ?Sized>(
        mut self,
        tree: &mut T,
        batch: &mut MutationBatch<'_>,
    ) {
        let parent = self.parent;
        let mut flags = tree.state_flags(parent);
        debug_assert!(
            flags.kids_mutating,
            "kids_mutating of {parent:?} was cleared while a scope was open"
        );
        flags.kids_mutating = false;
        tree.set_state_flags(parent, flags);

        let len = tree.child_count(parent);
        #[cfg(debug_assertions)]
        {
            let end = self.start_index.unwrap_or(len).min(len);
            for idx in 0..end {
                let child = tree.child_at(parent, idx);
                debug_assert!(
                    child.and_then(|c| tree.index_in_parent(c)) == Some(idx),
                    "child {idx} of {parent:?} moved without being registered"
                );
            }
        }

        let mut renumbered = 0;
        if let Some(start) = self.start_index {
            for idx in start..len {
                let Some(child) = tree.child_at(parent, idx) else {
                    panic!("{parent:?} reports {len} children but has none at {idx}");
                };
                tree.set_index_in_parent(child, idx);
                tree.mark_dirty(child, dirty::GROUP_INFO);
                renumbered += 1;
            }
            if len == 0 || start + 1 < len {
                tree.mark_dirty(parent, dirty::EMBEDDED_OBJECTS);
            }
        }

        flags.kids_mutating = self.saved_flags.kids_mutating;
        tree.set_state_flags(parent, flags);

        self.finished = true;
        batch.trace_scope_end(&ScopeEndEvent {
            parent,
            start_index: self.start_index,
            renumbered,
        });
    }

    fn checked_index<T: AccessibleTree + ?Sized>(&self, tree: &T, child: AccessibleId) -> usize {
        assert!(
            tree.parent(child) == Some(self.parent),
            "{child:?} is not a child of {:?}",
            self.parent
        );
        let Some(index) = tree.index_in_parent(child) else {
            panic!("{child:?} has no position in {:?}", self.parent);
        };
        index
    }

    fn lower_start(&mut self, index: usize) {
        self.start_index = Some(self.start_index.map_or(index, |start| start.min(index)));
    }

    /// Resolves the forest node on first use. A declined lookup disables the
    /// scope's events for good.
    fn target_node<T: AccessibleTree + ?Sized>(
        &mut self,
        tree: &T,
        batch: &mut MutationBatch<'_>,
    ) -> Option<ForestNodeId> {
        if self.target == Target::Pending {
            self.target = match batch.queue_mutation(tree, self.parent) {
                Some(node) => Target::Node(node),
                None => Target::Disabled,
            };
        }
        match self.target {
            Target::Node(node) => Some(node),
            Target::Pending | Target::Disabled => None,
        }
    }
}

impl Drop for MutationScope {
    fn drop(&mut self) {
        #[cfg(any(test, feature = "std"))]
        if std::thread::panicking() {
            return;
        }
        debug_assert!(
            self.finished,
            "MutationScope for {:?} dropped without finish()",
            self.parent
        );
    }
}
