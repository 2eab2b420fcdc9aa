// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for mutation batches.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! forest, scopes, and batch call at each step. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Scope begin/end events carry the forest so a sink can dump the tree of
//! pending events "before" and "after" a parent's children change.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::event::AccEvent;
use crate::forest::EventForest;
use crate::id::{AccessibleId, ForestNodeId};
use crate::text::Adjacency;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a [`MutationScope`](crate::scope::MutationScope) opens.
#[derive(Clone, Copy, Debug)]
pub struct ScopeBeginEvent {
    /// The parent whose children are about to change.
    pub parent: AccessibleId,
    /// Whether the scope records events at all.
    pub events_enabled: bool,
    /// Whether a scope on the same parent was already open.
    pub nested: bool,
}

/// Emitted when a [`MutationScope`](crate::scope::MutationScope) finishes.
#[derive(Clone, Copy, Debug)]
pub struct ScopeEndEvent {
    /// The parent whose children changed.
    pub parent: AccessibleId,
    /// First renumbered child position, if any child was touched.
    pub start_index: Option<usize>,
    /// Number of children whose position index was rewritten.
    pub renumbered: usize,
}

/// How [`EventForest::find_or_insert`] resolved a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// A node for the container already existed.
    Existing,
    /// A new node was appended to the end of a sibling chain.
    Appended,
    /// A new node was created under the node of the innermost mutated
    /// ancestor.
    Nested {
        /// Container of the enclosing node.
        under: AccessibleId,
    },
    /// A new node took the slot of a node for one of its descendants and
    /// adopted it.
    Spliced {
        /// Number of nodes moved under the new node.
        adopted: u32,
    },
}

/// Emitted when the forest resolves a container to a node.
#[derive(Clone, Copy, Debug)]
pub struct PlacementEvent {
    /// The mutated container.
    pub container: AccessibleId,
    /// The node responsible for it.
    pub node: ForestNodeId,
    /// How it was found or created.
    pub placement: Placement,
}

/// Emitted when a container's mutation is already implied by an ancestor's
/// show and needs no tracking.
#[derive(Clone, Copy, Debug)]
pub struct IgnoredEvent {
    /// The container whose mutation was ignored.
    pub container: AccessibleId,
    /// The freshly shown ancestor that covers it.
    pub shown: AccessibleId,
}

/// Emitted when a pending subtree of the forest is dropped as moot.
#[derive(Clone, Copy, Debug)]
pub struct DiscardedEvent {
    /// Container of the dropped subtree's root node.
    pub container: AccessibleId,
    /// The show or hide target that made it moot.
    pub cause: AccessibleId,
    /// Number of forest nodes dropped.
    pub nodes: u32,
}

/// Emitted when a text delta is merged into its neighbor's.
#[derive(Clone, Copy, Debug)]
pub struct CoalescedEvent {
    /// The hypertext container.
    pub container: AccessibleId,
    /// The accessible whose text was absorbed.
    pub target: AccessibleId,
    /// Where the text went.
    pub side: Adjacency,
}

/// Emitted once a batch has been fully delivered.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessSummary {
    /// Forest nodes visited.
    pub nodes: u32,
    /// Notifications fired.
    pub fired: u32,
    /// Subtrees torn down.
    pub shutdowns: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from mutation batches.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a scope opens, with the forest as it stands.
    fn on_scope_begin(&mut self, e: &ScopeBeginEvent, forest: &EventForest) {
        _ = (e, forest);
    }

    /// Called when a scope finishes, with the forest as it stands.
    fn on_scope_end(&mut self, e: &ScopeEndEvent, forest: &EventForest) {
        _ = (e, forest);
    }

    /// Called when a container is resolved to a forest node.
    fn on_placement(&mut self, e: &PlacementEvent) {
        _ = e;
    }

    /// Called when a container's mutation is ignored.
    fn on_ignored(&mut self, e: &IgnoredEvent) {
        _ = e;
    }

    /// Called when a moot forest subtree is dropped.
    fn on_discarded(&mut self, e: &DiscardedEvent) {
        _ = e;
    }

    /// Called when two text deltas are merged.
    fn on_coalesced(&mut self, e: &CoalescedEvent) {
        _ = e;
    }

    /// Called for every notification, right before it reaches the event sink.
    fn on_fired(&mut self, e: &AccEvent) {
        _ = e;
    }

    /// Called after a batch has been delivered.
    fn on_process(&mut self, s: &ProcessSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer<'_> {
    fn default() -> Self {
        Self::none()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`ScopeBeginEvent`].
    #[inline]
    pub fn scope_begin(&mut self, e: &ScopeBeginEvent, forest: &EventForest) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_scope_begin(e, forest);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (e, forest);
        }
    }

    /// Emits a [`ScopeEndEvent`].
    #[inline]
    pub fn scope_end(&mut self, e: &ScopeEndEvent, forest: &EventForest) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_scope_end(e, forest);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (e, forest);
        }
    }

    /// Emits a [`PlacementEvent`].
    #[inline]
    pub fn placement(&mut self, e: &PlacementEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_placement(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`IgnoredEvent`].
    #[inline]
    pub fn ignored(&mut self, e: &IgnoredEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_ignored(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DiscardedEvent`].
    #[inline]
    pub fn discarded(&mut self, e: &DiscardedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_discarded(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CoalescedEvent`].
    #[inline]
    pub fn coalesced(&mut self, e: &CoalescedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_coalesced(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a fired notification.
    #[inline]
    pub fn fired(&mut self, e: &AccEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_fired(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ProcessSummary`].
    #[inline]
    pub fn process(&mut self, summary: &ProcessSummary) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_process(summary);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = summary;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
