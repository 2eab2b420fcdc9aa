// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-document mutation controller.
//!
//! [`MutationBatch`] owns the [`EventForest`] of one document mutation pass,
//! the [`BatchConfig`] it was built with, and the optional [`Tracer`] every
//! step reports to. Scopes feed it; [`process`](MutationBatch::process)
//! delivers and empties it.

use crate::config::BatchConfig;
use crate::dirty;
use crate::event::{EventSink, MutationEvent};
use crate::forest::EventForest;
use crate::id::{AccessibleId, ForestNodeId};
use crate::trace::{ProcessSummary, ScopeBeginEvent, ScopeEndEvent, Tracer};
use crate::tree::AccessibleTree;

/// Pending notifications of one document mutation pass.
#[derive(Debug)]
pub struct MutationBatch<'t> {
    forest: EventForest,
    tracer: Tracer<'t>,
    suppressed: bool,
}

impl Default for MutationBatch<'_> {
    fn default() -> Self {
        Self::new(BatchConfig::new())
    }
}

impl<'t> MutationBatch<'t> {
    /// Creates an empty batch without tracing.
    #[must_use]
    pub fn new(config: BatchConfig) -> Self {
        Self::with_tracer(config, Tracer::none())
    }

    /// Creates an empty batch that reports to `tracer`.
    #[must_use]
    pub fn with_tracer(config: BatchConfig, tracer: Tracer<'t>) -> Self {
        Self {
            forest: EventForest::with_config(config),
            tracer,
            suppressed: false,
        }
    }

    /// Returns the batch configuration.
    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        self.forest.config()
    }

    /// Returns the pending forest.
    #[must_use]
    pub fn forest(&self) -> &EventForest {
        &self.forest
    }

    /// Returns whether new scopes are currently kept from recording events.
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// While suppressed, [`queue_mutation`](Self::queue_mutation) declines
    /// every container, so scopes that have not recorded anything yet stay
    /// silent. Used when nobody listens to the document.
    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    /// Returns the forest node to record `container`'s child changes on, or
    /// `None` if they should not be recorded.
    pub fn queue_mutation<T: AccessibleTree + ?Sized>(
        &mut self,
        tree: &T,
        container: AccessibleId,
    ) -> Option<ForestNodeId> {
        if self.suppressed {
            return None;
        }
        self.forest.find_or_insert(tree, container, &mut self.tracer)
    }

    /// Asks for `id`'s computed name to be rechecked.
    pub fn queue_name_change<T: AccessibleTree + ?Sized>(&mut self, tree: &mut T, id: AccessibleId) {
        tree.mark_dirty(id, dirty::NAME);
    }

    /// Fires everything pending into `sink` and empties the batch.
    pub fn process<T, S>(&mut self, tree: &mut T, sink: &mut S) -> ProcessSummary
    where
        T: AccessibleTree + ?Sized,
        S: EventSink + ?Sized,
    {
        self.forest.process(tree, sink, &mut self.tracer)
    }

    /// Drops everything pending without firing, tearing down removed
    /// subtrees that are still owed a shutdown.
    pub fn clear<T: AccessibleTree + ?Sized>(&mut self, tree: &mut T) {
        self.forest.clear(tree);
    }

    pub(crate) fn record<T: AccessibleTree + ?Sized>(
        &mut self,
        tree: &T,
        node: ForestNodeId,
        event: MutationEvent,
    ) {
        self.forest.mutated(tree, node, event, &mut self.tracer);
    }

    pub(crate) fn trace_scope_begin(&mut self, e: &ScopeBeginEvent) {
        self.tracer.scope_begin(e, &self.forest);
    }

    pub(crate) fn trace_scope_end(&mut self, e: &ScopeEndEvent) {
        self.tracer.scope_end(e, &self.forest);
    }
}
