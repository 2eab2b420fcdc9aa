// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coalescing and ordered delivery of accessibility tree mutation events.
//!
//! When a document mutation pass inserts and removes many accessibles, firing
//! one show or hide per change produces redundant and out-of-order
//! notifications. `coalesce_core` collects the changes of one pass, drops the
//! ones made moot by containment, merges adjacent text changes, and delivers
//! the rest with nested containers before the containers around them and at
//! most one reorder per mutated container. It is `no_std` compatible (with
//! `alloc`) and keeps its forest in struct-of-arrays storage addressed by
//! index handles.
//!
//! # Architecture
//!
//! ```text
//!   document-change driver
//!       │
//!       ▼
//!   MutationScope::new(parent) ──► register_insertion / register_removal
//!       │                                   │
//!       ▼                                   ▼
//!   MutationScope::finish()        MutationBatch ──► EventForest
//!   (renumber, mark dirty)          find_or_insert, mutated
//!                                           │
//!                                           ▼
//!                      MutationBatch::process() ──► EventSink::fire(AccEvent)
//! ```
//!
//! **[`scope`]**: [`MutationScope`](scope::MutationScope) brackets one
//! parent's child changes, reports them, and keeps cached child indices in
//! order.
//!
//! **[`batch`]**: [`MutationBatch`](batch::MutationBatch) owns the forest,
//! the configuration, and the tracer of one document mutation pass.
//!
//! **[`forest`]**: [`EventForest`](forest::EventForest), the containment
//! forest of pending show/hide records, with placement, coalescing, and
//! delivery.
//!
//! **[`tree`]**: The [`AccessibleTree`](tree::AccessibleTree) trait the core
//! uses to navigate and update the accessible tree it reports on.
//!
//! **[`event`]**: Pending records, delivered [`AccEvent`](event::AccEvent)s,
//! and the [`EventSink`](event::EventSink) they go to.
//!
//! **[`text`]**: Adjacency and merge rules for text deltas.
//!
//! **[`dirty`]**: `understory_dirty` channels for cache invalidation.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! batch instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Lets an unfinished scope that is dropped
//!   during a panic skip its own assertion.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod batch;
pub mod config;
pub mod dirty;
pub mod event;
pub mod forest;
pub mod id;
pub mod scope;
pub mod text;
pub mod trace;
pub mod tree;

#[cfg(test)]
mod testing;
