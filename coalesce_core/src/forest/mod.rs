// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The event forest: pending show/hide records grouped by container.
//!
//! One [`EventForest`] lives for one document mutation batch. It holds a node
//! per container that had a direct child shown or hidden, arranged so that a
//! node nested under another tracks a container inside the outer node's
//! container. Processing walks it depth-first, firing nested containers'
//! records before those of the containers around them, and then empties it.
//!
//! # Submodules
//!
//! - `store`: arena storage, lookups, and [`clear`](EventForest::clear).
//! - `place`: [`find_or_insert`](EventForest::find_or_insert).
//! - `mutated`: [`mutated`](EventForest::mutated) and text coalescing.
//! - `process`: [`process`](EventForest::process).
//! - `traverse`: the [`Children`] iterator.
//! - `dump`: the [`ForestDump`] diagnostic.

mod dump;
mod mutated;
mod place;
mod process;
mod store;
mod traverse;

pub use dump::ForestDump;
pub use store::EventForest;
pub use traverse::Children;
