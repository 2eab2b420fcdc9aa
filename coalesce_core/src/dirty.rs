// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The core never recomputes caches itself. When a mutation invalidates
//! something the tree owns it calls
//! [`AccessibleTree::mark_dirty`](crate::tree::AccessibleTree::mark_dirty)
//! with one of these channels, and the tree decides when to recompute. Trees
//! built on [`understory_dirty`] can pass the channels straight to a
//! `DirtyTracker` and drain them later.
//!
//! All three channels are local-only: nothing propagates to descendants.

use understory_dirty::Channel;

/// The accessible moved within its parent; position-in-set and set-size
/// caches are stale.
pub const GROUP_INFO: Channel = Channel::new(0);

/// The parent's cached listing of embedded objects is stale.
pub const EMBEDDED_OBJECTS: Channel = Channel::new(1);

/// The accessible was shown or hidden and its computed name should be
/// rechecked.
pub const NAME: Channel = Channel::new(2);
