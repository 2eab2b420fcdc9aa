// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory accessible tree and scripted mutation driver.
//!
//! [`AccessibleStore`](store::AccessibleStore) is a small arena-backed
//! accessible tree implementing
//! [`AccessibleTree`](coalesce_core::tree::AccessibleTree). It keeps cached
//! child indices exactly as lazily as a real tree would (inserting a child
//! does not renumber its siblings) and records every subtree teardown, so
//! tests can observe what a batch did to it.
//!
//! [`Driver`](driver::Driver) pairs a store with a
//! [`MutationBatch`](coalesce_core::batch::MutationBatch) and runs scripted
//! mutations through properly ordered
//! [`MutationScope`](coalesce_core::scope::MutationScope)s.
//! [`log`] turns delivered events into short labelled lines for assertions.

#![no_std]

extern crate alloc;

pub mod driver;
pub mod log;
pub mod store;
