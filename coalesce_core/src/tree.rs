// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract between the core and the accessible tree it reports on.
//!
//! The core never owns accessibles. It navigates them, asks for their
//! flattened text, and writes back a small amount of bookkeeping (position
//! indices, the "kids mutating" flag, dirty marks, subtree teardown) through
//! the [`AccessibleTree`] trait. Every method assumes a correctly linked tree;
//! implementations are free to panic on stale handles.

use alloc::string::String;

use understory_dirty::Channel;

use crate::id::AccessibleId;

/// The flattened-text stand-in for a child that is not a text leaf.
pub const EMBEDDED_CHAR: char = '\u{FFFC}';

/// Accessible roles the core distinguishes.
///
/// Only [`MenuPopup`](Self::MenuPopup) changes event delivery; the remaining
/// variants exist so tree implementations and diagnostics can describe their
/// nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// A document root.
    Document,
    /// A generic grouping container.
    Section,
    /// A paragraph of text.
    Paragraph,
    /// A run of text with no children.
    TextLeaf,
    /// A hyperlink.
    Link,
    /// A push button.
    Button,
    /// A list container.
    List,
    /// An item in a list.
    ListItem,
    /// A popup menu. Hiding one also announces that the menu closed.
    MenuPopup,
    /// An item in a menu.
    MenuItem,
    /// An image.
    Image,
}

/// Per-accessible state bits the core reads and writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StateFlags {
    /// Set while a [`MutationScope`](crate::scope::MutationScope) is open on
    /// the accessible, so other code paths can detect reentrancy.
    pub kids_mutating: bool,
}

/// Navigation, queries, and bookkeeping hooks over an accessible tree.
pub trait AccessibleTree {
    /// Returns the parent of an accessible, or `None` for a document root or a
    /// detached accessible.
    fn parent(&self, id: AccessibleId) -> Option<AccessibleId>;

    /// Returns the document root the accessible belongs to.
    fn document(&self, id: AccessibleId) -> AccessibleId;

    /// Returns whether the accessible is a document root.
    fn is_document(&self, id: AccessibleId) -> bool;

    /// Returns the number of children.
    fn child_count(&self, id: AccessibleId) -> usize;

    /// Returns the child at the given position in the live child list.
    fn child_at(&self, id: AccessibleId, index: usize) -> Option<AccessibleId>;

    /// Returns the cached position index of the accessible in its parent.
    ///
    /// Within an open mutation scope the cached value of siblings may be stale;
    /// [`MutationScope::finish`](crate::scope::MutationScope::finish) brings
    /// every cached index back in line with the live child list.
    fn index_in_parent(&self, id: AccessibleId) -> Option<usize>;

    /// Overwrites the cached position index.
    fn set_index_in_parent(&mut self, id: AccessibleId, index: usize);

    /// Returns the live previous sibling.
    fn prev_sibling(&self, id: AccessibleId) -> Option<AccessibleId>;

    /// Returns the live next sibling.
    fn next_sibling(&self, id: AccessibleId) -> Option<AccessibleId>;

    /// Returns the role of the accessible.
    fn role(&self, id: AccessibleId) -> Role;

    /// Returns whether the accessible exposes flattened text over its
    /// children.
    fn is_hyper_text(&self, id: AccessibleId) -> bool;

    /// Appends the accessible's own contribution to its parent's flattened
    /// text: a text leaf appends its text, anything else appends
    /// [`EMBEDDED_CHAR`].
    fn append_text_to(&self, id: AccessibleId, out: &mut String);

    /// Returns the flattened-text offset (in chars) of `child` within the
    /// hypertext `container`.
    fn child_offset(&self, container: AccessibleId, child: AccessibleId) -> Option<usize>;

    /// Returns the accessible's state bits.
    fn state_flags(&self, id: AccessibleId) -> StateFlags;

    /// Replaces the accessible's state bits.
    fn set_state_flags(&mut self, id: AccessibleId, flags: StateFlags);

    /// Marks a cache of the accessible as stale.
    ///
    /// See [`dirty`](crate::dirty) for the channels the core uses.
    fn mark_dirty(&mut self, id: AccessibleId, channel: Channel);

    /// Tears down the removed subtree rooted at `root` in `document`.
    fn shutdown_subtree(&mut self, document: AccessibleId, root: AccessibleId);
}

/// Returns the flattened text an accessible contributes to its parent.
pub(crate) fn text_of<T: AccessibleTree + ?Sized>(tree: &T, id: AccessibleId) -> String {
    let mut text = String::new();
    tree.append_text_to(id, &mut text);
    text
}
