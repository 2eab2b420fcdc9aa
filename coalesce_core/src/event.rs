// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pending mutation records and the notifications delivered to listeners.
//!
//! A [`MutationEvent`] is what the forest stores while a batch is open: one
//! show or hide of a direct child of a container, plus an optional
//! [`TextChange`] describing the effect on the container's flattened text.
//! When the batch is processed each record turns into one or more
//! [`AccEvent`]s handed to an [`EventSink`].

use alloc::string::String;
use alloc::vec::Vec;

use crate::id::AccessibleId;

/// Siblings of a hidden accessible, captured before it was unlinked.
///
/// Adjacency checks for text coalescing use these instead of the live tree,
/// which may already have been rearranged by later removals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SiblingContext {
    /// Previous sibling at the time of removal.
    pub prev: Option<AccessibleId>,
    /// Next sibling at the time of removal.
    pub next: Option<AccessibleId>,
}

/// Whether a record announces an insertion or a removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// The target became a child of the container.
    Show,
    /// The target is being removed from the container.
    Hide {
        /// The removed subtree must be torn down once the hide has fired.
        needs_shutdown: bool,
        /// Siblings at the time of removal.
        siblings: SiblingContext,
    },
}

impl MutationKind {
    /// Returns `true` for [`Show`](Self::Show).
    #[inline]
    #[must_use]
    pub const fn is_show(&self) -> bool {
        matches!(self, Self::Show)
    }

    /// Returns `true` for [`Hide`](Self::Hide).
    #[inline]
    #[must_use]
    pub const fn is_hide(&self) -> bool {
        matches!(self, Self::Hide { .. })
    }

    /// Returns `true` when both kinds are shows or both are hides.
    #[inline]
    #[must_use]
    pub const fn same_kind(&self, other: &Self) -> bool {
        self.is_show() == other.is_show()
    }
}

/// Change to a container's flattened text caused by a show or hide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextChange {
    /// The hypertext container whose text changed.
    pub container: AccessibleId,
    /// Offset of the change, in chars.
    pub start: usize,
    /// The inserted or removed text.
    pub text: String,
    /// `true` for inserted text, `false` for removed text.
    pub inserted: bool,
    /// Whether the change was caused by user input.
    pub from_user_input: bool,
}

impl TextChange {
    /// Length of the changed text, in chars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns `true` if no text changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A pending show or hide of a container's direct child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationEvent {
    /// The child that was shown or hidden.
    pub target: AccessibleId,
    /// The container the child belongs to.
    pub container: AccessibleId,
    /// The document owning the target, used for subtree teardown.
    pub document: AccessibleId,
    /// Show or hide.
    pub kind: MutationKind,
    /// Whether the mutation was caused by user input.
    pub from_user_input: bool,
    /// Text delta attached during coalescing, if any.
    pub text_change: Option<TextChange>,
}

impl MutationEvent {
    /// Returns whether the removed subtree must be torn down after firing.
    #[must_use]
    pub const fn needs_shutdown(&self) -> bool {
        matches!(
            self.kind,
            MutationKind::Hide {
                needs_shutdown: true,
                ..
            }
        )
    }
}

/// Notification delivered to listeners when a batch is processed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccEvent {
    /// `target` became a child of `container`.
    Show {
        /// The shown accessible.
        target: AccessibleId,
        /// Its parent.
        container: AccessibleId,
        /// Whether the change was caused by user input.
        from_user_input: bool,
    },
    /// `target` was removed from `container`.
    Hide {
        /// The hidden accessible.
        target: AccessibleId,
        /// Its former parent.
        container: AccessibleId,
        /// Whether the change was caused by user input.
        from_user_input: bool,
    },
    /// The flattened text of a container changed.
    TextChange(TextChange),
    /// A popup menu went away.
    MenuPopupEnd {
        /// The popup being hidden.
        target: AccessibleId,
    },
    /// The child list of `container` changed.
    Reorder {
        /// The mutated container.
        container: AccessibleId,
    },
}

impl AccEvent {
    /// Returns the accessible the notification is about.
    #[must_use]
    pub fn target(&self) -> AccessibleId {
        match self {
            Self::Show { target, .. } | Self::Hide { target, .. } => *target,
            Self::MenuPopupEnd { target } => *target,
            Self::TextChange(change) => change.container,
            Self::Reorder { container } => *container,
        }
    }
}

/// Receives notifications, synchronously and in delivery order.
pub trait EventSink {
    /// Delivers one notification.
    fn fire(&mut self, event: AccEvent);
}

impl EventSink for Vec<AccEvent> {
    fn fire(&mut self, event: AccEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn fire(&mut self, event: AccEvent) {
        (**self).fire(event);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn acc(idx: u32) -> AccessibleId {
        AccessibleId::new(idx, 0)
    }

    #[test]
    fn kind_predicates() {
        let hide = MutationKind::Hide {
            needs_shutdown: false,
            siblings: SiblingContext::default(),
        };
        assert!(MutationKind::Show.is_show());
        assert!(hide.is_hide());
        assert!(!MutationKind::Show.same_kind(&hide));
        assert!(hide.same_kind(&hide));
    }

    #[test]
    fn needs_shutdown_only_for_marked_hides() {
        let mut ev = MutationEvent {
            target: acc(1),
            container: acc(0),
            document: acc(0),
            kind: MutationKind::Show,
            from_user_input: false,
            text_change: None,
        };
        assert!(!ev.needs_shutdown());
        ev.kind = MutationKind::Hide {
            needs_shutdown: true,
            siblings: SiblingContext::default(),
        };
        assert!(ev.needs_shutdown());
    }

    #[test]
    fn text_change_length_counts_chars() {
        let change = TextChange {
            container: acc(0),
            start: 0,
            text: String::from("h\u{e9}llo"),
            inserted: true,
            from_user_input: false,
        };
        assert_eq!(change.len(), 5);
        assert!(!change.is_empty());
    }

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink: Vec<AccEvent> = Vec::new();
        sink.fire(AccEvent::Reorder { container: acc(3) });
        sink.fire(AccEvent::MenuPopupEnd { target: acc(4) });
        assert_eq!(
            sink,
            vec![
                AccEvent::Reorder { container: acc(3) },
                AccEvent::MenuPopupEnd { target: acc(4) },
            ]
        );
        assert_eq!(sink[1].target(), acc(4));
    }
}
