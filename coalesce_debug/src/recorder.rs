// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as tagged little-endian records. [`decode`] reads them back as an
//! iterator of [`RecordedEvent`].
//!
//! Scope events store the number of pending forest nodes instead of the
//! forest itself. Text changes store their text as length-prefixed UTF-8.

use coalesce_core::event::{AccEvent, TextChange};
use coalesce_core::forest::EventForest;
use coalesce_core::id::AccessibleId;
use coalesce_core::text::Adjacency;
use coalesce_core::trace::{
    CoalescedEvent, DiscardedEvent, IgnoredEvent, Placement, PlacementEvent, ProcessSummary,
    ScopeBeginEvent, ScopeEndEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_SCOPE_BEGIN: u8 = 1;
const TAG_SCOPE_END: u8 = 2;
const TAG_PLACEMENT: u8 = 3;
const TAG_IGNORED: u8 = 4;
const TAG_DISCARDED: u8 = 5;
const TAG_COALESCED: u8 = 6;
const TAG_FIRED: u8 = 7;
const TAG_PROCESS: u8 = 8;

const FIRED_SHOW: u8 = 0;
const FIRED_HIDE: u8 = 1;
const FIRED_TEXT_CHANGE: u8 = 2;
const FIRED_MENU_POPUP_END: u8 = 3;
const FIRED_REORDER: u8 = 4;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_usize(&mut self, v: usize) {
        self.write_u64(u64::try_from(v).unwrap_or(u64::MAX));
    }

    fn write_option_usize(&mut self, v: Option<usize>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_usize(val);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }

    fn write_id(&mut self, id: AccessibleId) {
        self.write_u32(id.index());
        self.write_u32(id.generation());
    }

    fn write_pending(&mut self, forest: &EventForest) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "pending node count capped at u32::MAX for recording"
        )]
        self.write_u32(forest.len().min(u32::MAX as usize) as u32);
    }

    fn write_str(&mut self, s: &str) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "recorded text is truncated to u32::MAX bytes"
        )]
        let len = s.len().min(u32::MAX as usize) as u32;
        self.write_u32(len);
        self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
    }

    fn write_side(&mut self, side: Adjacency) {
        self.write_u8(match side {
            Adjacency::After => 0,
            Adjacency::Before => 1,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_scope_begin(&mut self, e: &ScopeBeginEvent, forest: &EventForest) {
        self.write_u8(TAG_SCOPE_BEGIN);
        self.write_id(e.parent);
        self.write_bool(e.events_enabled);
        self.write_bool(e.nested);
        self.write_pending(forest);
    }

    fn on_scope_end(&mut self, e: &ScopeEndEvent, forest: &EventForest) {
        self.write_u8(TAG_SCOPE_END);
        self.write_id(e.parent);
        self.write_option_usize(e.start_index);
        self.write_usize(e.renumbered);
        self.write_pending(forest);
    }

    fn on_placement(&mut self, e: &PlacementEvent) {
        self.write_u8(TAG_PLACEMENT);
        self.write_id(e.container);
        self.write_u32(e.node.index());
        match e.placement {
            Placement::Existing => self.write_u8(0),
            Placement::Appended => self.write_u8(1),
            Placement::Nested { under } => {
                self.write_u8(2);
                self.write_id(under);
            }
            Placement::Spliced { adopted } => {
                self.write_u8(3);
                self.write_u32(adopted);
            }
        }
    }

    fn on_ignored(&mut self, e: &IgnoredEvent) {
        self.write_u8(TAG_IGNORED);
        self.write_id(e.container);
        self.write_id(e.shown);
    }

    fn on_discarded(&mut self, e: &DiscardedEvent) {
        self.write_u8(TAG_DISCARDED);
        self.write_id(e.container);
        self.write_id(e.cause);
        self.write_u32(e.nodes);
    }

    fn on_coalesced(&mut self, e: &CoalescedEvent) {
        self.write_u8(TAG_COALESCED);
        self.write_id(e.container);
        self.write_id(e.target);
        self.write_side(e.side);
    }

    fn on_fired(&mut self, e: &AccEvent) {
        self.write_u8(TAG_FIRED);
        match e {
            AccEvent::Show {
                target,
                container,
                from_user_input,
            } => {
                self.write_u8(FIRED_SHOW);
                self.write_id(*target);
                self.write_id(*container);
                self.write_bool(*from_user_input);
            }
            AccEvent::Hide {
                target,
                container,
                from_user_input,
            } => {
                self.write_u8(FIRED_HIDE);
                self.write_id(*target);
                self.write_id(*container);
                self.write_bool(*from_user_input);
            }
            AccEvent::TextChange(change) => {
                self.write_u8(FIRED_TEXT_CHANGE);
                self.write_id(change.container);
                self.write_usize(change.start);
                self.write_bool(change.inserted);
                self.write_bool(change.from_user_input);
                self.write_str(&change.text);
            }
            AccEvent::MenuPopupEnd { target } => {
                self.write_u8(FIRED_MENU_POPUP_END);
                self.write_id(*target);
            }
            AccEvent::Reorder { container } => {
                self.write_u8(FIRED_REORDER);
                self.write_id(*container);
            }
        }
    }

    fn on_process(&mut self, s: &ProcessSummary) {
        self.write_u8(TAG_PROCESS);
        self.write_u32(s.nodes);
        self.write_u32(s.fired);
        self.write_u32(s.shutdowns);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`ScopeBeginEvent`].
    ScopeBegin {
        /// The recorded event.
        event: ScopeBeginEvent,
        /// Forest nodes pending when the scope opened.
        pending: u32,
    },
    /// A [`ScopeEndEvent`].
    ScopeEnd {
        /// The recorded event.
        event: ScopeEndEvent,
        /// Forest nodes pending when the scope finished.
        pending: u32,
    },
    /// A [`PlacementEvent`].
    Placement {
        /// The mutated container.
        container: AccessibleId,
        /// Raw index of the responsible forest node.
        node: u32,
        /// How the node was found or created.
        placement: Placement,
    },
    /// An [`IgnoredEvent`].
    Ignored(IgnoredEvent),
    /// A [`DiscardedEvent`].
    Discarded(DiscardedEvent),
    /// A [`CoalescedEvent`].
    Coalesced(CoalescedEvent),
    /// A delivered notification.
    Fired(AccEvent),
    /// A [`ProcessSummary`].
    Process(ProcessSummary),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_usize(&mut self) -> Option<usize> {
        usize::try_from(self.read_u64()?).ok()
    }

    fn read_option_usize(&mut self) -> Option<Option<usize>> {
        let present = self.read_u8()?;
        let val = self.read_usize()?;
        Some(if present != 0 { Some(val) } else { None })
    }

    fn read_id(&mut self) -> Option<AccessibleId> {
        let idx = self.read_u32()?;
        let generation = self.read_u32()?;
        Some(AccessibleId::new(idx, generation))
    }

    fn read_string(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        if self.remaining() < len {
            return None;
        }
        let text = core::str::from_utf8(&self.data[self.pos..self.pos + len]).ok()?;
        self.pos += len;
        Some(text.to_owned())
    }

    fn read_side(&mut self) -> Option<Adjacency> {
        Some(match self.read_u8()? {
            0 => Adjacency::After,
            _ => Adjacency::Before,
        })
    }

    fn decode_scope_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ScopeBegin {
            event: ScopeBeginEvent {
                parent: self.read_id()?,
                events_enabled: self.read_bool()?,
                nested: self.read_bool()?,
            },
            pending: self.read_u32()?,
        })
    }

    fn decode_scope_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ScopeEnd {
            event: ScopeEndEvent {
                parent: self.read_id()?,
                start_index: self.read_option_usize()?,
                renumbered: self.read_usize()?,
            },
            pending: self.read_u32()?,
        })
    }

    fn decode_placement(&mut self) -> Option<RecordedEvent> {
        let container = self.read_id()?;
        let node = self.read_u32()?;
        let placement = match self.read_u8()? {
            0 => Placement::Existing,
            1 => Placement::Appended,
            2 => Placement::Nested {
                under: self.read_id()?,
            },
            3 => Placement::Spliced {
                adopted: self.read_u32()?,
            },
            _ => return None,
        };
        Some(RecordedEvent::Placement {
            container,
            node,
            placement,
        })
    }

    fn decode_ignored(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Ignored(IgnoredEvent {
            container: self.read_id()?,
            shown: self.read_id()?,
        }))
    }

    fn decode_discarded(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Discarded(DiscardedEvent {
            container: self.read_id()?,
            cause: self.read_id()?,
            nodes: self.read_u32()?,
        }))
    }

    fn decode_coalesced(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Coalesced(CoalescedEvent {
            container: self.read_id()?,
            target: self.read_id()?,
            side: self.read_side()?,
        }))
    }

    fn decode_fired(&mut self) -> Option<RecordedEvent> {
        let event = match self.read_u8()? {
            FIRED_SHOW => AccEvent::Show {
                target: self.read_id()?,
                container: self.read_id()?,
                from_user_input: self.read_bool()?,
            },
            FIRED_HIDE => AccEvent::Hide {
                target: self.read_id()?,
                container: self.read_id()?,
                from_user_input: self.read_bool()?,
            },
            FIRED_TEXT_CHANGE => {
                let container = self.read_id()?;
                let start = self.read_usize()?;
                let inserted = self.read_bool()?;
                let from_user_input = self.read_bool()?;
                let text = self.read_string()?;
                AccEvent::TextChange(TextChange {
                    container,
                    start,
                    text,
                    inserted,
                    from_user_input,
                })
            }
            FIRED_MENU_POPUP_END => AccEvent::MenuPopupEnd {
                target: self.read_id()?,
            },
            FIRED_REORDER => AccEvent::Reorder {
                container: self.read_id()?,
            },
            _ => return None,
        };
        Some(RecordedEvent::Fired(event))
    }

    fn decode_process(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Process(ProcessSummary {
            nodes: self.read_u32()?,
            fired: self.read_u32()?,
            shutdowns: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_SCOPE_BEGIN => self.decode_scope_begin(),
            TAG_SCOPE_END => self.decode_scope_end(),
            TAG_PLACEMENT => self.decode_placement(),
            TAG_IGNORED => self.decode_ignored(),
            TAG_DISCARDED => self.decode_discarded(),
            TAG_COALESCED => self.decode_coalesced(),
            TAG_FIRED => self.decode_fired(),
            TAG_PROCESS => self.decode_process(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn acc(idx: u32) -> AccessibleId {
        AccessibleId::new(idx, 1)
    }

    #[test]
    fn scope_events_carry_pending_count() {
        let forest = EventForest::new();
        let mut rec = RecorderSink::new();
        rec.on_scope_begin(
            &ScopeBeginEvent {
                parent: acc(3),
                events_enabled: true,
                nested: false,
            },
            &forest,
        );
        rec.on_scope_end(
            &ScopeEndEvent {
                parent: acc(3),
                start_index: Some(2),
                renumbered: 4,
            },
            &forest,
        );

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::ScopeBegin { event, pending } => {
                assert_eq!(event.parent, acc(3));
                assert!(event.events_enabled);
                assert!(!event.nested);
                assert_eq!(*pending, 0);
            }
            other => panic!("expected ScopeBegin, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::ScopeEnd { event, .. } => {
                assert_eq!(event.start_index, Some(2));
                assert_eq!(event.renumbered, 4);
            }
            other => panic!("expected ScopeEnd, got {other:?}"),
        }
    }

    #[test]
    fn fired_text_change_keeps_its_text() {
        let mut rec = RecorderSink::new();
        let change = TextChange {
            container: acc(1),
            start: 7,
            text: String::from("h\u{e9}\u{FFFC}"),
            inserted: false,
            from_user_input: true,
        };
        rec.on_fired(&AccEvent::TextChange(change.clone()));
        rec.on_fired(&AccEvent::Reorder { container: acc(1) });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::Fired(AccEvent::TextChange(decoded)) => assert_eq!(decoded, &change),
            other => panic!("expected TextChange, got {other:?}"),
        }
        assert!(matches!(
            events[1],
            RecordedEvent::Fired(AccEvent::Reorder { container }) if container == acc(1)
        ));
    }

    #[test]
    fn process_summary_is_recorded() {
        let mut rec = RecorderSink::new();
        rec.on_discarded(&DiscardedEvent {
            container: acc(5),
            cause: acc(4),
            nodes: 2,
        });
        rec.on_process(&ProcessSummary {
            nodes: 3,
            fired: 9,
            shutdowns: 1,
        });

        let events: Vec<_> = decode(rec.into_bytes().as_slice()).collect();
        assert!(matches!(
            events[0],
            RecordedEvent::Discarded(DiscardedEvent { nodes: 2, .. })
        ));
        match &events[1] {
            RecordedEvent::Process(s) => {
                assert_eq!((s.nodes, s.fired, s.shutdowns), (3, 9, 1));
            }
            other => panic!("expected Process, got {other:?}"),
        }
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_ignored(&IgnoredEvent {
            container: acc(2),
            shown: acc(1),
        });
        let bytes = rec.as_bytes();
        assert_eq!(decode(&bytes[..bytes.len() - 1]).count(), 0);
        assert_eq!(decode(bytes).count(), 1);
    }
}
