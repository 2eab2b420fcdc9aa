// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). With
//! [`with_forest_dumps`](PrettyPrintSink::with_forest_dumps) it also dumps the
//! pending forest when a scope opens and when it finishes.

use std::io::Write;

use coalesce_core::event::AccEvent;
use coalesce_core::forest::EventForest;
use coalesce_core::trace::{
    CoalescedEvent, DiscardedEvent, IgnoredEvent, Placement, PlacementEvent, ProcessSummary,
    ScopeBeginEvent, ScopeEndEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    forest_dumps: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("forest_dumps", &self.forest_dumps)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            forest_dumps: false,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            forest_dumps: false,
        }
    }

    /// Also dumps the pending forest around every scope.
    #[must_use]
    pub fn with_forest_dumps(mut self, enabled: bool) -> Self {
        self.forest_dumps = enabled;
        self
    }

    /// Consumes the sink and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn dump(&mut self, label: &str, forest: &EventForest) {
        if !self.forest_dumps {
            return;
        }
        let _ = writeln!(self.writer, "  -- forest {label} --");
        for line in forest.dump().to_string().lines() {
            let _ = writeln!(self.writer, "  | {line}");
        }
    }
}

fn flag(set: bool) -> &'static str {
    if set { "yes" } else { "no" }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_scope_begin(&mut self, e: &ScopeBeginEvent, forest: &EventForest) {
        let _ = writeln!(
            self.writer,
            "[scope:begin] parent={:?} events={} nested={}",
            e.parent,
            flag(e.events_enabled),
            flag(e.nested),
        );
        self.dump("before", forest);
    }

    fn on_scope_end(&mut self, e: &ScopeEndEvent, forest: &EventForest) {
        let start = e
            .start_index
            .map_or_else(|| "-".to_owned(), |start| start.to_string());
        let _ = writeln!(
            self.writer,
            "[scope:end] parent={:?} start={start} renumbered={}",
            e.parent, e.renumbered,
        );
        self.dump("after", forest);
    }

    fn on_placement(&mut self, e: &PlacementEvent) {
        let how = match e.placement {
            Placement::Existing => "existing".to_owned(),
            Placement::Appended => "appended".to_owned(),
            Placement::Nested { under } => format!("nested under {under:?}"),
            Placement::Spliced { adopted } => format!("spliced, adopted {adopted}"),
        };
        let _ = writeln!(
            self.writer,
            "[place] container={:?} node={} {how}",
            e.container,
            e.node.index(),
        );
    }

    fn on_ignored(&mut self, e: &IgnoredEvent) {
        let _ = writeln!(
            self.writer,
            "[ignore] container={:?} covered by shown {:?}",
            e.container, e.shown,
        );
    }

    fn on_discarded(&mut self, e: &DiscardedEvent) {
        let _ = writeln!(
            self.writer,
            "[discard] container={:?} nodes={} cause={:?}",
            e.container, e.nodes, e.cause,
        );
    }

    fn on_coalesced(&mut self, e: &CoalescedEvent) {
        let _ = writeln!(
            self.writer,
            "[coalesce] container={:?} target={:?} side={:?}",
            e.container, e.target, e.side,
        );
    }

    fn on_fired(&mut self, e: &AccEvent) {
        let _ = match e {
            AccEvent::Show {
                target, container, ..
            } => writeln!(self.writer, "[fire] show {target:?} in {container:?}"),
            AccEvent::Hide {
                target, container, ..
            } => writeln!(self.writer, "[fire] hide {target:?} in {container:?}"),
            AccEvent::TextChange(change) => writeln!(
                self.writer,
                "[fire] text {} {:?} at {} in {:?}",
                if change.inserted { "+" } else { "-" },
                change.text,
                change.start,
                change.container,
            ),
            AccEvent::MenuPopupEnd { target } => {
                writeln!(self.writer, "[fire] menu-popup-end {target:?}")
            }
            AccEvent::Reorder { container } => {
                writeln!(self.writer, "[fire] reorder {container:?}")
            }
        };
    }

    fn on_process(&mut self, s: &ProcessSummary) {
        let _ = writeln!(
            self.writer,
            "[process] nodes={} fired={} shutdowns={}",
            s.nodes, s.fired, s.shutdowns,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coalesce_core::id::AccessibleId;

    #[test]
    fn pretty_print_fired() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_fired(&AccEvent::Reorder {
            container: AccessibleId::new(2, 0),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("[fire] reorder"), "got: {output}");
        assert!(output.contains("Acc(2@gen0)"), "got: {output}");
    }

    #[test]
    fn forest_dump_only_when_enabled() {
        let forest = EventForest::new();
        let begin = ScopeBeginEvent {
            parent: AccessibleId::new(1, 0),
            events_enabled: true,
            nested: false,
        };

        let mut quiet = PrettyPrintSink::with_writer(Vec::<u8>::new());
        quiet.on_scope_begin(&begin, &forest);
        let output = String::from_utf8(quiet.into_writer()).unwrap();
        assert!(!output.contains("forest before"), "got: {output}");

        let mut verbose = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_forest_dumps(true);
        verbose.on_scope_begin(&begin, &forest);
        let output = String::from_utf8(verbose.into_writer()).unwrap();
        assert!(output.contains("[scope:begin]"), "got: {output}");
        assert!(output.contains("  | (empty)"), "got: {output}");
    }
}
