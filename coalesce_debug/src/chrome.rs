// Copyright 2026 the Coalesce Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Recordings carry no clock, so each event's position in the recording is
//! used as its timestamp in microseconds. Scopes become begin/end slices,
//! everything else is an instant event.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use coalesce_core::event::AccEvent;
use coalesce_core::id::AccessibleId;
use coalesce_core::trace::Placement;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in decode(bytes).enumerate() {
        match recorded {
            RecordedEvent::ScopeBegin { event, pending } => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("scope {}", id(event.parent)),
                    "cat": "Scope",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "events_enabled": event.events_enabled,
                        "nested": event.nested,
                        "pending": pending,
                    }
                }));
            }
            RecordedEvent::ScopeEnd { event, pending } => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("scope {}", id(event.parent)),
                    "cat": "Scope",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "start_index": event.start_index,
                        "renumbered": event.renumbered,
                        "pending": pending,
                    }
                }));
            }
            RecordedEvent::Placement {
                container,
                node,
                placement,
            } => {
                let how = match placement {
                    Placement::Existing => "existing".to_owned(),
                    Placement::Appended => "appended".to_owned(),
                    Placement::Nested { under } => format!("nested under {}", id(under)),
                    Placement::Spliced { adopted } => format!("spliced over {adopted}"),
                };
                events.push(instant("Placement", "Forest", ts, json!({
                    "container": id(container),
                    "node": node,
                    "placement": how,
                })));
            }
            RecordedEvent::Ignored(e) => {
                events.push(instant("Ignored", "Forest", ts, json!({
                    "container": id(e.container),
                    "shown": id(e.shown),
                })));
            }
            RecordedEvent::Discarded(e) => {
                events.push(instant("Discarded", "Forest", ts, json!({
                    "container": id(e.container),
                    "cause": id(e.cause),
                    "nodes": e.nodes,
                })));
            }
            RecordedEvent::Coalesced(e) => {
                events.push(instant("Coalesced", "Text", ts, json!({
                    "container": id(e.container),
                    "target": id(e.target),
                    "side": format!("{:?}", e.side),
                })));
            }
            RecordedEvent::Fired(e) => {
                let (name, args) = fired(&e);
                events.push(instant(name, "Fired", ts, args));
            }
            RecordedEvent::Process(s) => {
                events.push(instant("Process", "Summary", ts, json!({
                    "nodes": s.nodes,
                    "fired": s.fired,
                    "shutdowns": s.shutdowns,
                })));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn instant(name: &str, cat: &str, ts: usize, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

fn fired(e: &AccEvent) -> (&'static str, Value) {
    match e {
        AccEvent::Show {
            target,
            container,
            from_user_input,
        } => (
            "Show",
            json!({
                "target": id(*target),
                "container": id(*container),
                "from_user_input": from_user_input,
            }),
        ),
        AccEvent::Hide {
            target,
            container,
            from_user_input,
        } => (
            "Hide",
            json!({
                "target": id(*target),
                "container": id(*container),
                "from_user_input": from_user_input,
            }),
        ),
        AccEvent::TextChange(change) => (
            if change.inserted {
                "TextInserted"
            } else {
                "TextRemoved"
            },
            json!({
                "container": id(change.container),
                "start": change.start,
                "text": change.text,
                "from_user_input": change.from_user_input,
            }),
        ),
        AccEvent::MenuPopupEnd { target } => ("MenuPopupEnd", json!({ "target": id(*target) })),
        AccEvent::Reorder { container } => ("Reorder", json!({ "container": id(*container) })),
    }
}

fn id(id: AccessibleId) -> String {
    format!("{}@{}", id.index(), id.generation())
}
