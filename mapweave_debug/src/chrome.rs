// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Recordings carry no timestamps; each event is placed at its ordinal
//! position, one microsecond apart, so the viewer shows the sequence.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of instant events, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Events that name a container are placed on that container's process
/// row; the rest go to row 0.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in decode(bytes).enumerate() {
        let (pid, cat, args) = match &recorded {
            RecordedEvent::InstanceCreated {
                instance,
                container,
                category,
                kind,
            } => (
                *container,
                "Factory",
                json!({
                    "instance": instance.to_string(),
                    "category": category.name(),
                    "kind": format!("{kind:?}"),
                }),
            ),
            RecordedEvent::Attached {
                parent,
                child,
                attachment,
            } => (
                0,
                "Tree",
                json!({
                    "parent": parent.to_string(),
                    "child": child.to_string(),
                    "attachment": format!("{attachment:?}"),
                }),
            ),
            RecordedEvent::Detached { parent, child } => (
                0,
                "Tree",
                json!({
                    "parent": parent.map(|p| p.to_string()),
                    "child": child.to_string(),
                }),
            ),
            RecordedEvent::Committed { instance } => (
                0,
                "Lifecycle",
                json!({ "instance": instance.to_string() }),
            ),
            RecordedEvent::UpdatePrepared { instance, outcome } => (
                0,
                "Update",
                json!({
                    "instance": instance.to_string(),
                    "outcome": format!("{outcome:?}"),
                }),
            ),
            RecordedEvent::UpdateCommitted { instance, action } => (
                0,
                "Update",
                json!({
                    "instance": instance.to_string(),
                    "action": format!("{action:?}"),
                }),
            ),
            RecordedEvent::Reordered {
                instance,
                before,
                moved,
            } => (
                0,
                "Tree",
                json!({
                    "instance": instance.to_string(),
                    "before": before.map(|b| b.to_string()),
                    "moved": moved,
                }),
            ),
            RecordedEvent::Removed { instance, released } => (
                0,
                "Lifecycle",
                json!({
                    "instance": instance.to_string(),
                    "released": released,
                }),
            ),
            RecordedEvent::SizeWarning {
                container,
                width,
                height,
            } => (
                *container,
                "Sizing",
                json!({
                    "width": width,
                    "height": height,
                }),
            ),
        };
        events.push(json!({
            "ph": "i",
            "name": recorded.name(),
            "cat": cat,
            "ts": ts,
            "pid": pid,
            "tid": 0,
            "s": "p",
            "args": args,
        }));
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use mapweave_core::instance::ContainerId;
    use mapweave_core::trace::{SizeWarningEvent, TraceSink};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_size_warning(&SizeWarningEvent {
            container: ContainerId(2),
            width: 300.0,
            height: 0.0,
        });
        rec.on_size_warning(&SizeWarningEvent {
            container: ContainerId(3),
            width: 0.0,
            height: 200.0,
        });

        let mut out = Vec::new();
        export(&rec.to_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        // Should parse as a JSON array.
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 2);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "SizeWarning");
        assert_eq!(parsed[0]["pid"], 2);
        assert_eq!(parsed[0]["args"]["width"], 300.0);

        // Ordinal timestamps.
        assert_eq!(parsed[0]["ts"], 0);
        assert_eq!(parsed[1]["ts"], 1);
        assert_eq!(parsed[1]["pid"], 3);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
