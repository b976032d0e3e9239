// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use mapweave_core::instance::InstanceId;
use mapweave_core::trace::{
    AttachedEvent, CommittedEvent, DetachedEvent, InstanceCreatedEvent, RemovedEvent,
    ReorderedEvent, SizeWarningEvent, TraceSink, UpdateCommittedEvent, UpdateOutcome,
    UpdatePreparedEvent,
};

use crate::recorder::RecordedId;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn id(instance: InstanceId) -> RecordedId {
    RecordedId::from(instance)
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_instance_created(&mut self, e: &InstanceCreatedEvent) {
        let _ = writeln!(
            self.writer,
            "[create] {} container={} kind={:?} category={}",
            id(e.instance),
            e.container.0,
            e.kind,
            e.category,
        );
    }

    fn on_attached(&mut self, e: &AttachedEvent) {
        let _ = writeln!(
            self.writer,
            "[attach] {} -> {} as {:?}",
            id(e.child),
            id(e.parent),
            e.attachment,
        );
    }

    fn on_detached(&mut self, e: &DetachedEvent) {
        match e.parent {
            Some(parent) => {
                let _ = writeln!(self.writer, "[detach] {} from {}", id(e.child), id(parent));
            }
            None => {
                let _ = writeln!(self.writer, "[detach] {} from container", id(e.child));
            }
        }
    }

    fn on_committed(&mut self, e: &CommittedEvent) {
        let _ = writeln!(self.writer, "[commit] {}", id(e.instance));
    }

    fn on_update_prepared(&mut self, e: &UpdatePreparedEvent) {
        let _ = match e.outcome {
            UpdateOutcome::SkippedImmutable => {
                writeln!(self.writer, "[prepare] {} immutable", id(e.instance))
            }
            UpdateOutcome::Unchanged => {
                writeln!(self.writer, "[prepare] {} unchanged", id(e.instance))
            }
            UpdateOutcome::Changed(n) => {
                writeln!(self.writer, "[prepare] {} changed={n}", id(e.instance))
            }
        };
    }

    fn on_update_committed(&mut self, e: &UpdateCommittedEvent) {
        let _ = writeln!(
            self.writer,
            "[update] {} {:?}",
            id(e.instance),
            e.action,
        );
    }

    fn on_reordered(&mut self, e: &ReorderedEvent) {
        let moved = if e.moved { "moved" } else { "kept" };
        let _ = match e.before {
            Some(before) => writeln!(
                self.writer,
                "[order] {} before {} {moved}",
                id(e.instance),
                id(before),
            ),
            None => writeln!(self.writer, "[order] {} in place {moved}", id(e.instance)),
        };
    }

    fn on_removed(&mut self, e: &RemovedEvent) {
        let _ = writeln!(
            self.writer,
            "[remove] {} released={}",
            id(e.instance),
            e.released,
        );
    }

    fn on_size_warning(&mut self, e: &SizeWarningEvent) {
        let _ = writeln!(
            self.writer,
            "[size] container={} parent is {}x{}px, map may not render",
            e.container.0, e.width, e.height,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapweave_core::instance::ContainerId;

    #[test]
    fn pretty_print_size_warning() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_size_warning(&SizeWarningEvent {
            container: ContainerId(7),
            width: 320.0,
            height: 0.0,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.starts_with("[size]"), "got: {output}");
        assert!(output.contains("container=7"), "got: {output}");
        assert!(output.contains("320x0px"), "got: {output}");
    }
}
