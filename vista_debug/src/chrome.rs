// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads entries recorded by a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes
//! [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};
use std::time::Duration;

use serde_json::{Value, json};

use crate::recorder::{Entry, RecordedEvent};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Phases become duration slices; everything else is an instant event.
pub fn export(entries: &[Entry], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::with_capacity(entries.len());

    for entry in entries {
        let ts = micros(entry.at);
        let value = match entry.event {
            RecordedEvent::PassBegin(e) => json!({
                "ph": "i",
                "name": "PassBegin",
                "cat": "Pass",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "t",
                "args": { "pass": e.pass }
            }),
            RecordedEvent::PhaseBegin(e) => json!({
                "ph": "B",
                "name": e.phase.name(),
                "cat": "Pass",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "args": { "pass": e.pass, "iteration": e.iteration }
            }),
            RecordedEvent::PhaseEnd(e) => json!({
                "ph": "E",
                "name": e.phase.name(),
                "cat": "Pass",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "args": { "work": e.work }
            }),
            RecordedEvent::ViewportChanged(e) => json!({
                "ph": "i",
                "name": "EffectiveViewportChanged",
                "cat": "Viewport",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "t",
                "args": {
                    "pass": e.pass,
                    "node": e.node.index(),
                    "generation": e.node.generation(),
                    "viewport": [e.viewport.x0, e.viewport.y0, e.viewport.x1, e.viewport.y1],
                }
            }),
            RecordedEvent::LayoutUpdated(e) => json!({
                "ph": "i",
                "name": "LayoutUpdated",
                "cat": "Pass",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "g",
                "args": {
                    "pass": e.pass,
                    "iterations": e.iterations,
                    "measured": e.measured,
                    "arranged": e.arranged,
                    "notified": e.notified,
                }
            }),
            RecordedEvent::PassFailed(e) => json!({
                "ph": "i",
                "name": "PassFailed",
                "cat": "Pass",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "g",
                "args": {
                    "pass": e.pass,
                    "iterations": e.iterations,
                    "reason": format!("{:?}", e.reason),
                }
            }),
        };
        events.push(value);
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn micros(at: Duration) -> f64 {
    at.as_secs_f64() * 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use vista_core::trace::{
        FailureKind, PassBeginEvent, PassFailedEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
        TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_pass_begin(&PassBeginEvent { pass: 1 });
        rec.on_phase_begin(&PhaseBeginEvent {
            pass: 1,
            iteration: 1,
            phase: PhaseKind::Arrange,
        });
        rec.on_phase_end(&PhaseEndEvent {
            pass: 1,
            iteration: 1,
            phase: PhaseKind::Arrange,
            work: 4,
        });
        rec.on_pass_failed(&PassFailedEvent {
            pass: 1,
            iterations: 1,
            reason: FailureKind::ViewportHandler,
        });

        let mut out = Vec::new();
        export(rec.entries(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "PassBegin");
        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "arrange");
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["args"]["work"], 4);
        assert_eq!(parsed[3]["args"]["reason"], "ViewportHandler");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
