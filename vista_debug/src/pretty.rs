// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use kurbo::Rect;
use vista_core::trace::{
    FailureKind, LayoutUpdatedEvent, PassBeginEvent, PassFailedEvent, PhaseBeginEvent,
    PhaseEndEvent, TraceSink, ViewportChangedEvent,
};

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

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn fmt_rect(r: Rect) -> String {
    format!("({}, {}, {}x{})", r.x0, r.y0, r.width(), r.height())
}

fn failure_name(reason: FailureKind) -> &'static str {
    match reason {
        FailureKind::ViewportHandler => "viewport handler failed",
        FailureKind::LayoutUpdatedHandler => "layout-updated handler failed",
        FailureKind::IterationLimit => "iteration limit reached",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(self.writer, "[pass] #{} begin", e.pass);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] pass={} iter={} {}",
            e.pass,
            e.iteration,
            e.phase.name(),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] pass={} iter={} {} work={}",
            e.pass,
            e.iteration,
            e.phase.name(),
            e.work,
        );
    }

    fn on_viewport_changed(&mut self, e: &ViewportChangedEvent) {
        let _ = writeln!(
            self.writer,
            "[viewport] pass={} node={} {}",
            e.pass,
            e.node,
            fmt_rect(e.viewport),
        );
    }

    fn on_layout_updated(&mut self, e: &LayoutUpdatedEvent) {
        let _ = writeln!(
            self.writer,
            "[updated] pass={} iterations={} measured={} arranged={} notified={}",
            e.pass, e.iterations, e.measured, e.arranged, e.notified,
        );
    }

    fn on_pass_failed(&mut self, e: &PassFailedEvent) {
        let _ = writeln!(
            self.writer,
            "[FAILED] pass={} after {} iteration(s): {}",
            e.pass,
            e.iterations,
            failure_name(e.reason),
        );
    }
}
