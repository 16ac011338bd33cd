// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and appends every event, stamped
//! with the time elapsed since the recorder was created, to a log that can be
//! inspected directly or handed to [`chrome::export`](crate::chrome::export).

use std::time::{Duration, Instant};

use vista_core::layout::NodeId;
use vista_core::trace::{
    LayoutUpdatedEvent, PassBeginEvent, PassFailedEvent, PhaseBeginEvent, PhaseEndEvent,
    TraceSink, ViewportChangedEvent,
};

/// A recorded trace event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`ViewportChangedEvent`].
    ViewportChanged(ViewportChangedEvent),
    /// A [`LayoutUpdatedEvent`].
    LayoutUpdated(LayoutUpdatedEvent),
    /// A [`PassFailedEvent`].
    PassFailed(PassFailedEvent),
}

impl RecordedEvent {
    /// The pass this event belongs to.
    #[must_use]
    pub fn pass(&self) -> u64 {
        match self {
            Self::PassBegin(e) => e.pass,
            Self::PhaseBegin(e) => e.pass,
            Self::PhaseEnd(e) => e.pass,
            Self::ViewportChanged(e) => e.pass,
            Self::LayoutUpdated(e) => e.pass,
            Self::PassFailed(e) => e.pass,
        }
    }
}

/// A [`RecordedEvent`] with its capture time.
#[derive(Clone, Copy, Debug)]
pub struct Entry {
    /// Time since the recorder was created.
    pub at: Duration,
    /// The event.
    pub event: RecordedEvent,
}

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Debug)]
pub struct RecorderSink {
    start: Instant,
    entries: Vec<Entry>,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder. Timestamps are relative to now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            entries: Vec::new(),
        }
    }

    /// Returns the recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterates over the recorded events without timestamps.
    pub fn events(&self) -> impl Iterator<Item = &RecordedEvent> + '_ {
        self.entries.iter().map(|e| &e.event)
    }

    /// Viewports delivered to `node`, in delivery order.
    pub fn viewports_for(&self, node: NodeId) -> impl Iterator<Item = kurbo::Rect> + '_ {
        self.events().filter_map(move |e| match e {
            RecordedEvent::ViewportChanged(v) if v.node == node => Some(v.viewport),
            _ => None,
        })
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Consumes the recorder and returns its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    fn push(&mut self, event: RecordedEvent) {
        self.entries.push(Entry {
            at: self.start.elapsed(),
            event,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.push(RecordedEvent::PassBegin(*e));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.push(RecordedEvent::PhaseBegin(*e));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.push(RecordedEvent::PhaseEnd(*e));
    }

    fn on_viewport_changed(&mut self, e: &ViewportChangedEvent) {
        self.push(RecordedEvent::ViewportChanged(*e));
    }

    fn on_layout_updated(&mut self, e: &LayoutUpdatedEvent) {
        self.push(RecordedEvent::LayoutUpdated(*e));
    }

    fn on_pass_failed(&mut self, e: &PassFailedEvent) {
        self.push(RecordedEvent::PassFailed(*e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use vista_core::layout::{Layout, LayoutTree};
    use vista_core::trace::{PhaseKind, Tracer};

    #[test]
    fn records_a_pass_in_order() {
        let mut tree = LayoutTree::default();
        let canvas = tree.create_node();
        tree.set_layout(canvas, Layout::new().with_size(52.0, 52.0));
        tree.on_effective_viewport_changed(canvas, |_| Ok(()));
        tree.set_content(tree.root(), Some(canvas)).unwrap();

        let mut rec = RecorderSink::new();
        tree.update_layout_traced(&mut Tracer::new(&mut rec)).unwrap();

        let events: Vec<_> = rec.events().copied().collect();
        assert!(matches!(events[0], RecordedEvent::PassBegin(PassBeginEvent { pass: 1 })));
        assert!(matches!(
            events[1],
            RecordedEvent::PhaseBegin(PhaseBeginEvent { phase: PhaseKind::Measure, .. })
        ));
        assert!(matches!(events.last(), Some(RecordedEvent::LayoutUpdated(_))));
        assert!(events.iter().all(|e| e.pass() == 1));

        let delivered: Vec<_> = rec.viewports_for(canvas).collect();
        assert_eq!(delivered, [Rect::new(-574.0, -424.0, 626.0, 476.0)]);
    }

    #[test]
    fn timestamps_never_decrease() {
        let mut rec = RecorderSink::new();
        for pass in 1..=4 {
            rec.on_pass_begin(&PassBeginEvent { pass });
        }
        let at: Vec<_> = rec.entries().iter().map(|e| e.at).collect();
        assert!(at.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn clear_discards_entries() {
        let mut rec = RecorderSink::default();
        rec.on_pass_begin(&PassBeginEvent { pass: 1 });
        rec.clear();
        assert!(rec.entries().is_empty());
        assert!(rec.into_entries().is_empty());
    }
}
