// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for layout passes.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! pass driver calls at each stage. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Pass the tracer to
//! [`LayoutTree::update_layout_traced`](crate::layout::LayoutTree::update_layout_traced).
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use kurbo::Rect;

use crate::layout::NodeId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a layout pass is being reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Desired sizes of invalidated nodes.
    Measure,
    /// Final rectangles of invalidated nodes.
    Arrange,
    /// Viewport recomputation and `EffectiveViewportChanged` delivery.
    Stabilize,
}

impl PhaseKind {
    /// Short lowercase name, for log lines and trace files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Measure => "measure",
            Self::Arrange => "arrange",
            Self::Stabilize => "stabilize",
        }
    }
}

/// Why a pass failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// An `EffectiveViewportChanged` handler returned an error.
    ViewportHandler,
    /// A `LayoutUpdated` handler returned an error.
    LayoutUpdatedHandler,
    /// The configured iteration limit was reached.
    IterationLimit,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a pass starts.
#[derive(Clone, Copy, Debug)]
pub struct PassBeginEvent {
    /// Pass counter.
    pub pass: u64,
}

/// Marks the beginning of a pass phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Pass counter.
    pub pass: u64,
    /// Iteration within the pass, starting at 1.
    pub iteration: u32,
    /// Which phase is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a pass phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Pass counter.
    pub pass: u64,
    /// Iteration within the pass, starting at 1.
    pub iteration: u32,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Nodes measured, arranged, or recomputed during the phase.
    pub work: usize,
}

/// Emitted for each node whose subscribers are about to be notified.
#[derive(Clone, Copy, Debug)]
pub struct ViewportChangedEvent {
    /// Pass counter.
    pub pass: u64,
    /// Node whose viewport changed.
    pub node: NodeId,
    /// New effective viewport in the node's local space.
    pub viewport: Rect,
}

/// Emitted when a pass reaches its fixed point, before `LayoutUpdated`
/// handlers run.
#[derive(Clone, Copy, Debug)]
pub struct LayoutUpdatedEvent {
    /// Pass counter.
    pub pass: u64,
    /// Iterations the pass needed.
    pub iterations: u32,
    /// Total measure calls.
    pub measured: usize,
    /// Total arrange calls.
    pub arranged: usize,
    /// Nodes whose subscribers were notified.
    pub notified: usize,
}

/// Emitted when a pass ends with an error.
#[derive(Clone, Copy, Debug)]
pub struct PassFailedEvent {
    /// Pass counter.
    pub pass: u64,
    /// Iterations run before the failure.
    pub iterations: u32,
    /// Failure category.
    pub reason: FailureKind,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from layout passes.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a pass starts.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called for each node whose viewport change is delivered.
    fn on_viewport_changed(&mut self, e: &ViewportChangedEvent) {
        _ = e;
    }

    /// Called when a pass completes.
    fn on_layout_updated(&mut self, e: &LayoutUpdatedEvent) {
        _ = e;
    }

    /// Called when a pass fails.
    fn on_pass_failed(&mut self, e: &PassFailedEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ViewportChangedEvent`].
    #[inline]
    pub fn viewport_changed(&mut self, e: &ViewportChangedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_viewport_changed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LayoutUpdatedEvent`].
    #[inline]
    pub fn layout_updated(&mut self, e: &LayoutUpdatedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_layout_updated(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassFailedEvent`].
    #[inline]
    pub fn pass_failed(&mut self, e: &PassFailedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_failed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
