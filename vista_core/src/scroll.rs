// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll container state.

use kurbo::{Rect, Size, Vec2};

use crate::viewport::ViewportClip;

/// Offset and bounds of a scroll container.
///
/// The offset is always clamped per axis to `[0, max(0, extent - viewport)]`.
/// A positive offset moves the visible window toward larger content
/// coordinates: with offset `(0, 10)` the content sees a viewport whose
/// origin is `(0, 10)`.
///
/// Extent and viewport size are written by the layout pass when the owning
/// node is arranged. Before the first arrange both are zero, so any requested
/// offset clamps to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollState {
    offset: Vec2,
    extent: Size,
    viewport: Size,
}

impl ScrollState {
    /// Creates a scroll state with zero offset and empty bounds.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            offset: Vec2::ZERO,
            extent: Size::ZERO,
            viewport: Size::ZERO,
        }
    }

    /// Current (clamped) offset.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Size of the scrollable content.
    #[must_use]
    pub const fn extent(&self) -> Size {
        self.extent
    }

    /// Size of the visible window.
    #[must_use]
    pub const fn viewport_size(&self) -> Size {
        self.viewport
    }

    /// Largest offset reachable on each axis.
    #[must_use]
    pub fn max_offset(&self) -> Vec2 {
        Vec2::new(
            (self.extent.width - self.viewport.width).max(0.0),
            (self.extent.height - self.viewport.height).max(0.0),
        )
    }

    /// Scrolls to the given offset. `None` leaves that axis unchanged;
    /// non-finite values are ignored.
    ///
    /// Returns whether the offset changed.
    pub fn scroll_to(&mut self, x: Option<f64>, y: Option<f64>) -> bool {
        let mut target = self.offset;
        if let Some(x) = x.filter(|x| x.is_finite()) {
            target.x = x;
        }
        if let Some(y) = y.filter(|y| y.is_finite()) {
            target.y = y;
        }
        self.set_offset(target)
    }

    /// Scrolls by a relative amount. Returns whether the offset changed.
    pub fn scroll_by(&mut self, delta: Vec2) -> bool {
        if !(delta.x.is_finite() && delta.y.is_finite()) {
            return false;
        }
        self.set_offset(self.offset + delta)
    }

    /// Updates extent and viewport size, re-clamping the offset.
    ///
    /// Returns whether the offset changed.
    pub fn set_bounds(&mut self, extent: Size, viewport: Size) -> bool {
        self.extent = extent;
        self.viewport = viewport;
        self.set_offset(self.offset)
    }

    fn set_offset(&mut self, target: Vec2) -> bool {
        let max = self.max_offset();
        let clamped = Vec2::new(target.x.clamp(0.0, max.x), target.y.clamp(0.0, max.y));
        let changed = clamped != self.offset;
        self.offset = clamped;
        changed
    }
}

impl ViewportClip for ScrollState {
    fn clip_rect(&self) -> Option<Rect> {
        Some(Rect::from_origin_size((0.0, 0.0), self.viewport))
    }

    fn content_offset(&self) -> Vec2 {
        self.offset
    }
}
