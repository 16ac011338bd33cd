// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node layout properties.

use kurbo::Insets;

/// Placement of a node inside the slot its parent gives it, per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Fill the slot. With an explicit size on the axis, center instead.
    #[default]
    Stretch,
    /// Align to the leading edge.
    Start,
    /// Center in the slot.
    Center,
    /// Align to the trailing edge.
    End,
}

/// Layout properties of a node.
///
/// Only the primitives needed to position overlapping children are
/// supported: an optional explicit size, a margin, and alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Layout {
    /// Explicit width, replacing the measured width.
    pub width: Option<f64>,
    /// Explicit height, replacing the measured height.
    pub height: Option<f64>,
    /// Space reserved around the node inside its slot.
    pub margin: Insets,
    /// Horizontal placement in the slot.
    pub horizontal: Alignment,
    /// Vertical placement in the slot.
    pub vertical: Alignment,
}

impl Layout {
    /// Default layout: no explicit size, no margin, stretched on both axes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            width: None,
            height: None,
            margin: Insets::ZERO,
            horizontal: Alignment::Stretch,
            vertical: Alignment::Stretch,
        }
    }

    /// Returns this layout with an explicit size.
    #[must_use]
    pub const fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Returns this layout with the given margin.
    #[must_use]
    pub const fn with_margin(mut self, margin: Insets) -> Self {
        self.margin = margin;
        self
    }

    /// Returns this layout with the given alignment on both axes.
    #[must_use]
    pub const fn with_alignment(mut self, horizontal: Alignment, vertical: Alignment) -> Self {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self
    }
}
