// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree configuration.

use kurbo::Size;

/// Configuration for a [`LayoutTree`](crate::layout::LayoutTree).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Client size of the host window. The root node is measured and arranged
    /// against it, and it is the outermost visible region for every viewport.
    pub window_size: Size,
    /// Optional cap on measure/arrange/stabilize iterations within one pass.
    ///
    /// `None` means a handler that invalidates layout on every notification
    /// keeps the pass running forever. With `Some(n)`, a pass that has not
    /// stabilized after `n` iterations fails with
    /// [`LayoutError::IterationLimit`](crate::error::LayoutError::IterationLimit).
    pub max_iterations: Option<u32>,
}

impl LayoutConfig {
    /// Window size used by [`Default`].
    pub const DEFAULT_WINDOW_SIZE: Size = Size::new(1200.0, 900.0);

    /// Creates a configuration for a window of the given client size, with no
    /// iteration limit.
    #[must_use]
    pub const fn new(window_size: Size) -> Self {
        Self {
            window_size,
            max_iterations: None,
        }
    }

    /// Returns this configuration with the given iteration limit.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW_SIZE)
    }
}
