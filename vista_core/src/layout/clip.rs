// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip shapes that bound what a node's descendants can see.

use kurbo::Rect;

use crate::viewport::ViewportClip;

/// A shape used to clip a node's descendants.
///
/// The shape is expressed in the node's content space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipShape {
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A rectangle with rounded corners. Viewports are clipped to its
    /// bounding rectangle.
    RoundedRect(kurbo::RoundedRect),
}

impl ClipShape {
    /// Returns the axis-aligned bounds of the shape.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rect(rect) => *rect,
            Self::RoundedRect(rounded) => rounded.rect(),
        }
    }
}

impl ViewportClip for ClipShape {
    fn clip_rect(&self) -> Option<Rect> {
        Some(self.bounds())
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{RoundedRect, Vec2};

    use super::*;

    #[test]
    fn rounded_rect_clips_to_bounds() {
        let shape = ClipShape::RoundedRect(RoundedRect::new(10.0, 10.0, 50.0, 40.0, 6.0));
        assert_eq!(shape.clip_rect(), Some(Rect::new(10.0, 10.0, 50.0, 40.0)));
        assert_eq!(shape.content_offset(), Vec2::ZERO);
    }
}
