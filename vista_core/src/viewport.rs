// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effective-viewport math.
//!
//! A node's *effective viewport* is the region of its local coordinate space
//! that is visible through every ancestor. It is computed by walking from the
//! root window down to the node. Each step goes from a node's *own* viewport
//! to the viewport its children see:
//!
//! 1. **Content space**: the own viewport is mapped through the inverse of
//!    the node's render transform ([`to_content_space`]). A node's transform
//!    therefore moves what its children see, never what it sees itself.
//! 2. **Clipping**: every [`ViewportClip`] capability the node carries
//!    intersects the viewport and adds its content offset ([`apply_clip`]).
//!    Scroll containers clip to their window and shift by their offset;
//!    explicit clip shapes only clip.
//! 3. **Child space**: the child's arranged origin is subtracted
//!    ([`child_space_viewport`]).
//!
//! Results are ordinary [`Rect`]s that may extend past the node's bounds in
//! every direction. Nested clips compose outermost to innermost.

use kurbo::{Affine, Point, Rect, Vec2};

/// A container capability that restricts or offsets the viewport seen by the
/// container's descendants.
///
/// Implemented by [`ClipShape`](crate::layout::ClipShape) and
/// [`ScrollState`](crate::scroll::ScrollState). A node may carry several
/// capabilities; they are applied in a fixed order, clip shape first.
pub trait ViewportClip {
    /// Visible window in the node's content space, or `None` if this
    /// capability does not clip.
    fn clip_rect(&self) -> Option<Rect>;

    /// Offset added to the viewport when mapping into descendant coordinates.
    fn content_offset(&self) -> Vec2 {
        Vec2::ZERO
    }
}

/// Maps a node's own viewport into its content space through the inverse of
/// its render transform.
#[must_use]
pub fn to_content_space(own: Rect, transform: Affine) -> Rect {
    if transform == Affine::IDENTITY {
        return own;
    }
    transform.inverse().transform_rect_bbox(own)
}

/// Applies one clip capability to a viewport in content space.
#[must_use]
pub fn apply_clip(viewport: Rect, clip: &dyn ViewportClip) -> Rect {
    let clipped = match clip.clip_rect() {
        Some(window) => intersect(viewport, window),
        None => viewport,
    };
    clipped + clip.content_offset()
}

/// Maps a content-space viewport into the space of a child arranged at
/// `child_origin`.
#[must_use]
pub fn child_space_viewport(content: Rect, child_origin: Point) -> Rect {
    content - child_origin.to_vec2()
}

/// Intersection that collapses to a zero-area rectangle at the clamped corner
/// when the inputs are disjoint.
fn intersect(a: Rect, b: Rect) -> Rect {
    let x0 = a.x0.max(b.x0);
    let y0 = a.y0.max(b.y0);
    let x1 = a.x1.min(b.x1).max(x0);
    let y1 = a.y1.min(b.y1).max(y0);
    Rect::new(x0, y0, x1, y1)
}
