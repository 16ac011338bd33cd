// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure measure/arrange arithmetic.
//!
//! These functions know nothing about the tree; the pass feeds them the
//! node's [`Layout`] and the sizes it collected from children.

use kurbo::{Rect, Size};

use super::props::{Alignment, Layout};

/// Space a node offers its children, given the space its parent offered it.
///
/// Explicit sizes replace the available size on their axis. Infinite
/// available space stays infinite.
#[must_use]
pub fn inner_available(layout: &Layout, available: Size) -> Size {
    let m = layout.margin;
    Size::new(
        layout
            .width
            .unwrap_or_else(|| (available.width - m.x0 - m.x1).max(0.0)),
        layout
            .height
            .unwrap_or_else(|| (available.height - m.y0 - m.y1).max(0.0)),
    )
}

/// Desired size including margin.
///
/// `content` is the largest desired size among the children (zero for a
/// leaf). It is capped by `inner`, the result of [`inner_available`].
#[must_use]
pub fn desired_size(layout: &Layout, content: Size, inner: Size) -> Size {
    let m = layout.margin;
    let width = layout.width.unwrap_or(content.width.min(inner.width));
    let height = layout.height.unwrap_or(content.height.min(inner.height));
    Size::new(width + m.x0 + m.x1, height + m.y0 + m.y1)
}

/// Final rectangle of a node within `slot`, in the parent's content space.
///
/// `desired` is the node's measured size including margin.
#[must_use]
pub fn arrange_rect(layout: &Layout, slot: Rect, desired: Size) -> Rect {
    let m = layout.margin;
    let inner_x = slot.x0 + m.x0;
    let inner_y = slot.y0 + m.y0;
    let inner_w = (slot.width() - m.x0 - m.x1).max(0.0);
    let inner_h = (slot.height() - m.y0 - m.y1).max(0.0);
    let desired_w = (desired.width - m.x0 - m.x1).max(0.0);
    let desired_h = (desired.height - m.y0 - m.y1).max(0.0);

    let (x, w) = place(layout.horizontal, layout.width, inner_w, desired_w);
    let (y, h) = place(layout.vertical, layout.height, inner_h, desired_h);
    Rect::new(inner_x + x, inner_y + y, inner_x + x + w, inner_y + y + h)
}

/// Offset and length along one axis.
fn place(alignment: Alignment, explicit: Option<f64>, available: f64, desired: f64) -> (f64, f64) {
    let len = match (explicit, alignment) {
        (Some(len), _) => len,
        (None, Alignment::Stretch) => available,
        (None, _) => desired.min(available),
    };
    let offset = match alignment {
        Alignment::Start => 0.0,
        Alignment::End => available - len,
        Alignment::Center | Alignment::Stretch => (available - len) / 2.0,
    };
    (offset, len)
}

#[cfg(test)]
mod tests {
    use kurbo::Insets;

    use super::*;

    const WINDOW: Size = Size::new(1200.0, 900.0);

    #[test]
    fn explicit_size_replaces_available() {
        let layout = Layout::new().with_size(52.0, 52.0);
        assert_eq!(inner_available(&layout, WINDOW), Size::new(52.0, 52.0));
        assert_eq!(
            desired_size(&layout, Size::ZERO, Size::new(52.0, 52.0)),
            Size::new(52.0, 52.0)
        );
    }

    #[test]
    fn margin_shrinks_inner_and_grows_desired() {
        let layout = Layout::new().with_margin(Insets::new(8.0, 0.0, 2.0, 4.0));
        let inner = inner_available(&layout, WINDOW);
        assert_eq!(inner, Size::new(1190.0, 896.0));
        assert_eq!(
            desired_size(&layout, Size::new(10.0, 10.0), inner),
            Size::new(20.0, 14.0)
        );
    }

    #[test]
    fn infinite_available_stays_infinite() {
        let layout = Layout::new().with_margin(Insets::uniform(5.0));
        let inner = inner_available(&layout, Size::new(f64::INFINITY, f64::INFINITY));
        assert!(inner.width.is_infinite() && inner.height.is_infinite());
    }

    #[test]
    fn content_is_capped_by_inner() {
        let layout = Layout::new();
        let inner = inner_available(&layout, Size::new(100.0, 100.0));
        assert_eq!(
            desired_size(&layout, Size::new(200.0, 50.0), inner),
            Size::new(100.0, 50.0)
        );
    }

    #[test]
    fn stretch_with_explicit_size_centers() {
        let layout = Layout::new().with_size(52.0, 52.0);
        let rect = arrange_rect(&layout, Rect::new(0.0, 0.0, 1200.0, 900.0), Size::new(52.0, 52.0));
        assert_eq!(rect, Rect::new(574.0, 424.0, 626.0, 476.0));
    }

    #[test]
    fn stretch_without_size_fills_slot_minus_margin() {
        let layout = Layout::new().with_margin(Insets::new(8.0, 0.0, 0.0, 0.0));
        let rect = arrange_rect(&layout, Rect::new(0.0, 0.0, 100.0, 50.0), Size::ZERO);
        assert_eq!(rect, Rect::new(8.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn start_and_end_use_desired_size() {
        let start = Layout::new().with_alignment(Alignment::Start, Alignment::End);
        let rect = arrange_rect(&start, Rect::new(0.0, 0.0, 100.0, 100.0), Size::new(30.0, 20.0));
        assert_eq!(rect, Rect::new(0.0, 80.0, 30.0, 100.0));
    }

    #[test]
    fn margin_offsets_centered_node() {
        let layout = Layout::new()
            .with_size(200.0, 200.0)
            .with_margin(Insets::new(8.0, 0.0, 0.0, 0.0));
        let rect = arrange_rect(&layout, Rect::new(0.0, 0.0, 1200.0, 900.0), Size::new(208.0, 200.0));
        assert_eq!(rect, Rect::new(504.0, 350.0, 704.0, 550.0));
    }
}
