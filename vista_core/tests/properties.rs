// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for viewport propagation.

use kurbo::{Rect, Size, Vec2};
use proptest::prelude::*;
use vista_core::layout::{Layout, LayoutTree, NodeId};

fn sized(tree: &mut LayoutTree, parent: NodeId, width: f64, height: f64) -> NodeId {
    let node = tree.create_node();
    tree.set_layout(node, Layout::new().with_size(width, height));
    tree.add_child(parent, node).unwrap();
    node
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

proptest! {
    #[test]
    fn centered_node_sees_window_around_itself(w in 1.0..1200.0_f64, h in 1.0..900.0_f64) {
        let mut tree = LayoutTree::default();
        let root = tree.root();
        let node = sized(&mut tree, root, w, h);
        tree.update_layout().unwrap();

        let vp = tree.effective_viewport(node).unwrap();
        prop_assert!(close(vp.width(), 1200.0));
        prop_assert!(close(vp.height(), 900.0));
        // Equal room on both sides of the node.
        prop_assert!(close(-vp.x0, vp.x1 - w));
        prop_assert!(close(-vp.y0, vp.y1 - h));
    }

    #[test]
    fn own_translation_never_changes_own_viewport(
        tx in -500.0..500.0_f64,
        ty in -500.0..500.0_f64,
    ) {
        let mut tree = LayoutTree::default();
        let root = tree.root();
        let node = sized(&mut tree, root, 80.0, 60.0);
        tree.update_layout().unwrap();
        let before = tree.effective_viewport(node);

        tree.set_transform(node, tx, ty, 0.0);
        let report = tree.update_layout().unwrap();
        prop_assert_eq!(tree.effective_viewport(node), before);
        prop_assert!(report.notified.is_empty());
    }

    #[test]
    fn ancestor_translation_shifts_descendants(
        tx in -500.0..500.0_f64,
        ty in -500.0..500.0_f64,
    ) {
        let mut tree = LayoutTree::default();
        let root = tree.root();
        let border = sized(&mut tree, root, 200.0, 200.0);
        let node = sized(&mut tree, border, 50.0, 50.0);
        tree.update_layout().unwrap();
        let before = tree.effective_viewport(node).unwrap();

        tree.set_transform(border, tx, ty, 0.0);
        tree.update_layout().unwrap();
        let after = tree.effective_viewport(node).unwrap();
        let expected = before - Vec2::new(tx, ty);
        prop_assert!(close(after.x0, expected.x0) && close(after.y0, expected.y0));
        prop_assert!(close(after.x1, expected.x1) && close(after.y1, expected.y1));
    }

    #[test]
    fn scroll_offset_stays_in_range(
        content in 100.0..2000.0_f64,
        x in -3000.0..3000.0_f64,
        y in -3000.0..3000.0_f64,
    ) {
        let mut tree = LayoutTree::default();
        let root = tree.root();
        let viewer = sized(&mut tree, root, 100.0, 100.0);
        tree.set_scrollable(viewer, true);
        let child = sized(&mut tree, viewer, content, content);
        tree.update_layout().unwrap();

        tree.change_view(viewer, Some(x), Some(y));
        tree.update_layout().unwrap();
        let state = tree.scroll_state(viewer).unwrap();
        let max = content - 100.0;
        prop_assert!((0.0..=max).contains(&state.offset().x));
        prop_assert!((0.0..=max).contains(&state.offset().y));
        prop_assert_eq!(state.extent(), Size::new(content, content));

        let vp = tree.effective_viewport(child).unwrap();
        prop_assert_eq!(
            vp,
            Rect::from_origin_size(state.offset().to_point(), Size::new(100.0, 100.0))
        );
    }
}
