// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout passes and change tracking.
//!
//! A pass is a loop of iterations, each of which follows a drain-recompute
//! pattern over the dirty channels:
//!
//! 1. **Collect**: Drain [`MEASURE`](dirty::MEASURE) and
//!    [`ARRANGE`](dirty::ARRANGE) into per-node flags, consume
//!    [`TOPOLOGY`](dirty::TOPOLOGY), and rebuild the traversal order if the
//!    tree shape changed.
//! 2. **Measuring**: The shallowest flagged node is re-measured with the
//!    space it was last offered. A changed desired size flags the parent.
//!    Repeats until no attached node is flagged.
//! 3. **Arranging**: The shallowest flagged node is re-arranged in the slot
//!    it was last given. A changed rectangle marks the node's subtree on the
//!    [`VIEWPORT`](dirty::VIEWPORT) channel.
//! 4. **Stabilizing**: Drain `VIEWPORT`, recompute viewports parent before
//!    child, and deliver `EffectiveViewportChanged` as one batch. Work the
//!    handlers request is applied afterwards; if any was requested the pass
//!    starts another iteration.
//!
//! When an iteration requests nothing, the tree goes back to
//! [`PassState::Idle`] and `LayoutUpdated` is raised once.
//!
//! [`PassReport`] uses [`NodeId`] handles throughout, and lists every
//! measure and arrange call so callers can count them per node.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use super::box_model;
use super::id::{INVALID, NodeId};
use super::tree::LayoutTree;
use crate::dirty;
use crate::error::{CallbackResult, LayoutError, Result};
use crate::event::{EventDispatcher, LayoutRequest, LayoutUpdatedArgs};
use crate::trace::{
    FailureKind, LayoutUpdatedEvent, PassBeginEvent, PassFailedEvent, PhaseBeginEvent,
    PhaseEndEvent, PhaseKind, Tracer, ViewportChangedEvent,
};

/// Where the tree is in its pass state machine.
///
/// ```text
/// Idle ──► Measuring ──► Arranging ──► Stabilizing ──► Idle
///              ▲                            │
///              └──── handler invalidation ──┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PassState {
    /// No pass in progress.
    #[default]
    Idle,
    /// Computing desired sizes.
    Measuring,
    /// Computing final rectangles.
    Arranging,
    /// Recomputing viewports and notifying subscribers.
    Stabilizing,
}

/// The work done by a single [`LayoutTree::update_layout`] call.
#[derive(Clone, Debug, Default)]
pub struct PassReport {
    /// Pass counter, or 0 if no pass was needed.
    pub pass: u64,
    /// Measure/arrange/stabilize iterations run.
    pub iterations: u32,
    /// Nodes measured, once per measure call.
    pub measured: Vec<NodeId>,
    /// Nodes arranged, once per arrange call.
    pub arranged: Vec<NodeId>,
    /// Nodes whose viewport was recomputed, once per recomputation.
    pub viewports: Vec<NodeId>,
    /// Nodes whose subscribers were notified, with the delivered viewport.
    pub notified: Vec<(NodeId, Rect)>,
}

impl PassReport {
    /// Returns `true` if no pass ran.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iterations == 0
    }

    /// How many times `id` was measured during the pass.
    #[must_use]
    pub fn measure_count(&self, id: NodeId) -> usize {
        self.measured.iter().filter(|&&n| n == id).count()
    }

    /// How many times `id` was arranged during the pass.
    #[must_use]
    pub fn arrange_count(&self, id: NodeId) -> usize {
        self.arranged.iter().filter(|&&n| n == id).count()
    }

    /// Viewports delivered for `id` during the pass, in order.
    pub fn notifications_for(&self, id: NodeId) -> impl Iterator<Item = Rect> + '_ {
        self.notified
            .iter()
            .filter(move |(n, _)| *n == id)
            .map(|(_, viewport)| *viewport)
    }
}

impl LayoutTree {
    /// Runs a layout pass if any layout work is pending.
    ///
    /// Returns an empty report (and raises nothing) when the tree is clean.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::Handler`] if an `EffectiveViewportChanged` handler
    ///   failed. The tree is back in [`PassState::Idle`], work requested by
    ///   the batch is still pending, and `LayoutUpdated` was not raised.
    /// - [`LayoutError::LayoutUpdatedHandler`] if a `LayoutUpdated` handler
    ///   failed. Layout itself is complete.
    /// - [`LayoutError::IterationLimit`] if
    ///   [`max_iterations`](crate::config::LayoutConfig::max_iterations) is
    ///   set and the pass did not settle in time.
    ///
    /// # Panics
    ///
    /// Propagates a panic from a handler. Subscriptions survive it and the
    /// tree is left in [`PassState::Idle`]; work the interrupted batch
    /// requested is lost.
    pub fn update_layout(&mut self) -> Result<PassReport> {
        self.update_layout_traced(&mut Tracer::none())
    }

    /// Like [`update_layout`](Self::update_layout), emitting trace events.
    ///
    /// # Errors
    ///
    /// See [`update_layout`](Self::update_layout).
    pub fn update_layout_traced(&mut self, tracer: &mut Tracer<'_>) -> Result<PassReport> {
        let mut report = PassReport::default();
        if !self.layout_requested {
            return Ok(report);
        }
        self.pass_count += 1;
        let pass = self.pass_count;
        report.pass = pass;
        tracer.pass_begin(&PassBeginEvent { pass });

        loop {
            report.iterations += 1;
            let iteration = report.iterations;
            self.layout_requested = false;
            self.collect_dirty();

            self.state = PassState::Measuring;
            tracer.phase_begin(&PhaseBeginEvent {
                pass,
                iteration,
                phase: PhaseKind::Measure,
            });
            let before = report.measured.len();
            self.run_measure(&mut report);
            tracer.phase_end(&PhaseEndEvent {
                pass,
                iteration,
                phase: PhaseKind::Measure,
                work: report.measured.len() - before,
            });

            self.state = PassState::Arranging;
            tracer.phase_begin(&PhaseBeginEvent {
                pass,
                iteration,
                phase: PhaseKind::Arrange,
            });
            let before = report.arranged.len();
            self.run_arrange(&mut report);
            tracer.phase_end(&PhaseEndEvent {
                pass,
                iteration,
                phase: PhaseKind::Arrange,
                work: report.arranged.len() - before,
            });

            self.state = PassState::Stabilizing;
            tracer.phase_begin(&PhaseBeginEvent {
                pass,
                iteration,
                phase: PhaseKind::Stabilize,
            });
            let before = report.viewports.len();
            let stabilized = self.stabilize(&mut report, tracer);
            tracer.phase_end(&PhaseEndEvent {
                pass,
                iteration,
                phase: PhaseKind::Stabilize,
                work: report.viewports.len() - before,
            });

            if let Err(err) = stabilized {
                self.state = PassState::Idle;
                tracer.pass_failed(&PassFailedEvent {
                    pass,
                    iterations: iteration,
                    reason: FailureKind::ViewportHandler,
                });
                return Err(err);
            }

            if !self.layout_requested {
                break;
            }
            if self
                .config
                .max_iterations
                .is_some_and(|max| iteration >= max)
            {
                self.state = PassState::Idle;
                tracer.pass_failed(&PassFailedEvent {
                    pass,
                    iterations: iteration,
                    reason: FailureKind::IterationLimit,
                });
                return Err(LayoutError::IterationLimit {
                    iterations: iteration,
                });
            }
        }

        self.state = PassState::Idle;
        tracer.layout_updated(&LayoutUpdatedEvent {
            pass,
            iterations: report.iterations,
            measured: report.measured.len(),
            arranged: report.arranged.len(),
            notified: report.notified.len(),
        });

        if let Err(source) = self.raise_layout_updated(&report) {
            tracer.pass_failed(&PassFailedEvent {
                pass,
                iterations: report.iterations,
                reason: FailureKind::LayoutUpdatedHandler,
            });
            return Err(LayoutError::LayoutUpdatedHandler { source });
        }
        Ok(report)
    }

    /// Returns the current traversal order (depth-first pre-order of attached
    /// nodes).
    ///
    /// Only valid after a pass has run since the last topology change.
    #[must_use]
    pub fn traversal_order(&self) -> Vec<NodeId> {
        self.traversal_order
            .iter()
            .map(|&idx| self.id_at(idx))
            .collect()
    }

    /// Drains the local channels into per-node flags.
    fn collect_dirty(&mut self) {
        let measure: Vec<u32> = self
            .dirty
            .drain(dirty::MEASURE)
            .deterministic()
            .run()
            .collect();
        for idx in measure {
            if self.is_live_slot(idx) {
                self.needs_measure[idx as usize] = true;
            }
        }

        let arrange: Vec<u32> = self
            .dirty
            .drain(dirty::ARRANGE)
            .deterministic()
            .run()
            .collect();
        for idx in arrange {
            if self.is_live_slot(idx) {
                self.needs_arrange[idx as usize] = true;
            }
        }

        // Drain TOPOLOGY channel (just consume, the flag below covers it).
        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            self.traversal_dirty = false;
        }
    }

    fn is_live_slot(&self, idx: u32) -> bool {
        idx < self.len && !self.free_list.contains(&idx)
    }

    /// Shallowest attached node whose flag is set, earliest in traversal
    /// order among equals.
    fn shallowest(&self, flags: &[bool]) -> Option<u32> {
        let mut best: Option<u32> = None;
        for &idx in &self.traversal_order {
            if !flags[idx as usize] {
                continue;
            }
            match best {
                Some(b) if self.depth[b as usize] <= self.depth[idx as usize] => {}
                _ => best = Some(idx),
            }
        }
        best
    }

    // -- Measuring --

    fn run_measure(&mut self, report: &mut PassReport) {
        while let Some(idx) = self.shallowest(&self.needs_measure) {
            let available = if idx == self.root {
                Some(self.config.window_size)
            } else {
                self.available[idx as usize]
            };
            let parent = self.parent[idx as usize];
            match available {
                Some(available) => {
                    let old = self.desired[idx as usize];
                    let new = self.measure_node(idx, available, report);
                    if new != old && parent != INVALID {
                        self.needs_measure[parent as usize] = true;
                    }
                }
                // Never measured: the parent decides what it is offered.
                None => self.needs_measure[parent as usize] = true,
            }
        }
    }

    /// Measures `idx` and its subtree. Clean nodes offered the same space
    /// return their cached desired size.
    fn measure_node(&mut self, idx: u32, available: Size, report: &mut PassReport) -> Size {
        let i = idx as usize;
        if !self.needs_measure[i] && self.available[i] == Some(available) {
            return self.desired[i];
        }
        self.needs_measure[i] = false;
        self.available[i] = Some(available);
        report.measured.push(self.id_at(idx));

        let layout = self.layout[i];
        let inner = box_model::inner_available(&layout, available);
        let offered = if self.scroll[i].is_some() {
            Size::new(f64::INFINITY, f64::INFINITY)
        } else {
            inner
        };

        let mut content = Size::ZERO;
        let mut child = self.first_child[i];
        while child != INVALID {
            let d = self.measure_node(child, offered, report);
            content = Size::new(content.width.max(d.width), content.height.max(d.height));
            child = self.next_sibling[child as usize];
        }

        let desired = box_model::desired_size(&layout, content, inner);
        self.desired[i] = desired;
        self.needs_arrange[i] = true;
        desired
    }

    // -- Arranging --

    fn run_arrange(&mut self, report: &mut PassReport) {
        while let Some(idx) = self.shallowest(&self.needs_arrange) {
            let slot = if idx == self.root {
                Some(self.window_rect())
            } else {
                self.slot[idx as usize]
            };
            match slot {
                Some(slot) => self.arrange_node(idx, slot, report),
                // Never arranged: let the parent hand out a slot.
                None => self.needs_arrange[self.parent[idx as usize] as usize] = true,
            }
        }
    }

    /// Arranges `idx` in `slot`, then its children in its content box.
    fn arrange_node(&mut self, idx: u32, slot: Rect, report: &mut PassReport) {
        let i = idx as usize;
        if !self.needs_arrange[i] && self.slot[i] == Some(slot) {
            return;
        }
        self.needs_arrange[i] = false;
        self.slot[i] = Some(slot);
        report.arranged.push(self.id_at(idx));

        let rect = box_model::arrange_rect(&self.layout[i], slot, self.desired[i]);
        if self.rect[i] != Some(rect) {
            self.rect[i] = Some(rect);
            self.mark_viewport_subtree(idx);
        }

        let size = rect.size();
        let scrolls = self.scroll[i].is_some();
        let mut extent = size;
        let mut child = self.first_child[i];
        while child != INVALID {
            let child_size = if scrolls {
                let d = self.desired[child as usize];
                Size::new(d.width.max(size.width), d.height.max(size.height))
            } else {
                size
            };
            extent = Size::new(
                extent.width.max(child_size.width),
                extent.height.max(child_size.height),
            );
            self.arrange_node(child, Rect::from_origin_size(Point::ORIGIN, child_size), report);
            child = self.next_sibling[child as usize];
        }

        let reclamped = match &mut self.scroll[i] {
            Some(state) => state.set_bounds(extent, size),
            None => false,
        };
        if reclamped {
            self.mark_content_viewports(idx);
        }
    }

    // -- Stabilizing --

    /// Recomputes marked viewports and delivers the batch.
    fn stabilize(&mut self, report: &mut PassReport, tracer: &mut Tracer<'_>) -> Result<()> {
        let mut affected: Vec<u32> = self
            .dirty
            .drain(dirty::VIEWPORT)
            .affected()
            .deterministic()
            .run()
            .collect();
        affected.retain(|&idx| {
            self.is_live_slot(idx) && self.traversal_index[idx as usize] != INVALID
        });
        affected.sort_unstable_by_key(|&idx| self.traversal_index[idx as usize]);
        affected.dedup();

        let mut batch = Vec::with_capacity(affected.len());
        for idx in affected {
            let parent = self.parent[idx as usize];
            let parent_content = if parent == INVALID {
                self.window_rect()
            } else {
                // Parents precede children in the batch, so a cached own
                // viewport is current. Scrolling changes only the content.
                match self.viewport[parent as usize] {
                    Some(own) => self.content_of(parent, own),
                    None => self.walk_viewport(parent).1,
                }
            };
            let own = self.own_viewport(idx, parent_content);
            self.viewport[idx as usize] = Some(own);
            let id = self.id_at(idx);
            report.viewports.push(id);
            batch.push((id, own));
        }

        let mut lent = LentEvents::new(self);
        let mut requests = Vec::new();
        let mut failure = None;
        for (node, viewport) in batch {
            if !lent.events.would_notify(node, viewport) {
                continue;
            }
            report.notified.push((node, viewport));
            tracer.viewport_changed(&ViewportChangedEvent {
                pass: report.pass,
                node,
                viewport,
            });
            if let Err(source) = lent.events.notify(&*lent.tree, node, viewport, &mut requests) {
                failure.get_or_insert(LayoutError::Handler { node, source });
            }
        }
        lent.finish();

        for request in requests {
            self.apply_request(request);
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Applies work requested by a handler. Requests naming destroyed nodes
    /// are dropped.
    fn apply_request(&mut self, request: LayoutRequest) {
        match request {
            LayoutRequest::InvalidateMeasure(node) if self.is_alive(node) => {
                self.invalidate_measure(node);
            }
            LayoutRequest::InvalidateArrange(node) if self.is_alive(node) => {
                self.invalidate_arrange(node);
            }
            LayoutRequest::ChangeView { node, x, y } if self.is_alive(node) => {
                self.change_view(node, x, y);
            }
            _ => {}
        }
    }

    fn raise_layout_updated(&mut self, report: &PassReport) -> CallbackResult {
        if self.events.layout_updated_count() == 0 {
            return Ok(());
        }
        let mut lent = LentEvents::new(self);
        let result = lent.events.notify_layout_updated(&LayoutUpdatedArgs {
            tree: &*lent.tree,
            report,
        });
        lent.finish();
        result
    }
}

/// The tree's dispatcher, moved out so handlers can read the tree.
///
/// Dropping it puts the dispatcher back. If a handler unwinds before
/// [`finish`](Self::finish), the tree is also returned to
/// [`PassState::Idle`] so it stays usable after the panic is caught.
struct LentEvents<'a> {
    tree: &'a mut LayoutTree,
    events: EventDispatcher,
    finished: bool,
}

impl<'a> LentEvents<'a> {
    fn new(tree: &'a mut LayoutTree) -> Self {
        let events = core::mem::replace(&mut tree.events, EventDispatcher::new());
        Self {
            tree,
            events,
            finished: false,
        }
    }

    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for LentEvents<'_> {
    fn drop(&mut self) {
        self.tree.events = core::mem::replace(&mut self.events, EventDispatcher::new());
        if !self.finished {
            self.tree.state = PassState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Insets;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::Layout;

    fn tree_with_canvas(size: f64) -> (LayoutTree, NodeId) {
        let mut tree = LayoutTree::new(LayoutConfig::default());
        let canvas = tree.create_node();
        tree.set_layout(canvas, Layout::new().with_size(size, size));
        tree.set_content(tree.root(), Some(canvas)).unwrap();
        (tree, canvas)
    }

    #[test]
    fn first_pass_measures_and_arranges_everything() {
        let (mut tree, canvas) = tree_with_canvas(52.0);
        let report = tree.update_layout().unwrap();
        assert_eq!(report.pass, 1);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.measure_count(canvas), 1);
        assert_eq!(report.arrange_count(canvas), 1);
        assert_eq!(report.measure_count(tree.root()), 1);
        assert_eq!(tree.rect(canvas), Some(Rect::new(574.0, 424.0, 626.0, 476.0)));
        assert_eq!(tree.desired_size(canvas), Size::new(52.0, 52.0));
        assert_eq!(tree.state(), PassState::Idle);
        assert!(!tree.needs_layout());
    }

    #[test]
    fn clean_tree_runs_no_pass() {
        let (mut tree, _) = tree_with_canvas(52.0);
        tree.update_layout().unwrap();
        let report = tree.update_layout().unwrap();
        assert!(report.is_empty());
        assert_eq!(tree.pass_count(), 1);
    }

    #[test]
    fn unchanged_desired_size_does_not_remeasure_parent() {
        let (mut tree, canvas) = tree_with_canvas(52.0);
        tree.update_layout().unwrap();
        tree.invalidate_measure(canvas);
        let report = tree.update_layout().unwrap();
        assert_eq!(report.measured, vec![canvas]);
        assert_eq!(report.arranged, vec![canvas]);
        // Rectangle unchanged, so no viewport work.
        assert!(report.viewports.is_empty());
    }

    #[test]
    fn changed_desired_size_bubbles_to_parent() {
        let mut tree = LayoutTree::default();
        let border = tree.create_node();
        let canvas = tree.create_node();
        tree.set_layout(canvas, Layout::new().with_size(40.0, 40.0));
        tree.set_content(tree.root(), Some(border)).unwrap();
        tree.set_content(border, Some(canvas)).unwrap();
        tree.update_layout().unwrap();
        assert_eq!(tree.desired_size(border), Size::new(40.0, 40.0));

        tree.set_size(canvas, Some(60.0), Some(60.0));
        let report = tree.update_layout().unwrap();
        assert_eq!(report.measure_count(canvas), 1);
        assert_eq!(report.measure_count(border), 1);
        assert_eq!(report.measure_count(tree.root()), 1);
        assert_eq!(tree.desired_size(border), Size::new(60.0, 60.0));
        // Border stretches over the window; the canvas is centered in it.
        assert_eq!(tree.rect(canvas), Some(Rect::new(570.0, 420.0, 630.0, 480.0)));
    }

    #[test]
    fn transform_only_arranges_the_node() {
        let (mut tree, canvas) = tree_with_canvas(52.0);
        tree.update_layout().unwrap();
        tree.set_transform(canvas, 5.0, 5.0, 0.0);
        let report = tree.update_layout().unwrap();
        assert!(report.measured.is_empty());
        assert_eq!(report.arranged, vec![canvas]);
        assert!(report.viewports.contains(&canvas));
        assert!(report.notified.is_empty());
    }

    #[test]
    fn margin_change_moves_node() {
        let (mut tree, canvas) = tree_with_canvas(100.0);
        tree.update_layout().unwrap();
        tree.set_margin(canvas, Insets::new(8.0, 0.0, 0.0, 0.0));
        tree.update_layout().unwrap();
        assert_eq!(tree.rect(canvas), Some(Rect::new(554.0, 400.0, 654.0, 500.0)));
    }

    #[test]
    fn window_resize_relayouts_from_root() {
        let (mut tree, canvas) = tree_with_canvas(100.0);
        tree.update_layout().unwrap();
        tree.set_window_size(Size::new(300.0, 200.0));
        tree.update_layout().unwrap();
        assert_eq!(tree.rect(canvas), Some(Rect::new(100.0, 50.0, 200.0, 150.0)));
        assert_eq!(
            tree.effective_viewport(canvas),
            Some(Rect::new(-100.0, -50.0, 200.0, 150.0))
        );
    }

    #[test]
    fn traversal_order_is_preorder() {
        let mut tree = LayoutTree::default();
        let a = tree.create_node();
        let b = tree.create_node();
        let root = tree.root();
        tree.add_child(root, a).unwrap();
        tree.add_child(a, b).unwrap();
        tree.update_layout().unwrap();
        assert_eq!(tree.traversal_order(), vec![root, a, b]);
    }

    #[test]
    fn detached_subtree_is_skipped() {
        let (mut tree, canvas) = tree_with_canvas(52.0);
        tree.update_layout().unwrap();
        tree.remove_from_parent(canvas);
        tree.set_size(canvas, Some(10.0), Some(10.0));
        let report = tree.update_layout().unwrap();
        assert_eq!(report.measure_count(canvas), 0);
        assert_eq!(tree.effective_viewport(canvas), None);

        tree.set_content(tree.root(), Some(canvas)).unwrap();
        let report = tree.update_layout().unwrap();
        assert_eq!(report.measure_count(canvas), 1);
        assert_eq!(tree.rect(canvas), Some(Rect::new(595.0, 445.0, 605.0, 455.0)));
    }
}
