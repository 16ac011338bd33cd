// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Insets, Point, Rect, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::clip::ClipShape;
use super::id::{INVALID, NodeId};
use super::pass::PassState;
use super::props::Layout;
use super::traverse::{Children, Descendants};
use crate::config::LayoutConfig;
use crate::dirty;
use crate::error::{CallbackResult, LayoutError, Result};
use crate::event::{EventDispatcher, LayoutUpdatedArgs, SubscriptionId, ViewportChangedArgs};
use crate::scroll::ScrollState;
use crate::transform::RenderTransform;
use crate::viewport;

/// A tree of layout nodes rooted at the window host.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// Mutations only record dirty state; nothing is computed until
/// [`update_layout`](Self::update_layout) runs a pass.
#[derive(Debug)]
pub struct LayoutTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) layout: Vec<Layout>,
    pub(crate) transform: Vec<RenderTransform>,
    pub(crate) clip: Vec<Option<ClipShape>>,
    pub(crate) scroll: Vec<Option<ScrollState>>,

    // -- Computed properties (written by update_layout) --
    pub(crate) desired: Vec<Size>,
    pub(crate) available: Vec<Option<Size>>,
    pub(crate) slot: Vec<Option<Rect>>,
    pub(crate) rect: Vec<Option<Rect>>,
    pub(crate) viewport: Vec<Option<Rect>>,
    pub(crate) needs_measure: Vec<bool>,
    pub(crate) needs_arrange: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache (attached nodes only) --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_index: Vec<u32>,
    pub(crate) depth: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Pass state --
    pub(crate) root: u32,
    pub(crate) config: LayoutConfig,
    pub(crate) state: PassState,
    pub(crate) pass_count: u64,
    pub(crate) layout_requested: bool,
    pub(crate) events: EventDispatcher,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutTree {
    /// Creates a tree containing only the root node, sized to the configured
    /// window.
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        let mut tree = Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            layout: Vec::new(),
            transform: Vec::new(),
            clip: Vec::new(),
            scroll: Vec::new(),
            desired: Vec::new(),
            available: Vec::new(),
            slot: Vec::new(),
            rect: Vec::new(),
            viewport: Vec::new(),
            needs_measure: Vec::new(),
            needs_arrange: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_index: Vec::new(),
            depth: Vec::new(),
            traversal_dirty: true,
            root: INVALID,
            config,
            state: PassState::Idle,
            pass_count: 0,
            layout_requested: false,
            events: EventDispatcher::new(),
        };
        let root = tree.create_node();
        tree.root = root.idx;
        tree.dirty.mark(root.idx, dirty::VIEWPORT);
        tree.layout_requested = true;
        tree
    }

    // -- Allocation API --

    /// Creates a new detached node and returns its handle.
    ///
    /// The node starts with the default [`Layout`], an identity transform, no
    /// clip, and no scroll state.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.layout[i] = Layout::new();
            self.transform[i] = RenderTransform::IDENTITY;
            self.clip[i] = None;
            self.scroll[i] = None;
            self.desired[i] = Size::ZERO;
            self.available[i] = None;
            self.slot[i] = None;
            self.rect[i] = None;
            self.viewport[i] = None;
            self.needs_measure[i] = true;
            self.needs_arrange[i] = false;
            self.traversal_index[i] = INVALID;
            self.depth[i] = INVALID;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.layout.push(Layout::new());
            self.transform.push(RenderTransform::IDENTITY);
            self.clip.push(None);
            self.scroll.push(None);
            self.desired.push(Size::ZERO);
            self.available.push(None);
            self.slot.push(None);
            self.rect.push(None);
            self.viewport.push(None);
            self.needs_measure.push(true);
            self.needs_arrange.push(false);
            self.traversal_index.push(INVALID);
            self.depth.push(INVALID);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.dirty.mark(idx, dirty::TOPOLOGY);

        self.id_at(idx)
    }

    /// Destroys a node, freeing its slot for reuse. Its subscriptions are
    /// dropped.
    ///
    /// # Panics
    ///
    /// Panics if the node is the root, has children (remove them first), or
    /// if the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(idx != self.root, "cannot destroy the root node");
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.remove_from_parent(id);
        }

        self.events.remove_node(id);
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Returns the root node (the window host).
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.id_at(self.root)
    }

    /// Replaces the content of `parent` with `child`, or clears it with
    /// `None`.
    ///
    /// Existing children of `parent` are detached. If `child` is attached
    /// elsewhere, it is moved.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Cycle`] if `child` is `parent` or one of its
    /// ancestors. The tree is unchanged in that case.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn set_content(&mut self, parent: NodeId, child: Option<NodeId>) -> Result<()> {
        self.validate(parent);
        if let Some(child) = child {
            self.validate(child);
            self.check_cycle(parent, child)?;
            let p = parent.idx;
            let c = child.idx;
            if self.parent[c as usize] == p
                && self.first_child[p as usize] == c
                && self.next_sibling[c as usize] == INVALID
            {
                return Ok(());
            }
        }

        let existing: Vec<NodeId> = self.children(parent).collect();
        for old in existing {
            if Some(old) != child {
                self.remove_from_parent(old);
            }
        }

        if let Some(child) = child {
            if self.parent[child.idx as usize] != INVALID {
                self.remove_from_parent(child);
            }
            self.link(parent.idx, child.idx, INVALID);
        }
        Ok(())
    }

    /// Adds `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Cycle`] if `child` is `parent` or one of its
    /// ancestors.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.validate(parent);
        self.validate(child);
        self.check_cycle(parent, child)?;
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
        self.link(parent.idx, child.idx, INVALID);
        Ok(())
    }

    /// Inserts `child` before `sibling` in the sibling list.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Cycle`] if `child` is an ancestor of `sibling`.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, or `sibling`
    /// has no parent.
    pub fn insert_before(&mut self, child: NodeId, sibling: NodeId) -> Result<()> {
        self.validate(child);
        self.validate(sibling);
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[sibling.idx as usize];
        assert!(p != INVALID, "sibling has no parent");
        self.check_cycle(self.id_at(p), child)?;
        self.link(p, child.idx, sibling.idx);
        Ok(())
    }

    /// Moves `child` to be the last child of `new_parent`.
    ///
    /// If `child` already has a parent, it is removed first.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Cycle`] if `child` is `new_parent` or one of
    /// its ancestors. The tree is unchanged in that case.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) -> Result<()> {
        self.validate(child);
        self.validate(new_parent);
        self.check_cycle(new_parent, child)?;
        if self.parent[child.idx as usize] != INVALID {
            self.remove_from_parent(child);
        }
        self.link(new_parent.idx, child.idx, INVALID);
        Ok(())
    }

    /// Removes `child` from its current parent.
    ///
    /// The detached subtree drops out of pending layout work and its computed
    /// viewports are cleared. Subscriptions on it stay registered but dormant;
    /// the first pass after re-attaching delivers a fresh viewport to each of
    /// them.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::VIEWPORT);

        let subtree: Vec<NodeId> = self.descendants(child).collect();
        for node in subtree {
            let i = node.idx as usize;
            self.viewport[i] = None;
            self.events.reset_node(node);
        }
        self.needs_measure[c as usize] = true;

        self.dirty.mark(p, dirty::MEASURE);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.layout_requested = true;
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(self.id_at(p))
        }
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns an iterator over `id` and all of its descendants, depth-first
    /// pre-order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        self.validate(id);
        Descendants::new(self, id.idx)
    }

    /// Returns whether the node is connected to the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.validate(id);
        let mut idx = id.idx;
        while idx != INVALID {
            if idx == self.root {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the layout properties of a node.
    #[must_use]
    pub fn layout(&self, id: NodeId) -> Layout {
        self.validate(id);
        self.layout[id.idx as usize]
    }

    /// Returns the render transform of a node.
    #[must_use]
    pub fn transform(&self, id: NodeId) -> RenderTransform {
        self.validate(id);
        self.transform[id.idx as usize]
    }

    /// Returns the clip shape of a node.
    #[must_use]
    pub fn clip(&self, id: NodeId) -> Option<ClipShape> {
        self.validate(id);
        self.clip[id.idx as usize]
    }

    /// Returns the scroll state of a scroll container.
    #[must_use]
    pub fn scroll_state(&self, id: NodeId) -> Option<ScrollState> {
        self.validate(id);
        self.scroll[id.idx as usize]
    }

    /// Returns the desired size (including margin) from the last measure.
    #[must_use]
    pub fn desired_size(&self, id: NodeId) -> Size {
        self.validate(id);
        self.desired[id.idx as usize]
    }

    /// Returns the final rectangle in the parent's content space.
    ///
    /// `None` until the node has been arranged.
    #[must_use]
    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.validate(id);
        self.rect[id.idx as usize]
    }

    /// Returns the effective viewport computed by the last pass.
    ///
    /// `None` for detached nodes and nodes no pass has reached yet.
    #[must_use]
    pub fn effective_viewport(&self, id: NodeId) -> Option<Rect> {
        self.validate(id);
        self.viewport[id.idx as usize]
    }

    /// Computes the effective viewport of `id` from the current geometry,
    /// walking from the root window down to the node.
    ///
    /// Unlike [`effective_viewport`](Self::effective_viewport) this does not
    /// wait for a pass, so it reflects scroll offsets, clips, and transforms
    /// set since, over the rectangles of the last arrange.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Detached`] if the node is not under the root.
    pub fn compute_effective_viewport(&self, id: NodeId) -> Result<Rect> {
        if !self.is_attached(id) {
            return Err(LayoutError::Detached(id));
        }
        Ok(self.walk_viewport(id.idx).0)
    }

    /// Returns the number of `EffectiveViewportChanged` subscriptions on a
    /// node.
    #[must_use]
    pub fn subscriber_count(&self, id: NodeId) -> usize {
        self.validate(id);
        self.events.subscriber_count(id)
    }

    /// Returns the tree configuration.
    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Returns whether a call to [`update_layout`](Self::update_layout)
    /// would run a pass.
    #[must_use]
    pub fn needs_layout(&self) -> bool {
        self.layout_requested
    }

    /// Returns the current pass state. Always [`PassState::Idle`] outside of
    /// event handlers.
    #[must_use]
    pub fn state(&self) -> PassState {
        self.state
    }

    /// Returns the number of passes run so far.
    #[must_use]
    pub fn pass_count(&self) -> u64 {
        self.pass_count
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the layout properties of a node and invalidates its measure.
    pub fn set_layout(&mut self, id: NodeId, layout: Layout) {
        self.validate(id);
        if self.layout[id.idx as usize] == layout {
            return;
        }
        self.layout[id.idx as usize] = layout;
        self.invalidate_measure(id);
    }

    /// Sets the margin of a node.
    pub fn set_margin(&mut self, id: NodeId, margin: Insets) {
        let layout = self.layout(id).with_margin(margin);
        self.set_layout(id, layout);
    }

    /// Sets or clears the explicit size of a node, per axis.
    pub fn set_size(&mut self, id: NodeId, width: Option<f64>, height: Option<f64>) {
        let mut layout = self.layout(id);
        layout.width = width;
        layout.height = height;
        self.set_layout(id, layout);
    }

    /// Sets the render transform of a node.
    ///
    /// Invalidates arrange for this node only and recomputes the viewports
    /// of its subtree. The node's own viewport is unaffected.
    pub fn set_transform(
        &mut self,
        id: NodeId,
        translate_x: f64,
        translate_y: f64,
        rotation_degrees: f64,
    ) {
        self.validate(id);
        let transform = RenderTransform::new(translate_x, translate_y, rotation_degrees);
        if self.transform[id.idx as usize] == transform {
            return;
        }
        self.transform[id.idx as usize] = transform;
        self.invalidate_arrange(id);
        self.dirty.mark_with(id.idx, dirty::VIEWPORT, &EagerPolicy);
    }

    /// Sets the clip shape of a node, in its content space.
    pub fn set_clip(&mut self, id: NodeId, clip: Option<ClipShape>) {
        self.validate(id);
        if self.clip[id.idx as usize] == clip {
            return;
        }
        self.clip[id.idx as usize] = clip;
        self.dirty.mark_with(id.idx, dirty::VIEWPORT, &EagerPolicy);
        self.layout_requested = true;
    }

    /// Turns a node into a scroll container, or back.
    ///
    /// Children of a scroll container are measured with unbounded space and
    /// see a viewport clipped to the container and shifted by its offset.
    pub fn set_scrollable(&mut self, id: NodeId, scrollable: bool) {
        self.validate(id);
        let state = &mut self.scroll[id.idx as usize];
        if state.is_some() == scrollable {
            return;
        }
        *state = scrollable.then(ScrollState::new);
        self.invalidate_measure(id);
        self.dirty.mark_with(id.idx, dirty::VIEWPORT, &EagerPolicy);
    }

    /// Scrolls a scroll container. `None` leaves that axis unchanged.
    ///
    /// The offset is clamped to the scrollable range known from the last
    /// arrange. Only viewports of the container's content are recomputed; no
    /// measure or arrange is scheduled.
    ///
    /// Returns whether the offset changed. Always `false` for nodes that are
    /// not scroll containers.
    pub fn change_view(&mut self, id: NodeId, x: Option<f64>, y: Option<f64>) -> bool {
        self.validate(id);
        let Some(state) = &mut self.scroll[id.idx as usize] else {
            return false;
        };
        if !state.scroll_to(x, y) {
            return false;
        }
        self.mark_content_viewports(id.idx);
        self.layout_requested = true;
        true
    }

    /// Resizes the host window, re-laying out the tree from the root.
    pub fn set_window_size(&mut self, size: Size) {
        if self.config.window_size == size {
            return;
        }
        self.config.window_size = size;
        self.invalidate_measure(self.root());
    }

    /// Marks a node as needing measure. Honored by the current pass when
    /// called from a handler through
    /// [`ViewportChangedArgs`](crate::event::ViewportChangedArgs).
    pub fn invalidate_measure(&mut self, id: NodeId) {
        self.validate(id);
        self.dirty.mark(id.idx, dirty::MEASURE);
        self.layout_requested = true;
    }

    /// Marks a node as needing arrange.
    pub fn invalidate_arrange(&mut self, id: NodeId) {
        self.validate(id);
        self.dirty.mark(id.idx, dirty::ARRANGE);
        self.layout_requested = true;
    }

    // -- Subscriptions --

    /// Subscribes to `EffectiveViewportChanged` for `node`.
    ///
    /// The handler is called during a pass whenever the node's effective
    /// viewport differs from the last value this subscription was given.
    /// Registering schedules a recomputation, so the next pass delivers the
    /// current viewport to this subscriber (and only to it, if others have
    /// already seen that value).
    pub fn on_effective_viewport_changed<F>(&mut self, node: NodeId, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut ViewportChangedArgs<'_>) -> CallbackResult + 'static,
    {
        self.validate(node);
        let id = self.events.subscribe_viewport(node, Box::new(handler));
        self.dirty.mark(node.idx, dirty::VIEWPORT);
        if self.is_attached(node) {
            self.layout_requested = true;
        }
        id
    }

    /// Subscribes to `LayoutUpdated`, raised once per completed pass.
    pub fn on_layout_updated<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&LayoutUpdatedArgs<'_>) -> CallbackResult + 'static,
    {
        self.events.subscribe_layout_updated(Box::new(handler))
    }

    /// Removes a subscription. Unsubscribing twice is harmless; returns
    /// whether anything was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // -- Internal helpers --

    /// Builds a handle for a live slot.
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Fails if attaching `child` beneath `parent` would create a cycle.
    fn check_cycle(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut idx = parent.idx;
        while idx != INVALID {
            if idx == child.idx {
                return Err(LayoutError::Cycle { parent, child });
            }
            idx = self.parent[idx as usize];
        }
        Ok(())
    }

    /// Links a parentless `c` under `p`, before `before` or at the end when
    /// `before` is [`INVALID`].
    fn link(&mut self, p: u32, c: u32, before: u32) {
        self.parent[c as usize] = p;
        if before == INVALID {
            self.prev_sibling[c as usize] = INVALID;
            self.next_sibling[c as usize] = INVALID;
            if self.first_child[p as usize] == INVALID {
                self.first_child[p as usize] = c;
            } else {
                // Walk to last child.
                let mut last = self.first_child[p as usize];
                while self.next_sibling[last as usize] != INVALID {
                    last = self.next_sibling[last as usize];
                }
                self.next_sibling[last as usize] = c;
                self.prev_sibling[c as usize] = last;
            }
        } else {
            let prev = self.prev_sibling[before as usize];
            self.next_sibling[c as usize] = before;
            self.prev_sibling[c as usize] = prev;
            if prev != INVALID {
                self.next_sibling[prev as usize] = c;
            } else {
                // `before` was the first child.
                self.first_child[p as usize] = c;
            }
            self.prev_sibling[before as usize] = c;
        }

        // Viewports flow from parent to child.
        let _ = self.dirty.add_dependency(c, p, dirty::VIEWPORT);

        self.dirty.mark(p, dirty::MEASURE);
        self.dirty.mark_with(c, dirty::VIEWPORT, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.layout_requested = true;
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Next slot after `idx` in a pre-order walk confined to the subtree of
    /// `top`.
    pub(crate) fn next_preorder(&self, idx: u32, top: u32) -> u32 {
        let first = self.first_child[idx as usize];
        if first != INVALID {
            return first;
        }
        let mut n = idx;
        while n != top && n != INVALID {
            let next = self.next_sibling[n as usize];
            if next != INVALID {
                return next;
            }
            n = self.parent[n as usize];
        }
        INVALID
    }

    /// Marks `idx` and its subtree for viewport recomputation.
    pub(crate) fn mark_viewport_subtree(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::VIEWPORT, &EagerPolicy);
    }

    /// Marks the subtrees of `idx`'s children for viewport recomputation.
    pub(crate) fn mark_content_viewports(&mut self, idx: u32) {
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.mark_viewport_subtree(child);
            child = self.next_sibling[child as usize];
        }
    }

    /// The root's parent content space: the window client area.
    pub(crate) fn window_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.config.window_size)
    }

    /// Own viewport of `idx` given the content viewport of its parent.
    pub(crate) fn own_viewport(&self, idx: u32, parent_content: Rect) -> Rect {
        let origin = self.rect[idx as usize].map_or(Point::ORIGIN, |r| r.origin());
        viewport::child_space_viewport(parent_content, origin)
    }

    /// Viewport that the children of `idx` see, before subtracting their
    /// own origins.
    pub(crate) fn content_of(&self, idx: u32, own: Rect) -> Rect {
        let i = idx as usize;
        let size = self.rect[i].map_or(Size::ZERO, |r| r.size());
        let mut content = viewport::to_content_space(own, self.transform[i].to_affine(size));
        if let Some(clip) = &self.clip[i] {
            content = viewport::apply_clip(content, clip);
        }
        if let Some(scroll) = &self.scroll[i] {
            content = viewport::apply_clip(content, scroll);
        }
        content
    }

    /// Walks from the root window to `idx`, returning its own and content
    /// viewports. `idx` must be attached.
    pub(crate) fn walk_viewport(&self, idx: u32) -> (Rect, Rect) {
        let mut chain = Vec::new();
        let mut n = idx;
        while n != INVALID {
            chain.push(n);
            n = self.parent[n as usize];
        }
        let mut content = self.window_rect();
        let mut own = content;
        for &n in chain.iter().rev() {
            own = self.own_viewport(n, content);
            content = self.content_of(n, own);
        }
        (own, content)
    }

    /// Rebuilds the depth-first pre-order traversal of attached nodes.
    pub(crate) fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        self.traversal_index.fill(INVALID);
        self.depth.fill(INVALID);
        self.dfs_collect(self.root, 0);
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "traversal length is bounded by the u32 slot count"
    )]
    fn dfs_collect(&mut self, idx: u32, depth: u32) {
        self.traversal_index[idx as usize] = self.traversal_order.len() as u32;
        self.traversal_order.push(idx);
        self.depth[idx as usize] = depth;
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child, depth + 1);
            child = self.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn new_tree_has_root() {
        let tree = LayoutTree::default();
        let root = tree.root();
        assert!(tree.is_alive(root));
        assert!(tree.is_attached(root));
        assert_eq!(tree.parent(root), None);
        assert!(tree.needs_layout());
    }

    #[test]
    fn create_and_destroy() {
        let mut tree = LayoutTree::default();
        let id = tree.create_node();
        assert!(tree.is_alive(id));
        assert!(!tree.is_attached(id));
        tree.destroy_node(id);
        assert!(!tree.is_alive(id));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut tree = LayoutTree::default();
        let id1 = tree.create_node();
        tree.destroy_node(id1);
        let id2 = tree.create_node();
        // id2 reuses the same slot but has a different generation.
        assert!(!tree.is_alive(id1));
        assert!(tree.is_alive(id2));
        assert_eq!(id1.index(), id2.index());
        assert_ne!(id1.generation(), id2.generation());
    }

    #[test]
    fn add_child_and_query() {
        let mut tree = LayoutTree::default();
        let parent = tree.create_node();
        let child1 = tree.create_node();
        let child2 = tree.create_node();

        tree.add_child(parent, child1).unwrap();
        tree.add_child(parent, child2).unwrap();

        assert_eq!(tree.parent(child1), Some(parent));
        let kids: Vec<_> = tree.children(parent).collect();
        assert_eq!(kids, vec![child1, child2]);
    }

    #[test]
    fn insert_before_works() {
        let mut tree = LayoutTree::default();
        let parent = tree.create_node();
        let a = tree.create_node();
        let b = tree.create_node();
        let c = tree.create_node();

        tree.add_child(parent, a).unwrap();
        tree.add_child(parent, c).unwrap();
        tree.insert_before(b, c).unwrap();
        let first = tree.create_node();
        tree.insert_before(first, a).unwrap();

        let kids: Vec<_> = tree.children(parent).collect();
        assert_eq!(kids, vec![first, a, b, c]);
    }

    #[test]
    fn reparent_moves_child() {
        let mut tree = LayoutTree::default();
        let p1 = tree.create_node();
        let p2 = tree.create_node();
        let child = tree.create_node();

        tree.add_child(p1, child).unwrap();
        tree.reparent(child, p2).unwrap();
        assert_eq!(tree.parent(child), Some(p2));
        assert!(tree.children(p1).next().is_none());
    }

    #[test]
    fn set_content_replaces_children() {
        let mut tree = LayoutTree::default();
        let root = tree.root();
        let a = tree.create_node();
        let b = tree.create_node();

        tree.set_content(root, Some(a)).unwrap();
        tree.set_content(root, Some(b)).unwrap();
        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![b]);
        assert_eq!(tree.parent(a), None);

        tree.set_content(root, None).unwrap();
        assert!(tree.children(root).next().is_none());
        assert!(!tree.is_attached(b));
    }

    #[test]
    fn attaching_beneath_descendant_is_rejected() {
        let mut tree = LayoutTree::default();
        let a = tree.create_node();
        let b = tree.create_node();
        let c = tree.create_node();
        tree.add_child(a, b).unwrap();
        tree.add_child(b, c).unwrap();

        assert!(matches!(
            tree.reparent(a, c),
            Err(LayoutError::Cycle { parent, child }) if parent == c && child == a
        ));
        assert!(matches!(tree.set_content(a, Some(a)), Err(LayoutError::Cycle { .. })));
        // Unchanged.
        assert_eq!(tree.parent(a), None);
        assert_eq!(tree.parent(c), Some(b));
    }

    #[test]
    fn descendants_is_preorder_and_confined() {
        let mut tree = LayoutTree::default();
        let a = tree.create_node();
        let b = tree.create_node();
        let c = tree.create_node();
        let d = tree.create_node();
        let sibling = tree.create_node();
        let root = tree.root();
        tree.add_child(root, a).unwrap();
        tree.add_child(root, sibling).unwrap();
        tree.add_child(a, b).unwrap();
        tree.add_child(b, c).unwrap();
        tree.add_child(a, d).unwrap();

        assert_eq!(tree.descendants(a).collect::<Vec<_>>(), vec![a, b, c, d]);
        assert_eq!(tree.descendants(c).collect::<Vec<_>>(), vec![c]);
    }

    #[test]
    fn change_view_on_plain_node_is_ignored() {
        let mut tree = LayoutTree::default();
        let node = tree.create_node();
        assert!(!tree.change_view(node, Some(5.0), None));
        assert_eq!(tree.scroll_state(node), None);
    }

    #[test]
    fn compute_viewport_of_detached_node_fails() {
        let mut tree = LayoutTree::default();
        let node = tree.create_node();
        assert!(matches!(
            tree.compute_effective_viewport(node),
            Err(LayoutError::Detached(id)) if id == node
        ));
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let mut tree = LayoutTree::default();
        let node = tree.create_node();
        let sub = tree.on_effective_viewport_changed(node, |_| Ok(()));
        assert_eq!(tree.subscriber_count(node), 1);
        assert!(tree.unsubscribe(sub));
        assert!(!tree.unsubscribe(sub));
        assert_eq!(tree.subscriber_count(node), 0);
    }

    #[test]
    fn destroy_drops_subscriptions() {
        let mut tree = LayoutTree::default();
        let node = tree.create_node();
        let sub = tree.on_effective_viewport_changed(node, |_| Ok(()));
        tree.destroy_node(node);
        assert!(!tree.unsubscribe(sub));
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut tree = LayoutTree::default();
        let parent = tree.create_node();
        let child = tree.create_node();
        tree.add_child(parent, child).unwrap();
        tree.destroy_node(parent);
    }

    #[test]
    #[should_panic(expected = "cannot destroy the root node")]
    fn destroy_root_panics() {
        let mut tree = LayoutTree::default();
        let root = tree.root();
        tree.destroy_node(root);
    }

    #[test]
    #[should_panic(expected = "child already has a parent")]
    fn add_attached_child_panics() {
        let mut tree = LayoutTree::default();
        let p1 = tree.create_node();
        let p2 = tree.create_node();
        let child = tree.create_node();
        tree.add_child(p1, child).unwrap();
        let _ = tree.add_child(p2, child);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_set_transform() {
        let mut tree = LayoutTree::default();
        let id = tree.create_node();
        tree.destroy_node(id);
        tree.set_transform(id, 1.0, 0.0, 0.0);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_parent() {
        let mut tree = LayoutTree::default();
        let id = tree.create_node();
        tree.destroy_node(id);
        let _ = tree.parent(id);
    }
}
