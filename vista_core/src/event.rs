// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout event subscriptions.
//!
//! Two events are raised by a pass:
//!
//! - **`EffectiveViewportChanged`** is per node. It is delivered during the
//!   Stabilizing phase to every subscription whose node's freshly computed
//!   viewport differs (by value) from the last value *that subscription* was
//!   given. Handlers may request further layout work through
//!   [`ViewportChangedArgs`]; the pass loops until nothing is requested.
//! - **`LayoutUpdated`** is tree-wide and raised exactly once when a pass
//!   reaches its fixed point, after every viewport notification of that pass.
//!
//! Subscriptions hold [`NodeId`] keys, not references. They are resolved
//! against tree membership when a batch is dispatched, so a subscription on a
//! detached node simply stays dormant until the node is attached again.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use crate::error::{CallbackError, CallbackResult};
use crate::layout::{LayoutTree, NodeId, PassReport};

/// Handle returned by subscription methods, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Layout work requested by a handler, applied once the batch is delivered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum LayoutRequest {
    InvalidateMeasure(NodeId),
    InvalidateArrange(NodeId),
    ChangeView {
        node: NodeId,
        x: Option<f64>,
        y: Option<f64>,
    },
}

/// Arguments passed to an `EffectiveViewportChanged` handler.
pub struct ViewportChangedArgs<'a> {
    tree: &'a LayoutTree,
    node: NodeId,
    viewport: Rect,
    requests: &'a mut Vec<LayoutRequest>,
}

impl<'a> ViewportChangedArgs<'a> {
    /// Node whose viewport changed.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// New effective viewport, in the node's local space.
    #[must_use]
    pub fn effective_viewport(&self) -> Rect {
        self.viewport
    }

    /// Read access to the tree as of this notification.
    ///
    /// Subscription queries made through it see no subscriptions while a
    /// batch is being delivered.
    #[must_use]
    pub fn tree(&self) -> &'a LayoutTree {
        self.tree
    }

    /// Requests a measure of `node` within the current pass.
    pub fn invalidate_measure(&mut self, node: NodeId) {
        self.requests.push(LayoutRequest::InvalidateMeasure(node));
    }

    /// Requests an arrange of `node` within the current pass.
    pub fn invalidate_arrange(&mut self, node: NodeId) {
        self.requests.push(LayoutRequest::InvalidateArrange(node));
    }

    /// Requests a scroll of `node` within the current pass.
    pub fn change_view(&mut self, node: NodeId, x: Option<f64>, y: Option<f64>) {
        self.requests.push(LayoutRequest::ChangeView { node, x, y });
    }
}

impl fmt::Debug for ViewportChangedArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportChangedArgs")
            .field("node", &self.node)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

/// Arguments passed to a `LayoutUpdated` handler.
pub struct LayoutUpdatedArgs<'a> {
    pub(crate) tree: &'a LayoutTree,
    pub(crate) report: &'a PassReport,
}

impl<'a> LayoutUpdatedArgs<'a> {
    /// Read access to the settled tree.
    #[must_use]
    pub fn tree(&self) -> &'a LayoutTree {
        self.tree
    }

    /// Work done by the pass that just completed.
    #[must_use]
    pub fn report(&self) -> &'a PassReport {
        self.report
    }
}

impl fmt::Debug for LayoutUpdatedArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutUpdatedArgs")
            .field("report", self.report)
            .finish_non_exhaustive()
    }
}

type ViewportHandler = Box<dyn FnMut(&mut ViewportChangedArgs<'_>) -> CallbackResult>;
type LayoutUpdatedHandler = Box<dyn FnMut(&LayoutUpdatedArgs<'_>) -> CallbackResult>;

struct ViewportSubscription {
    id: SubscriptionId,
    node: NodeId,
    /// Last value delivered to this subscription.
    last: Option<Rect>,
    handler: ViewportHandler,
}

/// Registry of event subscriptions, owned by a [`LayoutTree`].
///
/// Only the tree builds one; reach it through the tree's subscription
/// methods.
pub struct EventDispatcher {
    viewport: Vec<ViewportSubscription>,
    layout_updated: Vec<(SubscriptionId, LayoutUpdatedHandler)>,
    next_id: u64,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("viewport_subscriptions", &self.viewport.len())
            .field("layout_updated_subscriptions", &self.layout_updated.len())
            .finish_non_exhaustive()
    }
}

impl EventDispatcher {
    pub(crate) const fn new() -> Self {
        Self {
            viewport: Vec::new(),
            layout_updated: Vec::new(),
            next_id: 0,
        }
    }

    fn allocate_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn subscribe_viewport(&mut self, node: NodeId, handler: ViewportHandler) -> SubscriptionId {
        let id = self.allocate_id();
        self.viewport.push(ViewportSubscription {
            id,
            node,
            last: None,
            handler,
        });
        id
    }

    pub(crate) fn subscribe_layout_updated(&mut self, handler: LayoutUpdatedHandler) -> SubscriptionId {
        let id = self.allocate_id();
        self.layout_updated.push((id, handler));
        id
    }

    /// Removes a subscription. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if let Some(pos) = self.viewport.iter().position(|s| s.id == id) {
            self.viewport.remove(pos);
            return true;
        }
        if let Some(pos) = self.layout_updated.iter().position(|(s, _)| *s == id) {
            self.layout_updated.remove(pos);
            return true;
        }
        false
    }

    /// Number of viewport subscriptions on `node`.
    #[must_use]
    pub fn subscriber_count(&self, node: NodeId) -> usize {
        self.viewport.iter().filter(|s| s.node == node).count()
    }

    /// Number of `LayoutUpdated` subscriptions.
    #[must_use]
    pub fn layout_updated_count(&self) -> usize {
        self.layout_updated.len()
    }

    /// Returns whether delivering `viewport` for `node` would call at least
    /// one handler.
    #[must_use]
    pub fn would_notify(&self, node: NodeId, viewport: Rect) -> bool {
        self.viewport
            .iter()
            .any(|s| s.node == node && s.last != Some(viewport))
    }

    /// Forgets the last delivered value of every subscription on `node`, so
    /// the next computed viewport is delivered again.
    pub(crate) fn reset_node(&mut self, node: NodeId) {
        for sub in self.viewport.iter_mut().filter(|s| s.node == node) {
            sub.last = None;
        }
    }

    /// Drops every subscription on `node`.
    pub(crate) fn remove_node(&mut self, node: NodeId) {
        self.viewport.retain(|s| s.node != node);
    }

    /// Delivers `viewport` to every subscription on `node` that has not seen
    /// this exact value, in registration order.
    ///
    /// Every eligible handler runs even if an earlier one fails; the first
    /// error is returned. On success, returns the number of handlers called.
    pub(crate) fn notify(
        &mut self,
        tree: &LayoutTree,
        node: NodeId,
        viewport: Rect,
        requests: &mut Vec<LayoutRequest>,
    ) -> Result<usize, CallbackError> {
        let mut delivered = 0;
        let mut first_error = None;
        for sub in self.viewport.iter_mut() {
            if sub.node != node || sub.last == Some(viewport) {
                continue;
            }
            sub.last = Some(viewport);
            delivered += 1;
            let mut args = ViewportChangedArgs {
                tree,
                node,
                viewport,
                requests: &mut *requests,
            };
            if let Err(err) = (sub.handler)(&mut args) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(delivered),
        }
    }

    /// Raises `LayoutUpdated`. Every handler runs; the first error is
    /// returned.
    pub(crate) fn notify_layout_updated(&mut self, args: &LayoutUpdatedArgs<'_>) -> Result<(), CallbackError> {
        let mut first_error = None;
        for (_, handler) in self.layout_updated.iter_mut() {
            if let Err(err) = handler(args) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
