// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Vista uses multi-channel dirty tracking (via [`understory_dirty`]) as the
//! tree's global dirty queue. Each channel represents an independent category
//! of pending work.
//!
//! # Propagation semantics
//!
//! - **Local**: [`MEASURE`] and [`ARRANGE`] are marked with the default
//!   policy. Only the invalidated node is queued; the pass itself decides
//!   whether the change spreads (a new desired size re-measures the parent, a
//!   new slot re-arranges the child).
//!
//! - **Propagating**: [`VIEWPORT`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and has dependency edges
//!   from child to parent. Moving, clipping, scrolling, or transforming a
//!   node changes what every descendant can see, so marking a node marks its
//!   whole subtree.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on attach, detach, create, and
//!   destroy. It triggers a traversal-order rebuild at the start of the next
//!   pass iteration.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Each
//! [`LayoutTree::update_layout`](crate::layout::LayoutTree::update_layout)
//! iteration drains the channels into per-node flags and reports the work it
//! did in a [`PassReport`](crate::layout::PassReport).

use understory_dirty::Channel;

/// Desired size may have changed; the node must be measured again.
pub const MEASURE: Channel = Channel::new(0);

/// Final rectangle may have changed; the node must be arranged again.
pub const ARRANGE: Channel = Channel::new(1);

/// Effective viewport must be recomputed for the node and its descendants.
pub const VIEWPORT: Channel = Channel::new(2);

/// Tree topology changed; triggers traversal order rebuild.
pub const TOPOLOGY: Channel = Channel::new(3);
