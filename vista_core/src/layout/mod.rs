// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout tree data model.
//!
//! A *node* is an element of the layout tree. Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is destroyed, preventing use-after-free bugs at the API level.
//! - Topology: parent, first-child, and sibling links forming an ordered,
//!   acyclic tree under a single root (the window host).
//! - **Local properties** set by the caller: [`layout`](LayoutTree::set_layout)
//!   (explicit size, margin, alignment), [`transform`](LayoutTree::set_transform),
//!   [`clip`](LayoutTree::set_clip), and
//!   [`scrollability`](LayoutTree::set_scrollable).
//! - **Computed properties** produced by
//!   [`update_layout`](LayoutTree::update_layout): desired size, final
//!   rectangle, and effective viewport.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles
//! for cache-friendly traversal.
//!
//! # Box model
//!
//! Children overlap in their parent's content box; there are no panels. See
//! [`box_model`] for the arithmetic. Scroll containers offer their children
//! unbounded space and give each child a slot at least as large as the
//! container.
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding dirty channel
//! (see [`dirty`](crate::dirty)):
//!
//! - **MEASURE** / **ARRANGE**: local; the pass spreads them as sizes and
//!   rectangles actually change.
//! - **VIEWPORT**: propagates to all descendants, since what a node can see
//!   depends on every ancestor.
//! - **TOPOLOGY**: structural changes (attach, detach, create, destroy)
//!   that trigger a traversal-order rebuild.

pub mod box_model;
mod clip;
mod id;
mod pass;
mod props;
mod traverse;
mod tree;

pub use clip::ClipShape;
pub use id::{INVALID, NodeId};
pub use pass::{PassReport, PassState};
pub use props::{Alignment, Layout};
pub use traverse::{Children, Descendants};
pub use tree::LayoutTree;
