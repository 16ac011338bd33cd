// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout tree with effective-viewport tracking and change notification.
//!
//! `vista_core` maintains a tree of layout nodes, runs measure/arrange passes
//! over the parts of it that changed, and tells interested nodes which region
//! around them is currently visible. It is `no_std` compatible (with `alloc`)
//! and uses array-based struct-of-arrays storage with generational index
//! handles, like a compositor's layer store.
//!
//! # Architecture
//!
//! Every mutation marks dirty state; a pass drives the tree back to a fixed
//! point:
//!
//! ```text
//!   set_layout / set_transform / change_view / set_content
//!       │
//!       ▼
//!   dirty channels ──► LayoutTree::update_layout()
//!                          │
//!        ┌─────────────────┘
//!        ▼
//!   Measuring ──► Arranging ──► Stabilizing ──► Idle ──► LayoutUpdated
//!        ▲                          │
//!        └──── handler invalidation ┘
//! ```
//!
//! **[`layout`]**: The node store, topology, the minimal box model, and the
//! pass state machine ([`PassState`](layout::PassState)).
//!
//! **[`viewport`]**: Effective-viewport math and the
//! [`ViewportClip`](viewport::ViewportClip) capability trait that containers
//! implement to clip or offset what their descendants can see.
//!
//! **[`scroll`]**: [`ScrollState`](scroll::ScrollState): clamped offsets
//! over a scrollable extent.
//!
//! **[`event`]**: Subscriptions for `EffectiveViewportChanged` and
//! `LayoutUpdated`, batched per pass.
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`.
//!
//! **[`transform`]**: 2D render transforms (translation plus rotation about
//! the node center).
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! pass instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! **[`config`]** and **[`error`]**: Tree configuration and the error type
//! returned by passes.
//!
//! # Example
//!
//! ```
//! use kurbo::Rect;
//! use vista_core::config::LayoutConfig;
//! use vista_core::layout::{Layout, LayoutTree};
//!
//! let mut tree = LayoutTree::new(LayoutConfig::default());
//! let node = tree.create_node();
//! tree.set_layout(node, Layout::new().with_size(52.0, 52.0));
//! tree.set_content(tree.root(), Some(node)).unwrap();
//! tree.update_layout().unwrap();
//!
//! assert_eq!(
//!     tree.effective_viewport(node),
//!     Some(Rect::new(-574.0, -424.0, 626.0, 476.0))
//! );
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod config;
pub mod dirty;
pub mod error;
pub mod event;
pub mod layout;
pub mod scroll;
pub mod trace;
pub mod transform;
pub mod viewport;
