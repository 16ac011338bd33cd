// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by tree operations and layout passes.

use alloc::boxed::Box;

use crate::layout::NodeId;

/// Error type returned by event handlers.
pub type CallbackError = Box<dyn core::error::Error + Send + Sync>;

/// Return type of event handlers.
pub type CallbackResult = core::result::Result<(), CallbackError>;

/// Convenience alias for results with a [`LayoutError`].
pub type Result<T, E = LayoutError> = core::result::Result<T, E>;

/// Errors produced by [`LayoutTree`](crate::layout::LayoutTree).
///
/// Stale handles and other misuse of the API are programmer errors and panic
/// instead.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LayoutError {
    /// An `EffectiveViewportChanged` handler failed.
    ///
    /// The remaining handlers of the batch still ran, invalidations they
    /// requested are pending, and `LayoutUpdated` was not raised.
    #[error("viewport handler for {node:?} failed")]
    Handler {
        /// Node the failing subscription is attached to.
        node: NodeId,
        /// Error returned by the handler.
        #[source]
        source: CallbackError,
    },
    /// A `LayoutUpdated` handler failed. The pass itself completed.
    #[error("layout-updated handler failed")]
    LayoutUpdatedHandler {
        /// Error returned by the handler.
        #[source]
        source: CallbackError,
    },
    /// The pass did not reach a fixed point within the configured number of
    /// iterations.
    #[error("layout did not stabilize after {iterations} iterations")]
    IterationLimit {
        /// Iterations run before giving up.
        iterations: u32,
    },
    /// Attaching `child` beneath `parent` would create a cycle.
    #[error("cannot attach {child:?} beneath its own descendant {parent:?}")]
    Cycle {
        /// Requested parent.
        parent: NodeId,
        /// Node that would have been attached.
        child: NodeId,
    },
    /// The node is not connected to the root.
    #[error("{0:?} is not attached to the tree")]
    Detached(NodeId),
}
