// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! UI-thread marshalling for a vista layout tree.
//!
//! A [`LayoutTree`](vista_core::layout::LayoutTree) is single-context: its
//! callbacks are plain boxed closures, so it is not `Send`. [`UiThread`]
//! gives other threads a way in. It spawns a dedicated thread that builds and
//! owns the tree, runs queued work against it, and drives layout passes on a
//! fixed tick.
//!
//! ```no_run
//! use vista_core::layout::Layout;
//! use vista_dispatch::{DispatchConfig, UiThread};
//!
//! let ui = UiThread::spawn(DispatchConfig::default()).unwrap();
//! let canvas = ui
//!     .execute(|tree| {
//!         let canvas = tree.create_node();
//!         tree.set_layout(canvas, Layout::new().with_size(52.0, 52.0));
//!         tree.set_content(tree.root(), Some(canvas)).map(|()| canvas)
//!     })
//!     .unwrap()
//!     .unwrap();
//! ui.wait_for_tick().unwrap();
//! let viewport = ui.execute(move |tree| tree.effective_viewport(canvas)).unwrap();
//! assert!(viewport.is_some());
//! ```

use std::time::Duration;

use vista_core::config::LayoutConfig;

mod thread;

pub use thread::UiThread;

/// Errors returned by [`UiThread`] operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DispatchError {
    /// The UI thread is no longer running.
    #[error("the UI thread has stopped")]
    Disconnected,
    /// The dispatched work panicked. The UI thread is still running.
    #[error("dispatched work panicked: {0}")]
    Panicked(String),
}

/// Configuration for [`UiThread::spawn`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DispatchConfig {
    /// Configuration of the tree built on the UI thread.
    pub layout: LayoutConfig,
    /// Longest time between two ticks when no work arrives.
    pub tick_interval: Duration,
    /// Whether queued work runs immediately, or waits for
    /// [`UiThread::mark_ready`].
    pub start_ready: bool,
}

impl DispatchConfig {
    /// Default tick interval, roughly one 60 Hz frame.
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

    /// Returns a copy that holds work back until the host is ready.
    #[must_use]
    pub const fn deferred(mut self) -> Self {
        self.start_ready = false;
        self
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
            start_ready: true,
        }
    }
}
