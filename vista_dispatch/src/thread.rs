// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The UI thread and its work queue.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError, Sender, SyncSender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use vista_core::error::LayoutError;
use vista_core::layout::LayoutTree;

use crate::{DispatchConfig, DispatchError};

type Job = Box<dyn FnOnce(&mut LayoutTree) + Send>;

enum Message {
    Run(Job),
    Ready,
    /// Answered with the tick count once the tick after it completes.
    Tick(SyncSender<u64>),
    Shutdown,
}

/// State shared between the UI thread and its handle.
#[derive(Default)]
struct TickState {
    tick: u64,
    stopped: bool,
    layout_error: Option<LayoutError>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<TickState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TickState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks the thread stopped on exit, including by panic.
struct StopGuard(Arc<Shared>);

impl Drop for StopGuard {
    fn drop(&mut self) {
        self.0.lock().stopped = true;
    }
}

/// A dedicated thread owning a [`LayoutTree`].
///
/// Work is run in submission order. After draining whatever work is queued,
/// the thread runs [`update_layout`](LayoutTree::update_layout) if layout is
/// pending and then advances its tick counter. When no work arrives it still
/// ticks every [`tick_interval`](DispatchConfig::tick_interval).
///
/// Until [`mark_ready`](Self::mark_ready) is called (or if the thread was
/// spawned with [`start_ready`](DispatchConfig::start_ready)), submitted work
/// is held back and no layout passes run. Ticks still advance.
///
/// Dropping the handle shuts the thread down.
pub struct UiThread {
    tx: Sender<Message>,
    shared: Arc<Shared>,
    thread_id: ThreadId,
    handle: Option<JoinHandle<()>>,
}

impl fmt::Debug for UiThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiThread")
            .field("thread_id", &self.thread_id)
            .finish_non_exhaustive()
    }
}

impl UiThread {
    /// Starts the UI thread and builds its tree.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread could not be spawned.
    pub fn spawn(config: DispatchConfig) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::new(Shared::default());
        let guard = StopGuard(Arc::clone(&shared));
        let handle = thread::Builder::new()
            .name("vista-ui".into())
            .spawn(move || run(&rx, &guard, config))?;
        Ok(Self {
            tx,
            shared,
            thread_id: handle.thread().id(),
            handle: Some(handle),
        })
    }

    /// Runs `f` on the UI thread and blocks until it returns.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Panicked`] if `f` panicked. The UI thread survives.
    /// - [`DispatchError::Disconnected`] if the thread has stopped.
    ///
    /// # Panics
    ///
    /// Panics if called from the UI thread itself, which would deadlock.
    pub fn execute<F, R>(&self, f: F) -> Result<R, DispatchError>
    where
        F: FnOnce(&mut LayoutTree) -> R + Send + 'static,
        R: Send + 'static,
    {
        assert!(
            thread::current().id() != self.thread_id,
            "UiThread::execute called from the UI thread"
        );
        let (result_tx, result_rx) = mpsc::sync_channel(1);
        self.send(Message::Run(Box::new(move |tree| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| f(tree)));
            let _ = result_tx.send(result.map_err(panic_message));
        })))?;
        match result_rx.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(DispatchError::Panicked(message)),
            Err(_) => Err(DispatchError::Disconnected),
        }
    }

    /// Queues `f` to run on the UI thread without waiting for it.
    ///
    /// A panic in `f` is contained and otherwise ignored.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Disconnected`] if the thread has stopped.
    pub fn post<F>(&self, f: F) -> Result<(), DispatchError>
    where
        F: FnOnce(&mut LayoutTree) + Send + 'static,
    {
        self.send(Message::Run(Box::new(move |tree| {
            let _ = panic::catch_unwind(AssertUnwindSafe(|| f(tree)));
        })))
    }

    /// Releases held-back work, in submission order, and lets layout passes
    /// run. Calling it again has no effect.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Disconnected`] if the thread has stopped.
    pub fn mark_ready(&self) -> Result<(), DispatchError> {
        self.send(Message::Ready)
    }

    /// Blocks until the UI thread completes a tick that started after this
    /// call, and returns the new tick count.
    ///
    /// The request travels through the work queue, so anything submitted
    /// before it, with [`execute`](Self::execute) or [`post`](Self::post),
    /// has run by the time it returns. If the thread is ready, the layout
    /// that work caused has settled too.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Disconnected`] if the thread stops first.
    pub fn wait_for_tick(&self) -> Result<u64, DispatchError> {
        let (tick_tx, tick_rx) = mpsc::sync_channel(1);
        self.send(Message::Tick(tick_tx))?;
        tick_rx.recv().map_err(|_| DispatchError::Disconnected)
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.shared.lock().tick
    }

    /// Takes the error of the most recent failed layout pass, if any.
    pub fn take_layout_error(&self) -> Option<LayoutError> {
        self.shared.lock().layout_error.take()
    }

    /// Whether the UI thread is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.shared.lock().stopped
    }

    /// Stops the UI thread and waits for it to exit. Queued work submitted
    /// before this call still runs.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Panicked`] if the UI thread died from a panic.
    pub fn shutdown(mut self) -> Result<(), DispatchError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), DispatchError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let _ = self.tx.send(Message::Shutdown);
        handle
            .join()
            .map_err(|payload| DispatchError::Panicked(panic_message(payload)))
    }

    fn send(&self, message: Message) -> Result<(), DispatchError> {
        self.tx
            .send(message)
            .map_err(|_| DispatchError::Disconnected)
    }
}

impl Drop for UiThread {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// The UI thread's main loop.
fn run(rx: &mpsc::Receiver<Message>, guard: &StopGuard, config: DispatchConfig) {
    let shared = &guard.0;
    let mut tree = LayoutTree::new(config.layout);
    let mut ready = config.start_ready;
    let mut held: VecDeque<Job> = VecDeque::new();
    let mut waiting: Vec<SyncSender<u64>> = Vec::new();

    loop {
        let mut next = match rx.recv_timeout(config.tick_interval) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => return,
        };
        while let Some(message) = next {
            match message {
                Message::Run(job) if ready => job(&mut tree),
                Message::Run(job) => held.push_back(job),
                Message::Ready => {
                    ready = true;
                    for job in held.drain(..) {
                        job(&mut tree);
                    }
                }
                Message::Tick(reply) => waiting.push(reply),
                Message::Shutdown => return,
            }
            next = match rx.try_recv() {
                Ok(message) => Some(message),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => return,
            };
        }

        let failed = if ready && tree.needs_layout() {
            tree.update_layout().err()
        } else {
            None
        };

        let mut state = shared.lock();
        if failed.is_some() {
            state.layout_error = failed;
        }
        state.tick += 1;
        let tick = state.tick;
        drop(state);
        for reply in waiting.drain(..) {
            let _ = reply.send(tick);
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
