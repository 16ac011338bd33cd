// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `UiThread` behavior with a real thread.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use kurbo::Rect;
use vista_core::error::LayoutError;
use vista_core::layout::{Layout, NodeId, PassState};
use vista_dispatch::{DispatchConfig, DispatchError, UiThread};

fn fast() -> DispatchConfig {
    DispatchConfig {
        tick_interval: Duration::from_millis(2),
        ..DispatchConfig::default()
    }
}

fn attach_canvas(ui: &UiThread) -> NodeId {
    ui.execute(|tree| {
        let canvas = tree.create_node();
        tree.set_layout(canvas, Layout::new().with_size(52.0, 52.0));
        tree.set_content(tree.root(), Some(canvas)).unwrap();
        canvas
    })
    .unwrap()
}

#[test]
fn execute_returns_result_and_layout_runs_on_tick() {
    let ui = UiThread::spawn(fast()).unwrap();
    let canvas = attach_canvas(&ui);
    ui.wait_for_tick().unwrap();

    let viewport = ui.execute(move |tree| tree.effective_viewport(canvas)).unwrap();
    assert_eq!(viewport, Some(Rect::new(-574.0, -424.0, 626.0, 476.0)));
    assert!(ui.take_layout_error().is_none());
    ui.shutdown().unwrap();
}

#[test]
fn ticks_advance_while_idle() {
    let ui = UiThread::spawn(fast()).unwrap();
    let first = ui.wait_for_tick().unwrap();
    let second = ui.wait_for_tick().unwrap();
    assert!(second > first);
    assert!(ui.tick_count() >= second);
}

#[test]
fn panicking_work_is_reported_and_thread_survives() {
    let ui = UiThread::spawn(fast()).unwrap();
    let err = ui.execute(|_| -> u32 { panic!("boom") }).unwrap_err();
    assert_eq!(err, DispatchError::Panicked("boom".to_owned()));

    ui.post(|_| panic!("ignored")).unwrap();
    let root = ui.execute(|tree| tree.root()).unwrap();
    assert_eq!(root.index(), 0);
    assert!(ui.is_running());
}

#[test]
fn posted_work_runs_in_submission_order() {
    let ui = UiThread::spawn(fast()).unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    for i in 0..3 {
        let log = Arc::clone(&log);
        ui.post(move |_| log.lock().unwrap().push(i)).unwrap();
    }
    ui.execute(|_| ()).unwrap();
    assert_eq!(*log.lock().unwrap(), [0, 1, 2]);
}

#[test]
fn posted_work_has_settled_after_wait_for_tick() {
    let ui = UiThread::spawn(fast()).unwrap();
    let canvas = attach_canvas(&ui);
    ui.wait_for_tick().unwrap();

    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    ui.post(move |tree| {
        tree.set_layout(canvas, Layout::new().with_size(100.0, 100.0));
        tree.on_effective_viewport_changed(canvas, move |args| {
            *sink.lock().unwrap() = Some(args.effective_viewport());
            Ok(())
        });
    })
    .unwrap();
    ui.wait_for_tick().unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        Some(Rect::new(-550.0, -400.0, 650.0, 500.0))
    );
}

#[test]
fn handler_panic_inside_execute_keeps_subscriptions() {
    let ui = UiThread::spawn(fast()).unwrap();
    let canvas = attach_canvas(&ui);
    ui.wait_for_tick().unwrap();

    let err = ui
        .execute(move |tree| {
            tree.on_effective_viewport_changed(canvas, |_| panic!("handler panicked"));
            tree.set_layout(canvas, Layout::new().with_size(60.0, 60.0));
            tree.update_layout()
        })
        .unwrap_err();
    assert_eq!(err, DispatchError::Panicked("handler panicked".to_owned()));

    let (count, state) = ui
        .execute(move |tree| (tree.subscriber_count(canvas), tree.state()))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(state, PassState::Idle);
    assert!(ui.is_running());
}

#[test]
fn work_is_held_until_ready() {
    let ui = UiThread::spawn(fast().deferred()).unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    for i in 0..3 {
        let log = Arc::clone(&log);
        ui.post(move |_| log.lock().unwrap().push(i)).unwrap();
    }
    ui.wait_for_tick().unwrap();
    ui.wait_for_tick().unwrap();
    assert!(log.lock().unwrap().is_empty());

    ui.mark_ready().unwrap();
    // Released work runs before anything submitted later.
    ui.execute(|_| ()).unwrap();
    assert_eq!(*log.lock().unwrap(), [0, 1, 2]);
}

#[test]
fn failed_pass_is_kept_for_the_host() {
    let ui = UiThread::spawn(fast()).unwrap();
    ui.execute(|tree| {
        let canvas = tree.create_node();
        tree.on_effective_viewport_changed(canvas, |_| Err("rejected".into()));
        tree.set_content(tree.root(), Some(canvas)).unwrap();
    })
    .unwrap();
    ui.wait_for_tick().unwrap();

    let err = ui.take_layout_error();
    assert!(matches!(err, Some(LayoutError::Handler { .. })), "got {err:?}");
    assert!(ui.take_layout_error().is_none());
}

#[test]
fn panicking_handler_stops_the_thread() {
    let ui = UiThread::spawn(fast()).unwrap();
    ui.execute(|tree| {
        let canvas = tree.create_node();
        tree.on_effective_viewport_changed(canvas, |_| panic!("handler panicked"));
        tree.set_content(tree.root(), Some(canvas)).unwrap();
    })
    .unwrap();

    assert_eq!(ui.wait_for_tick(), Err(DispatchError::Disconnected));
    assert!(!ui.is_running());
    assert_eq!(ui.execute(|_| ()), Err(DispatchError::Disconnected));
    assert_eq!(
        ui.shutdown(),
        Err(DispatchError::Panicked("handler panicked".to_owned()))
    );
}
