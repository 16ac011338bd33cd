// Copyright 2026 the Vista Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drives a handful of effective-viewport scenarios through one layout tree.
//!
//! Every pass is traced to both a
//! [`PrettyPrintSink`](vista_debug::pretty::PrettyPrintSink) on stdout and a
//! [`RecorderSink`](vista_debug::recorder::RecorderSink); the recording is
//! exported as a Chrome trace JSON file at the end.

use std::cell::RefCell;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use kurbo::{Insets, Rect};
use vista_core::config::LayoutConfig;
use vista_core::layout::{Layout, LayoutTree, NodeId};
use vista_core::trace::{
    LayoutUpdatedEvent, PassBeginEvent, PassFailedEvent, PhaseBeginEvent, PhaseEndEvent,
    TraceSink, Tracer, ViewportChangedEvent,
};
use vista_debug::pretty::PrettyPrintSink;
use vista_debug::recorder::RecorderSink;

/// Forwards every event to two sinks.
struct Tee<'a> {
    a: &'a mut dyn TraceSink,
    b: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.a.on_pass_begin(e);
        self.b.on_pass_begin(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.a.on_phase_begin(e);
        self.b.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.a.on_phase_end(e);
        self.b.on_phase_end(e);
    }

    fn on_viewport_changed(&mut self, e: &ViewportChangedEvent) {
        self.a.on_viewport_changed(e);
        self.b.on_viewport_changed(e);
    }

    fn on_layout_updated(&mut self, e: &LayoutUpdatedEvent) {
        self.a.on_layout_updated(e);
        self.b.on_layout_updated(e);
    }

    fn on_pass_failed(&mut self, e: &PassFailedEvent) {
        self.a.on_pass_failed(e);
        self.b.on_pass_failed(e);
    }
}

fn sized(tree: &mut LayoutTree, parent: NodeId, size: f64) -> Result<NodeId, Box<dyn Error>> {
    let node = tree.create_node();
    tree.set_layout(node, Layout::new().with_size(size, size));
    tree.add_child(parent, node)?;
    Ok(node)
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();

    let mut tree = LayoutTree::new(LayoutConfig::default());
    let root = tree.root();
    let seen: Rc<RefCell<Vec<(NodeId, Rect)>>> = Rc::default();

    let mut pass = |tree: &mut LayoutTree, label: &str| -> Result<(), Box<dyn Error>> {
        println!("== {label}");
        let mut tee = Tee {
            a: &mut pretty,
            b: &mut recorder,
        };
        tree.update_layout_traced(&mut Tracer::new(&mut tee))?;
        Ok(())
    };

    // A 52x52 canvas inside a 100x100 border, both centered.
    let border = sized(&mut tree, root, 100.0)?;
    let canvas = sized(&mut tree, border, 52.0)?;
    let log = Rc::clone(&seen);
    tree.on_effective_viewport_changed(canvas, move |args| {
        log.borrow_mut().push((args.node(), args.effective_viewport()));
        Ok(())
    });
    pass(&mut tree, "centered canvas")?;

    // Translating the canvas itself changes nothing it can see.
    tree.set_transform(canvas, 30.0, 30.0, 0.0);
    pass(&mut tree, "own translation")?;

    // Translating the border shifts the canvas viewport the other way.
    tree.set_transform(border, 10.0, 20.0, 0.0);
    pass(&mut tree, "ancestor translation")?;
    tree.set_transform(border, 0.0, 0.0, 0.0);

    // Margin on the border moves everything beneath it.
    tree.set_margin(border, Insets::new(8.0, 0.0, 0.0, 0.0));
    pass(&mut tree, "ancestor margin")?;

    // A scroll container with larger content.
    tree.remove_from_parent(border);
    let viewer = sized(&mut tree, root, 100.0)?;
    tree.set_scrollable(viewer, true);
    let content = sized(&mut tree, viewer, 200.0)?;
    let log = Rc::clone(&seen);
    tree.on_effective_viewport_changed(content, move |args| {
        log.borrow_mut().push((args.node(), args.effective_viewport()));
        // Grow once the user scrolls, like a virtualizing list would.
        if args.effective_viewport().y0 > 0.0 {
            let node = args.node();
            args.invalidate_measure(node);
        }
        Ok(())
    });
    pass(&mut tree, "scroll container")?;

    tree.change_view(viewer, None, Some(10.0));
    pass(&mut tree, "change_view")?;

    println!("== delivered");
    for (node, viewport) in seen.borrow().iter() {
        println!("{node}: {viewport:?}");
    }

    let path = "trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    vista_debug::chrome::export(recorder.entries(), &mut writer)?;
    println!("Wrote {path} ({} passes)", tree.pass_count());
    Ok(())
}
