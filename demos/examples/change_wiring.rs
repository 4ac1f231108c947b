// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notification wired to a live selection.
//!
//! A hub carries geometry events from the map to a selection model, which
//! drops its cached bounds in response. Along the way: kind filters, parent
//! forwarding with a trace, suspend/resume, and the nesting trip-wire that
//! turns a listener cascade into an error instead of a hang.
//!
//! Run:
//! - `cargo run -p thicket_demos --example change_wiring`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Rect;
use thicket_change::{ChangeEvent, ChangeHub, TraceRecorder};
use thicket_map::{MapNode, MapTree, NodeId, events};
use thicket_selection::SelectionModel;

fn main() {
    let mut tree = MapTree::new();
    let canvas = tree.insert(MapNode::canvas(Rect::new(0.0, 0.0, 640.0, 480.0)), None);
    let left = tree.insert(MapNode::plain(Rect::new(40.0, 40.0, 160.0, 100.0)), Some(canvas));
    let right = tree.insert(MapNode::plain(Rect::new(240.0, 60.0, 360.0, 120.0)), Some(canvas));
    let wire = tree.insert(MapNode::link_between(left, right), Some(canvas));

    let selection = Rc::new(RefCell::new(SelectionModel::new()));
    selection.borrow_mut().set_to(&mut tree, [left, right]);
    println!("selected bounds: {:?}", selection.borrow().bounds(&tree));

    // The selection cares about geometry on its members; everything else
    // passes it by, thanks to the kind filter on the subscription.
    let mut hub = ChangeHub::<NodeId>::new();
    let watcher = {
        let selection = Rc::clone(&selection);
        hub.register(move |event, _scope| {
            selection.borrow().invalidate_bounds();
            println!("  watcher: geometry changed on {:?}, cached bounds dropped", event.source);
            Ok(())
        })
    };
    let geometry_only = Some(events::GEOMETRY.into_set());
    hub.attach(left, watcher, geometry_only).unwrap();
    hub.attach(right, watcher, geometry_only).unwrap();

    println!();
    println!("== a node moves ==");
    tree.set_bounds(left, Rect::new(60.0, 180.0, 180.0, 240.0));
    tree.route_link(wire);
    let summary = hub.dispatch(&ChangeEvent::new(events::GEOMETRY, left)).unwrap();
    println!("geometry at left: delivered {}", summary.delivered);
    println!("recomputed bounds: {:?}", selection.borrow().bounds(&tree));

    // A style change on the same node never reaches the watcher.
    let summary = hub.dispatch(&ChangeEvent::new(events::STYLE, left)).unwrap();
    println!(
        "style at left: delivered {}, filtered {}",
        summary.delivered, summary.filtered,
    );

    println!();
    println!("== suspend and resume ==");
    hub.suspend();
    let summary = hub.dispatch(&ChangeEvent::new(events::GEOMETRY, left)).unwrap();
    println!(
        "while suspended: delivered {}, dropped={} (nothing is queued)",
        summary.delivered, summary.dropped_suspended,
    );
    hub.resume();

    println!();
    println!("== parent forwarding, traced ==");
    // A map-level listener hears about changes anywhere below the canvas
    // once the parent chain is recorded in the hub.
    let map_watcher = hub.register(move |event, _scope| {
        println!("  map watcher: change at {:?} reached the canvas", event.source);
        Ok(())
    });
    hub.attach(canvas, map_watcher, None).unwrap();
    hub.set_parent(left, canvas);
    hub.set_parent(right, canvas);

    let mut recorder = TraceRecorder::new();
    let summary = hub
        .dispatch_traced(&ChangeEvent::new(events::GEOMETRY, left), &mut recorder)
        .unwrap();
    println!("delivered {}, forwarded {} hop(s)", summary.delivered, summary.forwarded);
    for record in recorder.records() {
        println!("  trace: {record:?}");
    }

    println!();
    println!("== the nesting trip-wire ==");
    // A cascade: each stage reacts to geometry by deriving geometry for the
    // next stage. The depth guard cuts the chain off at the hub's limit
    // rather than letting it run away.
    let stages: Vec<NodeId> = (0..7)
        .map(|i| {
            let x = 40.0 + 80.0 * f64::from(i);
            tree.insert(MapNode::plain(Rect::new(x, 400.0, x + 60.0, 440.0)), Some(canvas))
        })
        .collect();
    for pair in stages.windows(2) {
        let (stage, next) = (pair[0], pair[1]);
        let relay = hub.register(move |event, scope| {
            println!("  relay at depth {}: {:?} -> {:?}", scope.depth(), stage, next);
            scope.emit(&ChangeEvent::new(event.kind, next))?;
            Ok(())
        });
        hub.attach(stage, relay, geometry_only).unwrap();
    }
    match hub.dispatch(&ChangeEvent::new(events::GEOMETRY, stages[0])) {
        Ok(_) => println!("cascade ran to completion"),
        Err(err) => println!("cascade stopped: {err}"),
    }

    // The guard is per-dispatch; the hub itself is fine afterwards.
    let summary = hub.dispatch(&ChangeEvent::new(events::GEOMETRY, right)).unwrap();
    println!();
    println!(
        "the hub survives: delivered {}, forwarded {}",
        summary.delivered, summary.forwarded,
    );
}
