// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `thicket_change` crate.
//!
//! These exercise whole dispatch scenarios: filters and forwarding combined,
//! summary accounting, trace output, and the behavior of subscription edits
//! made while a dispatch is in flight.

use std::cell::RefCell;
use std::rc::Rc;

use thicket_change::{
    ChangeEvent, ChangeHub, DispatchTrace, EventKind, FaultCause, HandlerFault, ListenerId,
    TraceRecord, TraceRecorder,
};

const GEOMETRY: EventKind = EventKind::new(0);
const HIERARCHY: EventKind = EventKind::new(1);
const STYLE: EventKind = EventKind::new(2);

type Log = Rc<RefCell<Vec<(&'static str, u32, EventKind)>>>;

fn watcher(hub: &mut ChangeHub<u32>, log: &Log, name: &'static str) -> ListenerId {
    let log = Rc::clone(log);
    hub.register(move |event, _scope| {
        log.borrow_mut().push((name, event.source, event.kind));
        Ok(())
    })
}

#[test]
fn editor_wiring_end_to_end() {
    // Canvas 1 contains group 2, which contains node 3; node 4 sits directly
    // on the canvas.
    let mut hub = ChangeHub::<u32>::new();
    hub.set_parent(2, 1);
    hub.set_parent(3, 2);
    hub.set_parent(4, 1);

    let log: Log = Rc::default();
    let inspector = watcher(&mut hub, &log, "inspector");
    let overview = watcher(&mut hub, &log, "overview");
    hub.attach(3, inspector, Some(GEOMETRY.into_set() | STYLE.into_set()))
        .unwrap();
    hub.attach(4, inspector, Some(GEOMETRY.into_set() | STYLE.into_set()))
        .unwrap();
    hub.attach(1, overview, None).unwrap();

    // A move of node 3 reaches the inspector and, via the group, the canvas
    // overview.
    let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 3)).unwrap();
    assert_eq!(summary.delivered, 2);
    assert_eq!(summary.forwarded, 2);
    assert_eq!(
        *log.borrow(),
        vec![("inspector", 3, GEOMETRY), ("overview", 3, GEOMETRY)]
    );

    // A hierarchy change on node 4 is not the inspector's business, but the
    // overview still hears it through the canvas.
    log.borrow_mut().clear();
    let summary = hub.dispatch(&ChangeEvent::new(HIERARCHY, 4)).unwrap();
    assert_eq!(summary.delivered, 1);
    assert_eq!(summary.filtered, 1);
    assert_eq!(*log.borrow(), vec![("overview", 4, HIERARCHY)]);
}

#[test]
fn components_ride_along_with_the_event() {
    let mut hub = ChangeHub::<u32>::new();
    let seen: Rc<RefCell<Vec<u32>>> = Rc::default();

    let seen2 = Rc::clone(&seen);
    let listener = hub.register(move |event, _scope| {
        seen2.borrow_mut().extend(event.components.iter().copied());
        Ok(())
    });
    hub.attach(1, listener, None).unwrap();

    // A group drop reports the members that moved with it.
    hub.dispatch(&ChangeEvent::with_components(HIERARCHY, 1, [3, 4, 5]))
        .unwrap();
    assert_eq!(*seen.borrow(), vec![3, 4, 5]);
}

#[test]
fn filters_apply_to_forwarded_events_too() {
    let mut hub = ChangeHub::<u32>::new();
    hub.set_parent(3, 2);

    let log: Log = Rc::default();
    let on_parent = watcher(&mut hub, &log, "parent");
    hub.attach(2, on_parent, Some(GEOMETRY.into_set())).unwrap();

    let summary = hub.dispatch(&ChangeEvent::new(STYLE, 3)).unwrap();
    assert_eq!(summary.forwarded, 1);
    assert_eq!(summary.filtered, 1);
    assert_eq!(summary.delivered, 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn summary_accounts_for_every_subscription() {
    let mut hub = ChangeHub::<u32>::new();
    hub.set_parent(3, 2);

    let log: Log = Rc::default();
    let originator = watcher(&mut hub, &log, "originator");
    let muted = watcher(&mut hub, &log, "muted");
    let heard = watcher(&mut hub, &log, "heard");
    let broken = hub.register(|_, _| Err(HandlerFault::new("out of sync")));

    hub.attach(3, originator, None).unwrap();
    hub.attach(3, muted, Some(HIERARCHY.into_set())).unwrap();
    hub.attach(3, heard, None).unwrap();
    hub.attach(2, broken, None).unwrap();

    let event = ChangeEvent::new(GEOMETRY, 3).from_listener(originator);
    let summary = hub.dispatch(&event).unwrap();

    assert_eq!(summary.delivered, 1);
    assert_eq!(summary.filtered, 1);
    assert_eq!(summary.skipped_origin, 1);
    assert_eq!(summary.forwarded, 1);
    assert_eq!(summary.faults.len(), 1);
    assert!(!summary.is_clean());
    assert_eq!(summary.faults[0].client, 2);
    assert!(matches!(
        summary.faults[0].cause,
        FaultCause::Failed(ref fault) if fault.message == "out of sync"
    ));
    assert_eq!(*log.borrow(), vec![("heard", 3, GEOMETRY)]);
}

#[test]
fn trace_recorder_reports_decisions_in_order() {
    let mut hub = ChangeHub::<u32>::new();
    hub.set_parent(3, 2);

    let on_child = hub.register(|_, _| Ok(()));
    let muted = hub.register(|_, _| Ok(()));
    let on_parent = hub.register(|_, _| Ok(()));
    hub.attach(3, on_child, None).unwrap();
    hub.attach(3, muted, Some(HIERARCHY.into_set())).unwrap();
    hub.attach(2, on_parent, None).unwrap();

    let mut rec = TraceRecorder::new();
    hub.dispatch_traced(&ChangeEvent::new(GEOMETRY, 3), &mut rec)
        .unwrap();

    assert_eq!(
        rec.records(),
        &[
            TraceRecord::Delivered {
                client: 3,
                listener: on_child,
                kind: GEOMETRY,
            },
            TraceRecord::Filtered {
                client: 3,
                listener: muted,
                kind: GEOMETRY,
            },
            TraceRecord::Forwarded { child: 3, parent: 2 },
            TraceRecord::Delivered {
                client: 2,
                listener: on_parent,
                kind: GEOMETRY,
            },
        ]
    );
}

#[test]
fn detach_during_dispatch_spares_the_in_flight_event() {
    let mut hub = ChangeHub::<u32>::new();
    let log: Log = Rc::default();

    let doomed = watcher(&mut hub, &log, "doomed");
    let log2 = Rc::clone(&log);
    let reaper = hub.register(move |event, scope| {
        log2.borrow_mut().push(("reaper", event.source, event.kind));
        scope.detach(7, doomed);
        Ok(())
    });
    hub.attach(7, reaper, None).unwrap();
    hub.attach(7, doomed, None).unwrap();

    // The detach lands after the current dispatch finishes delivering.
    let summary = hub.dispatch(&ChangeEvent::new(STYLE, 7)).unwrap();
    assert_eq!(summary.delivered, 2);
    assert!(!hub.is_attached(7, doomed));

    let summary = hub.dispatch(&ChangeEvent::new(STYLE, 7)).unwrap();
    assert_eq!(summary.delivered, 1);
    assert_eq!(
        *log.borrow(),
        vec![
            ("reaper", 7, STYLE),
            ("doomed", 7, STYLE),
            ("reaper", 7, STYLE),
        ]
    );
}

#[test]
fn raising_the_depth_limit_unblocks_a_deep_cascade() {
    fn wire_cascade(hub: &mut ChangeHub<u32>, hops: u32) {
        for client in 0..hops {
            let relay = hub.register(move |_, scope| {
                scope.emit(&ChangeEvent::new(STYLE, client + 1))?;
                Ok(())
            });
            hub.attach(client, relay, None).unwrap();
        }
    }

    let mut hub = ChangeHub::<u32>::new();
    wire_cascade(&mut hub, 7);
    let err = hub.dispatch(&ChangeEvent::new(STYLE, 0)).unwrap_err();
    assert_eq!(err.limit, hub.depth_limit());

    hub.set_depth_limit(10);
    let summary = hub.dispatch(&ChangeEvent::new(STYLE, 0)).unwrap();
    assert!(summary.is_clean());
}

#[test]
fn derived_events_from_handlers_reach_their_own_audience() {
    // A model listener turns geometry changes on the node into a style
    // refresh on its label, which a second listener consumes.
    let mut hub = ChangeHub::<u32>::new();
    let log: Log = Rc::default();

    let label_view = watcher(&mut hub, &log, "label");
    hub.attach(20, label_view, Some(STYLE.into_set())).unwrap();

    let log2 = Rc::clone(&log);
    let model = hub.register(move |event, scope| {
        log2.borrow_mut().push(("model", event.source, event.kind));
        let nested = scope.emit(&ChangeEvent::new(STYLE, 20))?;
        assert_eq!(nested.delivered, 1);
        assert!(nested.is_clean());
        Ok(())
    });
    hub.attach(10, model, Some(GEOMETRY.into_set())).unwrap();

    let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 10)).unwrap();
    assert_eq!(summary.delivered, 1);
    assert_eq!(
        *log.borrow(),
        vec![("model", 10, GEOMETRY), ("label", 20, STYLE)]
    );

    // The guard fully unwound; later dispatches start from depth zero.
    let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 10)).unwrap();
    assert_eq!(summary.delivered, 1);
}

#[test]
fn owners_are_tracked_and_protected_from_self_subscription() {
    let mut hub = ChangeHub::<u32>::new();
    let listener = hub.register_for(5, |_, _| Ok(()));
    assert_eq!(hub.owner_of(listener), Some(5));

    assert!(hub.attach(5, listener, None).is_err());
    assert!(hub.attach(6, listener, None).unwrap());

    assert!(hub.unregister(listener));
    assert_eq!(hub.owner_of(listener), None);
    assert!(!hub.is_attached(6, listener));
}

#[test]
fn suspension_is_visible_to_traces() {
    struct CountDrops(usize);
    impl DispatchTrace<u32> for CountDrops {
        fn dropped_suspended(&mut self, _event: &ChangeEvent<u32>) {
            self.0 += 1;
        }
    }

    let mut hub = ChangeHub::<u32>::new();
    let listener = hub.register(|_, _| Ok(()));
    hub.attach(7, listener, None).unwrap();

    hub.suspend();
    let mut drops = CountDrops(0);
    hub.dispatch_traced(&ChangeEvent::new(GEOMETRY, 7), &mut drops)
        .unwrap();
    hub.dispatch_traced(&ChangeEvent::new(STYLE, 7), &mut drops)
        .unwrap();
    assert_eq!(drops.0, 2);

    hub.resume();
    let summary = hub
        .dispatch_traced(&ChangeEvent::new(GEOMETRY, 7), &mut drops)
        .unwrap();
    assert_eq!(summary.delivered, 1);
    assert_eq!(drops.0, 2);
}
