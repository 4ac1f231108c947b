// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Change: listener fanout and change notification for map editors.
//!
//! This crate provides the notification layer for editors where many views
//! (inspectors, overlays, the selection) observe changes to many components.
//! It models notification as a combination of:
//!
//! - **Event kinds** ([`EventKind`], [`KindSet`]): Named change domains
//!   (e.g., geometry, hierarchy, style), with cheap set filters.
//! - **A hub** ([`ChangeHub`]): Registration and subscription storage, keyed
//!   by an arbitrary client id. One handler can watch any number of clients.
//! - **Dispatch** ([`ChangeEvent`], [`DispatchSummary`]): Ordered, filtered
//!   delivery with per-listener fault isolation, so one broken listener
//!   never starves the rest.
//! - **Forwarding**: Events climb a parent chain the embedder mirrors into
//!   the hub, so containers hear about changes in their subtrees.
//! - **Re-entrancy control** ([`EmitScope`], [`LoopError`]): Handlers fire
//!   follow-up events through a scope that bounds nesting depth and turns
//!   runaway notification loops into errors instead of stack overflows.
//! - **Tracing** ([`DispatchTrace`], [`TraceRecorder`]): An optional sink
//!   that explains every delivery decision, for tests and debugging.
//!
//! ## Quick Start
//!
//! ```rust
//! use thicket_change::{ChangeEvent, ChangeHub, EventKind};
//!
//! const GEOMETRY: EventKind = EventKind::new(0);
//! const STYLE: EventKind = EventKind::new(1);
//!
//! let mut hub = ChangeHub::<u32>::new();
//!
//! // Register a handler, then attach it to the clients it should watch.
//! let listener = hub.register(|event, _scope| {
//!     assert_eq!(event.source, 7);
//!     Ok(())
//! });
//! hub.attach(7, listener, Some(GEOMETRY.into_set())).unwrap();
//!
//! // Geometry events on client 7 reach the listener; style events do not.
//! let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
//! assert_eq!(summary.delivered, 1);
//! let summary = hub.dispatch(&ChangeEvent::new(STYLE, 7)).unwrap();
//! assert_eq!(summary.filtered, 1);
//! ```
//!
//! ## Delivery Order
//!
//! For one event, the hub walks the source client's subscriptions in attach
//! order ([`ChangeHub::promote`] moves one to the front), then forwards the
//! event along the parent chain recorded with [`ChangeHub::set_parent`].
//! Subscriptions whose [`KindSet`] filter does not match are skipped, as is
//! the subscription that originated the event
//! ([`ChangeEvent::from_listener`]).
//!
//! ## Fault Isolation
//!
//! A handler that returns an error, or that is reached again while already
//! running, is recorded in [`DispatchSummary::faults`] and delivery moves on
//! to the next subscription. The one failure that does abort a dispatch is
//! an exhausted nesting limit: a chain of handlers feeding each other events
//! past [`ChangeHub::depth_limit`] fails with [`LoopError`], however deeply
//! the chain tried to bury it.
//!
//! ## Suspension
//!
//! [`ChangeHub::suspend`] drops events outright until a matching
//! [`ChangeHub::resume`]; there is no queue and no replay. Callers batching
//! edits re-notify once afterwards with a summary event of their own.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.
//!
//! ## Features
//!
//! This crate currently has no optional features. All functionality is always
//! available.

#![no_std]

extern crate alloc;

mod event;
mod hub;
mod kind;
mod trace;

pub use event::{
    AttachError, ChangeEvent, DeliveryFault, DispatchSummary, FaultCause, HandlerFault,
    ListenerId, LoopError, NotAttachedError,
};
pub use hub::{ChangeHub, DEFAULT_DEPTH_LIMIT, EmitScope, SharedHandler};
pub use kind::{EventKind, KindSet, KindSetIter};
pub use trace::{DispatchTrace, NoTrace, TraceRecord, TraceRecorder};
