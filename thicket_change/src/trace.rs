// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explainability helpers for dispatch.
//!
//! The hub does not log. When an embedder needs to know why a listener did or
//! did not hear an event ("was it filtered? suspended? did an ancestor
//! forward it?"), it passes a trace sink into
//! [`ChangeHub::dispatch_traced`](crate::ChangeHub::dispatch_traced) and
//! inspects what was recorded. [`TraceRecorder`] is a ready-made sink that
//! keeps every decision in order; tests lean on it heavily.

use alloc::vec::Vec;

use crate::event::{ChangeEvent, DeliveryFault, ListenerId};
use crate::kind::EventKind;

/// A callback sink for dispatch tracing.
///
/// All methods have empty defaults so sinks only override what they need.
pub trait DispatchTrace<K> {
    /// A handler ran and returned `Ok`.
    fn delivered(&mut self, event: &ChangeEvent<K>, client: K, listener: ListenerId) {
        let _ = (event, client, listener);
    }

    /// A subscription was skipped by its kind filter.
    fn filtered(&mut self, event: &ChangeEvent<K>, client: K, listener: ListenerId) {
        let _ = (event, client, listener);
    }

    /// A subscription was skipped because it originated the event.
    fn skipped_origin(&mut self, event: &ChangeEvent<K>, client: K, listener: ListenerId) {
        let _ = (event, client, listener);
    }

    /// A delivery faulted; the fault carries the listener and cause.
    fn fault(&mut self, event: &ChangeEvent<K>, fault: &DeliveryFault<K>) {
        let _ = (event, fault);
    }

    /// The event was forwarded from `child` to its ancestor `parent`.
    fn forwarded(&mut self, event: &ChangeEvent<K>, child: K, parent: K) {
        let _ = (event, child, parent);
    }

    /// The parent chain revisited a client; forwarding stopped there.
    fn forward_cycle(&mut self, event: &ChangeEvent<K>, at: K) {
        let _ = (event, at);
    }

    /// The hub was suspended; the event was dropped without delivery.
    fn dropped_suspended(&mut self, event: &ChangeEvent<K>) {
        let _ = event;
    }

    /// An attach was ignored because the listener was already attached.
    fn duplicate_attach(&mut self, client: K, listener: ListenerId) {
        let _ = (client, listener);
    }
}

/// A trace sink that ignores everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoTrace;

impl<K> DispatchTrace<K> for NoTrace {}

/// One recorded dispatch decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceRecord<K> {
    /// Handler ran successfully.
    Delivered {
        /// Client whose subscription list was being delivered.
        client: K,
        /// The listener that ran.
        listener: ListenerId,
        /// Kind of the event.
        kind: EventKind,
    },
    /// Subscription skipped by its kind filter.
    Filtered {
        /// Client whose subscription list was being delivered.
        client: K,
        /// The listener that was skipped.
        listener: ListenerId,
        /// Kind of the event.
        kind: EventKind,
    },
    /// Subscription skipped as the event's originator.
    SkippedOrigin {
        /// Client whose subscription list was being delivered.
        client: K,
        /// The listener that was skipped.
        listener: ListenerId,
    },
    /// Delivery faulted.
    Fault(DeliveryFault<K>),
    /// Event forwarded up one parent hop.
    Forwarded {
        /// The client the event was delivered to before the hop.
        child: K,
        /// The ancestor receiving the forwarded event.
        parent: K,
    },
    /// Parent chain revisited a client.
    ForwardCycle {
        /// Where the revisit was detected.
        at: K,
    },
    /// Event dropped because the hub was suspended.
    DroppedSuspended {
        /// Kind of the dropped event.
        kind: EventKind,
    },
    /// Duplicate attach ignored.
    DuplicateAttach {
        /// Client the attach was addressed to.
        client: K,
        /// The already-attached listener.
        listener: ListenerId,
    },
}

/// Records every dispatch decision in order.
#[derive(Clone, Debug, Default)]
pub struct TraceRecorder<K> {
    records: Vec<TraceRecord<K>>,
}

impl<K> TraceRecorder<K> {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Clears all recorded decisions.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// All recorded decisions, oldest first.
    #[must_use]
    pub fn records(&self) -> &[TraceRecord<K>] {
        &self.records
    }

    /// Number of successful deliveries recorded.
    #[must_use]
    pub fn delivered_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Delivered { .. }))
            .count()
    }

    /// Number of faults recorded.
    #[must_use]
    pub fn fault_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Fault(_)))
            .count()
    }
}

impl<K: Copy> DispatchTrace<K> for TraceRecorder<K> {
    fn delivered(&mut self, event: &ChangeEvent<K>, client: K, listener: ListenerId) {
        self.records.push(TraceRecord::Delivered {
            client,
            listener,
            kind: event.kind,
        });
    }

    fn filtered(&mut self, event: &ChangeEvent<K>, client: K, listener: ListenerId) {
        self.records.push(TraceRecord::Filtered {
            client,
            listener,
            kind: event.kind,
        });
    }

    fn skipped_origin(&mut self, _event: &ChangeEvent<K>, client: K, listener: ListenerId) {
        self.records
            .push(TraceRecord::SkippedOrigin { client, listener });
    }

    fn fault(&mut self, _event: &ChangeEvent<K>, fault: &DeliveryFault<K>) {
        self.records.push(TraceRecord::Fault(fault.clone()));
    }

    fn forwarded(&mut self, _event: &ChangeEvent<K>, child: K, parent: K) {
        self.records.push(TraceRecord::Forwarded { child, parent });
    }

    fn forward_cycle(&mut self, _event: &ChangeEvent<K>, at: K) {
        self.records.push(TraceRecord::ForwardCycle { at });
    }

    fn dropped_suspended(&mut self, event: &ChangeEvent<K>) {
        self.records.push(TraceRecord::DroppedSuspended {
            kind: event.kind,
        });
    }

    fn duplicate_attach(&mut self, client: K, listener: ListenerId) {
        self.records
            .push(TraceRecord::DuplicateAttach { client, listener });
    }
}
