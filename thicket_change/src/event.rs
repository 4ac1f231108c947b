// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events, listener handles, delivery summaries, and dispatch errors.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;

use crate::kind::EventKind;

/// Handle for a registered listener.
///
/// Returned by [`ChangeHub::register`](crate::ChangeHub::register) and used to
/// attach, detach, and promote the listener, and to stamp events with their
/// originator via [`ChangeEvent::origin`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u32);

impl ListenerId {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A change notification.
///
/// Carries the kind tag, the client the change happened on, and optionally a
/// list of affected child components (for bulk hierarchy events). Events
/// stamped with an [`origin`](Self::origin) listener are not delivered back to
/// that listener, which keeps a listener that mutates its own subject from
/// hearing its own echo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent<K> {
    /// What aspect changed.
    pub kind: EventKind,
    /// The component the change happened on.
    pub source: K,
    /// Child components affected by a bulk hierarchy change, if any.
    pub components: SmallVec<[K; 4]>,
    /// The listener that caused this event, if it came from inside a handler.
    pub origin: Option<ListenerId>,
}

impl<K> ChangeEvent<K> {
    /// Creates an event with no affected children and no origin.
    pub fn new(kind: EventKind, source: K) -> Self {
        Self {
            kind,
            source,
            components: SmallVec::new(),
            origin: None,
        }
    }

    /// Creates a bulk hierarchy event listing the affected children.
    pub fn with_components(kind: EventKind, source: K, components: impl IntoIterator<Item = K>) -> Self {
        Self {
            kind,
            source,
            components: components.into_iter().collect(),
            origin: None,
        }
    }

    /// Stamps the event with the listener that produced it.
    #[must_use]
    pub fn from_listener(mut self, origin: ListenerId) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// Failure reported by a handler for one delivery.
///
/// Handler failures are isolated: they are recorded in the
/// [`DispatchSummary`] and delivery continues to the remaining listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerFault {
    /// Human-readable description of what went wrong.
    pub message: String,
}

impl HandlerFault {
    /// Creates a fault with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for HandlerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler fault: {}", self.message)
    }
}

impl core::error::Error for HandlerFault {}

/// Why a delivery to one listener did not complete normally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FaultCause {
    /// The handler ran and reported a failure.
    Failed(HandlerFault),
    /// The handler was already executing when a nested dispatch reached it
    /// again, so the delivery was skipped.
    Busy,
}

/// One failed delivery, with enough context to diagnose it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryFault<K> {
    /// The listener that faulted.
    pub listener: ListenerId,
    /// The client whose subscription list was being delivered.
    pub client: K,
    /// The kind of the event being delivered.
    pub kind: EventKind,
    /// What went wrong.
    pub cause: FaultCause,
}

/// Structured result of one top-level dispatch.
///
/// Counts cover the source client and every ancestor the event was forwarded
/// to. Nested dispatches started by handlers report their own summaries to
/// those handlers and are not folded in here.
#[derive(Clone, Debug)]
pub struct DispatchSummary<K> {
    /// Number of handlers that ran and returned `Ok`.
    pub delivered: usize,
    /// Number of subscriptions skipped by their kind filter.
    pub filtered: usize,
    /// Number of subscriptions skipped because they originated the event.
    pub skipped_origin: usize,
    /// Number of ancestors the event was forwarded to.
    pub forwarded: usize,
    /// `true` if the hub was suspended and the event was dropped outright.
    pub dropped_suspended: bool,
    /// Failed deliveries, in the order they occurred.
    pub faults: Vec<DeliveryFault<K>>,
}

impl<K> DispatchSummary<K> {
    /// Returns `true` if every attempted delivery completed normally.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

impl<K> Default for DispatchSummary<K> {
    fn default() -> Self {
        Self {
            delivered: 0,
            filtered: 0,
            skipped_origin: 0,
            forwarded: 0,
            dropped_suspended: false,
            faults: Vec::new(),
        }
    }
}

/// Error returned when nested dispatch exceeds the hub's depth limit.
///
/// Hitting the limit means handlers are re-triggering each other without
/// converging. The whole in-flight dispatch chain is aborted; this is a
/// loop trip-wire, not a recoverable condition.
#[derive(Clone, PartialEq, Eq)]
pub struct LoopError<K> {
    /// The configured nesting limit that was exceeded.
    pub limit: usize,
    /// The kind of the event that tripped the limit.
    pub kind: EventKind,
    /// The client the event was addressed to.
    pub source: K,
}

impl<K: fmt::Debug> fmt::Debug for LoopError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LoopError {{ limit: {}, kind: {:?}, source: {:?} }}",
            self.limit, self.kind, self.source
        )
    }
}

impl<K: fmt::Debug> fmt::Display for LoopError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dispatch of {:?} on {:?} exceeded the nesting limit of {}; handlers are looping",
            self.kind, self.source, self.limit
        )
    }
}

impl<K: fmt::Debug> core::error::Error for LoopError<K> {}

impl<K: fmt::Debug> From<LoopError<K>> for HandlerFault {
    fn from(err: LoopError<K>) -> Self {
        Self::new(alloc::format!("{err}"))
    }
}

/// Error returned by [`ChangeHub::attach`](crate::ChangeHub::attach).
#[derive(Clone, PartialEq, Eq)]
pub enum AttachError<K> {
    /// The listener is owned by the client it was being attached to.
    /// A component listening to itself is a trivial notification loop.
    SelfSubscription {
        /// The client the attach was addressed to.
        client: K,
        /// The listener whose owner is that same client.
        listener: ListenerId,
    },
    /// The listener id is not registered with this hub.
    UnknownListener {
        /// The unregistered id.
        listener: ListenerId,
    },
}

impl<K: fmt::Debug> fmt::Debug for AttachError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfSubscription { client, listener } => write!(
                f,
                "AttachError::SelfSubscription {{ client: {client:?}, listener: {listener:?} }}"
            ),
            Self::UnknownListener { listener } => {
                write!(f, "AttachError::UnknownListener {{ listener: {listener:?} }}")
            }
        }
    }
}

impl<K: fmt::Debug> fmt::Display for AttachError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfSubscription { client, listener } => write!(
                f,
                "cannot attach {listener:?} to {client:?}: the listener is owned by that client"
            ),
            Self::UnknownListener { listener } => {
                write!(f, "listener {listener:?} is not registered with this hub")
            }
        }
    }
}

impl<K: fmt::Debug> core::error::Error for AttachError<K> {}

/// Error returned by [`ChangeHub::promote`](crate::ChangeHub::promote) when
/// the listener is not attached to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct NotAttachedError<K> {
    /// The client whose delivery order was being adjusted.
    pub client: K,
    /// The listener that is not attached there.
    pub listener: ListenerId,
}

impl<K: fmt::Debug> fmt::Debug for NotAttachedError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NotAttachedError {{ client: {:?}, listener: {:?} }}",
            self.client, self.listener
        )
    }
}

impl<K: fmt::Debug> fmt::Display for NotAttachedError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listener {:?} is not attached to {:?}",
            self.listener, self.client
        )
    }
}

impl<K: fmt::Debug> core::error::Error for NotAttachedError<K> {}
