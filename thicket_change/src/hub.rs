// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The change hub: subscription storage and event delivery.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::{SmallVec, smallvec};

use crate::event::{
    AttachError, ChangeEvent, DeliveryFault, DispatchSummary, FaultCause, HandlerFault,
    ListenerId, LoopError, NotAttachedError,
};
use crate::kind::KindSet;
use crate::trace::{DispatchTrace, NoTrace};

/// Default limit on handler-initiated dispatch nesting.
///
/// The value is a trip-wire for runaway notification loops, not a principled
/// bound; hubs can change it with [`ChangeHub::set_depth_limit`].
pub const DEFAULT_DEPTH_LIMIT: usize = 5;

/// A stored handler, shared between the registry and any subscriptions.
///
/// Handlers run with the event and an [`EmitScope`] that lets them start
/// nested dispatches or edit subscriptions. The `RefCell` is what detects a
/// nested dispatch reaching a handler that is already on the stack; that
/// delivery is skipped and recorded as [`FaultCause::Busy`].
pub type SharedHandler<K> =
    Rc<RefCell<dyn FnMut(&ChangeEvent<K>, &mut EmitScope<'_, K>) -> Result<(), HandlerFault>>>;

struct HandlerSlot<K> {
    owner: Option<K>,
    handler: SharedHandler<K>,
}

struct Subscription<K> {
    listener: ListenerId,
    kinds: Option<KindSet>,
    handler: SharedHandler<K>,
}

impl<K> Clone for Subscription<K> {
    fn clone(&self) -> Self {
        Self {
            listener: self.listener,
            kinds: self.kinds,
            handler: Rc::clone(&self.handler),
        }
    }
}

/// Tracks handler-initiated dispatch nesting for one top-level dispatch.
///
/// Once tripped it stays tripped, so the abort propagates out through every
/// frame of the chain even when a handler swallows the nested error.
#[derive(Debug)]
struct DepthGuard {
    depth: usize,
    limit: usize,
    tripped: bool,
}

impl DepthGuard {
    const fn new(limit: usize) -> Self {
        Self {
            depth: 0,
            limit,
            tripped: false,
        }
    }

    fn try_enter(&mut self) -> bool {
        if self.depth >= self.limit {
            self.tripped = true;
            false
        } else {
            self.depth += 1;
            true
        }
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }
}

/// Multi-listener change notification with filtering, priority ordering,
/// suspend/resume, parent forwarding, and loop protection.
///
/// A hub is generic over the client key `K`, typically a generational id from
/// a scene or map tree. Handlers are registered once, then attached to any
/// number of clients; each attachment may carry a [`KindSet`] filter.
///
/// Delivery for one event goes to the source client's subscriptions in order
/// (promoted listener first), then the event is forwarded to the client's
/// parent, its grandparent, and so on, so containers hear about changes in
/// their subtrees. Handler failures never abort delivery; they are collected
/// in the returned [`DispatchSummary`].
///
/// # Example
///
/// ```
/// use thicket_change::{ChangeEvent, ChangeHub, EventKind};
///
/// const GEOMETRY: EventKind = EventKind::new(0);
///
/// let mut hub = ChangeHub::<u32>::new();
/// let listener = hub.register(|event, _scope| {
///     assert_eq!(event.kind, GEOMETRY);
///     Ok(())
/// });
/// hub.attach(7, listener, None).unwrap();
///
/// let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
/// assert_eq!(summary.delivered, 1);
/// ```
///
/// # See Also
///
/// - [`EmitScope`]: What handlers can do while a dispatch is in flight.
/// - [`DispatchTrace`]: Optional sink explaining every delivery decision.
pub struct ChangeHub<K> {
    handlers: Vec<Option<HandlerSlot<K>>>,
    subs: HashMap<K, Vec<Subscription<K>>>,
    parents: HashMap<K, K>,
    suspended: u32,
    depth_limit: usize,
}

impl<K> fmt::Debug for ChangeHub<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered = self.handlers.iter().filter(|s| s.is_some()).count();
        f.debug_struct("ChangeHub")
            .field("registered", &registered)
            .field("clients", &self.subs.len())
            .field("parents", &self.parents.len())
            .field("suspended", &self.suspended)
            .field("depth_limit", &self.depth_limit)
            .finish_non_exhaustive()
    }
}

impl<K> Default for ChangeHub<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ChangeHub<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates an empty hub with the default depth limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_depth_limit(DEFAULT_DEPTH_LIMIT)
    }

    /// Creates an empty hub with a specific nesting limit.
    ///
    /// A limit of 0 is legal and makes any nested
    /// [`EmitScope::emit`] fatal.
    #[must_use]
    pub fn with_depth_limit(limit: usize) -> Self {
        Self {
            handlers: Vec::new(),
            subs: HashMap::new(),
            parents: HashMap::new(),
            suspended: 0,
            depth_limit: limit,
        }
    }

    /// Returns the current nesting limit.
    #[must_use]
    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    /// Changes the nesting limit for subsequent dispatches.
    pub fn set_depth_limit(&mut self, limit: usize) {
        self.depth_limit = limit;
    }

    /// Registers a handler with no owner, returning its id.
    ///
    /// The id can then be attached to any number of clients.
    pub fn register<F>(&mut self, handler: F) -> ListenerId
    where
        F: FnMut(&ChangeEvent<K>, &mut EmitScope<'_, K>) -> Result<(), HandlerFault> + 'static,
    {
        self.push_handler(None, Rc::new(RefCell::new(handler)))
    }

    /// Registers a handler owned by `owner`.
    ///
    /// The owner is the component the handler speaks for. Attaching the
    /// handler to its own owner is refused by [`attach`](Self::attach),
    /// since a component listening to itself is a trivial loop.
    pub fn register_for<F>(&mut self, owner: K, handler: F) -> ListenerId
    where
        F: FnMut(&ChangeEvent<K>, &mut EmitScope<'_, K>) -> Result<(), HandlerFault> + 'static,
    {
        self.push_handler(Some(owner), Rc::new(RefCell::new(handler)))
    }

    fn push_handler(&mut self, owner: Option<K>, handler: SharedHandler<K>) -> ListenerId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "listener ids use 32-bit indices by design."
        )]
        let id = ListenerId(self.handlers.len() as u32);
        self.handlers.push(Some(HandlerSlot { owner, handler }));
        id
    }

    /// Returns `true` if the id refers to a registered handler.
    #[must_use]
    pub fn is_registered(&self, listener: ListenerId) -> bool {
        self.handlers
            .get(listener.idx())
            .is_some_and(|slot| slot.is_some())
    }

    /// Returns the owner recorded for a listener, if any.
    #[must_use]
    pub fn owner_of(&self, listener: ListenerId) -> Option<K> {
        self.handlers
            .get(listener.idx())
            .and_then(|slot| slot.as_ref())
            .and_then(|slot| slot.owner)
    }

    /// Removes a handler and every subscription it holds.
    ///
    /// Returns `false` if the id was not registered.
    pub fn unregister(&mut self, listener: ListenerId) -> bool {
        let Some(slot) = self.handlers.get_mut(listener.idx()) else {
            return false;
        };
        if slot.is_none() {
            return false;
        }
        *slot = None;
        self.subs.retain(|_, list| {
            list.retain(|s| s.listener != listener);
            !list.is_empty()
        });
        true
    }

    /// Subscribes `listener` to events on `client`.
    ///
    /// With `kinds` present, only events whose kind is in the set are
    /// delivered; without it, everything is.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the subscription was added.
    /// - `Ok(false)` if the listener was already attached to this client;
    ///   the existing subscription (and its filter) is left untouched.
    /// - `Err(AttachError::SelfSubscription)` if the listener's owner is
    ///   `client` itself.
    /// - `Err(AttachError::UnknownListener)` if the id is not registered.
    pub fn attach(
        &mut self,
        client: K,
        listener: ListenerId,
        kinds: Option<KindSet>,
    ) -> Result<bool, AttachError<K>> {
        self.attach_traced(client, listener, kinds, &mut NoTrace)
    }

    /// Like [`attach`](Self::attach), reporting an ignored duplicate to the
    /// trace sink.
    pub fn attach_traced<T: DispatchTrace<K>>(
        &mut self,
        client: K,
        listener: ListenerId,
        kinds: Option<KindSet>,
        trace: &mut T,
    ) -> Result<bool, AttachError<K>> {
        let slot = self
            .handlers
            .get(listener.idx())
            .and_then(|slot| slot.as_ref())
            .ok_or(AttachError::UnknownListener { listener })?;
        if slot.owner == Some(client) {
            return Err(AttachError::SelfSubscription { client, listener });
        }
        let handler = Rc::clone(&slot.handler);
        let list = self.subs.entry(client).or_default();
        if list.iter().any(|s| s.listener == listener) {
            trace.duplicate_attach(client, listener);
            return Ok(false);
        }
        list.push(Subscription {
            listener,
            kinds,
            handler,
        });
        Ok(true)
    }

    /// Removes the subscription of `listener` on `client`.
    ///
    /// Returns `false` if no such subscription exists.
    pub fn detach(&mut self, client: K, listener: ListenerId) -> bool {
        let Some(list) = self.subs.get_mut(&client) else {
            return false;
        };
        let Some(pos) = list.iter().position(|s| s.listener == listener) else {
            return false;
        };
        // Order is delivery order, so no swap_remove here.
        list.remove(pos);
        if list.is_empty() {
            self.subs.remove(&client);
        }
        true
    }

    /// Moves an existing subscription to the front of the delivery order.
    pub fn promote(
        &mut self,
        client: K,
        listener: ListenerId,
    ) -> Result<(), NotAttachedError<K>> {
        let Some(list) = self.subs.get_mut(&client) else {
            return Err(NotAttachedError { client, listener });
        };
        let Some(pos) = list.iter().position(|s| s.listener == listener) else {
            return Err(NotAttachedError { client, listener });
        };
        let sub = list.remove(pos);
        list.insert(0, sub);
        Ok(())
    }

    /// Returns `true` if `listener` is attached to `client`.
    #[must_use]
    pub fn is_attached(&self, client: K, listener: ListenerId) -> bool {
        self.subs
            .get(&client)
            .is_some_and(|list| list.iter().any(|s| s.listener == listener))
    }

    /// Iterates the listeners attached to `client`, in delivery order.
    pub fn listeners_of(&self, client: K) -> impl Iterator<Item = ListenerId> + '_ {
        self.subs
            .get(&client)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|s| s.listener)
    }

    /// Records `parent` as the forwarding target for events on `child`.
    ///
    /// The hub keeps its own copy of the hierarchy; embedders mirror their
    /// tree's parent edges into it.
    pub fn set_parent(&mut self, child: K, parent: K) {
        self.parents.insert(child, parent);
    }

    /// Removes the forwarding edge for `child`, returning `true` if one existed.
    pub fn clear_parent(&mut self, child: K) -> bool {
        self.parents.remove(&child).is_some()
    }

    /// Returns the forwarding target recorded for `child`, if any.
    #[must_use]
    pub fn parent_of(&self, child: K) -> Option<K> {
        self.parents.get(&child).copied()
    }

    /// Suspends delivery. Nestable; see [`resume`](Self::resume).
    pub fn suspend(&mut self) {
        self.suspended += 1;
    }

    /// Decrements the suspension count.
    ///
    /// Events dispatched while suspended are dropped entirely. There is no
    /// queue and no replay. Resuming below zero saturates.
    pub fn resume(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
    }

    /// Returns `true` while the suspension count is above zero.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended > 0
    }

    /// Delivers an event.
    ///
    /// Delivery order is subscription order on the source client (promoted
    /// listener first), then the parent chain. Skips subscriptions whose
    /// filter does not match and the subscription that originated the event.
    /// Handler failures are isolated and collected; an exhausted nesting
    /// limit aborts the whole chain with [`LoopError`].
    pub fn dispatch(&mut self, event: &ChangeEvent<K>) -> Result<DispatchSummary<K>, LoopError<K>> {
        self.dispatch_traced(event, &mut NoTrace)
    }

    /// Like [`dispatch`](Self::dispatch), reporting every delivery decision
    /// to the trace sink.
    pub fn dispatch_traced<T: DispatchTrace<K>>(
        &mut self,
        event: &ChangeEvent<K>,
        trace: &mut T,
    ) -> Result<DispatchSummary<K>, LoopError<K>> {
        let mut guard = DepthGuard::new(self.depth_limit);
        self.run_chain(event, &mut guard, trace)
    }

    fn loop_error(&self, event: &ChangeEvent<K>) -> LoopError<K> {
        LoopError {
            limit: self.depth_limit,
            kind: event.kind,
            source: event.source,
        }
    }

    /// Delivers to the source client, then walks the parent chain.
    fn run_chain(
        &mut self,
        event: &ChangeEvent<K>,
        guard: &mut DepthGuard,
        trace: &mut dyn DispatchTrace<K>,
    ) -> Result<DispatchSummary<K>, LoopError<K>> {
        let mut summary = DispatchSummary::default();
        if self.suspended > 0 {
            summary.dropped_suspended = true;
            trace.dropped_suspended(event);
            return Ok(summary);
        }

        self.deliver_to(event.source, event, guard, trace, &mut summary)?;

        let mut visited: SmallVec<[K; 8]> = smallvec![event.source];
        let mut current = event.source;
        while let Some(parent) = self.parents.get(&current).copied() {
            if visited.contains(&parent) {
                trace.forward_cycle(event, parent);
                break;
            }
            trace.forwarded(event, current, parent);
            summary.forwarded += 1;
            self.deliver_to(parent, event, guard, trace, &mut summary)?;
            visited.push(parent);
            current = parent;
        }
        Ok(summary)
    }

    /// Delivers one event to one client's subscription list.
    fn deliver_to(
        &mut self,
        client: K,
        event: &ChangeEvent<K>,
        guard: &mut DepthGuard,
        trace: &mut dyn DispatchTrace<K>,
        summary: &mut DispatchSummary<K>,
    ) -> Result<(), LoopError<K>> {
        // Snapshot the list so handlers can attach and detach freely; edits
        // take effect on the next dispatch, not the in-flight one.
        let subs: Vec<Subscription<K>> = match self.subs.get(&client) {
            Some(list) => list.clone(),
            None => return Ok(()),
        };

        for sub in &subs {
            if event.origin == Some(sub.listener) {
                summary.skipped_origin += 1;
                trace.skipped_origin(event, client, sub.listener);
                continue;
            }
            if let Some(kinds) = sub.kinds
                && !kinds.contains(event.kind)
            {
                summary.filtered += 1;
                trace.filtered(event, client, sub.listener);
                continue;
            }

            match sub.handler.try_borrow_mut() {
                Ok(mut handler) => {
                    let result = {
                        let mut scope = EmitScope {
                            hub: &mut *self,
                            guard: &mut *guard,
                            trace: &mut *trace,
                        };
                        (*handler)(event, &mut scope)
                    };
                    match result {
                        Ok(()) => {
                            summary.delivered += 1;
                            trace.delivered(event, client, sub.listener);
                        }
                        Err(fault) => {
                            let fault = DeliveryFault {
                                listener: sub.listener,
                                client,
                                kind: event.kind,
                                cause: FaultCause::Failed(fault),
                            };
                            trace.fault(event, &fault);
                            summary.faults.push(fault);
                        }
                    }
                }
                Err(_) => {
                    let fault = DeliveryFault {
                        listener: sub.listener,
                        client,
                        kind: event.kind,
                        cause: FaultCause::Busy,
                    };
                    trace.fault(event, &fault);
                    summary.faults.push(fault);
                }
            }

            // A tripped guard means some nested emit exhausted the limit;
            // abort the chain even if the handler swallowed the error.
            if guard.tripped {
                return Err(self.loop_error(event));
            }
        }
        Ok(())
    }
}

/// What a handler may do while its dispatch is in flight.
///
/// The scope threads the depth guard through nested dispatches, which is what
/// makes the loop trip-wire work: a handler that needs to fire follow-up
/// events calls [`emit`](Self::emit) rather than holding its own reference to
/// the hub. Subscription edits made here land on the next dispatch.
pub struct EmitScope<'a, K> {
    hub: &'a mut ChangeHub<K>,
    guard: &'a mut DepthGuard,
    trace: &'a mut dyn DispatchTrace<K>,
}

impl<K> fmt::Debug for EmitScope<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmitScope")
            .field("depth", &self.guard.depth)
            .field("limit", &self.guard.limit)
            .finish_non_exhaustive()
    }
}

impl<K> EmitScope<'_, K>
where
    K: Copy + Eq + Hash,
{
    /// Starts a nested dispatch.
    ///
    /// The nested delivery runs to completion before this returns; its
    /// summary covers only the nested chain. Fails with [`LoopError`] when
    /// nesting exceeds the hub's limit, and the failure also aborts every
    /// outer frame of the chain.
    pub fn emit(&mut self, event: &ChangeEvent<K>) -> Result<DispatchSummary<K>, LoopError<K>> {
        if !self.guard.try_enter() {
            return Err(self.hub.loop_error(event));
        }
        let result = self.hub.run_chain(event, self.guard, &mut *self.trace);
        if result.is_ok() {
            self.guard.exit();
        }
        result
    }

    /// Current handler nesting depth (0 inside a top-level dispatch).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.guard.depth
    }

    /// Subscribes a listener; takes effect on the next dispatch.
    ///
    /// See [`ChangeHub::attach`].
    pub fn attach(
        &mut self,
        client: K,
        listener: ListenerId,
        kinds: Option<KindSet>,
    ) -> Result<bool, AttachError<K>> {
        self.hub.attach(client, listener, kinds)
    }

    /// Unsubscribes a listener; takes effect on the next dispatch.
    pub fn detach(&mut self, client: K, listener: ListenerId) -> bool {
        self.hub.detach(client, listener)
    }

    /// Moves a subscription to the front of the delivery order.
    pub fn promote(
        &mut self,
        client: K,
        listener: ListenerId,
    ) -> Result<(), NotAttachedError<K>> {
        self.hub.promote(client, listener)
    }

    /// Records a forwarding edge.
    pub fn set_parent(&mut self, child: K, parent: K) {
        self.hub.set_parent(child, parent);
    }

    /// Returns the forwarding target recorded for `child`, if any.
    #[must_use]
    pub fn parent_of(&self, child: K) -> Option<K> {
        self.hub.parent_of(child)
    }

    /// Returns `true` if `listener` is attached to `client`.
    #[must_use]
    pub fn is_attached(&self, client: K, listener: ListenerId) -> bool {
        self.hub.is_attached(client, listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::EventKind;
    use crate::trace::{TraceRecord, TraceRecorder};
    use alloc::vec;

    const GEOMETRY: EventKind = EventKind::new(0);
    const STYLE: EventKind = EventKind::new(1);
    const HIERARCHY: EventKind = EventKind::new(2);

    type Log = Rc<RefCell<Vec<(u32, EventKind)>>>;

    fn logging_listener(hub: &mut ChangeHub<u32>, log: &Log, tag: u32) -> ListenerId {
        let log = Rc::clone(log);
        hub.register(move |event, _scope| {
            log.borrow_mut().push((tag, event.kind));
            Ok(())
        })
    }

    #[test]
    fn delivers_in_attach_order() {
        let mut hub = ChangeHub::<u32>::new();
        let log: Log = Rc::default();
        let a = logging_listener(&mut hub, &log, 1);
        let b = logging_listener(&mut hub, &log, 2);
        hub.attach(7, a, None).unwrap();
        hub.attach(7, b, None).unwrap();

        let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
        assert_eq!(summary.delivered, 2);
        assert!(summary.is_clean());
        assert_eq!(*log.borrow(), vec![(1, GEOMETRY), (2, GEOMETRY)]);
    }

    #[test]
    fn promote_moves_listener_to_front() {
        let mut hub = ChangeHub::<u32>::new();
        let log: Log = Rc::default();
        let a = logging_listener(&mut hub, &log, 1);
        let b = logging_listener(&mut hub, &log, 2);
        hub.attach(7, a, None).unwrap();
        hub.attach(7, b, None).unwrap();
        hub.promote(7, b).unwrap();

        hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
        assert_eq!(*log.borrow(), vec![(2, GEOMETRY), (1, GEOMETRY)]);

        let order: Vec<_> = hub.listeners_of(7).collect();
        assert_eq!(order, vec![b, a]);
    }

    #[test]
    fn promote_unattached_listener_is_an_error() {
        let mut hub = ChangeHub::<u32>::new();
        let listener = hub.register(|_, _| Ok(()));
        let err = hub.promote(7, listener).unwrap_err();
        assert_eq!(err.client, 7);
        assert_eq!(err.listener, listener);
    }

    #[test]
    fn kind_filter_restricts_delivery() {
        let mut hub = ChangeHub::<u32>::new();
        let log: Log = Rc::default();
        let a = logging_listener(&mut hub, &log, 1);
        hub.attach(7, a, Some(GEOMETRY.into_set() | HIERARCHY.into_set()))
            .unwrap();

        let summary = hub.dispatch(&ChangeEvent::new(STYLE, 7)).unwrap();
        assert_eq!(summary.delivered, 0);
        assert_eq!(summary.filtered, 1);
        assert!(log.borrow().is_empty());

        let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
        assert_eq!(summary.delivered, 1);
        assert_eq!(*log.borrow(), vec![(1, GEOMETRY)]);
    }

    #[test]
    fn originating_listener_does_not_hear_its_own_event() {
        let mut hub = ChangeHub::<u32>::new();
        let log: Log = Rc::default();
        let a = logging_listener(&mut hub, &log, 1);
        let b = logging_listener(&mut hub, &log, 2);
        hub.attach(7, a, None).unwrap();
        hub.attach(7, b, None).unwrap();

        let event = ChangeEvent::new(STYLE, 7).from_listener(a);
        let summary = hub.dispatch(&event).unwrap();
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.skipped_origin, 1);
        assert_eq!(*log.borrow(), vec![(2, STYLE)]);
    }

    #[test]
    fn self_subscription_is_refused() {
        let mut hub = ChangeHub::<u32>::new();
        let listener = hub.register_for(7, |_, _| Ok(()));
        let err = hub.attach(7, listener, None).unwrap_err();
        assert!(matches!(err, AttachError::SelfSubscription { client: 7, .. }));

        // The same handler may listen to other clients.
        assert!(hub.attach(8, listener, None).unwrap());
    }

    #[test]
    fn unknown_listener_is_refused() {
        let mut hub = ChangeHub::<u32>::new();
        let err = hub.attach(7, ListenerId(42), None).unwrap_err();
        assert!(matches!(err, AttachError::UnknownListener { .. }));
    }

    #[test]
    fn duplicate_attach_is_ignored_and_traced() {
        let mut hub = ChangeHub::<u32>::new();
        let listener = hub.register(|_, _| Ok(()));
        assert!(hub.attach(7, listener, None).unwrap());

        let mut rec = TraceRecorder::new();
        let added = hub
            .attach_traced(7, listener, Some(STYLE.into_set()), &mut rec)
            .unwrap();
        assert!(!added);
        assert_eq!(
            rec.records(),
            &[TraceRecord::DuplicateAttach {
                client: 7,
                listener
            }]
        );

        // The original unfiltered subscription is untouched.
        let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
        assert_eq!(summary.delivered, 1);
    }

    #[test]
    fn detach_absent_is_a_noop() {
        let mut hub = ChangeHub::<u32>::new();
        let listener = hub.register(|_, _| Ok(()));
        assert!(!hub.detach(7, listener));
        hub.attach(7, listener, None).unwrap();
        assert!(hub.detach(7, listener));
        assert!(!hub.detach(7, listener));
    }

    #[test]
    fn unregister_removes_all_subscriptions() {
        let mut hub = ChangeHub::<u32>::new();
        let log: Log = Rc::default();
        let a = logging_listener(&mut hub, &log, 1);
        hub.attach(7, a, None).unwrap();
        hub.attach(8, a, None).unwrap();

        assert!(hub.unregister(a));
        assert!(!hub.is_registered(a));
        assert!(!hub.is_attached(7, a));
        assert!(!hub.is_attached(8, a));
        assert!(!hub.unregister(a));
    }

    #[test]
    fn suspend_drops_events_without_replay() {
        let mut hub = ChangeHub::<u32>::new();
        let log: Log = Rc::default();
        let a = logging_listener(&mut hub, &log, 1);
        hub.attach(7, a, None).unwrap();

        hub.suspend();
        hub.suspend();
        let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
        assert!(summary.dropped_suspended);
        assert_eq!(summary.delivered, 0);

        hub.resume();
        assert!(hub.is_suspended());
        let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
        assert!(summary.dropped_suspended);

        hub.resume();
        assert!(!hub.is_suspended());
        let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
        assert_eq!(summary.delivered, 1);
        // Dropped events were not queued.
        assert_eq!(log.borrow().len(), 1);

        // Resuming past zero saturates.
        hub.resume();
        assert!(!hub.is_suspended());
    }

    #[test]
    fn events_forward_up_the_parent_chain() {
        let mut hub = ChangeHub::<u32>::new();
        let log: Log = Rc::default();
        let on_child = logging_listener(&mut hub, &log, 1);
        let on_parent = logging_listener(&mut hub, &log, 2);
        let on_root = logging_listener(&mut hub, &log, 3);
        hub.attach(10, on_child, None).unwrap();
        hub.attach(20, on_parent, None).unwrap();
        hub.attach(30, on_root, None).unwrap();
        hub.set_parent(10, 20);
        hub.set_parent(20, 30);

        let summary = hub.dispatch(&ChangeEvent::new(HIERARCHY, 10)).unwrap();
        assert_eq!(summary.delivered, 3);
        assert_eq!(summary.forwarded, 2);
        assert_eq!(
            *log.borrow(),
            vec![(1, HIERARCHY), (2, HIERARCHY), (3, HIERARCHY)]
        );

        // An event on the parent does not travel down.
        log.borrow_mut().clear();
        let summary = hub.dispatch(&ChangeEvent::new(HIERARCHY, 20)).unwrap();
        assert_eq!(summary.delivered, 2);
        assert_eq!(*log.borrow(), vec![(2, HIERARCHY), (3, HIERARCHY)]);
    }

    #[test]
    fn clearing_a_parent_edge_stops_forwarding() {
        let mut hub = ChangeHub::<u32>::new();
        let log: Log = Rc::default();
        let on_parent = logging_listener(&mut hub, &log, 2);
        hub.attach(20, on_parent, None).unwrap();
        hub.set_parent(10, 20);

        let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 10)).unwrap();
        assert_eq!(summary.forwarded, 1);
        assert_eq!(summary.delivered, 1);

        assert!(hub.clear_parent(10));
        assert_eq!(hub.parent_of(10), None);
        let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 10)).unwrap();
        assert_eq!(summary.forwarded, 0);
        assert_eq!(summary.delivered, 0);
        assert_eq!(*log.borrow(), vec![(2, GEOMETRY)]);

        // No edge left to remove.
        assert!(!hub.clear_parent(10));
    }

    #[test]
    fn corrupt_parent_edges_cannot_loop_forwarding() {
        let mut hub = ChangeHub::<u32>::new();
        let log: Log = Rc::default();
        let a = logging_listener(&mut hub, &log, 1);
        let b = logging_listener(&mut hub, &log, 2);
        hub.attach(1, a, None).unwrap();
        hub.attach(2, b, None).unwrap();
        hub.set_parent(1, 2);
        hub.set_parent(2, 1);

        let mut rec = TraceRecorder::new();
        let summary = hub
            .dispatch_traced(&ChangeEvent::new(GEOMETRY, 1), &mut rec)
            .unwrap();
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.forwarded, 1);
        assert!(
            rec.records()
                .iter()
                .any(|r| matches!(r, TraceRecord::ForwardCycle { at: 1 })),
            "cycle should be traced"
        );
    }

    #[test]
    fn handler_failure_does_not_abort_delivery() {
        let mut hub = ChangeHub::<u32>::new();
        let log: Log = Rc::default();
        let bad = hub.register(|_, _| Err(HandlerFault::new("listener broke")));
        let good = logging_listener(&mut hub, &log, 2);
        hub.attach(7, bad, None).unwrap();
        hub.attach(7, good, None).unwrap();

        let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.faults.len(), 1);
        assert_eq!(summary.faults[0].listener, bad);
        assert_eq!(summary.faults[0].client, 7);
        assert!(matches!(
            summary.faults[0].cause,
            FaultCause::Failed(ref f) if f.message == "listener broke"
        ));
        // The second listener still ran.
        assert_eq!(*log.borrow(), vec![(2, GEOMETRY)]);
    }

    #[test]
    fn nested_emit_delivers_before_returning() {
        let mut hub = ChangeHub::<u32>::new();
        let log: Log = Rc::default();

        let follow = logging_listener(&mut hub, &log, 2);
        hub.attach(8, follow, None).unwrap();

        let log2 = Rc::clone(&log);
        let primary = hub.register(move |_, scope| {
            assert_eq!(scope.depth(), 0);
            let nested = scope.emit(&ChangeEvent::new(STYLE, 8))?;
            assert_eq!(nested.delivered, 1);
            log2.borrow_mut().push((1, GEOMETRY));
            Ok(())
        });
        hub.attach(7, primary, None).unwrap();

        let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
        assert_eq!(summary.delivered, 1);
        // The nested event landed before the outer handler finished.
        assert_eq!(*log.borrow(), vec![(2, STYLE), (1, GEOMETRY)]);
    }

    #[test]
    fn nested_emit_back_into_running_handler_is_a_busy_fault() {
        let mut hub = ChangeHub::<u32>::new();
        let seen: Rc<RefCell<Vec<FaultCause>>> = Rc::default();

        let seen2 = Rc::clone(&seen);
        let echo = hub.register(move |event, scope| {
            if event.kind == GEOMETRY {
                // Fires at the client it is itself attached to, without an
                // origin stamp, so the nested dispatch reaches it again.
                let nested = scope.emit(&ChangeEvent::new(STYLE, 7))?;
                for fault in nested.faults {
                    seen2.borrow_mut().push(fault.cause);
                }
            }
            Ok(())
        });
        hub.attach(7, echo, None).unwrap();

        let summary = hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
        assert!(summary.is_clean());
        assert_eq!(*seen.borrow(), vec![FaultCause::Busy]);
    }

    /// Attaches a relay at each of `clients.start..clients.end` that fires a
    /// follow-up event at the next client over.
    fn attach_relays(hub: &mut ChangeHub<u32>, clients: core::ops::Range<u32>, swallow: bool) {
        for client in clients {
            let relay = hub.register(move |_, scope| {
                let follow_up = ChangeEvent::new(GEOMETRY, client + 1);
                if swallow {
                    // Deliberately discards the nested failure.
                    let _ = scope.emit(&follow_up);
                } else {
                    scope.emit(&follow_up)?;
                }
                Ok(())
            });
            hub.attach(client, relay, None).unwrap();
        }
    }

    #[test]
    fn runaway_notification_chain_trips_the_loop_guard() {
        let mut hub = ChangeHub::<u32>::new();
        attach_relays(&mut hub, 0..8, false);

        let err = hub.dispatch(&ChangeEvent::new(GEOMETRY, 0)).unwrap_err();
        assert_eq!(err.limit, DEFAULT_DEPTH_LIMIT);

        // The same chain fits under a raised limit.
        let mut hub = ChangeHub::<u32>::with_depth_limit(16);
        attach_relays(&mut hub, 0..8, false);
        assert!(hub.dispatch(&ChangeEvent::new(GEOMETRY, 0)).is_ok());
    }

    #[test]
    fn loop_guard_aborts_even_when_handlers_swallow_the_error() {
        let mut hub = ChangeHub::<u32>::new();
        attach_relays(&mut hub, 0..8, true);

        assert!(hub.dispatch(&ChangeEvent::new(GEOMETRY, 0)).is_err());
    }

    #[test]
    fn depth_limit_zero_makes_any_nested_emit_fatal() {
        let mut hub = ChangeHub::<u32>::with_depth_limit(0);
        let listener = hub.register(|_, scope| {
            let err = scope.emit(&ChangeEvent::new(STYLE, 8)).unwrap_err();
            assert_eq!(err.limit, 0);
            Err(err.into())
        });
        hub.attach(7, listener, None).unwrap();

        assert!(hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).is_err());
    }

    #[test]
    fn subscriptions_added_mid_dispatch_take_effect_next_time() {
        let mut hub = ChangeHub::<u32>::new();
        let log: Log = Rc::default();

        let late = logging_listener(&mut hub, &log, 2);
        let log2 = Rc::clone(&log);
        let early = hub.register(move |_, scope| {
            log2.borrow_mut().push((1, GEOMETRY));
            scope.attach(7, late, None).unwrap();
            Ok(())
        });
        hub.attach(7, early, None).unwrap();

        hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
        assert_eq!(*log.borrow(), vec![(1, GEOMETRY)]);

        hub.dispatch(&ChangeEvent::new(GEOMETRY, 7)).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![(1, GEOMETRY), (1, GEOMETRY), (2, GEOMETRY)]
        );
    }

    #[test]
    fn trace_recorder_sees_every_decision() {
        let mut hub = ChangeHub::<u32>::new();
        let heard = hub.register(|_, _| Ok(()));
        let filtered = hub.register(|_, _| Ok(()));
        hub.attach(7, heard, None).unwrap();
        hub.attach(7, filtered, Some(STYLE.into_set())).unwrap();

        let mut rec = TraceRecorder::new();
        hub.dispatch_traced(&ChangeEvent::new(GEOMETRY, 7), &mut rec)
            .unwrap();
        assert_eq!(rec.delivered_count(), 1);
        assert_eq!(rec.fault_count(), 0);
        assert!(
            rec.records()
                .iter()
                .any(|r| matches!(r, TraceRecord::Filtered { .. }))
        );
    }
}
