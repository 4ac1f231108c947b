// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Selection: the observable selection of a concept map.
//!
//! This crate handles the bookkeeping of "what is selected" for a
//! [`MapTree`]: an ordered, duplicate-free set of nodes whose `SELECTED`
//! flags it keeps in step, with cached aggregate queries and observer
//! notification after every logical change.
//!
//! The core type is [`SelectionModel`], which tracks:
//! - The selected nodes, in insertion order.
//! - Aggregates the rest of an editor asks for constantly: the union of
//!   member bounds, per-kind counts, the distinct parents, and the union of
//!   editable property bits.
//! - A monotonically increasing **revision** counter that bumps once per
//!   logical change.
//! - Registered observers, called exactly once per logical change.
//!
//! Mutators take the tree as an argument so the model can maintain the
//! members' flags; a node evicted from the selection really is deselected
//! on the map.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Rect;
//! use thicket_map::{MapNode, MapTree};
//! use thicket_selection::SelectionModel;
//!
//! let mut tree = MapTree::new();
//! let canvas = tree.insert(MapNode::canvas(Rect::new(0.0, 0.0, 800.0, 600.0)), None);
//! let a = tree.insert(MapNode::plain(Rect::new(40.0, 40.0, 160.0, 90.0)), Some(canvas));
//! let b = tree.insert(MapNode::plain(Rect::new(300.0, 200.0, 420.0, 250.0)), Some(canvas));
//!
//! let mut selection = SelectionModel::new();
//! selection.add(&mut tree, a);
//! selection.add(&mut tree, b);
//! assert!(tree.is_selected(a));
//! assert_eq!(selection.len(), 2);
//!
//! // The union of member bounds, computed lazily and cached.
//! assert_eq!(
//!     selection.bounds(&tree),
//!     Some(Rect::new(40.0, 40.0, 420.0, 250.0))
//! );
//!
//! // Clearing remembers what was selected; reselect brings it back.
//! selection.clear(&mut tree);
//! assert!(selection.is_empty());
//! selection.reselect(&mut tree);
//! assert_eq!(selection.as_slice(), &[a, b]);
//! ```
//!
//! ## Observers and re-entrancy
//!
//! Observers are `Rc<RefCell<dyn FnMut(&mut SelectionModel, &mut MapTree)>>`
//! closures ([`SelectionObserver`]), called after each change with the model
//! itself so they can query freely:
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use thicket_map::MapTree;
//! use thicket_selection::{SelectionModel, SelectionObserver};
//!
//! let mut tree = MapTree::new();
//! let mut selection = SelectionModel::new();
//!
//! let changes = Rc::new(RefCell::new(0_usize));
//! let seen = Rc::clone(&changes);
//! let observer: SelectionObserver = Rc::new(RefCell::new(
//!     move |selection: &mut SelectionModel, _tree: &mut MapTree| {
//!         *seen.borrow_mut() += 1;
//!         assert!(selection.is_empty());
//!     },
//! ));
//! selection.observe(observer);
//!
//! selection.clear_and_notify(&mut tree);
//! assert_eq!(*changes.borrow(), 1);
//! ```
//!
//! While a notification is underway, every mutation is silently rejected:
//! an observer reacting to a change cannot cause a second, nested change.
//! The model counts these in [`SelectionModel::rejected_mutations`] so
//! misbehaving observers are visible in diagnostics.
//!
//! ## Frozen snapshots
//!
//! [`SelectionModel::freeze`] produces a [`FrozenSelection`]: an immutable
//! copy of the membership and its aggregates, settled at freeze time.
//! Mutating the live model never changes an existing snapshot. Editors use
//! this for "the selection as of the start of the drag" and similar.
//!
//! This crate is `no_std` and uses `alloc`. It requires either the `std`
//! feature (default) or the `libm` feature for kurbo's float math.

#![no_std]

extern crate alloc;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::Rect;
use smallvec::SmallVec;
use thicket_map::{MapTree, NodeId, NodeKind, PropertyFlags};

/// An observer closure, called with the model and tree after each logical
/// change.
pub type SelectionObserver = Rc<RefCell<dyn FnMut(&mut SelectionModel, &mut MapTree)>>;

/// Identifies a registered observer for [`SelectionModel::unobserve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u32);

/// Hard failure from [`SelectionModel::remove`]: the node was not a member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemoveAbsentError(pub NodeId);

impl fmt::Display for RemoveAbsentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} is not in the selection", self.0)
    }
}

impl core::error::Error for RemoveAbsentError {}

/// The ordered, observable selection over a [`MapTree`].
///
/// Members are kept in insertion order with no duplicates. Every mutator
/// maintains the members' `SELECTED` flags on the tree and fires exactly
/// one notification per logical change that changed anything; no-op calls
/// neither notify nor bump the revision.
///
/// Multi-select legality is enforced on the way in: a sole member that
/// does not support multi-selection is evicted when a second node arrives,
/// and a node that does not support multi-selection is rejected when the
/// selection is already occupied. See [`SelectionModel::add`].
pub struct SelectionModel {
    members: Vec<NodeId>,
    kind_counts: [usize; NodeKind::COUNT],
    parents: SmallVec<[NodeId; 4]>,
    bounds_cache: Cell<Option<Rect>>,
    bounds_dirty: Cell<bool>,
    property_cache: Cell<PropertyFlags>,
    property_dirty: Cell<bool>,
    size_override: Option<(f64, f64)>,
    last_selection: Option<Vec<NodeId>>,
    observers: Vec<(ObserverId, SelectionObserver)>,
    next_observer: u32,
    notify_underway: bool,
    revision: u64,
    rejected_mutations: u64,
}

impl fmt::Debug for SelectionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionModel")
            .field("members", &self.members)
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionModel {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            kind_counts: [0; NodeKind::COUNT],
            parents: SmallVec::new(),
            bounds_cache: Cell::new(None),
            bounds_dirty: Cell::new(false),
            property_cache: Cell::new(PropertyFlags::empty()),
            property_dirty: Cell::new(false),
            size_override: None,
            last_selection: None,
            observers: Vec::new(),
            next_observer: 0,
            notify_underway: false,
            revision: 0,
            rejected_mutations: 0,
        }
    }

    /// Returns `true` if the selection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the number of selected nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns all members in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.members
    }

    /// Returns an iterator over the members in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, NodeId> {
        self.members.iter()
    }

    /// Returns `true` if `id` is a member.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.position_of(id).is_some()
    }

    /// The earliest-selected member, if any.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.members.first().copied()
    }

    /// The latest-selected member, if any.
    #[must_use]
    pub fn last(&self) -> Option<NodeId> {
        self.members.last().copied()
    }

    /// The sole member, or `None` unless exactly one node is selected.
    #[must_use]
    pub fn only(&self) -> Option<NodeId> {
        match *self.members.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// The current revision counter.
    ///
    /// Bumped once per logical change that changed anything; no-op calls
    /// leave it alone. Cheap "did anything happen since I last looked?"
    /// marker for polling callers.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// How many mutations have been silently rejected.
    ///
    /// Covers mutators called while a notification was underway and adds
    /// refused by multi-select legality. Diagnostic only.
    #[must_use]
    pub fn rejected_mutations(&self) -> u64 {
        self.rejected_mutations
    }

    /// The number of members of `kind`, from the eagerly maintained counts.
    #[must_use]
    pub fn kind_count(&self, kind: NodeKind) -> usize {
        self.kind_counts[kind.index()]
    }

    /// Returns `true` if any member is of `kind`.
    #[must_use]
    pub fn contains_kind(&self, kind: NodeKind) -> bool {
        self.kind_count(kind) > 0
    }

    /// Returns `true` if all members share one kind (vacuously true when
    /// empty).
    #[must_use]
    pub fn all_of_same_kind(&self) -> bool {
        self.kind_counts.iter().filter(|&&count| count > 0).count() <= 1
    }

    /// The members of `kind`, in selection order.
    #[must_use]
    pub fn all_of_kind(&self, tree: &MapTree, kind: NodeKind) -> Vec<NodeId> {
        self.members
            .iter()
            .copied()
            .filter(|&id| tree.node(id).is_some_and(|node| node.kind == kind))
            .collect()
    }

    /// The distinct parents of the members, as of the last logical change.
    ///
    /// Reparenting on the tree reaches this list at the next change, not
    /// immediately.
    #[must_use]
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Returns `true` if every member has the same parent (vacuously true
    /// when empty; parentless members compare equal to each other).
    #[must_use]
    pub fn all_have_same_parent(&self, tree: &MapTree) -> bool {
        let mut parents = self.members.iter().map(|&id| tree.parent_of(id));
        match parents.next() {
            Some(reference) => parents.all(|parent| parent == reference),
            None => true,
        }
    }

    /// Returns `true` if every member sits directly on a canvas.
    #[must_use]
    pub fn all_have_top_level_parent(&self, tree: &MapTree) -> bool {
        self.members.iter().all(|&id| {
            tree.parent_of(id)
                .and_then(|parent| tree.node(parent))
                .is_some_and(|node| node.kind == NodeKind::Canvas)
        })
    }

    /// The union of member bounds, or `None` when empty.
    ///
    /// Computed lazily and cached; membership changes invalidate the cache
    /// automatically. Geometry changes happen outside this model, so wire
    /// them to [`SelectionModel::invalidate_bounds`]. A size override (see
    /// [`SelectionModel::set_size_override`]) replaces the union's width
    /// and height while keeping its origin.
    #[must_use]
    pub fn bounds(&self, tree: &MapTree) -> Option<Rect> {
        if self.bounds_dirty.get() {
            let mut union: Option<Rect> = None;
            for &id in &self.members {
                if let Some(bounds) = tree.bounds_of(id) {
                    union = Some(match union {
                        Some(so_far) => so_far.union(bounds),
                        None => bounds,
                    });
                }
            }
            self.bounds_cache.set(union);
            self.bounds_dirty.set(false);
        }
        let bounds = self.bounds_cache.get()?;
        match self.size_override {
            Some(size) => Some(Rect::from_origin_size(bounds.origin(), size)),
            None => Some(bounds),
        }
    }

    /// Drops the cached bounds union.
    ///
    /// Call after moving or resizing members; the next
    /// [`SelectionModel::bounds`] recomputes.
    pub fn invalidate_bounds(&self) {
        self.bounds_dirty.set(true);
    }

    /// The union of the members' editable property bits.
    ///
    /// Inspectors use this to decide which controls to offer for a mixed
    /// selection. Lazy and cached like [`SelectionModel::bounds`].
    #[must_use]
    pub fn property_bits(&self, tree: &MapTree) -> PropertyFlags {
        if self.property_dirty.get() {
            let mut bits = PropertyFlags::empty();
            for &id in &self.members {
                if let Some(node) = tree.node(id) {
                    bits |= node.properties;
                }
            }
            self.property_cache.set(bits);
            self.property_dirty.set(false);
        }
        self.property_cache.get()
    }

    /// Replaces the reported selection size for synthetic selections.
    ///
    /// `None` restores the computed union. Does not notify.
    pub fn set_size_override(&mut self, size: Option<(f64, f64)>) {
        self.size_override = size;
    }

    /// The current size override, if any.
    #[must_use]
    pub fn size_override(&self) -> Option<(f64, f64)> {
        self.size_override
    }

    /// Adds `id` to the selection.
    ///
    /// Returns `false` without notifying when `id` is already a member or
    /// no longer in the tree. Multi-select legality applies: a sole member
    /// that does not support multi-selection is evicted (deselected) to
    /// make room, and `id` is rejected when the selection is occupied and
    /// `id` itself does not support multi-selection.
    ///
    /// On success the node's `SELECTED` flag is set, aggregates update,
    /// and observers are notified once.
    pub fn add(&mut self, tree: &mut MapTree, id: NodeId) -> bool {
        if self.reject_if_notifying() {
            return false;
        }
        let changed = self.add_inner(tree, id);
        if changed {
            self.finish_change(tree);
        }
        changed
    }

    /// Adds every id in `ids`, with one notification iff anything changed.
    ///
    /// Each element goes through the same legality checks as
    /// [`SelectionModel::add`]. Returns `true` if anything changed.
    pub fn add_all<I>(&mut self, tree: &mut MapTree, ids: I) -> bool
    where
        I: IntoIterator<Item = NodeId>,
    {
        if self.reject_if_notifying() {
            return false;
        }
        let mut changed = false;
        for id in ids {
            changed |= self.add_inner(tree, id);
        }
        if changed {
            self.finish_change(tree);
        }
        changed
    }

    /// Replaces the selection with `ids`, preserving their order.
    ///
    /// Clears first (recording the prior contents for
    /// [`SelectionModel::reselect`]), then adds each id under the usual
    /// legality checks. One notification iff the final contents differ
    /// from the prior contents. Returns `true` if they did.
    pub fn set_to<I>(&mut self, tree: &mut MapTree, ids: I) -> bool
    where
        I: IntoIterator<Item = NodeId>,
    {
        if self.reject_if_notifying() {
            return false;
        }
        self.replace_members(tree, ids)
    }

    /// Removes `id` from the selection, clearing its `SELECTED` flag.
    ///
    /// # Errors
    ///
    /// Returns [`RemoveAbsentError`] if `id` is not a member. A call
    /// during a notification is dropped (and counted) with `Ok(())`.
    pub fn remove(&mut self, tree: &mut MapTree, id: NodeId) -> Result<(), RemoveAbsentError> {
        if self.reject_if_notifying() {
            return Ok(());
        }
        if self.remove_inner(tree, id) {
            self.finish_change(tree);
            Ok(())
        } else {
            Err(RemoveAbsentError(id))
        }
    }

    /// Flips membership for every id in `ids`.
    ///
    /// Members leave, non-members join (under add's legality checks). One
    /// notification iff anything changed. Returns `true` if anything did.
    pub fn toggle<I>(&mut self, tree: &mut MapTree, ids: I) -> bool
    where
        I: IntoIterator<Item = NodeId>,
    {
        if self.reject_if_notifying() {
            return false;
        }
        let mut changed = false;
        for id in ids {
            if self.position_of(id).is_some() {
                changed |= self.remove_inner(tree, id);
            } else {
                changed |= self.add_inner(tree, id);
            }
        }
        if changed {
            self.finish_change(tree);
        }
        changed
    }

    /// Empties the selection, clearing every member's `SELECTED` flag.
    ///
    /// The prior contents are recorded for [`SelectionModel::reselect`].
    /// Returns `false` (and does not notify) when already empty.
    pub fn clear(&mut self, tree: &mut MapTree) -> bool {
        if self.reject_if_notifying() {
            return false;
        }
        let changed = self.clear_inner(tree);
        if changed {
            self.finish_change(tree);
        }
        changed
    }

    /// Empties the selection and notifies observers even when it was
    /// already empty.
    ///
    /// The revision still only bumps when something was actually cleared.
    pub fn clear_and_notify(&mut self, tree: &mut MapTree) {
        if self.reject_if_notifying() {
            return;
        }
        if self.clear_inner(tree) {
            self.rebuild_aggregates(tree);
            self.revision = self.revision.wrapping_add(1);
        }
        self.notify(tree);
    }

    /// Restores the most recently cleared selection.
    ///
    /// Nodes that have since left the tree or been flagged deleted are
    /// dropped from the restored set. Without a recorded selection this
    /// just clears. Returns `true` if the contents changed.
    pub fn reselect(&mut self, tree: &mut MapTree) -> bool {
        if self.reject_if_notifying() {
            return false;
        }
        match self.last_selection.take() {
            Some(snapshot) => {
                let survivors: Vec<NodeId> = snapshot
                    .into_iter()
                    .filter(|&id| tree.contains_id(id) && !tree.is_deleted(id))
                    .collect();
                self.replace_members(tree, survivors)
            }
            None => {
                let changed = self.clear_inner(tree);
                if changed {
                    self.finish_change(tree);
                }
                changed
            }
        }
    }

    /// Drops members that are flagged deleted or gone from the tree.
    ///
    /// One notification iff any member was dropped. Returns `true` if any
    /// was.
    pub fn clear_deleted(&mut self, tree: &mut MapTree) -> bool {
        if self.reject_if_notifying() {
            return false;
        }
        let before = self.members.len();
        for &id in &self.members {
            if !tree.contains_id(id) || tree.is_deleted(id) {
                tree.set_selected(id, false);
            }
        }
        self.members
            .retain(|&id| tree.contains_id(id) && !tree.is_deleted(id));
        if self.members.len() == before {
            return false;
        }
        self.finish_change(tree);
        true
    }

    /// Registers an observer, called after every logical change.
    ///
    /// Observers run in registration order. One registered during a
    /// notification first runs on the next change; one removed during a
    /// notification still sees the in-flight one.
    pub fn observe(&mut self, observer: SelectionObserver) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer = self.next_observer.wrapping_add(1);
        self.observers.push((id, observer));
        id
    }

    /// Removes a registered observer. Returns `false` if `id` is unknown.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    /// Captures the membership and aggregates as a [`FrozenSelection`].
    ///
    /// The snapshot settles the lazy caches against the tree as it stands
    /// now; later changes to the model or the tree do not reach it.
    #[must_use]
    pub fn freeze(&self, tree: &MapTree) -> FrozenSelection {
        FrozenSelection {
            members: self.members.clone(),
            bounds: self.bounds(tree),
            kind_counts: self.kind_counts,
            parents: self.parents.clone(),
            property_bits: self.property_bits(tree),
        }
    }

    fn position_of(&self, id: NodeId) -> Option<usize> {
        self.members.iter().position(|&member| member == id)
    }

    fn reject_if_notifying(&mut self) -> bool {
        if self.notify_underway {
            self.rejected_mutations = self.rejected_mutations.wrapping_add(1);
            return true;
        }
        false
    }

    /// Membership change without notification; returns whether anything
    /// changed.
    fn add_inner(&mut self, tree: &mut MapTree, id: NodeId) -> bool {
        if !tree.contains_id(id) || self.contains(id) {
            return false;
        }
        if let [sole] = *self.members.as_slice()
            && !tree.supports_multi_select(sole)
        {
            tree.set_selected(sole, false);
            self.members.clear();
        }
        if !self.members.is_empty() && !tree.supports_multi_select(id) {
            self.rejected_mutations = self.rejected_mutations.wrapping_add(1);
            return false;
        }
        tree.set_selected(id, true);
        self.members.push(id);
        true
    }

    fn remove_inner(&mut self, tree: &mut MapTree, id: NodeId) -> bool {
        let Some(position) = self.position_of(id) else {
            return false;
        };
        tree.set_selected(id, false);
        self.members.remove(position);
        true
    }

    /// Empties members and flags, recording the prior contents. No
    /// notification.
    fn clear_inner(&mut self, tree: &mut MapTree) -> bool {
        if self.members.is_empty() {
            return false;
        }
        self.last_selection = Some(self.members.clone());
        for &id in &self.members {
            tree.set_selected(id, false);
        }
        self.members.clear();
        true
    }

    fn replace_members<I>(&mut self, tree: &mut MapTree, ids: I) -> bool
    where
        I: IntoIterator<Item = NodeId>,
    {
        let prior = self.members.clone();
        self.clear_inner(tree);
        for id in ids {
            self.add_inner(tree, id);
        }
        let changed = self.members != prior;
        if changed {
            self.finish_change(tree);
        }
        changed
    }

    fn rebuild_aggregates(&mut self, tree: &MapTree) {
        self.kind_counts = [0; NodeKind::COUNT];
        self.parents.clear();
        for &id in &self.members {
            if let Some(node) = tree.node(id) {
                self.kind_counts[node.kind.index()] += 1;
            }
            if let Some(parent) = tree.parent_of(id)
                && !self.parents.contains(&parent)
            {
                self.parents.push(parent);
            }
        }
        self.bounds_dirty.set(true);
        self.property_dirty.set(true);
    }

    /// Settles aggregates, bumps the revision, and notifies.
    ///
    /// Inner mutators leave the aggregates alone so a batch pays for one
    /// rebuild, not one per element.
    fn finish_change(&mut self, tree: &mut MapTree) {
        self.rebuild_aggregates(tree);
        self.revision = self.revision.wrapping_add(1);
        self.notify(tree);
    }

    fn notify(&mut self, tree: &mut MapTree) {
        if self.notify_underway {
            return;
        }
        self.notify_underway = true;
        let observers: Vec<SelectionObserver> = self
            .observers
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in &observers {
            (&mut *observer.borrow_mut())(&mut *self, &mut *tree);
        }
        self.notify_underway = false;
    }
}

/// An immutable snapshot of a selection and its aggregates.
///
/// Produced by [`SelectionModel::freeze`]. Holds plain values settled at
/// freeze time: it never touches `SELECTED` flags, never notifies, and is
/// exempt from multi-select legality because it cannot change.
#[derive(Clone, Debug, PartialEq)]
pub struct FrozenSelection {
    members: Vec<NodeId>,
    bounds: Option<Rect>,
    kind_counts: [usize; NodeKind::COUNT],
    parents: SmallVec<[NodeId; 4]>,
    property_bits: PropertyFlags,
}

impl FrozenSelection {
    /// Returns `true` if the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the number of members in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns the snapshot's members in their selection order.
    #[must_use]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.members
    }

    /// Returns an iterator over the snapshot's members.
    pub fn iter(&self) -> core::slice::Iter<'_, NodeId> {
        self.members.iter()
    }

    /// Returns `true` if `id` was a member at freeze time.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    /// The earliest-selected member, if any.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.members.first().copied()
    }

    /// The latest-selected member, if any.
    #[must_use]
    pub fn last(&self) -> Option<NodeId> {
        self.members.last().copied()
    }

    /// The sole member, or `None` unless exactly one node was selected.
    #[must_use]
    pub fn only(&self) -> Option<NodeId> {
        match *self.members.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// The bounds union as it stood at freeze time.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// The number of members of `kind` at freeze time.
    #[must_use]
    pub fn kind_count(&self, kind: NodeKind) -> usize {
        self.kind_counts[kind.index()]
    }

    /// Returns `true` if any member was of `kind`.
    #[must_use]
    pub fn contains_kind(&self, kind: NodeKind) -> bool {
        self.kind_count(kind) > 0
    }

    /// Returns `true` if all members shared one kind.
    #[must_use]
    pub fn all_of_same_kind(&self) -> bool {
        self.kind_counts.iter().filter(|&&count| count > 0).count() <= 1
    }

    /// The distinct parents of the members at freeze time.
    #[must_use]
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// The union of editable property bits at freeze time.
    #[must_use]
    pub fn property_bits(&self) -> PropertyFlags {
        self.property_bits
    }
}
