// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event kind tags and kind sets used to filter subscriptions.

use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Identifies what aspect of a component changed (geometry, style, hierarchy, ...).
///
/// A kind is a lightweight tag (a single `u8`) attached to every
/// [`ChangeEvent`](crate::ChangeEvent). Subscriptions may carry a [`KindSet`]
/// filter so a listener only hears about the kinds it cares about.
///
/// # Example
///
/// ```
/// use thicket_change::EventKind;
///
/// // Define your own kinds as constants
/// const GEOMETRY: EventKind = EventKind::new(0);
/// const STYLE: EventKind = EventKind::new(1);
/// const HIERARCHY: EventKind = EventKind::new(2);
/// ```
///
/// # See Also
///
/// - [`KindSet`]: A compact set of kinds, used as a subscription filter.
/// - [`ChangeHub::attach`](crate::ChangeHub::attach): Accepts an optional filter.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct EventKind(u8);

impl EventKind {
    /// Creates a new kind with the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 64`, as [`KindSet`] only supports 64 kinds.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        assert!(index < 64, "EventKind index must be less than 64");
        Self(index)
    }

    /// Returns the index of this kind.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Converts this kind into a single-element [`KindSet`].
    #[must_use]
    pub const fn into_set(self) -> KindSet {
        KindSet(1_u64 << self.0)
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventKind").field(&self.0).finish()
    }
}

/// A compact bitfield representing a set of up to 64 event kinds.
///
/// Used as the subscription filter: a listener attached with a `KindSet` only
/// receives events whose kind is a member. A listener attached without a
/// filter receives everything.
///
/// # Example
///
/// ```
/// use thicket_change::{EventKind, KindSet};
///
/// const GEOMETRY: EventKind = EventKind::new(0);
/// const STYLE: EventKind = EventKind::new(1);
/// const LABEL: EventKind = EventKind::new(2);
///
/// let mut filter = KindSet::empty();
/// filter.insert(GEOMETRY);
/// filter.insert(STYLE);
///
/// assert!(filter.contains(GEOMETRY));
/// assert!(!filter.contains(LABEL));
///
/// // Combine sets with bitwise OR
/// let visual = GEOMETRY.into_set() | STYLE.into_set();
/// assert!(visual.contains(STYLE));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u64);

impl KindSet {
    /// An empty kind set.
    pub const EMPTY: Self = Self(0);

    /// A kind set containing all 64 possible kinds.
    pub const ALL: Self = Self(u64::MAX);

    /// Creates an empty kind set.
    #[must_use]
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Creates a kind set containing all 64 possible kinds.
    #[must_use]
    pub const fn all() -> Self {
        Self::ALL
    }

    /// Returns `true` if this set contains no kinds.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if this set contains the given kind.
    #[must_use]
    pub const fn contains(self, kind: EventKind) -> bool {
        (self.0 & (1_u64 << kind.0)) != 0
    }

    /// Inserts a kind into the set.
    pub fn insert(&mut self, kind: EventKind) {
        self.0 |= 1_u64 << kind.0;
    }

    /// Removes a kind from the set.
    pub fn remove(&mut self, kind: EventKind) {
        self.0 &= !(1_u64 << kind.0);
    }

    /// Returns the number of kinds in the set.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns an iterator over the kinds in this set.
    #[must_use]
    pub const fn iter(self) -> KindSetIter {
        KindSetIter { bits: self.0 }
    }
}

impl fmt::Debug for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl BitOr for KindSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for KindSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for KindSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for KindSet {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for KindSet {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

impl From<EventKind> for KindSet {
    fn from(kind: EventKind) -> Self {
        kind.into_set()
    }
}

impl IntoIterator for KindSet {
    type Item = EventKind;
    type IntoIter = KindSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the kinds in a [`KindSet`].
#[derive(Clone, Debug)]
pub struct KindSetIter {
    bits: u64,
}

impl Iterator for KindSetIter {
    type Item = EventKind;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        #[expect(clippy::cast_possible_truncation, reason = "trailing_zeros <= 63")]
        let index = self.bits.trailing_zeros() as u8;
        self.bits &= self.bits - 1; // Clear the lowest set bit
        Some(EventKind(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.bits.count_ones() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for KindSetIter {}
