// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The change-event vocabulary for map editors.
//!
//! These are the [`EventKind`]s map embedders dispatch through a
//! `thicket_change` hub and filter subscriptions by. Keeping the constants
//! here gives every collaborator (selection, inspectors, overlays) one
//! shared numbering.
//!
//! # Example
//!
//! ```
//! use thicket_map::events;
//!
//! let interesting = events::GEOMETRY.into_set() | events::HIERARCHY.into_set();
//! assert!(interesting.contains(events::GEOMETRY));
//! assert!(!interesting.contains(events::STYLE));
//! ```

use thicket_change::EventKind;

/// Bounds moved or resized.
pub const GEOMETRY: EventKind = EventKind::new(0);
/// Parent or child list changed.
pub const HIERARCHY: EventKind = EventKind::new(1);
/// Fill, stroke, font, or another visual property changed.
pub const STYLE: EventKind = EventKind::new(2);
/// Label text changed.
pub const LABEL: EventKind = EventKind::new(3);
/// Link endpoints or curvature changed.
pub const LINK: EventKind = EventKind::new(4);
/// Node created, deleted, restored, or reclaimed.
pub const LIFECYCLE: EventKind = EventKind::new(5);
