// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Map: the component tree of a concept map.
//!
//! This crate provides the model side of a node-and-link map editor:
//!
//! - **Nodes** ([`MapNode`], [`NodeKind`]): A closed set of component kinds
//!   (canvas, plain node, group, link) with per-kind flags and editable
//!   properties ([`NodeFlags`], [`PropertyFlags`]).
//! - **The tree** ([`MapTree`]): A generational arena with paint-ordered
//!   children, insertion/removal/reparenting, and link routing.
//! - **Pick geometry**: Strict and loose containment plus edge distance,
//!   per kind (shapes for boxed nodes, stroked curves for links), serving
//!   the traversals in `thicket_pick`.
//! - **Pick resolution hooks**: [`MapTree::default_pick`],
//!   [`MapTree::parent_redirect`], [`MapTree::default_drop_target`] decide
//!   what a raw geometric hit turns into.
//! - **An event vocabulary** ([`events`]): Shared [`EventKind`] constants
//!   for dispatching map changes through a `thicket_change` hub.
//!
//! [`EventKind`]: thicket_change::EventKind
//!
//! ## Quick Start
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use thicket_map::{MapNode, MapTree, NodeKind};
//!
//! let mut tree = MapTree::new();
//! let canvas = tree.insert(MapNode::canvas(Rect::new(0.0, 0.0, 800.0, 600.0)), None);
//! let idea = tree.insert(MapNode::plain(Rect::new(40.0, 40.0, 160.0, 90.0)), Some(canvas));
//! let note = tree.insert(MapNode::plain(Rect::new(300.0, 200.0, 420.0, 250.0)), Some(canvas));
//! let link = tree.insert(MapNode::link_between(idea, note), Some(canvas));
//!
//! assert_eq!(tree.node(link).unwrap().kind, NodeKind::Link);
//! assert!(tree.contains(idea, Point::new(100.0, 60.0)));
//!
//! // Links follow their endpoints when asked to re-route.
//! tree.set_bounds(idea, Rect::new(40.0, 300.0, 160.0, 350.0));
//! tree.route_link(link);
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It requires either the `std`
//! feature (default) or the `libm` feature for kurbo's float math.

#![no_std]

extern crate alloc;

pub mod events;
mod geom;
mod tree;
mod types;

pub use geom::PICK_SLOP;
pub use tree::{MapTree, ReparentError};
pub use types::{LinkCurve, MapNode, NodeFlags, NodeId, NodeKind, NodeShape, PropertyFlags};
