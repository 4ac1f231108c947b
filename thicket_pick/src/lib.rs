// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Pick: tree walks and picking for concept maps.
//!
//! This crate turns a [`MapTree`] into answers to "what is under the
//! cursor":
//!
//! - **Walks** ([`Walk`], [`TreeVisitor`], [`Order`]): Depth-first
//!   traversal in pre- or post-order, seeing the topmost (last-painted)
//!   sibling first, with visitor-controlled early exit.
//! - **Policy** ([`PickContext`], [`default_accept`],
//!   [`default_accept_traversal`]): Per-query pruning and filtering with
//!   depth and layer caps, hidden and dragged subtrees, exclusions, and an
//!   optional acceptor hook.
//! - **Point picking** ([`pick_point`]): Exact outline hits first, then a
//!   forgiving round within a small slop where links also compete by curve
//!   distance; raw hits resolve through groups, deletion, and drop
//!   targets.
//! - **Region picking** ([`pick_region`]): Every node overlapping a
//!   rubber-band rectangle, unresolved.
//!
//! [`MapTree`]: thicket_map::MapTree
//!
//! ## Quick Start
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use thicket_map::{MapNode, MapTree};
//! use thicket_pick::{PickContext, pick_point, pick_region};
//!
//! let mut tree = MapTree::new();
//! let canvas = tree.insert(MapNode::canvas(Rect::new(0.0, 0.0, 800.0, 600.0)), None);
//! let idea = tree.insert(MapNode::plain(Rect::new(40.0, 40.0, 160.0, 90.0)), Some(canvas));
//!
//! let ctx = PickContext::new(Some(canvas));
//! assert_eq!(pick_point(&tree, &ctx, Point::new(100.0, 60.0)), Some(idea));
//! assert_eq!(
//!     pick_region(&tree, &ctx, Rect::new(0.0, 0.0, 200.0, 200.0)),
//!     vec![idea]
//! );
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It requires either the `std`
//! feature (default) or the `libm` feature for kurbo's float math.

#![no_std]

extern crate alloc;

mod context;
mod point;
mod region;
mod traverse;

pub use context::PickContext;
pub use point::pick_point;
pub use region::pick_region;
pub use traverse::{Order, TreeVisitor, Walk, default_accept, default_accept_traversal};
