// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shape and curve tests backing the tree's pick geometry.
//!
//! Everything here works in squared distances, so no square roots are needed
//! and results stay exact for comparisons.

use kurbo::{Ellipse, ParamCurveNearest, Point, Rect, RoundedRect, Shape, Vec2};

use crate::types::{LinkCurve, NodeShape};

/// How far outside a node's strict outline a loose test still matches, in map
/// units.
pub const PICK_SLOP: f64 = 6.0;

/// Accuracy passed to kurbo's nearest-point solver.
const NEAREST_ACCURACY: f64 = 1e-6;

/// Strict containment for a boxed node's outline.
pub(crate) fn shape_contains(bounds: Rect, shape: NodeShape, pt: Point) -> bool {
    match shape {
        NodeShape::Rect => bounds.contains(pt),
        NodeShape::RoundedRect { radius } => {
            RoundedRect::from_rect(bounds, radius).contains(pt)
        }
        NodeShape::Ellipse => {
            let radii = Vec2::new(bounds.width() / 2.0, bounds.height() / 2.0);
            Ellipse::new(bounds.center(), radii, 0.0).contains(pt)
        }
    }
}

/// Squared distance from a point to the rectangle's boundary, measured
/// outward. Points inside or on the boundary report 0.
pub(crate) fn rect_edge_distance_sq(bounds: Rect, pt: Point) -> f64 {
    let dx = (bounds.x0 - pt.x).max(pt.x - bounds.x1).max(0.0);
    let dy = (bounds.y0 - pt.y).max(pt.y - bounds.y1).max(0.0);
    dx * dx + dy * dy
}

/// Squared distance from a point to a link's stroke centerline.
pub(crate) fn curve_distance_sq(curve: LinkCurve, pt: Point) -> f64 {
    match curve {
        LinkCurve::Line(line) => line.nearest(pt, NEAREST_ACCURACY).distance_sq,
        LinkCurve::Quad(quad) => quad.nearest(pt, NEAREST_ACCURACY).distance_sq,
    }
}

/// Moves a curve rigidly by `delta`.
pub(crate) fn translate_curve(curve: LinkCurve, delta: Vec2) -> LinkCurve {
    match curve {
        LinkCurve::Line(line) => {
            LinkCurve::Line(kurbo::Line::new(line.p0 + delta, line.p1 + delta))
        }
        LinkCurve::Quad(quad) => LinkCurve::Quad(kurbo::QuadBez::new(
            quad.p0 + delta,
            quad.p1 + delta,
            quad.p2 + delta,
        )),
    }
}
