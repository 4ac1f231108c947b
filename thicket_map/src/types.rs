// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the map tree: node identifiers, kinds, flags, and geometry.

use kurbo::{Line, Point, QuadBez, Rect};

/// Identifier for a node in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// The closed set of node kinds a map is built from.
///
/// Kind-specific behavior (pick resolution, drop targets, editable
/// properties) is dispatched by matching on this enum rather than through
/// trait objects, so the full behavior of a node is readable in one place.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// The map surface itself. A solo object: it never participates in
    /// multi-selection and never claims its children's picks.
    Canvas,
    /// An ordinary boxed node.
    Plain,
    /// A container that claims picks on its children.
    Group,
    /// An edge between two nodes, with curve geometry.
    Link,
}

impl NodeKind {
    /// The number of kinds, for kind-indexed tables.
    pub const COUNT: usize = 4;

    /// This kind's position in a kind-indexed table.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The properties editable on nodes of this kind.
    ///
    /// A selection spanning several kinds can only edit the union of the
    /// members' sets; inspectors use this to decide which controls to show.
    #[must_use]
    pub const fn supported_properties(self) -> PropertyFlags {
        match self {
            Self::Canvas => PropertyFlags::FILL_COLOR.union(PropertyFlags::NOTES),
            Self::Plain => PropertyFlags::FILL_COLOR
                .union(PropertyFlags::STROKE_COLOR)
                .union(PropertyFlags::STROKE_WIDTH)
                .union(PropertyFlags::TEXT_COLOR)
                .union(PropertyFlags::FONT)
                .union(PropertyFlags::LABEL)
                .union(PropertyFlags::NOTES)
                .union(PropertyFlags::SHAPE)
                .union(PropertyFlags::RESIZE)
                .union(PropertyFlags::LOCATION),
            Self::Group => PropertyFlags::STROKE_COLOR
                .union(PropertyFlags::STROKE_WIDTH)
                .union(PropertyFlags::LABEL)
                .union(PropertyFlags::NOTES)
                .union(PropertyFlags::RESIZE)
                .union(PropertyFlags::LOCATION),
            Self::Link => PropertyFlags::STROKE_COLOR
                .union(PropertyFlags::STROKE_WIDTH)
                .union(PropertyFlags::TEXT_COLOR)
                .union(PropertyFlags::FONT)
                .union(PropertyFlags::LABEL)
                .union(PropertyFlags::NOTES)
                .union(PropertyFlags::CURVE)
                .union(PropertyFlags::LINK_ARROWS)
                .union(PropertyFlags::LOCATION),
        }
    }

    /// The flag set nodes of this kind start with.
    #[must_use]
    pub const fn default_flags(self) -> NodeFlags {
        match self {
            Self::Canvas => NodeFlags::empty(),
            _ => NodeFlags::MULTI_SELECT,
        }
    }
}

bitflags::bitflags! {
    /// Node state flags controlling visibility, picking, and selection.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is hidden (invisible and unpickable, along with its subtree).
        const HIDDEN       = 0b0000_0001;
        /// Node is filtered out by the current view filter.
        const FILTERED     = 0b0000_0010;
        /// Node is deleted but not yet reclaimed (undo keeps it around).
        const DELETED      = 0b0000_0100;
        /// Node is currently selected.
        const SELECTED     = 0b0000_1000;
        /// Node may share a selection with other nodes.
        const MULTI_SELECT = 0b0001_0000;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::MULTI_SELECT
    }
}

bitflags::bitflags! {
    /// Editable property keys.
    ///
    /// Each [`NodeKind`] supports a fixed subset; see
    /// [`NodeKind::supported_properties`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u32 {
        /// Interior fill color.
        const FILL_COLOR   = 1 << 0;
        /// Outline stroke color.
        const STROKE_COLOR = 1 << 1;
        /// Outline stroke width.
        const STROKE_WIDTH = 1 << 2;
        /// Label text color.
        const TEXT_COLOR   = 1 << 3;
        /// Label font.
        const FONT         = 1 << 4;
        /// Label text.
        const LABEL        = 1 << 5;
        /// Attached notes.
        const NOTES        = 1 << 6;
        /// Boxed node shape.
        const SHAPE        = 1 << 7;
        /// Link curvature.
        const CURVE        = 1 << 8;
        /// Resizable bounds.
        const RESIZE       = 1 << 9;
        /// Movable location.
        const LOCATION     = 1 << 10;
        /// Link arrow heads.
        const LINK_ARROWS  = 1 << 11;
    }
}

/// Outline shape of a boxed node, within its bounds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NodeShape {
    /// Plain rectangle.
    Rect,
    /// Rectangle with rounded corners.
    RoundedRect {
        /// Corner radius.
        radius: f64,
    },
    /// Ellipse inscribed in the bounds.
    Ellipse,
}

/// Geometry of a link's stroke.
///
/// Straight links are a [`Line`] between the endpoint nodes' centers. Curved
/// links are a [`QuadBez`]; their strict containment region gets concave,
/// which is why point picking keeps a loose fallback around (see the
/// `thicket_pick` crate).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LinkCurve {
    /// Straight segment.
    Line(Line),
    /// Quadratic Bézier segment.
    Quad(QuadBez),
}

/// One component of the map.
///
/// Bounds are absolute map coordinates; the map has no nested coordinate
/// spaces. For links, `bounds` is the curve's bounding box grown by half the
/// stroke width and is re-derived by routing.
#[derive(Clone, Debug, PartialEq)]
pub struct MapNode {
    /// What this node is.
    pub kind: NodeKind,
    /// Absolute bounds.
    pub bounds: Rect,
    /// Outline shape; only meaningful for boxed kinds.
    pub shape: NodeShape,
    /// Stroke geometry; present on links, `None` elsewhere.
    pub curve: Option<LinkCurve>,
    /// The nodes a link connects; `None` for non-links.
    pub ends: Option<(NodeId, NodeId)>,
    /// Stroke width, which doubles as a link's pick thickness.
    pub stroke_width: f64,
    /// Stacking layer. Higher layers sit above lower ones during picking.
    pub layer: i32,
    /// State flags.
    pub flags: NodeFlags,
    /// Editable properties. Starts at the kind's supported set.
    pub properties: PropertyFlags,
}

impl MapNode {
    fn with_kind(kind: NodeKind, bounds: Rect) -> Self {
        Self {
            kind,
            bounds,
            shape: NodeShape::Rect,
            curve: None,
            ends: None,
            stroke_width: 1.0,
            layer: 0,
            flags: kind.default_flags(),
            properties: kind.supported_properties(),
        }
    }

    /// An ordinary boxed node.
    #[must_use]
    pub fn plain(bounds: Rect) -> Self {
        Self::with_kind(NodeKind::Plain, bounds)
    }

    /// A group container.
    #[must_use]
    pub fn group(bounds: Rect) -> Self {
        Self::with_kind(NodeKind::Group, bounds)
    }

    /// The map surface.
    #[must_use]
    pub fn canvas(bounds: Rect) -> Self {
        Self::with_kind(NodeKind::Canvas, bounds)
    }

    /// A straight link between two nodes.
    ///
    /// The curve starts degenerate; inserting the link into a
    /// [`MapTree`](crate::MapTree) routes it from the endpoints' bounds, as
    /// does [`MapTree::route_link`](crate::MapTree::route_link) after an
    /// endpoint moves.
    #[must_use]
    pub fn link_between(from: NodeId, to: NodeId) -> Self {
        let mut node = Self::with_kind(NodeKind::Link, Rect::ZERO);
        node.curve = Some(LinkCurve::Line(Line::new(Point::ZERO, Point::ZERO)));
        node.ends = Some((from, to));
        node
    }

    /// Sets the stacking layer.
    #[must_use]
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Sets the outline shape.
    #[must_use]
    pub fn with_shape(mut self, shape: NodeShape) -> Self {
        self.shape = shape;
        self
    }

    /// Sets the stroke width.
    #[must_use]
    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    /// Returns `true` if this node may share a selection with others.
    #[must_use]
    pub fn supports_multi_select(&self) -> bool {
        self.flags.contains(NodeFlags::MULTI_SELECT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_defaults_mark_the_canvas_as_solo() {
        assert_eq!(NodeKind::Canvas.default_flags(), NodeFlags::empty());
        assert_eq!(NodeKind::Plain.default_flags(), NodeFlags::MULTI_SELECT);
        assert_eq!(NodeKind::Group.default_flags(), NodeFlags::MULTI_SELECT);
        assert_eq!(NodeKind::Link.default_flags(), NodeFlags::MULTI_SELECT);
    }

    #[test]
    fn property_sets_follow_the_kind() {
        assert!(
            NodeKind::Link
                .supported_properties()
                .contains(PropertyFlags::CURVE)
        );
        assert!(
            !NodeKind::Plain
                .supported_properties()
                .contains(PropertyFlags::CURVE)
        );
        assert!(
            NodeKind::Plain
                .supported_properties()
                .contains(PropertyFlags::SHAPE)
        );
        assert!(
            !NodeKind::Canvas
                .supported_properties()
                .contains(PropertyFlags::LOCATION)
        );
        // Shared across several kinds.
        for kind in [NodeKind::Plain, NodeKind::Group, NodeKind::Link] {
            assert!(
                kind.supported_properties().contains(PropertyFlags::NOTES),
                "{kind:?} should support notes"
            );
        }
    }

    #[test]
    fn constructors_wire_kind_coupled_fields() {
        let plain = MapNode::plain(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(plain.kind, NodeKind::Plain);
        assert!(plain.curve.is_none());
        assert!(plain.supports_multi_select());

        let canvas = MapNode::canvas(Rect::new(0.0, 0.0, 500.0, 500.0));
        assert!(!canvas.supports_multi_select());

        let link = MapNode::link_between(NodeId::new(0, 1), NodeId::new(1, 1));
        assert_eq!(link.kind, NodeKind::Link);
        assert!(link.curve.is_some());
        assert_eq!(link.ends, Some((NodeId::new(0, 1), NodeId::new(1, 1))));
    }

    #[test]
    fn builders_layer_on_top_of_kind_defaults() {
        let node = MapNode::plain(Rect::new(0.0, 0.0, 10.0, 10.0))
            .with_layer(3)
            .with_shape(NodeShape::Ellipse)
            .with_stroke_width(2.5);
        assert_eq!(node.layer, 3);
        assert_eq!(node.shape, NodeShape::Ellipse);
        assert_eq!(node.stroke_width, 2.5);
        assert_eq!(node.properties, NodeKind::Plain.supported_properties());
    }
}
