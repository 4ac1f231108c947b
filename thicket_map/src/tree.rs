// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, mutation, queries, pick hooks.

use alloc::vec::Vec;
use core::fmt;

use kurbo::{Line, ParamCurveExtrema, Point, QuadBez, Rect};

use crate::geom::{
    PICK_SLOP, curve_distance_sq, rect_edge_distance_sq, shape_contains, translate_curve,
};
use crate::types::{LinkCurve, MapNode, NodeFlags, NodeId, NodeKind};

/// The component tree of a concept map.
///
/// Nodes live in a generational arena: removing a node frees its slot and
/// bumps the slot's generation, so a stale [`NodeId`] can never alias a later
/// node. Children are stored in paint order, last on top; picking walks them
/// in reverse.
///
/// Bounds are absolute map coordinates. Moving a node does not move its
/// links; call [`MapTree::route_link`] on affected links afterwards (link
/// geometry is derived from the endpoint nodes' bounds).
///
/// ## Example
///
/// ```rust
/// use kurbo::{Point, Rect};
/// use thicket_map::{MapNode, MapTree};
///
/// let mut tree = MapTree::new();
/// let canvas = tree.insert(MapNode::canvas(Rect::new(0.0, 0.0, 500.0, 500.0)), None);
/// let a = tree.insert(MapNode::plain(Rect::new(10.0, 10.0, 60.0, 40.0)), Some(canvas));
/// let b = tree.insert(MapNode::plain(Rect::new(200.0, 10.0, 260.0, 40.0)), Some(canvas));
/// let link = tree.insert(MapNode::link_between(a, b), Some(canvas));
///
/// assert!(tree.contains(a, Point::new(20.0, 20.0)));
/// assert!(tree.contains(link, Point::new(130.0, 25.0)));
/// ```
pub struct MapTree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl fmt::Debug for MapTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("MapTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl Default for MapTree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: MapNode,
}

impl Node {
    fn new(generation: u32, data: MapNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            data,
        }
    }
}

/// Error from [`MapTree::reparent`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReparentError {
    /// The node or the requested parent is not in the tree.
    Stale(NodeId),
    /// The requested parent sits inside the node's own subtree.
    WouldCycle {
        /// The node being moved.
        node: NodeId,
        /// The offending parent.
        new_parent: NodeId,
    },
}

impl fmt::Display for ReparentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stale(id) => write!(f, "reparent of stale node {id:?}"),
            Self::WouldCycle { node, new_parent } => write!(
                f,
                "reparenting {node:?} under {new_parent:?} would create a cycle"
            ),
        }
    }
}

impl core::error::Error for ReparentError {}

impl MapTree {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Inserts a node as the last (topmost) child of `parent`, or as a root.
    ///
    /// A stale `parent` leaves the node as a root. Links are routed from
    /// their endpoints' bounds on the way in, when both ends are live.
    pub fn insert(&mut self, data: MapNode, parent: Option<NodeId>) -> NodeId {
        let kind = data.kind;
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, data));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, data)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent
            && self.is_alive(p)
        {
            self.link_parent(id, p);
        }
        if kind == NodeKind::Link {
            self.route_link(id);
        }
        id
    }

    /// Removes a node and its subtree, returning the node's data.
    ///
    /// Every id in the subtree goes stale. Returns `None` if `id` already
    /// was.
    pub fn remove(&mut self, id: NodeId) -> Option<MapNode> {
        if !self.is_alive(id) {
            return None;
        }
        if let Some(parent) = self.node_ref(id).parent {
            self.unlink_parent(id, parent);
        }
        Some(self.remove_subtree(id))
    }

    fn remove_subtree(&mut self, id: NodeId) -> MapNode {
        let node = self.nodes[id.idx()].take().expect("dangling NodeId");
        self.free_list.push(id.idx());
        for child in node.children {
            let _ = self.remove_subtree(child);
        }
        node.data
    }

    /// Moves `id` under `new_parent` (or to the roots), keeping it topmost in
    /// its new sibling order.
    ///
    /// # Errors
    ///
    /// [`ReparentError::Stale`] if `id` or `new_parent` is not live, and
    /// [`ReparentError::WouldCycle`] if `new_parent` lies in `id`'s subtree
    /// (including `id` itself). The tree is unchanged on error.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), ReparentError> {
        if !self.is_alive(id) {
            return Err(ReparentError::Stale(id));
        }
        if let Some(p) = new_parent {
            if !self.is_alive(p) {
                return Err(ReparentError::Stale(p));
            }
            // Walk up from the new parent; hitting `id` means `p` is inside
            // the subtree being moved.
            let mut current = Some(p);
            while let Some(c) = current {
                if c == id {
                    return Err(ReparentError::WouldCycle { node: id, new_parent: p });
                }
                current = self.node_ref(c).parent;
            }
        }
        if let Some(old) = self.node_ref(id).parent {
            self.unlink_parent(id, old);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        Ok(())
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let children = &mut self.node_mut(parent).children;
        if let Some(pos) = children.iter().position(|c| *c == id) {
            // Not `swap_remove`: sibling order is paint order.
            children.remove(pos);
        }
        self.node_mut(id).parent = None;
    }

    /// Re-derives a link's curve from its endpoints' bounds centers.
    ///
    /// Straight links become the center-to-center segment. Curved links keep
    /// their bow: the control point shifts with the chord midpoint. The
    /// link's bounds become the rerouted curve's bounding box grown by half
    /// the stroke width, so even an axis-aligned straight link has area.
    ///
    /// Returns `false` (leaving the link untouched) if `id` is not a live
    /// link or either endpoint is stale.
    pub fn route_link(&mut self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let Some((from, to)) = self.node_ref(id).data.ends else {
            return false;
        };
        let (Some(a), Some(b)) = (self.bounds_of(from), self.bounds_of(to)) else {
            return false;
        };
        let (start, end) = (a.center(), b.center());
        let node = self.node_mut(id);
        let Some(curve) = node.data.curve else {
            return false;
        };
        let routed = match curve {
            LinkCurve::Line(_) => LinkCurve::Line(Line::new(start, end)),
            LinkCurve::Quad(q) => {
                let shift = start.midpoint(end) - q.p0.midpoint(q.p2);
                LinkCurve::Quad(QuadBez::new(start, q.p1 + shift, end))
            }
        };
        let bbox = match routed {
            LinkCurve::Line(l) => l.bounding_box(),
            LinkCurve::Quad(q) => q.bounding_box(),
        };
        let reach = node.data.stroke_width / 2.0;
        node.data.curve = Some(routed);
        node.data.bounds = bbox.inflate(reach, reach);
        true
    }

    /// Updates a node's bounds.
    ///
    /// A link's curve moves rigidly with its bounds so the two stay
    /// consistent; boxed nodes just take the new rectangle. No link attached
    /// to a moved boxed node is rerouted here.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if node.data.bounds == bounds {
            return;
        }
        if node.data.kind == NodeKind::Link
            && let Some(curve) = node.data.curve
        {
            let delta = bounds.origin() - node.data.bounds.origin();
            node.data.curve = Some(translate_curve(curve, delta));
        }
        node.data.bounds = bounds;
    }

    /// Updates a node's stacking layer.
    pub fn set_layer(&mut self, id: NodeId, layer: i32) {
        if let Some(node) = self.node_opt_mut(id) {
            node.data.layer = layer;
        }
    }

    /// Shows or hides a node (and, during picking, its subtree).
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        self.set_flag(id, NodeFlags::HIDDEN, hidden);
    }

    /// Marks a node in or out of the current view filter.
    pub fn set_filtered(&mut self, id: NodeId, filtered: bool) {
        self.set_flag(id, NodeFlags::FILTERED, filtered);
    }

    /// Marks a node deleted-but-reclaimable (undo holds onto it).
    pub fn set_deleted(&mut self, id: NodeId, deleted: bool) {
        self.set_flag(id, NodeFlags::DELETED, deleted);
    }

    /// Records a node's selected state.
    pub fn set_selected(&mut self, id: NodeId, selected: bool) {
        self.set_flag(id, NodeFlags::SELECTED, selected);
    }

    /// Allows or forbids the node sharing a selection with others.
    pub fn set_multi_select(&mut self, id: NodeId, multi: bool) {
        self.set_flag(id, NodeFlags::MULTI_SELECT, multi);
    }

    fn set_flag(&mut self, id: NodeId, flag: NodeFlags, value: bool) {
        if let Some(node) = self.node_opt_mut(id) {
            node.data.flags.set(flag, value);
        }
    }

    /// Returns a node's data, or `None` for stale ids.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&MapNode> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .map(|node| &node.data)
    }

    /// Returns `true` if `id` refers to a live node.
    #[must_use]
    pub fn contains_id(&self, id: NodeId) -> bool {
        self.is_alive(id)
    }

    /// Returns a node's parent, or `None` for roots and stale ids.
    #[must_use]
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        self.node_ref(id).parent
    }

    /// Returns a node's children in paint order (last drawn on top).
    ///
    /// Stale ids have no children.
    #[must_use]
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        if !self.is_alive(id) {
            return &[];
        }
        &self.node_ref(id).children
    }

    /// Collects the ids of all parentless live nodes.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns `true` if no nodes are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of ancestors above `id`; roots are at depth 0.
    #[must_use]
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        if !self.is_alive(id) {
            return None;
        }
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.node_ref(current).parent {
            depth += 1;
            current = parent;
        }
        Some(depth)
    }

    /// Returns `true` if the node is hidden. Stale ids are nothing at all,
    /// so every flag predicate reports `false` for them.
    #[must_use]
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.has_flag(id, NodeFlags::HIDDEN)
    }

    /// Returns `true` if the node is filtered out of the current view.
    #[must_use]
    pub fn is_filtered(&self, id: NodeId) -> bool {
        self.has_flag(id, NodeFlags::FILTERED)
    }

    /// Returns `true` if the node is deleted but not reclaimed.
    #[must_use]
    pub fn is_deleted(&self, id: NodeId) -> bool {
        self.has_flag(id, NodeFlags::DELETED)
    }

    /// Returns `true` if the node is selected.
    #[must_use]
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.has_flag(id, NodeFlags::SELECTED)
    }

    /// Returns `true` if the node may share a selection with others.
    #[must_use]
    pub fn supports_multi_select(&self, id: NodeId) -> bool {
        self.has_flag(id, NodeFlags::MULTI_SELECT)
    }

    fn has_flag(&self, id: NodeId, flag: NodeFlags) -> bool {
        self.node(id).is_some_and(|n| n.flags.contains(flag))
    }

    /// Returns a node's stacking layer.
    #[must_use]
    pub fn layer_of(&self, id: NodeId) -> Option<i32> {
        self.node(id).map(|n| n.layer)
    }

    /// Returns a node's bounds.
    #[must_use]
    pub fn bounds_of(&self, id: NodeId) -> Option<Rect> {
        self.node(id).map(|n| n.bounds)
    }

    /// Strict containment: the point is on the node's outline or stroke.
    ///
    /// Boxed nodes test their exact shape. Links match within half their
    /// stroke width of the curve. Stale ids never contain anything.
    #[must_use]
    pub fn contains(&self, id: NodeId, pt: Point) -> bool {
        let Some(data) = self.node(id) else {
            return false;
        };
        match data.curve {
            Some(curve) => {
                let reach = data.stroke_width / 2.0;
                curve_distance_sq(curve, pt) <= reach * reach
            }
            None => shape_contains(data.bounds, data.shape, pt),
        }
    }

    /// Forgiving containment: strict, widened by [`PICK_SLOP`].
    ///
    /// Boxed nodes accept anywhere in their inflated bounds, shape ignored.
    /// Links match within half their stroke width plus the slop.
    #[must_use]
    pub fn loose_contains(&self, id: NodeId, pt: Point) -> bool {
        let Some(data) = self.node(id) else {
            return false;
        };
        match data.curve {
            Some(curve) => {
                let reach = data.stroke_width / 2.0 + PICK_SLOP;
                curve_distance_sq(curve, pt) <= reach * reach
            }
            None => data.bounds.inflate(PICK_SLOP, PICK_SLOP).contains(pt),
        }
    }

    /// Squared distance from the point to the node's edge.
    ///
    /// Links measure to their curve; boxed nodes to their bounds rectangle
    /// (0 inside), which is close enough for ranking overlapping hits.
    /// Stale ids are infinitely far: `f64::MAX`.
    #[must_use]
    pub fn distance_to_edge_sq(&self, id: NodeId, pt: Point) -> f64 {
        let Some(data) = self.node(id) else {
            return f64::MAX;
        };
        match data.curve {
            Some(curve) => curve_distance_sq(curve, pt),
            None => rect_edge_distance_sq(data.bounds, pt),
        }
    }

    /// What a direct hit on this node resolves to: the node itself, or
    /// nothing when it is deleted (or stale).
    #[must_use]
    pub fn default_pick(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id) {
            Some(data) if !data.flags.contains(NodeFlags::DELETED) => Some(id),
            _ => None,
        }
    }

    /// The node that claims a hit on `id`: its outermost [`NodeKind::Group`]
    /// ancestor if it has one, otherwise `id` itself.
    ///
    /// The canvas never claims its children's hits.
    #[must_use]
    pub fn parent_redirect(&self, id: NodeId) -> NodeId {
        if !self.is_alive(id) {
            return id;
        }
        let mut claimed = None;
        let mut current = id;
        while let Some(parent) = self.node_ref(current).parent {
            if self.node_ref(parent).data.kind == NodeKind::Group {
                claimed = Some(parent);
            }
            current = parent;
        }
        claimed.unwrap_or(id)
    }

    /// Where a drop on `id` should land: the first of `id` and its ancestors
    /// that can receive drops.
    ///
    /// Links and deleted nodes cannot; the canvas always can. `None` when
    /// the whole ancestor chain refuses (or `id` is stale).
    #[must_use]
    pub fn default_drop_target(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        let mut current = Some(id);
        while let Some(c) = current {
            let node = self.node_ref(c);
            let refuses = node.data.kind == NodeKind::Link
                || node.data.flags.contains(NodeFlags::DELETED);
            if !refuses {
                return Some(c);
            }
            current = node.parent;
        }
        None
    }

    fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .is_some_and(|slot| slot.as_ref().is_some_and(|n| n.generation == id.1))
    }

    /// Access a node known to be live; panics if `id` is stale.
    fn node_ref(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node known to be live, mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes[id.idx()].as_mut()
    }
}
