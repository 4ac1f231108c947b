// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-query traversal and picking policy.

use thicket_map::{MapTree, NodeId};

/// Policy for one walk or pick over a [`MapTree`].
///
/// A context is cheap to build and [`Copy`], so callers typically assemble
/// one per query with the builder methods:
///
/// ```
/// use kurbo::Rect;
/// use thicket_map::{MapNode, MapTree};
/// use thicket_pick::PickContext;
///
/// let mut tree = MapTree::new();
/// let canvas = tree.insert(MapNode::canvas(Rect::new(0.0, 0.0, 640.0, 480.0)), None);
/// let dragged = tree.insert(MapNode::plain(Rect::new(20.0, 20.0, 120.0, 80.0)), Some(canvas));
///
/// let ctx = PickContext::new(Some(canvas))
///     .dragging(dragged)
///     .max_layer(3);
/// ```
///
/// Every field defaults to "no restriction": unlimited depth and layer,
/// nothing excluded, nothing dragged, selected and filtered-out nodes
/// eligible, no acceptor, plain pick resolution.
#[derive(Clone, Copy, Debug)]
pub struct PickContext {
    pub(crate) root: Option<NodeId>,
    pub(crate) max_depth: usize,
    pub(crate) max_layer: i32,
    pub(crate) exclude: Option<NodeId>,
    pub(crate) dragging: Option<NodeId>,
    pub(crate) ignore_selected: bool,
    pub(crate) drop_target: bool,
    pub(crate) acceptor: Option<fn(&MapTree, NodeId) -> bool>,
}

impl PickContext {
    /// An unrestricted policy rooted at `root`.
    ///
    /// Walks and picks visit `root`'s descendants; a `None` root makes every
    /// query come back empty rather than erroring.
    pub const fn new(root: Option<NodeId>) -> Self {
        Self {
            root,
            max_depth: usize::MAX,
            max_layer: i32::MAX,
            exclude: None,
            dragging: None,
            ignore_selected: false,
            drop_target: false,
            acceptor: None,
        }
    }

    /// Stops descending below `depth` levels under the root (the root's
    /// immediate children are depth 1).
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Prunes subtrees whose root sits on a layer above `layer`.
    #[must_use]
    pub const fn max_layer(mut self, layer: i32) -> Self {
        self.max_layer = layer;
        self
    }

    /// Makes `id` invisible to picks while still walking its children.
    #[must_use]
    pub const fn exclude(mut self, id: NodeId) -> Self {
        self.exclude = Some(id);
        self
    }

    /// Prunes `id`'s whole subtree, as when `id` is being dragged and must
    /// not be its own drop target.
    #[must_use]
    pub const fn dragging(mut self, id: NodeId) -> Self {
        self.dragging = Some(id);
        self
    }

    /// Makes selected nodes invisible to picks while still walking their
    /// children.
    #[must_use]
    pub const fn ignore_selected(mut self) -> Self {
        self.ignore_selected = true;
        self
    }

    /// Resolves point picks through [`MapTree::default_drop_target`], so the
    /// result is something that can receive a drop.
    #[must_use]
    pub const fn drop_target(mut self) -> Self {
        self.drop_target = true;
        self
    }

    /// Rejects any node for which `acceptor` returns `false`, in addition to
    /// the built-in pick policy. The node's children are still walked.
    #[must_use]
    pub const fn acceptor(mut self, acceptor: fn(&MapTree, NodeId) -> bool) -> Self {
        self.acceptor = Some(acceptor);
        self
    }

    /// The root this context walks from, if any.
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }
}

impl Default for PickContext {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use thicket_map::MapNode;

    use super::*;

    #[test]
    fn defaults_restrict_nothing() {
        let ctx = PickContext::new(None);
        assert_eq!(ctx.max_depth, usize::MAX);
        assert_eq!(ctx.max_layer, i32::MAX);
        assert!(ctx.exclude.is_none());
        assert!(ctx.dragging.is_none());
        assert!(!ctx.ignore_selected);
        assert!(!ctx.drop_target);
        assert!(ctx.acceptor.is_none());
    }

    #[test]
    fn builders_compose() {
        let mut tree = MapTree::new();
        let canvas = tree.insert(MapNode::canvas(Rect::ZERO), None);
        let node = tree.insert(MapNode::plain(Rect::ZERO), Some(canvas));

        let ctx = PickContext::new(Some(canvas))
            .max_depth(2)
            .max_layer(5)
            .exclude(node)
            .dragging(node)
            .ignore_selected()
            .drop_target()
            .acceptor(|tree, id| tree.layer_of(id) == Some(0));

        assert_eq!(ctx.root(), Some(canvas));
        assert_eq!(ctx.max_depth, 2);
        assert_eq!(ctx.max_layer, 5);
        assert_eq!(ctx.exclude, Some(node));
        assert_eq!(ctx.dragging, Some(node));
        assert!(ctx.ignore_selected);
        assert!(ctx.drop_target);
        assert!(ctx.acceptor.is_some_and(|accept| accept(&tree, node)));
    }
}
