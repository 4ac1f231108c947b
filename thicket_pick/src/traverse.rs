// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-first walks with a pluggable acceptance policy.

use thicket_map::{MapTree, NodeId};

use crate::PickContext;

/// When a node is handed to the visitor relative to its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// Parents before children.
    PreOrder,
    /// Children before parents.
    PostOrder,
}

/// Receives nodes from a [`Walk`] and steers its policy.
///
/// Only [`TreeVisitor::visit`] is required. The two acceptance hooks default
/// to the standard pick policy ([`default_accept`] and
/// [`default_accept_traversal`]); override them to tighten or loosen it.
/// [`TreeVisitor::done`] lets a visitor cut the walk short as soon as it has
/// what it came for.
pub trait TreeVisitor {
    /// Called for every accepted node, in traversal order.
    fn visit(&mut self, tree: &MapTree, id: NodeId);

    /// Whether `id` itself should be visited.
    ///
    /// Rejection here is local: the node is skipped but its children are
    /// still walked.
    fn accept(&self, tree: &MapTree, ctx: &PickContext, id: NodeId) -> bool {
        default_accept(tree, ctx, id)
    }

    /// Whether the walk may enter `id`'s subtree at all.
    ///
    /// Rejection here prunes: neither `id` nor anything below it is seen.
    fn accept_traversal(
        &self,
        tree: &MapTree,
        ctx: &PickContext,
        id: NodeId,
        depth: usize,
    ) -> bool {
        default_accept_traversal(tree, ctx, id, depth)
    }

    /// Checked after every visit and after every subtree; `true` stops the
    /// walk immediately, skipping any pending ancestor visits.
    fn done(&self) -> bool {
        false
    }
}

/// The standard subtree-pruning policy.
///
/// Rejects the node being dragged, hidden nodes, nodes deeper than the
/// context's depth limit, and nodes on a layer above the context's layer
/// cap. A rejection prunes the node's whole subtree.
pub fn default_accept_traversal(
    tree: &MapTree,
    ctx: &PickContext,
    id: NodeId,
    depth: usize,
) -> bool {
    if ctx.dragging == Some(id) {
        return false;
    }
    if tree.is_hidden(id) {
        return false;
    }
    if depth > ctx.max_depth {
        return false;
    }
    if tree.layer_of(id).is_some_and(|layer| layer > ctx.max_layer) {
        return false;
    }
    true
}

/// The standard per-node visibility policy.
///
/// Rejects the context's excluded node, filtered-out nodes, selected nodes
/// when the context ignores the selection, and anything the context's
/// acceptor turns down. Rejection is local; children are still walked.
pub fn default_accept(tree: &MapTree, ctx: &PickContext, id: NodeId) -> bool {
    if ctx.exclude == Some(id) {
        return false;
    }
    if tree.is_filtered(id) {
        return false;
    }
    if ctx.ignore_selected && tree.is_selected(id) {
        return false;
    }
    if let Some(acceptor) = ctx.acceptor
        && !acceptor(tree, id)
    {
        return false;
    }
    true
}

/// A depth-first walk of the subtree under a context's root.
///
/// Children recurse in reverse insertion order, so the walk sees the
/// topmost (last-painted) sibling first. A `None` or stale root makes
/// [`Walk::run`] a no-op.
#[derive(Clone, Copy, Debug)]
pub struct Walk<'a> {
    ctx: &'a PickContext,
    order: Order,
}

impl<'a> Walk<'a> {
    /// A walk over `ctx`'s subtree in the given order.
    pub const fn new(ctx: &'a PickContext, order: Order) -> Self {
        Self { ctx, order }
    }

    /// Drives `visitor` over the tree.
    pub fn run<V: TreeVisitor>(&self, tree: &MapTree, visitor: &mut V) {
        let Some(root) = self.ctx.root else {
            return;
        };
        if !tree.contains_id(root) {
            return;
        }
        self.walk_node(tree, visitor, root, 0);
    }

    fn walk_node<V: TreeVisitor>(
        &self,
        tree: &MapTree,
        visitor: &mut V,
        id: NodeId,
        depth: usize,
    ) {
        if !visitor.accept_traversal(tree, self.ctx, id, depth) {
            return;
        }
        let accepted = visitor.accept(tree, self.ctx, id);
        if self.order == Order::PreOrder && accepted {
            visitor.visit(tree, id);
            if visitor.done() {
                return;
            }
        }
        for &child in tree.children_of(id).iter().rev() {
            self.walk_node(tree, visitor, child, depth + 1);
            if visitor.done() {
                return;
            }
        }
        if self.order == Order::PostOrder && accepted {
            visitor.visit(tree, id);
        }
    }
}
