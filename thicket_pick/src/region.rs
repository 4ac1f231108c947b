// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region (rubber-band) picking.

use alloc::vec::Vec;

use kurbo::Rect;
use thicket_map::{MapTree, NodeId};

use crate::{Order, PickContext, TreeVisitor, Walk};

/// Collects nodes whose bounds overlap the region, skipping the traversal
/// root itself.
struct RegionCollector {
    region: Rect,
    root: Option<NodeId>,
    found: Vec<NodeId>,
}

impl TreeVisitor for RegionCollector {
    fn visit(&mut self, tree: &MapTree, id: NodeId) {
        if self.root == Some(id) {
            return;
        }
        let overlaps = tree
            .bounds_of(id)
            .is_some_and(|bounds| bounds.intersect(self.region).area() > 0.0);
        if overlaps {
            self.found.push(id);
        }
    }
}

/// Picks every node whose bounds overlap `region`, in traversal order.
///
/// The traversal root (usually the canvas) never picks itself. A hit needs
/// positive overlap area, so merely touching the region's edge is not
/// enough. No resolution applies: grouped members report themselves
/// alongside their group. The policy in `ctx` prunes and filters exactly as
/// it does for walks, and a missing root yields an empty pick.
pub fn pick_region(tree: &MapTree, ctx: &PickContext, region: Rect) -> Vec<NodeId> {
    let mut collect = RegionCollector {
        region,
        root: ctx.root,
        found: Vec::new(),
    };
    Walk::new(ctx, Order::PreOrder).run(tree, &mut collect);
    collect.found
}
