// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-phase point picking.

use alloc::vec::Vec;

use kurbo::Point;
use thicket_map::{MapTree, NodeId, NodeKind};

use crate::{Order, PickContext, TreeVisitor, Walk};

/// Stops at the first node whose exact outline contains the point.
///
/// Driven post-order over reversed paint order, the first hit is the
/// topmost one on screen.
struct FirstStrictHit {
    point: Point,
    hit: Option<NodeId>,
}

impl TreeVisitor for FirstStrictHit {
    fn visit(&mut self, tree: &MapTree, id: NodeId) {
        if tree.contains(id, self.point) {
            self.hit = Some(id);
        }
    }

    fn done(&self) -> bool {
        self.hit.is_some()
    }
}

/// Gathers material for the forgiving round: nodes within the slop of the
/// point, plus every link seen along the way.
struct LooseCandidates {
    point: Point,
    loose: Vec<NodeId>,
    links: Vec<NodeId>,
}

impl TreeVisitor for LooseCandidates {
    fn visit(&mut self, tree: &MapTree, id: NodeId) {
        if tree.node(id).is_some_and(|node| node.kind == NodeKind::Link) {
            self.links.push(id);
        }
        if tree.loose_contains(id, self.point) {
            self.loose.push(id);
        }
    }
}

/// Turns a raw hit into the node the caller should get.
///
/// The hit's outermost group claims it, deleted nodes resolve to nothing,
/// and drop-target queries climb to something droppable.
fn resolve(tree: &MapTree, ctx: &PickContext, hit: NodeId) -> Option<NodeId> {
    let claimed = tree.parent_redirect(hit);
    let picked = tree.default_pick(claimed)?;
    if ctx.drop_target {
        tree.default_drop_target(picked)
    } else {
        Some(picked)
    }
}

/// Picks the node under `point`, honoring `ctx`'s policy.
///
/// Picking runs in two rounds. The first takes the topmost node whose exact
/// outline contains the point. When nothing does, a second round gathers
/// every node within [`PICK_SLOP`](thicket_map::PICK_SLOP) of the point and
/// takes the closest by squared edge distance; links compete in this round
/// by curve distance even when they sit beyond the slop, but only once some
/// node was within it. Equally distant candidates keep the one met first,
/// which is the topmost in paint order.
///
/// The raw hit then resolves before it is returned: its outermost group
/// claims it, a deleted hit resolves to nothing, and with
/// [`PickContext::drop_target`] the result climbs to a node that can
/// receive a drop.
///
/// Returns `None` for a missing root, when nothing is near the point, or
/// when resolution refuses the hit.
pub fn pick_point(tree: &MapTree, ctx: &PickContext, point: Point) -> Option<NodeId> {
    let mut strict = FirstStrictHit { point, hit: None };
    Walk::new(ctx, Order::PostOrder).run(tree, &mut strict);
    if let Some(hit) = strict.hit {
        return resolve(tree, ctx, hit);
    }

    let mut fallback = LooseCandidates {
        point,
        loose: Vec::new(),
        links: Vec::new(),
    };
    Walk::new(ctx, Order::PostOrder).run(tree, &mut fallback);
    if fallback.loose.is_empty() {
        return None;
    }
    let mut best: Option<(NodeId, f64)> = None;
    for id in fallback.loose.iter().chain(fallback.links.iter()).copied() {
        let distance_sq = tree.distance_to_edge_sq(id, point);
        match best {
            Some((_, nearest)) if distance_sq >= nearest => {}
            _ => best = Some((id, distance_sq)),
        }
    }
    let (winner, _) = best?;
    resolve(tree, ctx, winner)
}
