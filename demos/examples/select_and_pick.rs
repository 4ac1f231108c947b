// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Picking and selection basics.
//!
//! Build a small concept map, pick nodes by point and by region, and drive
//! the selection through its main moves: replace, toggle, reselect, and the
//! solo rules around the canvas.
//!
//! Run:
//! - `cargo run -p thicket_demos --example select_and_pick`

use kurbo::{Point, Rect};
use thicket_map::{MapNode, MapTree, NodeId, NodeKind};
use thicket_pick::{PickContext, pick_point, pick_region};
use thicket_selection::SelectionModel;

fn main() {
    // A canvas holding two boxed nodes, a two-member group, and a link.
    let mut tree = MapTree::new();
    let canvas = tree.insert(MapNode::canvas(Rect::new(0.0, 0.0, 640.0, 480.0)), None);
    let sun = tree.insert(MapNode::plain(Rect::new(40.0, 40.0, 160.0, 100.0)), Some(canvas));
    let planet = tree.insert(MapNode::plain(Rect::new(240.0, 60.0, 360.0, 120.0)), Some(canvas));
    let group = tree.insert(MapNode::group(Rect::new(80.0, 200.0, 400.0, 360.0)), Some(canvas));
    let moon_a = tree.insert(MapNode::plain(Rect::new(100.0, 220.0, 180.0, 280.0)), Some(group));
    let moon_b = tree.insert(MapNode::plain(Rect::new(300.0, 280.0, 380.0, 340.0)), Some(group));
    let orbit = tree.insert(MapNode::link_between(sun, planet), Some(canvas));

    let labels = [
        (canvas, "canvas"),
        (sun, "sun"),
        (planet, "planet"),
        (group, "group"),
        (moon_a, "moon-a"),
        (moon_b, "moon-b"),
        (orbit, "orbit"),
    ];
    let name = |id: NodeId| {
        labels
            .iter()
            .find(|(node, _)| *node == id)
            .map_or("?", |(_, label)| *label)
    };
    let picked = |hit: Option<NodeId>| hit.map_or("nothing", name);

    let ctx = PickContext::new(Some(canvas));

    println!("== point picks ==");
    // Inside the planet, away from the link's line: a strict hit.
    println!("(330, 110): {}", picked(pick_point(&tree, &ctx, Point::new(330.0, 110.0))));
    // Inside moon-a; the group claims hits on its members.
    println!("(140, 240): {}", picked(pick_point(&tree, &ctx, Point::new(140.0, 240.0))));
    // On the link's line, halfway between sun and planet.
    println!("(200, 80):  {}", picked(pick_point(&tree, &ctx, Point::new(200.0, 80.0))));
    // Same point as a drop-target query; links cannot take drops, so the
    // pick climbs to the canvas.
    let drop = pick_point(&tree, &ctx.drop_target(), Point::new(200.0, 80.0));
    println!("(200, 80) as drop target: {}", picked(drop));
    // Empty corner: the canvas itself catches it.
    println!("(620, 460): {}", picked(pick_point(&tree, &ctx, Point::new(620.0, 460.0))));
    // With the canvas excluded it no longer swallows near-misses, and
    // 4 units right of the planet's edge the forgiving round rescues the
    // pick: everything within the slop competes by distance to its edge.
    let no_backdrop = ctx.exclude(canvas);
    let rescued = pick_point(&tree, &no_backdrop, Point::new(364.0, 90.0));
    println!("(364, 90) with the canvas excluded: {}", picked(rescued));

    println!();
    println!("== region pick ==");
    let band = Rect::new(20.0, 20.0, 420.0, 140.0);
    let swept = pick_region(&tree, &ctx, band);
    let swept_names: Vec<&str> = swept.iter().copied().map(name).collect();
    println!("sweep {band:?}");
    println!("hits: {swept_names:?}");

    println!();
    println!("== selection ==");
    let mut selection = SelectionModel::new();
    selection.set_to(&mut tree, swept);
    println!(
        "set to the sweep: {} members, {} plain + {} link",
        selection.len(),
        selection.kind_count(NodeKind::Plain),
        selection.kind_count(NodeKind::Link),
    );
    println!("union bounds: {:?}", selection.bounds(&tree));

    // A frozen snapshot keeps these numbers even as the live model moves on.
    let snapshot = selection.freeze(&tree);

    selection.toggle(&mut tree, [planet]);
    println!("toggled planet out: {} members", selection.len());

    selection.clear(&mut tree);
    selection.reselect(&mut tree);
    let restored: Vec<&str> = selection.iter().copied().map(name).collect();
    println!("cleared, then reselected: {restored:?}");

    // The canvas is a solo object. Adding an ordinary node evicts a solo
    // sole member; adding a solo object to an occupied selection is refused.
    selection.set_to(&mut tree, [canvas]);
    selection.add(&mut tree, planet);
    let after_evict: Vec<&str> = selection.iter().copied().map(name).collect();
    println!("canvas, then add planet: {after_evict:?} (canvas evicted)");
    let accepted = selection.add(&mut tree, canvas);
    println!(
        "add canvas to occupied selection: accepted={accepted}, rejected so far: {}",
        selection.rejected_mutations(),
    );

    println!();
    println!(
        "snapshot still remembers: {} members, bounds {:?}",
        snapshot.len(),
        snapshot.bounds(),
    );
    println!(
        "live model after {} revisions: {} member(s)",
        selection.revision(),
        selection.len(),
    );
}
