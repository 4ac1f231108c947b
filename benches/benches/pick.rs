// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use thicket_map::{MapNode, MapTree, NodeId};
use thicket_pick::{PickContext, pick_point, pick_region};

/// A `side` by `side` grid of 24x24 nodes on a 32-unit pitch.
///
/// The canvas carries no area of its own, so gap probes fall through to the
/// forgiving round instead of landing on the background.
fn grid_map(side: usize) -> (MapTree, NodeId) {
    let mut tree = MapTree::new();
    let canvas = tree.insert(MapNode::canvas(Rect::ZERO), None);
    for row in 0..side {
        for col in 0..side {
            let x = 32.0 * col as f64;
            let y = 32.0 * row as f64;
            tree.insert(
                MapNode::plain(Rect::new(x, y, x + 24.0, y + 24.0)),
                Some(canvas),
            );
        }
    }
    (tree, canvas)
}

fn bench_pick_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick/point");

    for side in [8_usize, 16, 32] {
        let nodes = side * side;
        let (tree, canvas) = grid_map(side);
        let ctx = PickContext::new(Some(canvas));
        group.throughput(Throughput::Elements(nodes as u64));

        // Dead center of a node: the strict round ends at its first hit.
        let on_node = Point::new(12.0, 12.0);
        group.bench_with_input(BenchmarkId::new("strict_hit", nodes), &on_node, |b, &p| {
            b.iter(|| black_box(pick_point(&tree, &ctx, p)));
        });

        // In a gap between four nodes: both rounds run in full, then the
        // candidates race on squared edge distance.
        let mid = 32.0 * (side / 2) as f64 - 4.0;
        let in_gap = Point::new(mid, mid);
        group.bench_with_input(BenchmarkId::new("loose_rescue", nodes), &in_gap, |b, &p| {
            b.iter(|| black_box(pick_point(&tree, &ctx, p)));
        });
    }

    group.finish();
}

fn bench_pick_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick/region");

    for side in [8_usize, 16, 32] {
        let nodes = side * side;
        let (tree, canvas) = grid_map(side);
        let ctx = PickContext::new(Some(canvas));
        let extent = 32.0 * side as f64;

        // A rubber band over the upper-left quarter of the grid.
        let region = Rect::new(0.0, 0.0, extent / 2.0, extent / 2.0);
        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &region, |b, &r| {
            b.iter(|| black_box(pick_region(&tree, &ctx, r)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pick_point, bench_pick_region);
criterion_main!(benches);
