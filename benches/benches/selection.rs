// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use kurbo::Rect;
use thicket_map::{MapNode, MapTree, NodeId};
use thicket_selection::SelectionModel;

/// A canvas with `len` plain nodes laid out in a row.
fn row_map(len: usize) -> (MapTree, Vec<NodeId>) {
    let mut tree = MapTree::new();
    let width = 24.0 * len as f64;
    let canvas = tree.insert(MapNode::canvas(Rect::new(0.0, 0.0, width, 64.0)), None);
    let ids = (0..len)
        .map(|i| {
            let x = 24.0 * i as f64;
            tree.insert(
                MapNode::plain(Rect::new(x, 20.0, x + 20.0, 44.0)),
                Some(canvas),
            )
        })
        .collect();
    (tree, ids)
}

fn bench_set_to(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/set_to");

    // Hypothesis: set_to is O(n^2) in the member count from the de-dup scan
    // on each add, while the aggregate rebuild is paid once per batch.
    for len in [64_usize, 256, 1_024, 4_096] {
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter_batched(
                || row_map(len),
                |(mut tree, ids)| {
                    let mut selection = SelectionModel::new();
                    selection.set_to(&mut tree, ids.iter().copied());
                    black_box(selection.len());
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_toggle(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/toggle");

    // Half the ids are members going in, so the batch removes as much as it
    // adds. Each flip pays a membership scan; the aggregate rebuild lands
    // once at the end.
    for len in [64_usize, 256, 1_024] {
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter_batched(
                || {
                    let (mut tree, ids) = row_map(len);
                    let mut selection = SelectionModel::new();
                    selection.set_to(&mut tree, ids.iter().copied().step_by(2));
                    (tree, selection, ids)
                },
                |(mut tree, mut selection, ids)| {
                    selection.toggle(&mut tree, ids);
                    black_box(selection.len());
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_bounds_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/bounds_recompute");

    for len in [64_usize, 1_024, 4_096] {
        let (mut tree, ids) = row_map(len);
        let mut selection = SelectionModel::new();
        selection.set_to(&mut tree, ids.iter().copied());
        group.throughput(Throughput::Elements(len as u64));

        group.bench_function(BenchmarkId::from_parameter(len), |b| {
            b.iter(|| {
                selection.invalidate_bounds();
                black_box(selection.bounds(&tree))
            });
        });
    }

    group.finish();
}

fn bench_freeze(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/freeze");

    for len in [64_usize, 1_024, 4_096] {
        let (mut tree, ids) = row_map(len);
        let mut selection = SelectionModel::new();
        selection.set_to(&mut tree, ids.iter().copied());
        group.throughput(Throughput::Elements(len as u64));

        group.bench_function(BenchmarkId::from_parameter(len), |b| {
            b.iter(|| black_box(selection.freeze(&tree)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_set_to,
    bench_toggle,
    bench_bounds_recompute,
    bench_freeze
);
criterion_main!(benches);
