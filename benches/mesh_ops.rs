//! Benchmarks for mesh operations.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use heron::algo::refine::{refine, refine_uniform, CellSplit, RefineOptions};
use heron::prelude::*;
use nalgebra::Point2;

fn grid_input(n: usize) -> (Vec<Point2<f64>>, Vec<[usize; 4]>) {
    let mut nodes = Vec::with_capacity((n + 1) * (n + 1));
    let mut cells = Vec::with_capacity(n * n);

    for j in 0..=n {
        for i in 0..=n {
            nodes.push(Point2::new(i as f64, j as f64));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;
            cells.push([v00, v10, v11, v01]);
        }
    }

    (nodes, cells)
}

fn create_grid_mesh(n: usize) -> HalfEdgeMesh {
    let (nodes, cells) = grid_input(n);
    build_from_polygons(&nodes, &cells).unwrap()
}

fn bench_mesh_construction(c: &mut Criterion) {
    let (nodes, cells) = grid_input(50);
    c.bench_function("build_grid_50x50", |b| {
        b.iter(|| {
            let mesh: HalfEdgeMesh = build_from_polygons(&nodes, &cells).unwrap();
            mesh
        });
    });
}

fn bench_queries(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);

    c.bench_function("cell_to_node", |b| b.iter(|| mesh.cell_to_node()));
    c.bench_function("cell_to_edge", |b| b.iter(|| mesh.cell_to_edge()));
    c.bench_function("cell_to_cell_sparse", |b| b.iter(|| mesh.cell_to_cell_sparse()));
    c.bench_function("edge_to_cell", |b| b.iter(|| mesh.edge_to_cell()));
    c.bench_function("node_to_node", |b| b.iter(|| mesh.node_to_node()));
    c.bench_function("cell_area", |b| b.iter(|| mesh.cell_area()));
}

fn bench_refinement(c: &mut Criterion) {
    let mesh = create_grid_mesh(20);
    let checkerboard: Vec<bool> = (0..mesh.num_cells()).map(|i| (i / 20 + i % 20) % 2 == 0).collect();

    c.bench_function("refine_uniform_fan", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut m| {
                refine_uniform(&mut m, 1).unwrap();
                m
            },
            BatchSize::SmallInput,
        );
    });

    let quad = RefineOptions::new().with_cell_split(CellSplit::Quad);
    c.bench_function("refine_checkerboard_quad", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut m| {
                refine(&mut m, &checkerboard, &quad).unwrap();
                m
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("refine_checkerboard_edge_only", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut m| {
                refine(&mut m, &checkerboard, &RefineOptions::edge_only()).unwrap();
                m
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_mesh_construction, bench_queries, bench_refinement);
criterion_main!(benches);
