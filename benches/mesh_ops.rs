//! Benchmarks for mesh operations.

use criterion::{criterion_group, criterion_main, Criterion};
use meshqa::prelude::*;
use nalgebra::Point3;

fn create_grid_record(n: usize) -> MeshRecord {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            // Slight bump so the grid is not planar.
            let z = 0.05 * ((i as f64) * 0.3).sin() * ((j as f64) * 0.3).cos();
            vertices.push(Point3::new(i as f64, j as f64, z));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    MeshRecord::new(vertices, faces)
}

fn bench_topology(c: &mut Criterion) {
    let record = create_grid_record(100);

    c.bench_function("build_topology_grid_100x100", |b| {
        b.iter(|| {
            let topo: Topology = build_topology(record.num_vertices(), &record.faces).unwrap();
            topo
        });
    });
}

fn bench_metrics(c: &mut Criterion) {
    let record = create_grid_record(100);
    let topo: Topology = build_topology(record.num_vertices(), &record.faces).unwrap();

    c.bench_function("build_metrics_grid_100x100", |b| {
        b.iter(|| build_metrics(&topo, &record.positions).unwrap());
    });
}

fn bench_clean(c: &mut Criterion) {
    let mut record = create_grid_record(100);
    // Every tenth face duplicated.
    let extra: Vec<[usize; 3]> = record.faces.iter().step_by(10).copied().collect();
    record.faces.extend(extra);

    c.bench_function("clean_mesh_grid_100x100", |b| {
        b.iter(|| clean_mesh(&record, &CleanOptions::default()).unwrap());
    });
}

criterion_group!(benches, bench_topology, bench_metrics, bench_clean);
criterion_main!(benches);
