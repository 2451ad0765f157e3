//! Benchmarks for quality evaluation and smoothing.

use criterion::{criterion_group, criterion_main, Criterion};
use polysmooth::prelude::*;
use nalgebra::Point2;

/// `n x n` quad grid with a fixed boundary and deterministically jittered
/// interior nodes; every third cell is split into two triangles.
fn create_jittered_grid(n: usize) -> PolygonalMesh {
    let mut positions = Vec::with_capacity((n + 1) * (n + 1));
    let mut fixed = Vec::new();
    let mut polygons = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            let idx = positions.len();
            if i == 0 || j == 0 || i == n || j == n {
                fixed.push(idx);
                positions.push(Point2::new(i as f64, j as f64));
            } else {
                let t = idx as f64;
                positions.push(Point2::new(
                    i as f64 + 0.3 * (1.7 * t).sin(),
                    j as f64 + 0.3 * (2.3 * t + 0.5).cos(),
                ));
            }
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            if (i + j) % 3 == 0 {
                polygons.push(vec![v00, v10, v11]);
                polygons.push(vec![v00, v11, v01]);
            } else {
                polygons.push(vec![v00, v10, v11, v01]);
            }
        }
    }

    build_from_polygons(&positions, &polygons, &fixed).unwrap()
}

fn bench_quality(c: &mut Criterion) {
    let mesh = create_jittered_grid(100);

    c.bench_function("quality_100x100_serial", |b| {
        b.iter(|| MeshQuality::evaluate(&mesh, false));
    });

    c.bench_function("quality_100x100_parallel", |b| {
        b.iter(|| MeshQuality::evaluate(&mesh, true));
    });
}

fn bench_smoothing(c: &mut Criterion) {
    let mesh = create_jittered_grid(30);

    c.bench_function("smart_laplace_30x30", |b| {
        let config = SmartLaplaceConfig::default();
        b.iter(|| smart_laplace(&mesh, &config).unwrap());
    });

    c.bench_function("getme_30x30_parallel", |b| {
        let config = GetmeConfig::new(mesh.max_polygon_nodes());
        b.iter(|| getme(&mesh, &config).unwrap());
    });

    c.bench_function("getme_30x30_sequential", |b| {
        let config = GetmeConfig::new(mesh.max_polygon_nodes()).sequential();
        b.iter(|| getme(&mesh, &config).unwrap());
    });
}

criterion_group!(benches, bench_quality, bench_smoothing);
criterion_main!(benches);
