//! Benchmarks for mesh operations.

use bmesh::prelude::*;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use nalgebra::Point3;

fn grid_input(n: usize) -> (Vec<Point3<f64>>, Vec<[usize; 4]>) {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n);

    // Create grid vertices
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    // Create quads
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11, v01]);
        }
    }

    (vertices, faces)
}

fn create_grid_mesh(n: usize) -> BMesh {
    let (vertices, faces) = grid_input(n);
    build_from_quads(&vertices, &faces).unwrap()
}

fn bench_mesh_construction(c: &mut Criterion) {
    let (vertices, faces) = grid_input(32);

    c.bench_function("build_grid_32x32", |b| {
        b.iter(|| build_from_quads(&vertices, &faces).unwrap());
    });
}

fn bench_mesh_queries(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);
    let keys: Vec<VertexKey> = mesh.vertex_keys().collect();

    c.bench_function("find_edge_all_neighbors", |b| {
        b.iter(|| {
            let mut found = 0;
            for &v in &keys {
                for w in mesh.vertex_neighbors(v) {
                    if mesh.find_edge(v, w).is_some() {
                        found += 1;
                    }
                }
            }
            found
        });
    });

    c.bench_function("vertex_faces_all", |b| {
        b.iter(|| keys.iter().map(|&v| mesh.vertex_faces(v).count()).sum::<usize>());
    });
}

fn bench_teardown(c: &mut Criterion) {
    let mesh = create_grid_mesh(32);

    c.bench_function("remove_all_faces_32x32", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut mesh| {
                let faces: Vec<_> = mesh.face_keys().collect();
                for f in faces {
                    mesh.remove_face(f);
                }
                mesh
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("remove_all_vertices_32x32", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut mesh| {
                let vertices: Vec<_> = mesh.vertex_keys().collect();
                for v in vertices {
                    mesh.remove_vertex(v);
                }
                mesh
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_geometry(c: &mut Criterion) {
    let mut parallel = create_grid_mesh(100);
    let mut sequential = create_grid_mesh(100);
    sequential.set_options(MeshOptions::default().with_parallel(false));

    c.bench_function("arrays_rebuild_100x100", |b| {
        b.iter(|| {
            parallel.set_options(*parallel.options());
            parallel.arrays().unwrap().num_triangles()
        });
    });

    c.bench_function("arrays_rebuild_100x100_sequential", |b| {
        b.iter(|| {
            sequential.set_options(*sequential.options());
            sequential.arrays().unwrap().num_triangles()
        });
    });

    c.bench_function("triangle_points_100x100", |b| {
        b.iter(|| parallel.triangle_points().len());
    });
}

criterion_group!(
    benches,
    bench_mesh_construction,
    bench_mesh_queries,
    bench_teardown,
    bench_geometry
);
criterion_main!(benches);
