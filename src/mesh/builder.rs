//! Mesh construction utilities.
//!
//! This module provides functions for building meshes from indexed
//! face-vertex lists, as commonly found in mesh file formats, and for
//! converting a mesh back into that form.
//!
//! Every face goes through [`BMesh::add_face`], so edges shared between
//! faces are created once and all cycles are wired by the topology engine.

use std::collections::HashMap;

use nalgebra::Point3;

use super::bmesh::BMesh;
use super::index::VertexKey;
use crate::error::{MeshError, Result};

/// Build a mesh from vertices and triangle faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Returns
/// A mesh, or an error if the input is invalid.
///
/// # Example
/// ```
/// use bmesh::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_edges(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<BMesh> {
    build(vertices, faces.iter().map(|f| &f[..]))
}

/// Build a mesh from vertices and quad faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of quad faces, each as [v0, v1, v2, v3] indices (counter-clockwise)
pub fn build_from_quads(vertices: &[Point3<f64>], faces: &[[usize; 4]]) -> Result<BMesh> {
    build(vertices, faces.iter().map(|f| &f[..]))
}

/// Build a mesh from vertices and faces of any size.
///
/// Faces with more than four vertices are kept in the topology but are
/// skipped by triangulated geometry extraction.
pub fn build_from_polygons(vertices: &[Point3<f64>], faces: &[Vec<usize>]) -> Result<BMesh> {
    build(vertices, faces.iter().map(|f| f.as_slice()))
}

fn build<'a, I>(vertices: &[Point3<f64>], faces: I) -> Result<BMesh>
where
    I: Iterator<Item = &'a [usize]> + Clone,
{
    // Validate everything up front so a failed build never leaves a partial mesh behind.
    let mut count = 0;
    for (fi, face) in faces.clone().enumerate() {
        count += 1;
        if let Some(&vi) = face.iter().find(|&&vi| vi >= vertices.len()) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
        if face.len() < 2 || has_repeated_vertex(face) {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }
    if count == 0 {
        return Err(MeshError::EmptyMesh);
    }

    let mut mesh = BMesh::new();
    let keys: Vec<VertexKey> = vertices.iter().map(|&p| mesh.add_vertex(p)).collect();

    let mut corners = Vec::new();
    for (fi, face) in faces.enumerate() {
        corners.clear();
        corners.extend(face.iter().map(|&vi| keys[vi]));
        mesh.add_face(&corners)
            .ok_or(MeshError::DegenerateFace { face: fi })?;
    }

    Ok(mesh)
}

fn has_repeated_vertex(face: &[usize]) -> bool {
    face.iter()
        .enumerate()
        .any(|(i, v)| face[i + 1..].contains(v))
}

/// Convert a mesh back to a face-vertex representation.
///
/// Vertices are numbered in insertion order, and each face lists its
/// vertices in the order it was defined with.
///
/// Returns (vertices, faces) tuple.
pub fn to_face_vertex(mesh: &BMesh) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let index: HashMap<VertexKey, usize> = mesh
        .vertex_keys()
        .enumerate()
        .map(|(i, v)| (v, i))
        .collect();

    let vertices: Vec<Point3<f64>> = mesh.vertices().map(|(_, v)| v.position).collect();

    let faces: Vec<Vec<usize>> = mesh
        .face_keys()
        .map(|f| {
            let mut face: Vec<usize> = mesh.face_vertices(f).map(|v| index[&v]).collect();
            // The anchor is the last defining corner.
            let shift = 1.min(face.len());
            face.rotate_left(shift);
            face
        })
        .collect();

    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2]];
        (vertices, faces)
    }

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        // Two triangles sharing an edge
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        (vertices, faces)
    }

    fn two_quads() -> (Vec<Point3<f64>>, Vec<[usize; 4]>) {
        // Two quads sharing an edge (1-2)
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2, 3], [1, 4, 5, 2]];
        (vertices, faces)
    }

    #[test]
    fn test_single_triangle() {
        let (vertices, faces) = single_triangle();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_edges(), 3);
        assert_eq!(mesh.num_loops(), 3);
        assert_eq!(mesh.num_faces(), 1);
        assert!(mesh.is_valid());

        // Every edge is used by exactly one face.
        for e in mesh.edge_keys() {
            assert_eq!(mesh.edge_faces(e).count(), 1);
        }
    }

    #[test]
    fn test_two_triangles() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        // 3 + 3 face sides, one shared
        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(mesh.num_loops(), 6);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_two_quads() {
        let (vertices, faces) = two_quads();
        let mesh = build_from_quads(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 7);
        assert_eq!(mesh.num_loops(), 8);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        let (out_verts, out_faces) = to_face_vertex(&mesh);

        assert_eq!(vertices.len(), out_verts.len());
        for (v_in, v_out) in vertices.iter().zip(out_verts.iter()) {
            assert!((v_in - v_out).norm() < 1e-10);
        }
        let expected: Vec<Vec<usize>> = faces.iter().map(|f| f.to_vec()).collect();
        assert_eq!(out_faces, expected);
    }

    #[test]
    fn test_roundtrip_quads() {
        let (vertices, faces) = two_quads();
        let mesh = build_from_quads(&vertices, &faces).unwrap();

        let (_, out_faces) = to_face_vertex(&mesh);
        assert_eq!(out_faces, vec![vec![0, 1, 2, 3], vec![1, 4, 5, 2]]);
    }

    #[test]
    fn test_polygons() {
        let vertices: Vec<_> = (0..5)
            .map(|i| {
                let t = i as f64 * std::f64::consts::TAU / 5.0;
                Point3::new(t.cos(), t.sin(), 0.0)
            })
            .chain(std::iter::once(Point3::new(0.0, 0.0, 1.0)))
            .collect();
        let faces = vec![vec![0, 1, 2, 3, 4], vec![0, 5, 1]];

        let mesh = build_from_polygons(&vertices, &faces).unwrap();
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 7);
        assert!(mesh.is_valid());
        assert_eq!(to_face_vertex(&mesh).1, faces);
    }

    #[test]
    fn test_empty_faces() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let faces: Vec<[usize; 3]> = Vec::new();

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let faces = vec![[0, 1, 2]]; // Indices 1 and 2 are invalid

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 1 })
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let (vertices, _) = single_triangle();
        let faces = vec![[0, 1, 2], [0, 0, 2]]; // Degenerate: v0 == v1

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 1 })));
    }

    #[test]
    fn test_quad_degenerate_face() {
        let (vertices, _) = two_quads();
        // Degenerate: v0 == v2 (diagonal vertices the same)
        let faces = vec![[0, 1, 0, 3]];

        let result = build_from_quads(&vertices, &faces);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));
    }
}
