//! # BMesh
//!
//! A topological mesh kernel with typed per-element attributes.
//!
//! A [`BMesh`](mesh::BMesh) stores vertices, edges, loops and faces in a
//! graph that supports non-manifold configurations: any number of faces may
//! share an edge, faces may have any number of sides, and vertices and edges
//! may exist without faces. The graph is the editing model; triangle and line
//! buffers for a renderer are derived from it on demand.
//!
//! ## Features
//!
//! - **Disk, radial and face cycles**: constant-time insertion and removal with
//!   every invariant restored before an operation returns
//! - **Cascading removal**: removing a vertex removes its edges, removing an
//!   edge removes the faces using it
//! - **Typed attributes**: per-kind definitions with defaults, validation and
//!   automatic backfill
//! - **Derived geometry**: triangle, line and render buffers with a lazily
//!   rebuilt cache
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use bmesh::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut mesh = BMesh::new();
//! let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
//! let d = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
//!
//! // Edges are derived from the face boundary.
//! let quad = mesh.add_face(&[a, b, c, d]).unwrap();
//! assert_eq!(mesh.num_edges(), 4);
//! assert_eq!(mesh.num_loops(), 4);
//! assert_eq!(mesh.face_vertex_count(quad), 4);
//!
//! // A second face reuses the shared edge.
//! let e = mesh.add_vertex(Point3::new(2.0, 0.5, 0.0));
//! mesh.add_face(&[b, e, c]).unwrap();
//! assert_eq!(mesh.num_edges(), 6);
//!
//! let shared = mesh.find_edge(b, c).unwrap();
//! assert_eq!(mesh.edge_faces(shared).count(), 2);
//! assert!(mesh.is_valid());
//! ```
//!
//! ## Attributes
//!
//! ```
//! use bmesh::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, -1.0, 0.0),
//! ];
//! let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2], [1, 0, 3]]).unwrap();
//!
//! mesh.define_attribute(
//!     ElementKind::Face,
//!     AttributeDefinition::new("material_id", BaseType::Int, 1),
//! );
//! let second = mesh.face_keys().nth(1).unwrap();
//! mesh.set_attribute(second.into(), "material_id", AttributeValue::Int(1)).unwrap();
//!
//! // Values must match their definition.
//! assert!(mesh
//!     .set_attribute(second.into(), "material_id", AttributeValue::Float(1.0))
//!     .is_err());
//!
//! let arrays = mesh.arrays().unwrap();
//! assert_eq!(arrays.surfaces.len(), 2);
//! assert_eq!(arrays.surfaces[&1].len(), 3);
//! ```
//!
//! ## Removal
//!
//! ```
//! use bmesh::prelude::*;
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(0.5, 1.0, 0.0),
//! # ];
//! let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//! let v = mesh.vertex_keys().next().unwrap();
//!
//! // Removing a vertex takes its two edges and the face with it.
//! mesh.remove_vertex(v);
//! assert_eq!(mesh.num_vertices(), 2);
//! assert_eq!(mesh.num_edges(), 1);
//! assert_eq!(mesh.num_faces(), 0);
//! assert!(mesh.get_vertex(v).is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attribute;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod options;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use bmesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attribute::{
        AttributeDefinition, AttributeMap, AttributeValue, BaseType, ElementKind,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::geometry::{Aabb, MeshArrays};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex, BMesh, Edge,
        EdgeKey, ElementKey, Face, FaceKey, Loop, LoopKey, Vertex, VertexKey,
    };
    pub use crate::options::MeshOptions;
}

// Re-export nalgebra types for convenience
pub use nalgebra;
