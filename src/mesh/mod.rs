//! Core mesh data structures.
//!
//! This module provides the [`BMesh`] topology graph and the operations that
//! build, query and tear it down.
//!
//! # Overview
//!
//! A [`BMesh`] stores four kinds of element: [`Vertex`], [`Edge`], [`Loop`]
//! and [`Face`]. Unlike a half-edge structure, any number of faces may share
//! an edge, and faces may have any number of sides. Connectivity is kept in
//! three families of circular lists:
//!
//! - the **disk cycle** of a vertex lists its incident edges,
//! - the **radial cycle** of an edge lists the loops of every face using it,
//! - the **face cycle** of a face lists its boundary loops in winding order.
//!
//! # Keys
//!
//! Elements are identified by generation-checked keys:
//! - [`VertexKey`] - Identifies a vertex
//! - [`EdgeKey`] - Identifies an edge
//! - [`LoopKey`] - Identifies a loop
//! - [`FaceKey`] - Identifies a face
//!
//! A key to a removed element never resolves again, even if its slot is reused.
//!
//! # Construction
//!
//! ```
//! use bmesh::mesh::{build_from_quads, BMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2, 3]];
//!
//! let mesh: BMesh = build_from_quads(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_loops(), 4);
//! ```

mod bmesh;
mod builder;
mod elements;
mod index;
mod topology;

pub use bmesh::{BMesh, DiskIter, FaceLoopIter, RadialIter};
pub use builder::{build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex};
pub use elements::{Edge, Face, Loop, Vertex};
pub use index::{EdgeKey, ElementKey, FaceKey, LoopKey, VertexKey};
