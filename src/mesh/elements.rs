//! The four node kinds of the topology graph.
//!
//! # Structure
//!
//! - A **vertex** anchors one incident edge; all incident edges form its
//!   *disk cycle*.
//! - An **edge** keeps, separately for each endpoint, a `next`/`prev` pair
//!   threading it into that endpoint's disk cycle, and anchors one loop of its
//!   *radial cycle* (the loops of every face using the edge).
//! - A **loop** is one corner of one face: it starts at `vert`, rides along
//!   `edge`, and is threaded into both the face's boundary cycle
//!   (`next`/`prev`) and the edge's radial cycle (`radial_next`/`radial_prev`).
//! - A **face** anchors one loop of its boundary cycle.
//!
//! All cross references are keys into the owning [`BMesh`](super::BMesh);
//! elements never own each other. Link fields are only written by the
//! topology operations, so a freshly inserted element always points at itself.

use nalgebra::Point3;

use super::index::{EdgeKey, FaceKey, LoopKey, VertexKey};
use crate::attribute::AttributeMap;

/// A vertex of the mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Dense index assigned at the last geometry rebuild.
    pub id: usize,

    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Attribute values.
    pub attributes: AttributeMap,

    /// One incident edge, or `None` for an isolated vertex.
    pub(crate) edge: Option<EdgeKey>,
}

impl Vertex {
    pub(crate) fn new(position: Point3<f64>, attributes: AttributeMap) -> Self {
        Self {
            id: 0,
            position,
            attributes,
            edge: None,
        }
    }

    /// The disk-cycle anchor.
    #[inline]
    pub fn edge(&self) -> Option<EdgeKey> {
        self.edge
    }

    /// Check whether no edge touches this vertex.
    #[inline]
    pub fn is_isolated(&self) -> bool {
        self.edge.is_none()
    }
}

/// An undirected edge between two distinct vertices.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Dense index assigned at the last geometry rebuild.
    pub id: usize,

    /// Attribute values.
    pub attributes: AttributeMap,

    pub(crate) vert1: VertexKey,
    pub(crate) vert2: VertexKey,

    // Disk links around `vert1`.
    pub(crate) next1: EdgeKey,
    pub(crate) prev1: EdgeKey,

    // Disk links around `vert2`.
    pub(crate) next2: EdgeKey,
    pub(crate) prev2: EdgeKey,

    /// Radial anchor.
    pub(crate) loop_: Option<LoopKey>,
}

impl Edge {
    /// Create an edge that forms a singleton disk cycle at both endpoints.
    pub(crate) fn new(
        key: EdgeKey,
        vert1: VertexKey,
        vert2: VertexKey,
        attributes: AttributeMap,
    ) -> Self {
        Self {
            id: 0,
            attributes,
            vert1,
            vert2,
            next1: key,
            prev1: key,
            next2: key,
            prev2: key,
            loop_: None,
        }
    }

    /// The first endpoint.
    #[inline]
    pub fn vert1(&self) -> VertexKey {
        self.vert1
    }

    /// The second endpoint.
    #[inline]
    pub fn vert2(&self) -> VertexKey {
        self.vert2
    }

    /// Both endpoints.
    #[inline]
    pub fn vertices(&self) -> [VertexKey; 2] {
        [self.vert1, self.vert2]
    }

    /// The radial-cycle anchor, or `None` if no face uses this edge.
    #[inline]
    pub fn loop_(&self) -> Option<LoopKey> {
        self.loop_
    }

    /// Check whether `v` is one of the endpoints.
    #[inline]
    pub fn contains_vertex(&self, v: VertexKey) -> bool {
        v == self.vert1 || v == self.vert2
    }

    /// The endpoint opposite to `v`.
    #[inline]
    pub fn other_vertex(&self, v: VertexKey) -> VertexKey {
        self.assert_endpoint(v);
        if v == self.vert1 {
            self.vert2
        } else {
            self.vert1
        }
    }

    /// The next edge in the disk cycle of endpoint `v`.
    #[inline]
    pub fn next(&self, v: VertexKey) -> EdgeKey {
        self.assert_endpoint(v);
        if v == self.vert1 {
            self.next1
        } else {
            self.next2
        }
    }

    /// The previous edge in the disk cycle of endpoint `v`.
    #[inline]
    pub fn prev(&self, v: VertexKey) -> EdgeKey {
        self.assert_endpoint(v);
        if v == self.vert1 {
            self.prev1
        } else {
            self.prev2
        }
    }

    pub(crate) fn set_next(&mut self, v: VertexKey, other: EdgeKey) {
        self.assert_endpoint(v);
        if v == self.vert1 {
            self.next1 = other;
        } else {
            self.next2 = other;
        }
    }

    pub(crate) fn set_prev(&mut self, v: VertexKey, other: EdgeKey) {
        self.assert_endpoint(v);
        if v == self.vert1 {
            self.prev1 = other;
        } else {
            self.prev2 = other;
        }
    }

    #[inline]
    fn assert_endpoint(&self, v: VertexKey) {
        debug_assert!(
            self.contains_vertex(v),
            "{:?} is not an endpoint of edge ({:?}, {:?})",
            v,
            self.vert1,
            self.vert2
        );
    }
}

/// One corner of a face: the face's use of one edge, starting at one vertex.
#[derive(Debug, Clone)]
pub struct Loop {
    /// Attribute values.
    pub attributes: AttributeMap,

    pub(crate) vert: VertexKey,
    pub(crate) edge: EdgeKey,

    /// Owning face. Only cleared while the face is being torn down.
    pub(crate) face: Option<FaceKey>,

    // Face boundary cycle.
    pub(crate) next: LoopKey,
    pub(crate) prev: LoopKey,

    // Radial cycle around `edge`.
    pub(crate) radial_next: LoopKey,
    pub(crate) radial_prev: LoopKey,
}

impl Loop {
    pub(crate) fn new(
        key: LoopKey,
        vert: VertexKey,
        edge: EdgeKey,
        face: FaceKey,
        attributes: AttributeMap,
    ) -> Self {
        Self {
            attributes,
            vert,
            edge,
            face: Some(face),
            next: key,
            prev: key,
            radial_next: key,
            radial_prev: key,
        }
    }

    /// The vertex this loop starts from.
    #[inline]
    pub fn vert(&self) -> VertexKey {
        self.vert
    }

    /// The edge this loop runs along.
    #[inline]
    pub fn edge(&self) -> EdgeKey {
        self.edge
    }

    /// The face this loop belongs to.
    #[inline]
    pub fn face(&self) -> Option<FaceKey> {
        self.face
    }

    /// Next loop around the face.
    #[inline]
    pub fn next(&self) -> LoopKey {
        self.next
    }

    /// Previous loop around the face.
    #[inline]
    pub fn prev(&self) -> LoopKey {
        self.prev
    }

    /// Next loop around the edge.
    #[inline]
    pub fn radial_next(&self) -> LoopKey {
        self.radial_next
    }

    /// Previous loop around the edge.
    #[inline]
    pub fn radial_prev(&self) -> LoopKey {
        self.radial_prev
    }
}

/// A polygonal face.
#[derive(Debug, Clone)]
pub struct Face {
    /// Dense index assigned at the last geometry rebuild.
    pub id: usize,

    /// Attribute values.
    pub attributes: AttributeMap,

    pub(crate) vert_count: usize,

    /// Boundary anchor; the most recently bound loop.
    pub(crate) loop_: Option<LoopKey>,
}

impl Face {
    pub(crate) fn new(attributes: AttributeMap) -> Self {
        Self {
            id: 0,
            attributes,
            vert_count: 0,
            loop_: None,
        }
    }

    /// Number of boundary vertices.
    #[inline]
    pub fn vert_count(&self) -> usize {
        self.vert_count
    }

    /// The boundary anchor.
    #[inline]
    pub fn loop_(&self) -> Option<LoopKey> {
        self.loop_
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_edge_disk_links() {
        let mut verts: SlotMap<VertexKey, ()> = SlotMap::with_key();
        let mut edges: SlotMap<EdgeKey, Edge> = SlotMap::with_key();
        let a = verts.insert(());
        let b = verts.insert(());

        let e = edges.insert_with_key(|k| Edge::new(k, a, b, AttributeMap::new()));
        let f = edges.insert_with_key(|k| Edge::new(k, a, b, AttributeMap::new()));

        let edge = &mut edges[e];
        assert_eq!(edge.next(a), e);
        assert_eq!(edge.prev(b), e);
        assert_eq!(edge.other_vertex(a), b);
        assert_eq!(edge.other_vertex(b), a);

        edge.set_next(b, f);
        assert_eq!(edge.next(b), f);
        assert_eq!(edge.next(a), e);
        edge.set_prev(a, f);
        assert_eq!(edge.prev(a), f);
        assert_eq!(edge.prev(b), e);
    }

    #[test]
    fn test_new_vertex_isolated() {
        let v = Vertex::new(Point3::new(1.0, 2.0, 3.0), AttributeMap::new());
        assert!(v.is_isolated());
        assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
    }
}
