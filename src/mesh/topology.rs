//! Topology operations.
//!
//! Every element is created and destroyed here. The operations keep three
//! families of circular doubly-linked lists intact:
//!
//! - the **disk cycle** of each vertex (edges around the vertex),
//! - the **radial cycle** of each edge (loops around the edge),
//! - the **face cycle** of each face (loops around the face).
//!
//! Removal cascades downwards: removing a vertex removes its edges, removing
//! an edge removes its loops, and removing a loop removes its whole face.
//! Each operation restores all invariants before returning and marks the
//! mesh dirty.

use nalgebra::Point3;

use super::bmesh::BMesh;
use super::elements::{Edge, Face, Loop, Vertex};
use super::index::{EdgeKey, FaceKey, LoopKey, VertexKey};
use crate::attribute::{AttributeMap, ElementKind};

impl BMesh {
    // ==================== Construction ====================

    /// Add a new isolated vertex and return its key.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexKey {
        self.add_vertex_with_attributes(position, AttributeMap::new())
    }

    /// Add a new isolated vertex carrying the given attributes.
    ///
    /// Missing attributes are filled from their definitions, and values that
    /// do not match their definition are reset to its default.
    pub fn add_vertex_with_attributes(
        &mut self,
        position: Point3<f64>,
        mut attributes: AttributeMap,
    ) -> VertexKey {
        self.registry.ensure(ElementKind::Vertex, &mut attributes);
        let key = self.vertices.insert(Vertex::new(position, attributes));
        self.vertex_order.push(key);
        self.mark_dirty();
        key
    }

    /// Add an edge between two vertices, or return the one that already joins them.
    ///
    /// # Panics
    /// Panics if `v1 == v2` or if either vertex has been removed.
    pub fn add_edge(&mut self, v1: VertexKey, v2: VertexKey) -> EdgeKey {
        assert!(v1 != v2, "edge endpoints must be distinct vertices ({:?})", v1);

        if let Some(existing) = self.find_edge(v1, v2) {
            return existing;
        }

        let mut attributes = AttributeMap::new();
        self.registry.ensure(ElementKind::Edge, &mut attributes);
        let key = self
            .edges
            .insert_with_key(|k| Edge::new(k, v1, v2, attributes));
        self.edge_order.push(key);

        self.disk_link(key, v1);
        self.disk_link(key, v2);

        self.mark_dirty();
        key
    }

    /// Splice `e` into the disk cycle of `v`, right after the vertex's anchor.
    fn disk_link(&mut self, e: EdgeKey, v: VertexKey) {
        match self.vertices[v].edge {
            None => {
                // A new edge already forms a singleton cycle.
                self.vertices[v].edge = Some(e);
            }
            Some(anchor) => {
                let next = self.edges[anchor].next(v);
                {
                    let edge = &mut self.edges[e];
                    edge.set_next(v, next);
                    edge.set_prev(v, anchor);
                }
                self.edges[next].set_prev(v, e);
                self.edges[anchor].set_next(v, e);
            }
        }
    }

    /// Add a face bounded by `vertices`, creating any missing edges.
    ///
    /// Edges join each vertex to the next one, wrapping around from the last
    /// to the first. Faces of any size are accepted, but only triangles and
    /// quads produce triangulated geometry.
    ///
    /// Returns `None` without touching the mesh if the list is empty,
    /// references a removed vertex, or repeats a vertex on consecutive corners.
    ///
    /// # Example
    /// ```
    /// use bmesh::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let mut mesh = BMesh::new();
    /// let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
    /// let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
    /// let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
    ///
    /// let f = mesh.add_face(&[a, b, c]).unwrap();
    /// assert_eq!(mesh.num_edges(), 3);
    /// assert_eq!(mesh.face_vertex_count(f), 3);
    /// assert!(mesh.add_face(&[]).is_none());
    /// ```
    pub fn add_face(&mut self, vertices: &[VertexKey]) -> Option<FaceKey> {
        if vertices.is_empty() {
            return None;
        }
        if let Some(&v) = vertices.iter().find(|&&v| !self.vertices.contains_key(v)) {
            log::warn!("add_face: {:?} is not part of this mesh", v);
            return None;
        }
        let n = vertices.len();
        if (0..n).any(|i| vertices[i] == vertices[(i + 1) % n]) {
            log::warn!("add_face: consecutive corners share a vertex, face rejected");
            return None;
        }

        let edges: Vec<EdgeKey> = (0..n)
            .map(|i| self.add_edge(vertices[i], vertices[(i + 1) % n]))
            .collect();

        let mut attributes = AttributeMap::new();
        self.registry.ensure(ElementKind::Face, &mut attributes);
        let face = self.faces.insert(Face::new(attributes));
        self.face_order.push(face);

        for (&v, &e) in vertices.iter().zip(&edges) {
            let mut attributes = AttributeMap::new();
            self.registry.ensure(ElementKind::Loop, &mut attributes);
            let l = self
                .loops
                .insert_with_key(|k| Loop::new(k, v, e, face, attributes));
            self.loop_order.push(l);

            self.face_link(l, face);
            self.radial_link(l, e);
        }

        self.faces[face].vert_count = n;
        self.mark_dirty();
        Some(face)
    }

    /// Bind `l` into the boundary of `f`, after the anchor; `l` becomes the anchor.
    fn face_link(&mut self, l: LoopKey, f: FaceKey) {
        if let Some(anchor) = self.faces[f].loop_ {
            let next = self.loops[anchor].next;
            {
                let lp = &mut self.loops[l];
                lp.prev = anchor;
                lp.next = next;
            }
            self.loops[next].prev = l;
            self.loops[anchor].next = l;
        }
        self.faces[f].loop_ = Some(l);
    }

    /// Bind `l` into the radial cycle of `e`, after the anchor; `l` becomes the anchor.
    fn radial_link(&mut self, l: LoopKey, e: EdgeKey) {
        if let Some(anchor) = self.edges[e].loop_ {
            let next = self.loops[anchor].radial_next;
            {
                let lp = &mut self.loops[l];
                lp.radial_prev = anchor;
                lp.radial_next = next;
            }
            self.loops[next].radial_prev = l;
            self.loops[anchor].radial_next = l;
        }
        self.edges[e].loop_ = Some(l);
    }

    // ==================== Queries ====================

    /// Find the edge joining two vertices.
    ///
    /// Walks both disk cycles in lockstep, so the cost is bounded by the
    /// smaller of the two valences.
    ///
    /// # Panics
    /// Panics if `v1 == v2` or if either vertex has been removed.
    pub fn find_edge(&self, v1: VertexKey, v2: VertexKey) -> Option<EdgeKey> {
        assert!(v1 != v2, "find_edge needs two distinct vertices ({:?})", v1);

        let start1 = self.vertices[v1].edge?;
        let start2 = self.vertices[v2].edge?;

        let mut e1 = start1;
        let mut e2 = start2;
        loop {
            if self.edges[e1].contains_vertex(v2) {
                return Some(e1);
            }
            if self.edges[e2].contains_vertex(v1) {
                return Some(e2);
            }
            e1 = self.edges[e1].next(v1);
            e2 = self.edges[e2].next(v2);
            // The joining edge lies in both cycles, so finishing either one is conclusive.
            if e1 == start1 || e2 == start2 {
                return None;
            }
        }
    }

    // ==================== Removal ====================

    /// Remove a vertex together with every edge, loop and face that uses it.
    ///
    /// # Panics
    /// Panics if `v` has already been removed.
    pub fn remove_vertex(&mut self, v: VertexKey) {
        while let Some(e) = self.vertices[v].edge {
            self.remove_edge(e);
        }

        self.vertices.remove(v);
        self.vertex_order.retain(|&k| k != v);
        self.mark_dirty();
    }

    /// Remove an edge together with every face that uses it.
    ///
    /// # Panics
    /// Panics if `e` has already been removed.
    pub fn remove_edge(&mut self, e: EdgeKey) {
        while let Some(l) = self.edges[e].loop_ {
            self.remove_loop(l);
        }

        let [v1, v2] = self.edges[e].vertices();
        self.disk_unlink(e, v1);
        self.disk_unlink(e, v2);

        self.edges.remove(e);
        self.edge_order.retain(|&k| k != e);
        self.mark_dirty();
    }

    /// Splice `e` out of the disk cycle of `v`, moving the anchor off it.
    fn disk_unlink(&mut self, e: EdgeKey, v: VertexKey) {
        let (next, prev) = {
            let edge = &self.edges[e];
            (edge.next(v), edge.prev(v))
        };

        if self.vertices[v].edge == Some(e) {
            self.vertices[v].edge = if next != e { Some(next) } else { None };
        }

        self.edges[prev].set_next(v, next);
        self.edges[next].set_prev(v, prev);
    }

    /// Remove a loop.
    ///
    /// A face cannot have a hole in its boundary, so removing a loop that
    /// belongs to a face removes the whole face.
    ///
    /// # Panics
    /// Panics if `l` has already been removed.
    pub fn remove_loop(&mut self, l: LoopKey) {
        if let Some(f) = self.loops[l].face {
            self.remove_face(f);
            return;
        }

        let (edge, radial_next, radial_prev) = {
            let lp = &self.loops[l];
            (lp.edge, lp.radial_next, lp.radial_prev)
        };

        if radial_next == l {
            self.edges[edge].loop_ = None;
        } else {
            self.loops[radial_prev].radial_next = radial_next;
            self.loops[radial_next].radial_prev = radial_prev;
            if self.edges[edge].loop_ == Some(l) {
                self.edges[edge].loop_ = Some(radial_next);
            }
        }

        self.loops.remove(l);
        self.loop_order.retain(|&k| k != l);
        self.mark_dirty();
    }

    /// Remove a face and its loops. Edges and vertices are kept.
    ///
    /// # Panics
    /// Panics if `f` has already been removed.
    pub fn remove_face(&mut self, f: FaceKey) {
        let boundary: Vec<LoopKey> = self.face_loops(f).collect();
        for l in boundary {
            // Detach first so `remove_loop` only unlinks the radial cycle.
            self.loops[l].face = None;
            self.remove_loop(l);
        }

        self.faces.remove(f);
        self.face_order.retain(|&k| k != f);
        self.mark_dirty();
    }
}
