//! The mesh aggregate.
//!
//! [`BMesh`] exclusively owns every vertex, edge, loop, face and attribute
//! definition. Elements are stored in generational arenas and additionally
//! listed in insertion order; the order lists drive iteration and the dense
//! ids handed to renderers.
//!
//! This module holds storage, accessors, traversal and validation. The
//! operations that change connectivity live in the `topology` module.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;
use slotmap::SlotMap;

use super::elements::{Edge, Face, Loop, Vertex};
use super::index::{EdgeKey, ElementKey, FaceKey, LoopKey, VertexKey};
use crate::attribute::{
    AttributeDefinition, AttributeMap, AttributeRegistry, AttributeValue, ElementKind,
};
use crate::error::{MeshError, Result};
use crate::geometry::MeshArrays;
use crate::options::MeshOptions;

/// A topological mesh of vertices, edges, loops and faces.
#[derive(Debug, Clone)]
pub struct BMesh {
    pub(crate) vertices: SlotMap<VertexKey, Vertex>,
    pub(crate) edges: SlotMap<EdgeKey, Edge>,
    pub(crate) loops: SlotMap<LoopKey, Loop>,
    pub(crate) faces: SlotMap<FaceKey, Face>,

    pub(crate) vertex_order: Vec<VertexKey>,
    pub(crate) edge_order: Vec<EdgeKey>,
    pub(crate) loop_order: Vec<LoopKey>,
    pub(crate) face_order: Vec<FaceKey>,

    pub(crate) registry: AttributeRegistry,
    pub(crate) options: MeshOptions,

    /// Set by every mutation; cleared by the geometry rebuild.
    pub(crate) dirty: bool,
    pub(crate) cache: Option<MeshArrays>,
}

impl BMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::with_options(MeshOptions::default())
    }

    /// Create a new empty mesh with the given options.
    pub fn with_options(options: MeshOptions) -> Self {
        Self {
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            loops: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            vertex_order: Vec::new(),
            edge_order: Vec::new(),
            loop_order: Vec::new(),
            face_order: Vec::new(),
            registry: AttributeRegistry::new(),
            options,
            dirty: true,
            cache: None,
        }
    }

    /// Current options.
    #[inline]
    pub fn options(&self) -> &MeshOptions {
        &self.options
    }

    /// Replace the options.
    pub fn set_options(&mut self, options: MeshOptions) {
        self.options = options;
        self.mark_dirty();
    }

    /// Check whether derived geometry is out of date.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of loops.
    #[inline]
    pub fn num_loops(&self) -> usize {
        self.loops.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Check whether the mesh has no elements at all.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
            && self.edges.is_empty()
            && self.loops.is_empty()
            && self.faces.is_empty()
    }

    /// Get a vertex by key.
    ///
    /// # Panics
    /// Panics if the vertex has been removed.
    #[inline]
    pub fn vertex(&self, key: VertexKey) -> &Vertex {
        &self.vertices[key]
    }

    /// Get a vertex by key, or `None` if it has been removed.
    #[inline]
    pub fn get_vertex(&self, key: VertexKey) -> Option<&Vertex> {
        self.vertices.get(key)
    }

    /// Get an edge by key.
    ///
    /// # Panics
    /// Panics if the edge has been removed.
    #[inline]
    pub fn edge(&self, key: EdgeKey) -> &Edge {
        &self.edges[key]
    }

    /// Get an edge by key, or `None` if it has been removed.
    #[inline]
    pub fn get_edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.edges.get(key)
    }

    /// Get a loop by key.
    ///
    /// # Panics
    /// Panics if the loop has been removed.
    #[inline]
    pub fn loop_(&self, key: LoopKey) -> &Loop {
        &self.loops[key]
    }

    /// Get a loop by key, or `None` if it has been removed.
    #[inline]
    pub fn get_loop(&self, key: LoopKey) -> Option<&Loop> {
        self.loops.get(key)
    }

    /// Get a face by key.
    ///
    /// # Panics
    /// Panics if the face has been removed.
    #[inline]
    pub fn face(&self, key: FaceKey) -> &Face {
        &self.faces[key]
    }

    /// Get a face by key, or `None` if it has been removed.
    #[inline]
    pub fn get_face(&self, key: FaceKey) -> Option<&Face> {
        self.faces.get(key)
    }

    /// Check whether an element is still part of the mesh.
    pub fn contains(&self, key: ElementKey) -> bool {
        match key {
            ElementKey::Vertex(k) => self.vertices.contains_key(k),
            ElementKey::Edge(k) => self.edges.contains_key(k),
            ElementKey::Loop(k) => self.loops.contains_key(k),
            ElementKey::Face(k) => self.faces.contains_key(k),
        }
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexKey) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexKey, pos: Point3<f64>) {
        self.vertices[v].position = pos;
        self.mark_dirty();
    }

    // ==================== Selection ====================

    /// The vertex whose dense id is `id`, as assigned by the last geometry rebuild.
    pub fn vertex_by_id(&self, id: usize) -> Option<VertexKey> {
        self.vertex_order
            .get(id)
            .copied()
            .filter(|&k| self.vertices[k].id == id)
    }

    /// The edge whose dense id is `id`, as assigned by the last geometry rebuild.
    pub fn edge_by_id(&self, id: usize) -> Option<EdgeKey> {
        self.edge_order
            .get(id)
            .copied()
            .filter(|&k| self.edges[k].id == id)
    }

    /// The face whose dense id is `id`, as assigned by the last geometry rebuild.
    pub fn face_by_id(&self, id: usize) -> Option<FaceKey> {
        self.face_order
            .get(id)
            .copied()
            .filter(|&k| self.faces[k].id == id)
    }

    // ==================== Attributes ====================

    /// Declare an attribute for every element of `kind`.
    ///
    /// If `kind` already has an attribute with this name, the existing
    /// definition is returned unchanged. Otherwise every existing element of
    /// `kind` receives its own copy of the default.
    ///
    /// # Panics
    /// Panics if the definition declares zero dimensions.
    ///
    /// # Example
    /// ```
    /// use bmesh::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let mut mesh = BMesh::new();
    /// let v = mesh.add_vertex(Point3::origin());
    /// mesh.define_attribute(
    ///     ElementKind::Vertex,
    ///     AttributeDefinition::new("weight", BaseType::Float, 1)
    ///         .with_default(AttributeValue::Float(1.0)),
    /// );
    /// assert_eq!(mesh.attribute(v.into(), "weight"), Some(&AttributeValue::Float(1.0)));
    /// ```
    pub fn define_attribute(
        &mut self,
        kind: ElementKind,
        definition: AttributeDefinition,
    ) -> AttributeDefinition {
        let (stored, inserted) = self.registry.define(kind, definition);
        let stored = stored.clone();

        if inserted {
            let name = &stored.name;
            let default = &stored.default;
            match kind {
                ElementKind::Vertex => {
                    for v in self.vertices.values_mut() {
                        v.attributes.insert(name.clone(), default.clone());
                    }
                }
                ElementKind::Edge => {
                    for e in self.edges.values_mut() {
                        e.attributes.insert(name.clone(), default.clone());
                    }
                }
                ElementKind::Loop => {
                    for l in self.loops.values_mut() {
                        l.attributes.insert(name.clone(), default.clone());
                    }
                }
                ElementKind::Face => {
                    for f in self.faces.values_mut() {
                        f.attributes.insert(name.clone(), default.clone());
                    }
                }
            }
        }

        self.mark_dirty();
        stored
    }

    /// Check whether an attribute is defined for `kind`.
    pub fn has_attribute(&self, kind: ElementKind, name: &str) -> bool {
        self.registry.contains(kind, name)
    }

    /// Look up an attribute definition.
    pub fn attribute_definition(
        &self,
        kind: ElementKind,
        name: &str,
    ) -> Option<&AttributeDefinition> {
        self.registry.get(kind, name)
    }

    /// All attribute definitions of `kind`, in declaration order.
    pub fn attribute_definitions(&self, kind: ElementKind) -> &[AttributeDefinition] {
        self.registry.definitions(kind)
    }

    /// The attribute map of an element.
    pub fn attributes(&self, element: ElementKey) -> Result<&AttributeMap> {
        let attrs = match element {
            ElementKey::Vertex(k) => self.vertices.get(k).map(|v| &v.attributes),
            ElementKey::Edge(k) => self.edges.get(k).map(|e| &e.attributes),
            ElementKey::Loop(k) => self.loops.get(k).map(|l| &l.attributes),
            ElementKey::Face(k) => self.faces.get(k).map(|f| &f.attributes),
        };
        attrs.ok_or_else(|| MeshError::StaleKey(format!("{:?}", element)))
    }

    fn attributes_mut(&mut self, element: ElementKey) -> Result<&mut AttributeMap> {
        let attrs = match element {
            ElementKey::Vertex(k) => self.vertices.get_mut(k).map(|v| &mut v.attributes),
            ElementKey::Edge(k) => self.edges.get_mut(k).map(|e| &mut e.attributes),
            ElementKey::Loop(k) => self.loops.get_mut(k).map(|l| &mut l.attributes),
            ElementKey::Face(k) => self.faces.get_mut(k).map(|f| &mut f.attributes),
        };
        attrs.ok_or_else(|| MeshError::StaleKey(format!("{:?}", element)))
    }

    /// Read one attribute of an element.
    pub fn attribute(&self, element: ElementKey, name: &str) -> Option<&AttributeValue> {
        self.attributes(element).ok()?.get(name)
    }

    /// Write one attribute of an element.
    ///
    /// Values for defined attributes must match their definition; undefined
    /// names are stored as-is.
    pub fn set_attribute(
        &mut self,
        element: ElementKey,
        name: &str,
        value: AttributeValue,
    ) -> Result<()> {
        let kind = element.kind();
        if let Some(def) = self.registry.get(kind, name) {
            if !def.validate(&value) {
                return Err(MeshError::AttributeMismatch {
                    kind,
                    name: name.to_string(),
                    expected: def.type_description(),
                });
            }
        }
        self.attributes_mut(element)?.insert(name.to_string(), value);
        self.mark_dirty();
        Ok(())
    }

    /// Re-apply the attribute definitions to one element.
    ///
    /// Returns the number of values that were reset to their default.
    pub fn ensure_attributes(&mut self, element: ElementKey) -> Result<usize> {
        let kind = element.kind();
        let registry = &self.registry;
        let attrs = match element {
            ElementKey::Vertex(k) => self.vertices.get_mut(k).map(|v| &mut v.attributes),
            ElementKey::Edge(k) => self.edges.get_mut(k).map(|e| &mut e.attributes),
            ElementKey::Loop(k) => self.loops.get_mut(k).map(|l| &mut l.attributes),
            ElementKey::Face(k) => self.faces.get_mut(k).map(|f| &mut f.attributes),
        }
        .ok_or_else(|| MeshError::StaleKey(format!("{:?}", element)))?;
        let reverted = registry.ensure(kind, attrs);
        if reverted > 0 {
            self.mark_dirty();
        }
        Ok(reverted)
    }

    // ==================== Iteration ====================

    /// Iterate over vertex keys in insertion order.
    pub fn vertex_keys(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertex_order.iter().copied()
    }

    /// Iterate over vertices with their keys, in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex)> + '_ {
        self.vertex_order.iter().map(|&k| (k, &self.vertices[k]))
    }

    /// Iterate over edge keys in insertion order.
    pub fn edge_keys(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edge_order.iter().copied()
    }

    /// Iterate over edges with their keys, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &Edge)> + '_ {
        self.edge_order.iter().map(|&k| (k, &self.edges[k]))
    }

    /// Iterate over loop keys in insertion order.
    pub fn loop_keys(&self) -> impl Iterator<Item = LoopKey> + '_ {
        self.loop_order.iter().copied()
    }

    /// Iterate over face keys in insertion order.
    pub fn face_keys(&self) -> impl Iterator<Item = FaceKey> + '_ {
        self.face_order.iter().copied()
    }

    /// Iterate over faces with their keys, in insertion order.
    pub fn faces(&self) -> impl Iterator<Item = (FaceKey, &Face)> + '_ {
        self.face_order.iter().map(|&k| (k, &self.faces[k]))
    }

    // ==================== Neighbourhoods ====================

    /// Iterate over the disk cycle of a vertex (its incident edges).
    pub fn vertex_edges(&self, v: VertexKey) -> DiskIter<'_> {
        DiskIter::new(self, v)
    }

    /// Iterate over the vertices sharing an edge with `v`.
    pub fn vertex_neighbors(&self, v: VertexKey) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertex_edges(v)
            .map(move |e| self.edges[e].other_vertex(v))
    }

    /// Iterate over the faces around a vertex.
    ///
    /// Faces are reported once per incident edge they use, so a face touching
    /// `v` through two edges appears twice.
    pub fn vertex_faces(&self, v: VertexKey) -> impl Iterator<Item = FaceKey> + '_ {
        self.vertex_edges(v).flat_map(move |e| self.edge_faces(e))
    }

    /// Number of edges incident to a vertex.
    pub fn valence(&self, v: VertexKey) -> usize {
        self.vertex_edges(v).count()
    }

    /// Iterate over the radial cycle of an edge.
    pub fn edge_loops(&self, e: EdgeKey) -> RadialIter<'_> {
        RadialIter::new(self, e)
    }

    /// Iterate over the faces using an edge.
    pub fn edge_faces(&self, e: EdgeKey) -> impl Iterator<Item = FaceKey> + '_ {
        self.edge_loops(e).filter_map(move |l| self.loops[l].face)
    }

    /// The endpoint of `e` opposite to `v`.
    #[inline]
    pub fn other_vertex(&self, e: EdgeKey, v: VertexKey) -> VertexKey {
        self.edges[e].other_vertex(v)
    }

    /// Midpoint of an edge.
    pub fn edge_center(&self, e: EdgeKey) -> Point3<f64> {
        let edge = &self.edges[e];
        nalgebra::center(self.position(edge.vert1), self.position(edge.vert2))
    }

    /// Length of an edge.
    pub fn edge_length(&self, e: EdgeKey) -> f64 {
        let edge = &self.edges[e];
        (self.position(edge.vert2) - self.position(edge.vert1)).norm()
    }

    /// Iterate over the boundary loops of a face, starting at its anchor.
    pub fn face_loops(&self, f: FaceKey) -> FaceLoopIter<'_> {
        FaceLoopIter::new(self, self.faces[f].loop_)
    }

    /// Iterate over the boundary vertices of a face.
    pub fn face_vertices(&self, f: FaceKey) -> impl Iterator<Item = VertexKey> + '_ {
        self.face_loops(f).map(move |l| self.loops[l].vert)
    }

    /// Iterate over the boundary edges of a face.
    pub fn face_edges(&self, f: FaceKey) -> impl Iterator<Item = EdgeKey> + '_ {
        self.face_loops(f).map(move |l| self.loops[l].edge)
    }

    /// Number of boundary vertices of a face.
    #[inline]
    pub fn face_vertex_count(&self, f: FaceKey) -> usize {
        self.faces[f].vert_count
    }

    /// Average of the boundary vertex positions of a face.
    pub fn face_center(&self, f: FaceKey) -> Point3<f64> {
        let mut sum = nalgebra::Vector3::zeros();
        let mut count = 0usize;
        for v in self.face_vertices(f) {
            sum += self.position(v).coords;
            count += 1;
        }
        if count == 0 {
            return Point3::origin();
        }
        Point3::from(sum / count as f64)
    }

    /// Length of the face cycle that `l` belongs to.
    pub fn loop_edge_count(&self, l: LoopKey) -> usize {
        FaceLoopIter::new(self, Some(l)).count()
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check every structural invariant, reporting the first violation.
    ///
    /// - order lists and arenas hold the same elements;
    /// - each disk cycle is closed, doubly linked, and has exactly one entry
    ///   per edge touching the vertex;
    /// - each radial cycle is closed and lists exactly the loops riding its edge;
    /// - each face cycle is closed, has `vert_count` loops, and consecutive
    ///   loops are joined by the earlier loop's edge;
    /// - no two edges join the same pair of vertices.
    pub fn validate(&self) -> Result<()> {
        self.validate_order()?;

        let mut degree: HashMap<VertexKey, usize> = HashMap::new();
        let mut pairs: HashSet<(VertexKey, VertexKey)> = HashSet::new();
        for (ek, e) in self.edges.iter() {
            if e.vert1 == e.vert2 {
                return Err(MeshError::violation(format!("{:?} joins a vertex to itself", ek)));
            }
            for v in e.vertices() {
                if !self.vertices.contains_key(v) {
                    return Err(MeshError::violation(format!(
                        "{:?} references removed {:?}",
                        ek, v
                    )));
                }
                *degree.entry(v).or_insert(0) += 1;
            }
            let pair = (e.vert1.min(e.vert2), e.vert1.max(e.vert2));
            if !pairs.insert(pair) {
                return Err(MeshError::violation(format!(
                    "duplicate edge between {:?} and {:?}",
                    pair.0, pair.1
                )));
            }
        }

        for (vk, v) in self.vertices.iter() {
            let expected = degree.get(&vk).copied().unwrap_or(0);
            let walked = self.check_disk(vk, v)?;
            if walked != expected {
                return Err(MeshError::violation(format!(
                    "disk cycle of {:?} has {} edges, {} edges touch it",
                    vk, walked, expected
                )));
            }
        }

        let mut radial_len: HashMap<EdgeKey, usize> = HashMap::new();
        let mut face_len: HashMap<FaceKey, usize> = HashMap::new();
        for (lk, l) in self.loops.iter() {
            self.check_loop(lk, l)?;
            *radial_len.entry(l.edge).or_insert(0) += 1;
            if let Some(f) = l.face {
                *face_len.entry(f).or_insert(0) += 1;
            }
        }

        for (ek, e) in self.edges.iter() {
            let expected = radial_len.get(&ek).copied().unwrap_or(0);
            let walked = self.check_radial(ek, e)?;
            if walked != expected {
                return Err(MeshError::violation(format!(
                    "radial cycle of {:?} has {} loops, {} loops ride it",
                    ek, walked, expected
                )));
            }
        }

        for (fk, f) in self.faces.iter() {
            let walked = self.check_face(fk, f)?;
            let owned = face_len.get(&fk).copied().unwrap_or(0);
            if walked != f.vert_count || owned != f.vert_count {
                return Err(MeshError::violation(format!(
                    "{:?} declares {} vertices, cycle has {}, {} loops reference it",
                    fk, f.vert_count, walked, owned
                )));
            }
        }

        Ok(())
    }

    fn validate_order(&self) -> Result<()> {
        fn check<K: slotmap::Key, V>(
            name: &str,
            order: &[K],
            arena: &SlotMap<K, V>,
        ) -> Result<()> {
            if order.len() != arena.len() || order.iter().any(|&k| !arena.contains_key(k)) {
                return Err(MeshError::violation(format!(
                    "{} order list out of sync ({} listed, {} stored)",
                    name,
                    order.len(),
                    arena.len()
                )));
            }
            Ok(())
        }
        check("vertex", &self.vertex_order, &self.vertices)?;
        check("edge", &self.edge_order, &self.edges)?;
        check("loop", &self.loop_order, &self.loops)?;
        check("face", &self.face_order, &self.faces)
    }

    fn check_disk(&self, vk: VertexKey, v: &Vertex) -> Result<usize> {
        let Some(start) = v.edge else {
            return Ok(0);
        };
        let mut current = start;
        let mut steps = 0;
        loop {
            let edge = self.edges.get(current).ok_or_else(|| {
                MeshError::violation(format!("disk of {:?} reaches removed {:?}", vk, current))
            })?;
            if !edge.contains_vertex(vk) {
                return Err(MeshError::violation(format!(
                    "{:?} in disk of {:?} does not touch it",
                    current, vk
                )));
            }
            let next = edge.next(vk);
            let linked = self
                .edges
                .get(next)
                .is_some_and(|n| n.contains_vertex(vk) && n.prev(vk) == current);
            if !linked {
                return Err(MeshError::violation(format!(
                    "disk of {:?} broken after {:?}",
                    vk, current
                )));
            }
            steps += 1;
            current = next;
            if current == start {
                return Ok(steps);
            }
            if steps > self.edges.len() {
                return Err(MeshError::violation(format!("disk of {:?} does not close", vk)));
            }
        }
    }

    fn check_radial(&self, ek: EdgeKey, e: &Edge) -> Result<usize> {
        let Some(start) = e.loop_ else {
            return Ok(0);
        };
        let mut current = start;
        let mut steps = 0;
        loop {
            let l = self.loops.get(current).ok_or_else(|| {
                MeshError::violation(format!("radial of {:?} reaches removed {:?}", ek, current))
            })?;
            if l.edge != ek {
                return Err(MeshError::violation(format!(
                    "{:?} in radial of {:?} rides another edge",
                    current, ek
                )));
            }
            let next = l.radial_next;
            if !self.loops.get(next).is_some_and(|n| n.radial_prev == current) {
                return Err(MeshError::violation(format!(
                    "radial of {:?} broken after {:?}",
                    ek, current
                )));
            }
            steps += 1;
            current = next;
            if current == start {
                return Ok(steps);
            }
            if steps > self.loops.len() {
                return Err(MeshError::violation(format!("radial of {:?} does not close", ek)));
            }
        }
    }

    fn check_loop(&self, lk: LoopKey, l: &Loop) -> Result<()> {
        let face = l
            .face
            .filter(|f| self.faces.contains_key(*f))
            .ok_or_else(|| MeshError::violation(format!("{:?} has no live face", lk)))?;
        let edge = self
            .edges
            .get(l.edge)
            .ok_or_else(|| MeshError::violation(format!("{:?} rides removed {:?}", lk, l.edge)))?;
        if !edge.contains_vertex(l.vert) {
            return Err(MeshError::violation(format!("{:?} starts off its edge", lk)));
        }
        let next = self
            .loops
            .get(l.next)
            .ok_or_else(|| MeshError::violation(format!("{:?} links to removed loop", lk)))?;
        if next.prev != lk || next.face != Some(face) {
            return Err(MeshError::violation(format!("face cycle broken after {:?}", lk)));
        }
        if next.vert != edge.other_vertex(l.vert) {
            return Err(MeshError::violation(format!("{:?} edge does not lead to next corner", lk)));
        }
        Ok(())
    }

    fn check_face(&self, fk: FaceKey, f: &Face) -> Result<usize> {
        let start = f
            .loop_
            .ok_or_else(|| MeshError::violation(format!("{:?} has no boundary", fk)))?;
        let mut current = start;
        let mut steps = 0;
        loop {
            let l = self.loops.get(current).ok_or_else(|| {
                let message = format!("boundary of {:?} reaches removed {:?}", fk, current);
                MeshError::violation(message)
            })?;
            if l.face != Some(fk) {
                return Err(MeshError::violation(format!(
                    "{:?} in boundary of {:?} belongs elsewhere",
                    current, fk
                )));
            }
            steps += 1;
            current = l.next;
            if current == start {
                return Ok(steps);
            }
            if steps > self.loops.len() {
                return Err(MeshError::violation(format!("boundary of {:?} does not close", fk)));
            }
        }
    }
}

impl Default for BMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the disk cycle of a vertex.
pub struct DiskIter<'a> {
    mesh: &'a BMesh,
    vertex: VertexKey,
    start: Option<EdgeKey>,
    current: Option<EdgeKey>,
}

impl<'a> DiskIter<'a> {
    fn new(mesh: &'a BMesh, vertex: VertexKey) -> Self {
        let start = mesh.vertex(vertex).edge;
        Self {
            mesh,
            vertex,
            start,
            current: start,
        }
    }
}

impl<'a> Iterator for DiskIter<'a> {
    type Item = EdgeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;
        let next = self.mesh.edges[result].next(self.vertex);
        self.current = if Some(next) == self.start { None } else { Some(next) };
        Some(result)
    }
}

/// Iterator over the radial cycle of an edge.
pub struct RadialIter<'a> {
    mesh: &'a BMesh,
    start: Option<LoopKey>,
    current: Option<LoopKey>,
}

impl<'a> RadialIter<'a> {
    fn new(mesh: &'a BMesh, edge: EdgeKey) -> Self {
        let start = mesh.edge(edge).loop_;
        Self {
            mesh,
            start,
            current: start,
        }
    }
}

impl<'a> Iterator for RadialIter<'a> {
    type Item = LoopKey;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;
        let next = self.mesh.loops[result].radial_next;
        self.current = if Some(next) == self.start { None } else { Some(next) };
        Some(result)
    }
}

/// Iterator over a face cycle.
pub struct FaceLoopIter<'a> {
    mesh: &'a BMesh,
    start: Option<LoopKey>,
    current: Option<LoopKey>,
}

impl<'a> FaceLoopIter<'a> {
    fn new(mesh: &'a BMesh, start: Option<LoopKey>) -> Self {
        Self {
            mesh,
            start,
            current: start,
        }
    }
}

impl<'a> Iterator for FaceLoopIter<'a> {
    type Item = LoopKey;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;
        let next = self.mesh.loops[result].next;
        self.current = if Some(next) == self.start { None } else { Some(next) };
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::BaseType;
    use approx::assert_relative_eq;

    fn triangle() -> (BMesh, [VertexKey; 3], FaceKey) {
        let mut mesh = BMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let f = mesh.add_face(&[a, b, c]).unwrap();
        (mesh, [a, b, c], f)
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = BMesh::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_edges(), 0);
        assert_eq!(mesh.num_loops(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_empty());
        assert!(mesh.is_valid());
        assert!(mesh.is_dirty());
    }

    #[test]
    fn test_face_queries() {
        let (mesh, [a, b, c], f) = triangle();

        assert_eq!(mesh.face_vertex_count(f), 3);
        let verts: Vec<_> = mesh.face_vertices(f).collect();
        assert_eq!(verts.len(), 3);
        for v in [a, b, c] {
            assert!(verts.contains(&v));
        }
        assert_eq!(mesh.face_edges(f).count(), 3);

        let center = mesh.face_center(f);
        assert_relative_eq!(center.x, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(center.y, 1.0 / 3.0, epsilon = 1e-12);

        let anchor = mesh.face(f).loop_().unwrap();
        assert_eq!(mesh.loop_edge_count(anchor), 3);
    }

    #[test]
    fn test_vertex_queries() {
        let (mesh, [a, b, c], f) = triangle();

        assert_eq!(mesh.valence(a), 2);
        let mut neighbors: Vec<_> = mesh.vertex_neighbors(a).collect();
        neighbors.sort();
        let mut expected = vec![b, c];
        expected.sort();
        assert_eq!(neighbors, expected);

        // One face, reached through both incident edges.
        let faces: Vec<_> = mesh.vertex_faces(a).collect();
        assert_eq!(faces, vec![f, f]);
    }

    #[test]
    fn test_edge_queries() {
        let (mesh, [a, b, _], f) = triangle();
        let e = mesh.find_edge(a, b).unwrap();

        assert_eq!(mesh.other_vertex(e, a), b);
        assert_relative_eq!(mesh.edge_length(e), 1.0);
        assert_relative_eq!(mesh.edge_center(e).x, 0.5);
        assert_eq!(mesh.edge_faces(e).collect::<Vec<_>>(), vec![f]);
        assert_eq!(mesh.edge_loops(e).count(), 1);
    }

    #[test]
    fn test_set_position_marks_dirty() {
        let (mut mesh, [a, _, _], _) = triangle();
        mesh.dirty = false;
        mesh.set_position(a, Point3::new(0.0, 0.0, 2.0));
        assert!(mesh.is_dirty());
        assert_eq!(mesh.position(a).z, 2.0);
    }

    #[test]
    fn test_attribute_default_fill_is_deep() {
        let mut mesh = BMesh::new();
        let keys: Vec<_> = (0..4)
            .map(|i| mesh.add_vertex(Point3::new(i as f64, 0.0, 0.0)))
            .collect();

        let def = mesh.define_attribute(
            ElementKind::Vertex,
            AttributeDefinition::new("weights", BaseType::Float, 5)
                .with_default(AttributeValue::FloatArray(vec![1.0; 5])),
        );

        for &k in &keys {
            assert_eq!(mesh.attribute(k.into(), "weights"), Some(&def.default));
        }

        // Mutating one copy leaves the others and the definition alone.
        mesh.vertices[keys[0]].attributes.insert(
            "weights".into(),
            AttributeValue::FloatArray(vec![9.0; 5]),
        );
        if let Some(AttributeValue::FloatArray(values)) =
            mesh.vertices[keys[1]].attributes.get_mut("weights")
        {
            values[0] = -1.0;
        }
        assert_eq!(
            mesh.attribute(keys[2].into(), "weights"),
            Some(&AttributeValue::FloatArray(vec![1.0; 5]))
        );
        assert_eq!(
            mesh.attribute_definition(ElementKind::Vertex, "weights").unwrap().default,
            AttributeValue::FloatArray(vec![1.0; 5])
        );
    }

    #[test]
    fn test_define_fills_every_kind() {
        let (mut mesh, _, f) = triangle();
        mesh.define_attribute(
            ElementKind::Edge,
            AttributeDefinition::new("crease", BaseType::Float, 1),
        );
        mesh.define_attribute(
            ElementKind::Loop,
            AttributeDefinition::new("uv", BaseType::Float, 2),
        );
        mesh.define_attribute(
            ElementKind::Face,
            AttributeDefinition::new("material_id", BaseType::Int, 1),
        );

        for e in mesh.edge_keys() {
            assert_eq!(mesh.attribute(e.into(), "crease"), Some(&AttributeValue::Float(0.0)));
        }
        for l in mesh.loop_keys() {
            assert!(mesh.attribute(l.into(), "uv").is_some());
        }
        assert_eq!(mesh.attribute(f.into(), "material_id"), Some(&AttributeValue::Int(0)));
        // Vertices were not touched by the other kinds' definitions.
        for v in mesh.vertex_keys() {
            assert!(mesh.attributes(v.into()).unwrap().is_empty());
        }
    }

    #[test]
    fn test_later_elements_get_defaults() {
        let mut mesh = BMesh::new();
        mesh.define_attribute(
            ElementKind::Face,
            AttributeDefinition::new("material_id", BaseType::Int, 1)
                .with_default(AttributeValue::Int(2)),
        );
        mesh.define_attribute(
            ElementKind::Loop,
            AttributeDefinition::new("uv", BaseType::Float, 2),
        );
        let a = mesh.add_vertex(Point3::origin());
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let f = mesh.add_face(&[a, b, c]).unwrap();

        assert_eq!(mesh.attribute(f.into(), "material_id"), Some(&AttributeValue::Int(2)));
        assert_eq!(
            mesh.face_loops(f)
                .filter(|&l| mesh.attribute(l.into(), "uv").is_some())
                .count(),
            3
        );
    }

    #[test]
    fn test_set_attribute_validates() {
        let (mut mesh, [a, _, _], _) = triangle();
        mesh.define_attribute(
            ElementKind::Vertex,
            AttributeDefinition::new("normal", BaseType::Float, 3),
        );

        let err = mesh
            .set_attribute(a.into(), "normal", AttributeValue::Float(1.0))
            .unwrap_err();
        assert!(matches!(err, MeshError::AttributeMismatch { .. }));

        mesh.set_attribute(a.into(), "normal", nalgebra::Vector3::z().into())
            .unwrap();
        assert_eq!(
            mesh.attribute(a.into(), "normal").and_then(|v| v.as_vec3()),
            Some(nalgebra::Vector3::z())
        );

        // Undeclared names are free-form.
        mesh.set_attribute(a.into(), "note", AttributeValue::Int(5)).unwrap();
        assert_eq!(mesh.attribute(a.into(), "note"), Some(&AttributeValue::Int(5)));
    }

    #[test]
    fn test_stale_key_rejected() {
        let (mut mesh, [a, _, _], _) = triangle();
        mesh.remove_vertex(a);
        assert!(!mesh.contains(a.into()));
        assert!(mesh.get_vertex(a).is_none());
        assert!(matches!(mesh.attributes(a.into()), Err(MeshError::StaleKey(_))));
        assert!(mesh
            .set_attribute(a.into(), "x", AttributeValue::Int(1))
            .is_err());
    }

    #[test]
    fn test_add_vertex_with_attributes_reverts() {
        let mut mesh = BMesh::new();
        mesh.define_attribute(
            ElementKind::Vertex,
            AttributeDefinition::new("uv", BaseType::Float, 2),
        );
        let mut attrs = AttributeMap::new();
        attrs.insert("uv".into(), AttributeValue::Int(4));
        let v = mesh.add_vertex_with_attributes(Point3::origin(), attrs);

        assert_eq!(
            mesh.attribute(v.into(), "uv"),
            Some(&AttributeValue::FloatVec2(nalgebra::Vector2::zeros()))
        );
    }

    #[test]
    fn test_ensure_attributes_on_existing_element() {
        let (mut mesh, [a, _, _], _) = triangle();
        mesh.define_attribute(
            ElementKind::Vertex,
            AttributeDefinition::new("group", BaseType::Int, 1),
        );
        // Bypass validation to simulate an externally edited map.
        mesh.vertices[a]
            .attributes
            .insert("group".into(), AttributeValue::Float(1.5));

        assert_eq!(mesh.ensure_attributes(a.into()).unwrap(), 1);
        assert_eq!(mesh.attribute(a.into(), "group"), Some(&AttributeValue::Int(0)));
        assert_eq!(mesh.ensure_attributes(a.into()).unwrap(), 0);
    }

    #[test]
    fn test_redefinition_keeps_values() {
        let (mut mesh, [a, _, _], _) = triangle();
        mesh.define_attribute(
            ElementKind::Vertex,
            AttributeDefinition::new("group", BaseType::Int, 1),
        );
        mesh.set_attribute(a.into(), "group", AttributeValue::Int(7)).unwrap();

        let def = mesh.define_attribute(
            ElementKind::Vertex,
            AttributeDefinition::new("group", BaseType::Float, 3),
        );
        assert_eq!(def.base_type, BaseType::Int);
        assert_eq!(mesh.attribute(a.into(), "group"), Some(&AttributeValue::Int(7)));
        assert_eq!(mesh.attribute_definitions(ElementKind::Vertex).len(), 1);
    }

    #[test]
    fn test_default_matches_new() {
        let mut mesh = BMesh::default();
        assert!(mesh.is_dirty());
        assert_eq!(mesh.num_vertices(), 0);
        assert!(matches!(mesh.arrays(), Err(MeshError::EmptyMesh)));

        mesh.add_vertex(Point3::origin());
        assert!(mesh.arrays().is_ok());
        assert!(!mesh.is_dirty());
    }

    #[test]
    fn test_validate_detects_corruption() {
        let (mut mesh, [a, b, _], _) = triangle();
        assert!(mesh.validate().is_ok());

        let e = mesh.find_edge(a, b).unwrap();
        let other = mesh.edges[e].next(a);
        mesh.edges.get_mut(other).unwrap().set_prev(a, other);
        assert!(matches!(mesh.validate(), Err(MeshError::TopologyViolation(_))));
    }
}
