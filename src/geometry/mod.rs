//! Derived geometry.
//!
//! Read-only flattenings of the topology into point and index buffers for a
//! renderer. Triangle winding follows the clockwise front-face convention:
//! walking a face from its anchor loop as `w0, w1, w2, ...`, a triangle is
//! emitted as `(w0, w2, w1)` and a quad as `(w0, w2, w1), (w2, w0, w3)`.
//! Faces with any other number of sides stay in the topology but produce no
//! triangles.
//!
//! [`BMesh::arrays`] caches the full render buffers. The cache is rebuilt on
//! the first read after any mutation, see [`BMesh::is_dirty`].

use std::collections::BTreeMap;

use nalgebra::{Point3, Vector2, Vector3};
use rayon::prelude::*;

use crate::attribute::{AttributeValue, ElementKind};
use crate::error::{MeshError, Result};
use crate::mesh::{BMesh, FaceKey, VertexKey};

/// Vertex attribute feeding [`MeshArrays::normals`] (float x3).
pub const NORMAL: &str = "normal";
/// Vertex attribute feeding [`MeshArrays::uv`] (float x2).
pub const UV: &str = "uv";
/// Vertex attribute feeding [`MeshArrays::uv2`] (float x2).
pub const UV2: &str = "uv2";
/// Vertex attribute feeding [`MeshArrays::tangents`] (float x4).
pub const TANGENT: &str = "tangent";
/// Face attribute selecting the surface a face is drawn with (int x1).
pub const MATERIAL_ID: &str = "material_id";

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// A degenerate box containing a single point.
    pub fn from_point(p: Point3<f64>) -> Self {
        Self { min: p, max: p }
    }

    /// The smallest box containing every point, or `None` for no points.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let mut aabb = Self::from_point(*iter.next()?);
        for p in iter {
            aabb.expand_to(p);
        }
        Some(aabb)
    }

    /// Grow the box to contain `p`.
    pub fn expand_to(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Center point.
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Render buffers for a whole mesh.
///
/// Per-vertex channels are indexed by the dense vertex id. A channel is
/// `None` when the matching vertex attribute is not defined.
#[derive(Debug, Clone)]
pub struct MeshArrays {
    /// Vertex positions.
    pub points: Vec<Point3<f64>>,
    /// Vertex normals, from the `normal` attribute.
    pub normals: Option<Vec<Vector3<f64>>>,
    /// First texture coordinate set, from the `uv` attribute.
    pub uv: Option<Vec<Vector2<f64>>>,
    /// Second texture coordinate set, from the `uv2` attribute.
    pub uv2: Option<Vec<Vector2<f64>>>,
    /// Tangents, four floats per vertex, from the `tangent` attribute.
    pub tangents: Option<Vec<f64>>,
    /// Triangle indices keyed by material id.
    ///
    /// Only ids carried by at least one face appear. Without a `material_id`
    /// face attribute every triangle is under id 0.
    pub surfaces: BTreeMap<usize, Vec<u32>>,
    /// Bounds of `points`.
    pub aabb: Aabb,
}

impl MeshArrays {
    /// Total number of triangles over all surfaces.
    pub fn num_triangles(&self) -> usize {
        self.surfaces.values().map(|s| s.len() / 3).sum()
    }
}

impl BMesh {
    /// Triangulate one face into vertex triples, honouring `flip_faces`.
    ///
    /// Returns `None` for faces that are neither triangles nor quads.
    fn face_triangles(&self, f: FaceKey) -> Option<Vec<[VertexKey; 3]>> {
        let count = self.face_vertex_count(f);
        if count != 3 && count != 4 {
            return None;
        }

        let corners: Vec<VertexKey> = self.face_vertices(f).collect();
        let mut triangles = match corners[..] {
            [a, b, c] => vec![[a, c, b]],
            [a, b, c, d] => vec![[a, c, b], [c, a, d]],
            _ => return None,
        };

        if self.options.flip_faces {
            for t in &mut triangles {
                t.swap(1, 2);
            }
        }
        Some(triangles)
    }

    /// Flat triangle list, three points per triangle.
    ///
    /// Faces that are neither triangles nor quads are skipped with a warning.
    pub fn triangle_points(&self) -> Vec<Point3<f64>> {
        let mut points = Vec::with_capacity(self.num_triangles() * 3);
        for f in self.face_keys() {
            match self.face_triangles(f) {
                Some(triangles) => {
                    points.extend(triangles.iter().flatten().map(|&v| *self.position(v)));
                }
                None => log::warn!(
                    "skipping {:?}: only faces with 3 or 4 vertices can be triangulated, it has {}",
                    f,
                    self.face_vertex_count(f)
                ),
            }
        }
        points
    }

    /// Number of triangles [`triangle_points`](Self::triangle_points) produces.
    pub fn num_triangles(&self) -> usize {
        self.faces()
            .map(|(_, face)| match face.vert_count() {
                3 => 1,
                4 => 2,
                _ => 0,
            })
            .sum()
    }

    /// Triangle points of a single face; empty for unsupported face sizes.
    pub fn face_triangle_points(&self, f: FaceKey) -> Vec<Point3<f64>> {
        self.face_triangles(f)
            .map(|triangles| {
                triangles
                    .iter()
                    .flatten()
                    .map(|&v| *self.position(v))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Flat line list, two points per edge.
    pub fn line_points(&self) -> Vec<Point3<f64>> {
        self.edges()
            .flat_map(|(_, e)| {
                let [a, b] = e.vertices();
                [*self.position(a), *self.position(b)]
            })
            .collect()
    }

    /// Outline of one face, two points per boundary edge.
    pub fn face_outline_points(&self, f: FaceKey) -> Vec<Point3<f64>> {
        self.face_loops(f)
            .flat_map(|l| {
                let lp = self.loop_(l);
                let next = self.loop_(lp.next());
                [*self.position(lp.vert()), *self.position(next.vert())]
            })
            .collect()
    }

    /// Bounds of all vertex positions, or `None` for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices().map(|(_, v)| &v.position))
    }

    /// Bounds of the realised geometry, rebuilding the cache if needed.
    ///
    /// # Errors
    /// Returns [`MeshError::EmptyMesh`] if the mesh has no vertices.
    pub fn aabb(&mut self) -> Result<Aabb> {
        Ok(self.arrays()?.aabb)
    }

    /// Render buffers, rebuilt if the mesh changed since the last call.
    ///
    /// The rebuild reassigns the dense `id` of every vertex, edge and face to
    /// its position in insertion order.
    ///
    /// # Errors
    /// Returns [`MeshError::EmptyMesh`] if the mesh has no vertices.
    ///
    /// # Example
    /// ```
    /// use bmesh::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let vertices = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ];
    /// let mut mesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
    ///
    /// let arrays = mesh.arrays().unwrap();
    /// assert_eq!(arrays.points.len(), 4);
    /// assert_eq!(arrays.num_triangles(), 2);
    /// assert!(arrays.normals.is_none());
    /// assert!(!mesh.is_dirty());
    /// ```
    pub fn arrays(&mut self) -> Result<&MeshArrays> {
        let arrays = match self.cache.take() {
            Some(cached) if !self.dirty => cached,
            _ => {
                let rebuilt = self.build_arrays()?;
                self.dirty = false;
                rebuilt
            }
        };
        Ok(&*self.cache.insert(arrays))
    }

    fn build_arrays(&mut self) -> Result<MeshArrays> {
        if self.vertices.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        self.assign_ids();

        let points: Vec<Point3<f64>> = self.vertices().map(|(_, v)| v.position).collect();
        let aabb = Aabb::from_points(&points).ok_or(MeshError::EmptyMesh)?;

        let mut normals = self.vertex_channel(NORMAL, |a| a.as_vec3());
        if self.options.flip_faces {
            if let Some(normals) = normals.as_mut() {
                for n in normals.iter_mut() {
                    *n = -*n;
                }
            }
        }
        let uv = self.vertex_channel(UV, |a| a.as_vec2());
        let uv2 = self.vertex_channel(UV2, |a| a.as_vec2());
        let tangents = self
            .vertex_channel(TANGENT, |a| a.as_vec4())
            .map(|t| t.iter().flat_map(|v| [v.x, v.y, v.z, v.w]).collect());

        let surfaces = self.build_surfaces();

        log::debug!(
            "rebuilt mesh arrays: {} points, {} surfaces, {} triangles",
            points.len(),
            surfaces.len(),
            surfaces.values().map(|s| s.len() / 3).sum::<usize>()
        );

        Ok(MeshArrays {
            points,
            normals,
            uv,
            uv2,
            tangents,
            surfaces,
            aabb,
        })
    }

    fn assign_ids(&mut self) {
        for (i, &k) in self.vertex_order.iter().enumerate() {
            self.vertices[k].id = i;
        }
        for (i, &k) in self.edge_order.iter().enumerate() {
            self.edges[k].id = i;
        }
        for (i, &k) in self.face_order.iter().enumerate() {
            self.faces[k].id = i;
        }
    }

    /// One value per vertex for a defined vertex attribute; zero where a
    /// value has the wrong shape.
    fn vertex_channel<T, F>(&self, name: &str, read: F) -> Option<Vec<T>>
    where
        T: Default,
        F: Fn(&AttributeValue) -> Option<T>,
    {
        if !self.has_attribute(ElementKind::Vertex, name) {
            return None;
        }
        let values = self
            .vertices()
            .map(|(_, v)| v.attributes.get(name).and_then(&read).unwrap_or_default())
            .collect();
        Some(values)
    }

    fn material_of(&self, f: FaceKey) -> usize {
        self.faces[f]
            .attributes
            .get(MATERIAL_ID)
            .and_then(|a| a.as_int())
            .map_or(0, |id| id.max(0) as usize)
    }

    fn build_surfaces(&self) -> BTreeMap<usize, Vec<u32>> {
        let triangles_of = |f: FaceKey| -> Vec<u32> {
            self.face_triangles(f)
                .map(|triangles| {
                    triangles
                        .iter()
                        .flatten()
                        .map(|&v| self.vertices[v].id as u32)
                        .collect()
                })
                .unwrap_or_default()
        };

        let per_face: Vec<Vec<u32>> = if self.options.parallel {
            self.face_order.par_iter().map(|&f| triangles_of(f)).collect()
        } else {
            self.face_order.iter().map(|&f| triangles_of(f)).collect()
        };

        for &f in &self.face_order {
            let count = self.faces[f].vert_count();
            if count != 3 && count != 4 {
                log::warn!(
                    "skipping {:?}: only faces with 3 or 4 vertices can be triangulated, it has {}",
                    f,
                    count
                );
            }
        }

        if !self.has_attribute(ElementKind::Face, MATERIAL_ID) {
            return BTreeMap::from([(0, per_face.concat())]);
        }

        let mut surfaces: BTreeMap<usize, Vec<u32>> = BTreeMap::new();
        for (indices, &f) in per_face.into_iter().zip(&self.face_order) {
            surfaces.entry(self.material_of(f)).or_default().extend(indices);
        }
        surfaces
    }
}
