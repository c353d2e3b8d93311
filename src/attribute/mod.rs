//! Typed per-element attributes.
//!
//! Every vertex, edge, loop and face carries an [`AttributeMap`], an open
//! dictionary from attribute name to [`AttributeValue`]. A mesh may declare
//! [`AttributeDefinition`]s per [`ElementKind`]; a definition fixes the value
//! shape through a `(base type, dimensions)` pair and provides the default
//! that is copied into elements lacking a valid value.
//!
//! | base    | dims | accepted value                     |
//! |---------|------|------------------------------------|
//! | `Int`   | 1    | [`AttributeValue::Int`]            |
//! | `Int`   | 2    | [`AttributeValue::IntVec2`]        |
//! | `Int`   | 3    | [`AttributeValue::IntVec3`]        |
//! | `Int`   | ≥4   | [`AttributeValue::IntArray`]       |
//! | `Float` | 1    | [`AttributeValue::Float`]          |
//! | `Float` | 2    | [`AttributeValue::FloatVec2`]      |
//! | `Float` | 3    | [`AttributeValue::FloatVec3`]      |
//! | `Float` | 4    | 4-element [`AttributeValue::FloatArray`] or [`AttributeValue::Color`] |
//! | `Float` | ≥5   | [`AttributeValue::FloatArray`]     |

mod registry;

use std::collections::HashMap;
use std::fmt;

use nalgebra::{Vector2, Vector3, Vector4};

pub use registry::AttributeRegistry;

/// Attribute storage of a single element.
pub type AttributeMap = HashMap<String, AttributeValue>;

/// The four kinds of mesh element that can carry attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A vertex.
    Vertex,
    /// An edge.
    Edge,
    /// A loop (one face corner).
    Loop,
    /// A face.
    Face,
}

impl ElementKind {
    /// All element kinds, leaf-first.
    pub const ALL: [ElementKind; 4] = [
        ElementKind::Vertex,
        ElementKind::Edge,
        ElementKind::Loop,
        ElementKind::Face,
    ];
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Vertex => "vertex",
            ElementKind::Edge => "edge",
            ElementKind::Loop => "loop",
            ElementKind::Face => "face",
        };
        f.write_str(name)
    }
}

/// Scalar base type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// Integer components.
    Int,
    /// Floating point components.
    Float,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Int => f.write_str("int"),
            BaseType::Float => f.write_str("float"),
        }
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Integer scalar.
    Int(i64),
    /// Pair of integers.
    IntVec2(Vector2<i64>),
    /// Triple of integers.
    IntVec3(Vector3<i64>),
    /// Variable-length integer array.
    IntArray(Vec<i64>),
    /// Float scalar.
    Float(f64),
    /// Pair of floats.
    FloatVec2(Vector2<f64>),
    /// Triple of floats.
    FloatVec3(Vector3<f64>),
    /// Variable-length float array.
    FloatArray(Vec<f64>),
    /// RGBA color.
    Color(Vector4<f64>),
}

impl AttributeValue {
    /// The zero value for a `(base, dimensions)` pair, or `None` for zero dimensions.
    pub fn zero(base: BaseType, dimensions: usize) -> Option<Self> {
        let value = match (base, dimensions) {
            (_, 0) => return None,
            (BaseType::Int, 1) => AttributeValue::Int(0),
            (BaseType::Int, 2) => AttributeValue::IntVec2(Vector2::zeros()),
            (BaseType::Int, 3) => AttributeValue::IntVec3(Vector3::zeros()),
            (BaseType::Int, n) => AttributeValue::IntArray(vec![0; n]),
            (BaseType::Float, 1) => AttributeValue::Float(0.0),
            (BaseType::Float, 2) => AttributeValue::FloatVec2(Vector2::zeros()),
            (BaseType::Float, 3) => AttributeValue::FloatVec3(Vector3::zeros()),
            (BaseType::Float, n) => AttributeValue::FloatArray(vec![0.0; n]),
        };
        Some(value)
    }

    /// Read the value as an integer scalar.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Read the value as a float scalar.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Read the value as a 2-float vector.
    pub fn as_vec2(&self) -> Option<Vector2<f64>> {
        match self {
            AttributeValue::FloatVec2(v) => Some(*v),
            _ => None,
        }
    }

    /// Read the value as a 3-float vector.
    pub fn as_vec3(&self) -> Option<Vector3<f64>> {
        match self {
            AttributeValue::FloatVec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Read the value as four floats, from either a color or a 4-element array.
    pub fn as_vec4(&self) -> Option<Vector4<f64>> {
        match self {
            AttributeValue::Color(c) => Some(*c),
            AttributeValue::FloatArray(a) if a.len() == 4 => {
                Some(Vector4::new(a[0], a[1], a[2], a[3]))
            }
            _ => None,
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<Vector2<f64>> for AttributeValue {
    fn from(v: Vector2<f64>) -> Self {
        AttributeValue::FloatVec2(v)
    }
}

impl From<Vector3<f64>> for AttributeValue {
    fn from(v: Vector3<f64>) -> Self {
        AttributeValue::FloatVec3(v)
    }
}

/// A named, typed attribute slot.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    /// Attribute name, unique per element kind.
    pub name: String,
    /// Scalar base type.
    pub base_type: BaseType,
    /// 1 for scalars, 2 or 3 for small vectors, 4 and above for arrays.
    pub dimensions: usize,
    /// Value copied into elements that lack a valid one.
    pub default: AttributeValue,
}

impl AttributeDefinition {
    /// Create a definition whose default is the zero value of its type.
    ///
    /// # Panics
    /// Panics if `dimensions` is zero.
    pub fn new(name: impl Into<String>, base_type: BaseType, dimensions: usize) -> Self {
        let default = AttributeValue::zero(base_type, dimensions)
            .unwrap_or_else(|| panic!("attribute dimensions must be at least 1"));
        Self {
            name: name.into(),
            base_type,
            dimensions,
            default,
        }
    }

    /// Replace the default value.
    pub fn with_default(mut self, default: AttributeValue) -> Self {
        self.default = default;
        self
    }

    /// Check whether `value` has the shape this definition declares.
    pub fn validate(&self, value: &AttributeValue) -> bool {
        use AttributeValue as V;
        match (self.base_type, self.dimensions) {
            (_, 0) => false,
            (BaseType::Int, 1) => matches!(value, V::Int(_)),
            (BaseType::Int, 2) => matches!(value, V::IntVec2(_)),
            (BaseType::Int, 3) => matches!(value, V::IntVec3(_)),
            (BaseType::Int, _) => matches!(value, V::IntArray(_)),
            (BaseType::Float, 1) => matches!(value, V::Float(_)),
            (BaseType::Float, 2) => matches!(value, V::FloatVec2(_)),
            (BaseType::Float, 3) => matches!(value, V::FloatVec3(_)),
            (BaseType::Float, 4) => match value {
                V::Color(_) => true,
                V::FloatArray(a) => a.len() == 4,
                _ => false,
            },
            (BaseType::Float, _) => matches!(value, V::FloatArray(_)),
        }
    }

    /// Short description of the declared type, e.g. `float x3`.
    pub fn type_description(&self) -> String {
        format!("{} x{}", self.base_type, self.dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_int() {
        let scalar = AttributeDefinition::new("id", BaseType::Int, 1);
        assert!(scalar.validate(&AttributeValue::Int(3)));
        assert!(!scalar.validate(&AttributeValue::Float(3.0)));

        let pair = AttributeDefinition::new("cell", BaseType::Int, 2);
        assert!(pair.validate(&AttributeValue::IntVec2(Vector2::new(1, 2))));
        assert!(!pair.validate(&AttributeValue::IntVec3(Vector3::new(1, 2, 3))));

        let triple = AttributeDefinition::new("voxel", BaseType::Int, 3);
        assert!(triple.validate(&AttributeValue::IntVec3(Vector3::new(1, 2, 3))));

        let array = AttributeDefinition::new("bones", BaseType::Int, 6);
        assert!(array.validate(&AttributeValue::IntArray(vec![1, 2])));
        assert!(!array.validate(&AttributeValue::FloatArray(vec![1.0])));
    }

    #[test]
    fn test_validate_float() {
        let scalar = AttributeDefinition::new("weight", BaseType::Float, 1);
        assert!(scalar.validate(&AttributeValue::Float(0.5)));
        assert!(!scalar.validate(&AttributeValue::Int(1)));

        let uv = AttributeDefinition::new("uv", BaseType::Float, 2);
        assert!(uv.validate(&AttributeValue::FloatVec2(Vector2::new(0.0, 1.0))));
        assert!(!uv.validate(&AttributeValue::FloatVec3(Vector3::zeros())));

        let normal = AttributeDefinition::new("normal", BaseType::Float, 3);
        assert!(normal.validate(&AttributeValue::FloatVec3(Vector3::z())));

        let tangent = AttributeDefinition::new("tangent", BaseType::Float, 4);
        assert!(tangent.validate(&AttributeValue::Color(Vector4::new(1.0, 0.0, 0.0, 1.0))));
        assert!(tangent.validate(&AttributeValue::FloatArray(vec![1.0, 0.0, 0.0, 1.0])));
        assert!(!tangent.validate(&AttributeValue::FloatArray(vec![1.0, 0.0])));

        let weights = AttributeDefinition::new("weights", BaseType::Float, 8);
        assert!(weights.validate(&AttributeValue::FloatArray(vec![0.25; 8])));
        assert!(!weights.validate(&AttributeValue::Color(Vector4::zeros())));
    }

    #[test]
    fn test_zero_defaults_validate() {
        for base in [BaseType::Int, BaseType::Float] {
            for dims in 1..7 {
                let def = AttributeDefinition::new("x", base, dims);
                assert!(def.validate(&def.default), "{} x{}", base, dims);
            }
        }
        assert!(AttributeValue::zero(BaseType::Float, 0).is_none());
    }

    #[test]
    #[should_panic(expected = "at least 1")]
    fn test_zero_dimensions_panics() {
        let _ = AttributeDefinition::new("bad", BaseType::Int, 0);
    }

    #[test]
    fn test_as_vec4() {
        let color = AttributeValue::Color(Vector4::new(0.1, 0.2, 0.3, 1.0));
        assert_eq!(color.as_vec4(), Some(Vector4::new(0.1, 0.2, 0.3, 1.0)));
        let array = AttributeValue::FloatArray(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(array.as_vec4(), Some(Vector4::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(AttributeValue::Float(1.0).as_vec4(), None);
    }
}
