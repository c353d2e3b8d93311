//! Key types for mesh elements.
//!
//! Elements live in generational arenas ([`slotmap::SlotMap`]). A key stays
//! cheap to copy and compare, and a key whose element has been removed is
//! detected instead of silently aliasing a newer element that reused the slot.

use slotmap::{new_key_type, Key};

use crate::attribute::ElementKind;

new_key_type! {
    /// A generation-checked vertex handle.
    pub struct VertexKey;
}

new_key_type! {
    /// A generation-checked edge handle.
    pub struct EdgeKey;
}

new_key_type! {
    /// A generation-checked loop handle.
    pub struct LoopKey;
}

new_key_type! {
    /// A generation-checked face handle.
    pub struct FaceKey;
}

/// A key to any element, used by the attribute surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKey {
    /// A vertex.
    Vertex(VertexKey),
    /// An edge.
    Edge(EdgeKey),
    /// A loop.
    Loop(LoopKey),
    /// A face.
    Face(FaceKey),
}

impl ElementKey {
    /// The kind of element this key refers to.
    #[inline]
    pub fn kind(self) -> ElementKind {
        match self {
            ElementKey::Vertex(_) => ElementKind::Vertex,
            ElementKey::Edge(_) => ElementKind::Edge,
            ElementKey::Loop(_) => ElementKind::Loop,
            ElementKey::Face(_) => ElementKind::Face,
        }
    }

    /// Check whether this is the null key of its kind.
    pub fn is_null(self) -> bool {
        match self {
            ElementKey::Vertex(k) => k.is_null(),
            ElementKey::Edge(k) => k.is_null(),
            ElementKey::Loop(k) => k.is_null(),
            ElementKey::Face(k) => k.is_null(),
        }
    }
}

macro_rules! impl_element_key {
    ($key:ident, $variant:ident) => {
        impl From<$key> for ElementKey {
            fn from(k: $key) -> Self {
                ElementKey::$variant(k)
            }
        }
    };
}

impl_element_key!(VertexKey, Vertex);
impl_element_key!(EdgeKey, Edge);
impl_element_key!(LoopKey, Loop);
impl_element_key!(FaceKey, Face);

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_stale_key_detected() {
        let mut arena: SlotMap<VertexKey, u32> = SlotMap::with_key();
        let a = arena.insert(1);
        arena.remove(a);
        let b = arena.insert(2);

        // The slot is reused but the old key no longer resolves.
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b), Some(&2));
        assert_ne!(a, b);
    }

    #[test]
    fn test_element_key_kind() {
        let mut verts: SlotMap<VertexKey, ()> = SlotMap::with_key();
        let mut faces: SlotMap<FaceKey, ()> = SlotMap::with_key();
        let v: ElementKey = verts.insert(()).into();
        let f: ElementKey = faces.insert(()).into();

        assert_eq!(v.kind(), ElementKind::Vertex);
        assert_eq!(f.kind(), ElementKind::Face);
        assert!(!v.is_null());
        assert!(ElementKey::Edge(EdgeKey::null()).is_null());
    }
}
