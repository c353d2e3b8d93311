//! Per-kind attribute definition tables.

use super::{AttributeDefinition, AttributeMap, AttributeValue, ElementKind};

/// The attribute definitions declared on one mesh, grouped by element kind.
///
/// Definitions are kept in declaration order.
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    vertex: Vec<AttributeDefinition>,
    edge: Vec<AttributeDefinition>,
    loops: Vec<AttributeDefinition>,
    face: Vec<AttributeDefinition>,
}

impl AttributeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// All definitions for `kind`.
    pub fn definitions(&self, kind: ElementKind) -> &[AttributeDefinition] {
        match kind {
            ElementKind::Vertex => &self.vertex,
            ElementKind::Edge => &self.edge,
            ElementKind::Loop => &self.loops,
            ElementKind::Face => &self.face,
        }
    }

    fn definitions_mut(&mut self, kind: ElementKind) -> &mut Vec<AttributeDefinition> {
        match kind {
            ElementKind::Vertex => &mut self.vertex,
            ElementKind::Edge => &mut self.edge,
            ElementKind::Loop => &mut self.loops,
            ElementKind::Face => &mut self.face,
        }
    }

    /// Look up a definition by name.
    pub fn get(&self, kind: ElementKind, name: &str) -> Option<&AttributeDefinition> {
        self.definitions(kind).iter().find(|d| d.name == name)
    }

    /// Check whether `name` is defined for `kind`.
    pub fn contains(&self, kind: ElementKind, name: &str) -> bool {
        self.get(kind, name).is_some()
    }

    /// Declare a definition.
    ///
    /// Returns the stored definition and whether it was newly inserted. A name
    /// that is already defined for `kind` keeps its existing definition. A
    /// default that does not satisfy its own definition is replaced by the
    /// zero value of the declared type.
    ///
    /// # Panics
    /// Panics if the definition declares zero dimensions.
    pub fn define(
        &mut self,
        kind: ElementKind,
        mut definition: AttributeDefinition,
    ) -> (&AttributeDefinition, bool) {
        assert!(definition.dimensions >= 1, "attribute dimensions must be at least 1");
        let defs = self.definitions_mut(kind);
        if let Some(pos) = defs.iter().position(|d| d.name == definition.name) {
            return (&defs[pos], false);
        }

        if !definition.validate(&definition.default) {
            log::warn!(
                "default of {} attribute '{}' is not a {}, using zero value",
                kind,
                definition.name,
                definition.type_description()
            );
            if let Some(zero) = AttributeValue::zero(definition.base_type, definition.dimensions) {
                definition.default = zero;
            }
        }

        defs.push(definition);
        let last = defs.len() - 1;
        (&defs[last], true)
    }

    /// Bring an element's attributes in line with the definitions of `kind`.
    ///
    /// Missing attributes receive a copy of the default; present values that
    /// fail validation are reset to the default with a warning. Returns the
    /// number of values that were reset.
    pub fn ensure(&self, kind: ElementKind, attributes: &mut AttributeMap) -> usize {
        let mut reverted = 0;
        for def in self.definitions(kind) {
            match attributes.get_mut(&def.name) {
                None => {
                    attributes.insert(def.name.clone(), def.default.clone());
                }
                Some(value) if !def.validate(value) => {
                    log::warn!(
                        "{} attribute '{}' not compatible with definition ({}), \
                         reverting to default",
                        kind,
                        def.name,
                        def.type_description()
                    );
                    *value = def.default.clone();
                    reverted += 1;
                }
                Some(_) => {}
            }
        }
        reverted
    }

    /// Total number of definitions across all kinds.
    pub fn len(&self) -> usize {
        ElementKind::ALL
            .iter()
            .map(|&kind| self.definitions(kind).len())
            .sum()
    }

    /// Check whether no definitions exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
