//! Error types for bmesh.
//!
//! This module defines the recoverable errors of the kernel. Violated
//! preconditions (an edge between a vertex and itself, a stale key passed to a
//! panicking accessor) are programmer errors and panic instead.

use thiserror::Error;

use crate::attribute::ElementKind;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The mesh has no vertices (or a bulk builder was given no faces).
    #[error("mesh is empty")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face repeats a vertex on one of its sides.
    #[error("face {face} is degenerate (repeated vertex)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A value does not match the attribute definition's type.
    #[error("value for {kind} attribute '{name}' does not match definition ({expected})")]
    AttributeMismatch {
        /// Element kind of the definition.
        kind: ElementKind,
        /// Attribute name.
        name: String,
        /// Human readable description of the declared type.
        expected: String,
    },

    /// A key refers to an element that has been removed.
    #[error("stale key: {0}")]
    StaleKey(String),

    /// A structural invariant of the mesh does not hold.
    #[error("topology violation: {0}")]
    TopologyViolation(String),
}

impl MeshError {
    /// Create a topology violation error.
    pub fn violation<T: std::fmt::Display>(details: T) -> Self {
        MeshError::TopologyViolation(details.to_string())
    }
}
