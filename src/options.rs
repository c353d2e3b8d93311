//! Mesh configuration.

/// Options that affect derived-geometry extraction.
///
/// Topology is never affected by these settings; they are applied when
/// triangle buffers and render arrays are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshOptions {
    /// Reverse every extracted triangle and negate every extracted normal.
    pub flip_faces: bool,

    /// Whether to use parallel execution when rebuilding render arrays (default: true).
    pub parallel: bool,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            flip_faces: false,
            parallel: true,
        }
    }
}

impl MeshOptions {
    /// Create options with face flipping enabled or disabled.
    pub fn with_flip_faces(mut self, flip_faces: bool) -> Self {
        self.flip_faces = flip_faces;
        self
    }

    /// Create options with parallel execution enabled or disabled.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
