//! Refraction indices of the media a path travels through.
//!
//! Entry `d` is the index of the medium the ray at recursion depth `d`
//! travels in; entry 0 is the camera's medium. Tracing a child ray truncates
//! the stack to the parent's depth first, so stale entries from sibling rays
//! never leak and the stack never grows past the path depth.

/// Refraction index of vacuum.
pub const VACUUM: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct MediumStack {
    indices: Vec<f32>,
    outer: f32,
}

impl MediumStack {
    /// Create a stack rooted at the medium the camera sits in.
    pub fn new(outer: f32) -> Self {
        let mut indices = Vec::with_capacity(16);
        indices.push(outer);
        Self { indices, outer }
    }

    /// Drop every entry except the camera medium.
    pub fn reset(&mut self) {
        self.indices.clear();
        self.indices.push(self.outer);
    }

    /// Index of the medium the ray at `depth` travels in.
    pub fn current(&self, depth: usize) -> f32 {
        self.indices
            .get(depth)
            .or_else(|| self.indices.last())
            .copied()
            .unwrap_or(self.outer)
    }

    /// Record the medium of the child ray spawned at `depth`.
    pub fn push_child(&mut self, depth: usize, index: f32) {
        self.indices.truncate(depth + 1);
        self.indices.push(index);
    }

    /// Index of the medium a ray at `depth` enters when it leaves its
    /// current one.
    ///
    /// Walks toward the root past every ancestor with the current index, so
    /// consecutive entries of the same medium count as one. Falls back to
    /// vacuum at the root.
    pub fn previous_index(&self, depth: usize) -> f32 {
        let current = self.current(depth);
        let end = depth.min(self.indices.len());
        self.indices[..end]
            .iter()
            .rev()
            .copied()
            .find(|&index| index != current)
            .unwrap_or(VACUUM)
    }

    /// Number of recorded entries, camera medium included.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl Default for MediumStack {
    fn default() -> Self {
        Self::new(VACUUM)
    }
}
