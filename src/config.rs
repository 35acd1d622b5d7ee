//! Tree traversal limits

/// A tree over `usize::MAX` records is at most 64 layers deep
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings applied when a tree is traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Deepest layer, counted from the root at 0, searched when locating a
    /// record. Also the most parent links followed from a leaf to the root.
    pub max_depth: usize,
}

impl TreeConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
