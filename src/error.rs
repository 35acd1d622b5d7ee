//! Merkle Tree Errors

use displaydoc::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// At least 2 records are required to build a tree, got: {0}
    InsufficientRecords(usize),
    /// Requested index: {0} exceeds number of nodes or records: {1}
    ExceededMaxIndex(usize, usize),
    /// Records sit at depth: {0}, deeper than the configured maximum: {1}
    ExceededMaxDepth(usize, usize),
}

impl std::error::Error for Error {}
