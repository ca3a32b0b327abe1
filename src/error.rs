//! Error types for heron.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The mesh has no cells.
    #[error("mesh has no cells")]
    EmptyMesh,

    /// A cell references an invalid vertex index.
    #[error("cell {cell} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The cell index.
        cell: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A cell has fewer than three vertices or repeats a vertex.
    #[error("cell {cell} is degenerate (fewer than 3 vertices or duplicate vertices)")]
    DegenerateCell {
        /// The cell index.
        cell: usize,
    },

    /// An edge has more than two incident cells.
    #[error("edge ({v0}, {v1}) has more than two incident cells")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// A boundary node starts or ends more than one boundary edge.
    #[error("node {node} is a non-manifold boundary vertex")]
    NonManifoldVertex {
        /// The node index.
        node: usize,
    },

    /// Two cells traverse a shared edge in the same direction.
    #[error("cells sharing edge ({v0}, {v1}) have inconsistent orientation")]
    InconsistentOrientation {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// An input array has the wrong length.
    #[error("shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        /// Which array is malformed.
        what: &'static str,
        /// The expected length.
        expected: usize,
        /// The actual length.
        found: usize,
    },

    /// An id is outside the valid range of its entity.
    #[error("{what} index {index} out of range (bound {bound})")]
    IndexOutOfRange {
        /// Which kind of id.
        what: &'static str,
        /// The offending id.
        index: usize,
        /// The exclusive upper bound.
        bound: usize,
    },

    /// An entity selector was not recognized.
    #[error("unrecognized entity kind `{name}` (expected node, edge, face or cell)")]
    UnrecognizedEntity {
        /// The selector as given.
        name: String,
    },

    /// The half-edge table violates a structural invariant.
    #[error("invalid topology: {details}")]
    InvalidTopology {
        /// Description of the violation(s).
        details: String,
    },
}

impl MeshError {
    /// Create a shape mismatch error.
    pub fn shape(what: &'static str, expected: usize, found: usize) -> Self {
        MeshError::ShapeMismatch {
            what,
            expected,
            found,
        }
    }

    /// Create an index out of range error.
    pub fn out_of_range(what: &'static str, index: usize, bound: usize) -> Self {
        MeshError::IndexOutOfRange { what, index, bound }
    }

    /// Check `found == expected`, reporting a shape mismatch otherwise.
    pub(crate) fn ensure_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
        if expected == found {
            Ok(())
        } else {
            Err(Self::shape(what, expected, found))
        }
    }
}
