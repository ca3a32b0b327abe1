//! # Heron
//!
//! Half-edge polygon meshes in 2D with conforming adaptive refinement.
//!
//! Heron stores an arbitrary polygonal mesh as a flat half-edge table and
//! derives every incidence relation (cell↔node, cell↔edge, cell↔cell,
//! edge↔node, edge↔cell, node↔node, boundary flags) from it on demand. Marked
//! cells can be refined in place without breaking conformity: edges shared
//! with unmarked neighbours are split on both sides.
//!
//! ## Features
//!
//! - **Half-edge table**: one six-field record per half-edge, typed ids
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Two query shapes**: ragged arrays or sparse boolean matrices
//! - **Adaptive refinement**: fan (triangles) or quad split around barycenters
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use heron::prelude::*;
//! use nalgebra::Point2;
//!
//! // Two unit squares side by side
//! let nodes = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(2.0, 0.0),
//!     Point2::new(0.0, 1.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(2.0, 1.0),
//! ];
//! let cells = vec![[0, 1, 4, 3], [1, 2, 5, 4]];
//!
//! let mesh: HalfEdgeMesh = build_from_polygons(&nodes, &cells).unwrap();
//! assert_eq!(mesh.num_nodes(), 6);
//! assert_eq!(mesh.num_edges(), 7);
//! assert_eq!(mesh.num_cells(), 2);
//! assert_eq!(mesh.boundary_edge_index().len(), 6);
//! ```
//!
//! ## Refinement
//!
//! ```
//! use heron::prelude::*;
//! use heron::algo::refine::{refine, RefineOptions};
//! use nalgebra::Point2;
//!
//! # let nodes = vec![
//! #     Point2::new(0.0, 0.0),
//! #     Point2::new(1.0, 0.0),
//! #     Point2::new(2.0, 0.0),
//! #     Point2::new(0.0, 1.0),
//! #     Point2::new(1.0, 1.0),
//! #     Point2::new(2.0, 1.0),
//! # ];
//! # let cells = vec![[0, 1, 4, 3], [1, 2, 5, 4]];
//! let mut mesh: HalfEdgeMesh = build_from_polygons(&nodes, &cells).unwrap();
//!
//! // Refine the left square only; the right one gains a midpoint.
//! refine(&mut mesh, &[true, false], &RefineOptions::default()).unwrap();
//! assert!(mesh.is_valid());
//! assert_eq!(mesh.num_cells(), 9);
//! assert_eq!(mesh.num_vertices_of_cells()[0], 5);
//! assert!((mesh.total_area() - 2.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use heron::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygon_mesh, build_from_polygons, to_polygons, CellId, EdgeId, EntityKind,
        HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, NodeId, PolygonMesh,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
