//! Core mesh data structures.
//!
//! This module provides the half-edge representation of 2D polygon meshes,
//! the conventional polygon mesh it is built from, and the incidence and
//! geometry queries derived from it.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which stores node coordinates and a
//! flat table of half-edge records. Edges and cells are derived: an edge is a
//! pair of twin half-edges, a cell is a `next`-cycle.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`NodeId`] - Identifies a node
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`CellId`] - Identifies a cell (or the exterior face)
//! - [`EdgeId`] - Identifies a full edge
//!
//! # Query Shapes
//!
//! Incidence queries come in two shapes: dense/ragged arrays ([`Ragged`] or
//! fixed-width rows) and sparse boolean matrices ([`BoolCsrMatrix`]).
//!
//! # Construction
//!
//! ```
//! use heron::mesh::{HalfEdgeMesh, build_from_polygons};
//! use nalgebra::Point2;
//!
//! let nodes = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! let cells = vec![[0, 1, 2]];
//!
//! let mesh: HalfEdgeMesh = build_from_polygons(&nodes, &cells).unwrap();
//! assert_eq!(mesh.num_edges(), 3);
//! ```

mod builder;
mod entity;
mod geometry;
mod halfedge;
mod incidence;
mod index;
mod polygon;
mod ragged;
mod sparse;
mod validate;

pub use builder::{build_from_polygon_mesh, build_from_polygons, to_polygons};
pub use entity::{Entity, EntityKind};
pub use halfedge::{CellHalfEdgeIter, HalfEdge, HalfEdgeMesh};
pub use index::{CellId, EdgeId, HalfEdgeId, MeshIndex, NodeId};
pub(crate) use index::ensure_capacity;
pub use polygon::PolygonMesh;
pub use ragged::Ragged;
pub use sparse::BoolCsrMatrix;
pub use validate::{ValidationError, ValidationReport};
