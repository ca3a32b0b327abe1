//! Mesh processing algorithms.
//!
//! - **Refinement**: conforming adaptive refinement of marked cells
//!
//! Algorithms take the mesh by `&mut` and replace its table as a whole, so a
//! failed call leaves the mesh as it was.

pub mod refine;
