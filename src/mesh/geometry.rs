//! Geometric quantities derived from node coordinates.

use nalgebra::{Point2, Vector2};

use super::entity::EntityKind;
use super::halfedge::HalfEdgeMesh;
use super::index::MeshIndex;
use crate::error::{MeshError, Result};

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Signed area of every cell (positive for counter-clockwise cells).
    ///
    /// Each half-edge contributes its shoelace term to its own cell; the
    /// exterior's accumulator is dropped.
    pub fn cell_area(&self) -> Vec<f64> {
        let mut area = vec![0.0; self.num_cells + 1];
        for he in &self.halfedges {
            let p0 = self.nodes[self.halfedges[he.prev.index()].to.index()];
            let p1 = self.nodes[he.to.index()];
            area[self.cell_slot(he.cell)] += p0.x * p1.y - p1.x * p0.y;
        }
        area.truncate(self.num_cells);
        for a in &mut area {
            *a *= 0.5;
        }
        area
    }

    /// Signed area of the listed cells, in the order given.
    pub fn cell_area_of(&self, cells: &[usize]) -> Result<Vec<f64>> {
        let area = self.cell_area();
        cells
            .iter()
            .map(|&c| {
                area.get(c)
                    .copied()
                    .ok_or_else(|| MeshError::out_of_range("cell", c, self.num_cells))
            })
            .collect()
    }

    /// Total area of the mesh.
    pub fn total_area(&self) -> f64 {
        self.cell_area().iter().sum()
    }

    /// Barycenter of every entity of a kind.
    ///
    /// Cells use the average of their vertices, edges their midpoint.
    pub fn entity_barycenter(&self, kind: EntityKind) -> Vec<Point2<f64>> {
        match kind {
            EntityKind::Node => self.nodes.clone(),
            EntityKind::Edge => self.points_on(&self.edge_to_node(), [0.5, 0.5]),
            EntityKind::Cell => {
                let mut sum = vec![Vector2::zeros(); self.num_cells + 1];
                let mut count = vec![0usize; self.num_cells + 1];
                for he in &self.halfedges {
                    let slot = self.cell_slot(he.cell);
                    sum[slot] += self.nodes[he.to.index()].coords;
                    count[slot] += 1;
                }
                sum.iter()
                    .zip(&count)
                    .take(self.num_cells)
                    .map(|(s, &n)| Point2::from(s / n.max(1) as f64))
                    .collect()
            }
        }
    }

    /// Length of every edge.
    pub fn edge_length(&self) -> Vec<f64> {
        self.edge_to_node()
            .into_iter()
            .map(|[a, b]| (self.nodes[b] - self.nodes[a]).norm())
            .collect()
    }

    /// Points at barycentric coordinates on edges.
    ///
    /// Returns one row per entry of `bcs`, each holding a point per edge of
    /// `index` (every edge when `None`). `bc[0]` weighs the origin of the
    /// main half-edge, `bc[1]` its target.
    pub fn edge_bc_to_point(
        &self,
        bcs: &[[f64; 2]],
        index: Option<&[usize]>,
    ) -> Result<Vec<Vec<Point2<f64>>>> {
        let edges = self.edge_to_node();
        let selected = match index {
            None => edges,
            Some(index) => index
                .iter()
                .map(|&e| {
                    edges
                        .get(e)
                        .copied()
                        .ok_or_else(|| MeshError::out_of_range("edge", e, edges.len()))
                })
                .collect::<Result<Vec<_>>>()?,
        };
        Ok(bcs.iter().map(|&bc| self.points_on(&selected, bc)).collect())
    }

    fn points_on(&self, edges: &[[usize; 2]], bc: [f64; 2]) -> Vec<Point2<f64>> {
        edges
            .iter()
            .map(|&[a, b]| Point2::from(self.nodes[a].coords * bc[0] + self.nodes[b].coords * bc[1]))
            .collect()
    }
}
