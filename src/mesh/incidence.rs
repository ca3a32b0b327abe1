//! Incidence and adjacency queries.
//!
//! Every query is re-derived from the current half-edge table. Each comes in
//! a dense form (a [`Ragged`] array or fixed-width rows) and a sparse form
//! (a [`BoolCsrMatrix`]).
//!
//! Edge `k` is the `k`-th main half-edge in id order; both half-edges of an
//! edge map to the same edge number.

use super::halfedge::HalfEdgeMesh;
use super::index::{EdgeId, HalfEdgeId, MeshIndex};
use super::ragged::Ragged;
use super::sparse::BoolCsrMatrix;

impl<I: MeshIndex> HalfEdgeMesh<I> {
    // ==================== Edge numbering ====================

    /// Edge number of every half-edge.
    pub fn halfedge_to_edge(&self) -> Vec<usize> {
        let mut edge = vec![0usize; self.halfedges.len()];
        let mut k = 0;
        for (i, he) in self.halfedges.iter().enumerate() {
            if he.is_main {
                edge[i] = k;
                edge[he.twin.index()] = k;
                k += 1;
            }
        }
        edge
    }

    /// Main half-edge of every edge, indexed by edge number.
    pub fn edge_halfedges(&self) -> Vec<HalfEdgeId<I>> {
        self.main_halfedges().collect()
    }

    /// Main half-edge of one edge.
    ///
    /// This scans the table; prefer [`HalfEdgeMesh::edge_halfedges`] in loops.
    pub fn edge_halfedge(&self, e: EdgeId<I>) -> HalfEdgeId<I> {
        self.main_halfedges()
            .nth(e.index())
            .unwrap_or_else(HalfEdgeId::invalid)
    }

    // ==================== Cell queries ====================

    /// Number of vertices of every cell.
    pub fn num_vertices_of_cells(&self) -> Vec<usize> {
        let mut count = vec![0usize; self.num_cells + 1];
        for he in &self.halfedges {
            count[self.cell_slot(he.cell)] += 1;
        }
        count.truncate(self.num_cells);
        count
    }

    /// Nodes of every cell, counter-clockwise, starting at the target of the
    /// cell's representative half-edge.
    pub fn cell_to_node(&self) -> Ragged {
        let mut c2n = Ragged::with_counts(&self.num_vertices_of_cells());
        for c in self.cell_ids() {
            for (slot, v) in c2n.row_mut(c.index()).iter_mut().zip(self.cell_nodes(c)) {
                *slot = v.index();
            }
        }
        c2n
    }

    /// Cell-node incidence as a `NC × NN` matrix.
    pub fn cell_to_node_sparse(&self) -> BoolCsrMatrix {
        let pairs = self
            .halfedges
            .iter()
            .filter(|he| !he.is_exterior())
            .map(|he| (he.cell.index(), he.to.index()))
            .collect();
        BoolCsrMatrix::from_pairs(self.num_cells, self.num_nodes(), pairs)
    }

    /// Edges of every cell.
    ///
    /// Slot `i` of a row is the edge between nodes `i` and `i + 1` of the
    /// same row of [`HalfEdgeMesh::cell_to_node`].
    pub fn cell_to_edge(&self) -> Ragged {
        let he2e = self.halfedge_to_edge();
        let mut c2e = Ragged::with_counts(&self.num_vertices_of_cells());
        for c in self.cell_ids() {
            let start = self.next(self.cell_halfedge(c));
            for (slot, he) in c2e.row_mut(c.index()).iter_mut().zip(self.cycle(start)) {
                *slot = he2e[he.index()];
            }
        }
        c2e
    }

    /// Cell-edge incidence as a `NC × NE` matrix.
    pub fn cell_to_edge_sparse(&self) -> BoolCsrMatrix {
        let he2e = self.halfedge_to_edge();
        let pairs = self
            .halfedges()
            .filter(|(_, he)| !he.is_exterior())
            .map(|(id, he)| (he.cell.index(), he2e[id.index()]))
            .collect();
        BoolCsrMatrix::from_pairs(self.num_cells, self.num_edges(), pairs)
    }

    /// Neighbouring cells of every cell, ascending.
    pub fn cell_to_cell(&self) -> Ragged {
        self.cell_to_cell_sparse().into_ragged()
    }

    /// Cell adjacency across interior edges as a symmetric `NC × NC` matrix.
    pub fn cell_to_cell_sparse(&self) -> BoolCsrMatrix {
        let mut pairs = Vec::new();
        for he in &self.halfedges {
            let other = self.halfedges[he.twin.index()].cell;
            if !he.is_exterior() && !other.is_exterior() {
                pairs.push((he.cell.index(), other.index()));
                pairs.push((other.index(), he.cell.index()));
            }
        }
        BoolCsrMatrix::from_pairs(self.num_cells, self.num_cells, pairs)
    }

    // ==================== Edge queries ====================

    /// Endpoints of every edge, oriented as its main half-edge.
    pub fn edge_to_node(&self) -> Vec<[usize; 2]> {
        self.main_halfedges()
            .map(|he| [self.origin(he).index(), self.to(he).index()])
            .collect()
    }

    /// Edge-node incidence as a `NE × NN` matrix.
    pub fn edge_to_node_sparse(&self) -> BoolCsrMatrix {
        let pairs = self
            .edge_to_node()
            .into_iter()
            .enumerate()
            .flat_map(|(e, [a, b])| [(e, a), (e, b)])
            .collect();
        BoolCsrMatrix::from_pairs(self.num_edges(), self.num_nodes(), pairs)
    }

    /// Cells on both sides of every edge as `[c0, c1, local0, local1]`.
    ///
    /// `c0` holds the main half-edge and `c1` its twin. `local*` is the slot of
    /// the edge in the cell's row of [`HalfEdgeMesh::cell_to_edge`]. On
    /// boundary edges the exterior side repeats the real one, so `c0 == c1`.
    pub fn edge_to_cell(&self) -> Vec<[usize; 4]> {
        let local = self.halfedge_local_slots();
        self.main_halfedges()
            .map(|main| {
                let twin = self.twin(main);
                let (h0, h1) = match (
                    self.is_exterior_halfedge(main),
                    self.is_exterior_halfedge(twin),
                ) {
                    (true, _) => (twin, twin),
                    (false, true) => (main, main),
                    (false, false) => (main, twin),
                };
                [
                    self.cell_of(h0).index(),
                    self.cell_of(h1).index(),
                    local[h0.index()],
                    local[h1.index()],
                ]
            })
            .collect()
    }

    /// Edge-cell incidence as a `NE × NC` matrix (exterior omitted).
    pub fn edge_to_cell_sparse(&self) -> BoolCsrMatrix {
        let he2e = self.halfedge_to_edge();
        let pairs = self
            .halfedges()
            .filter(|(_, he)| !he.is_exterior())
            .map(|(id, he)| (he2e[id.index()], he.cell.index()))
            .collect();
        BoolCsrMatrix::from_pairs(self.num_edges(), self.num_cells, pairs)
    }

    /// Edges sharing a node with each edge, as a `NE × NE` matrix.
    ///
    /// Every edge is adjacent to itself.
    pub fn edge_to_edge_sparse(&self) -> BoolCsrMatrix {
        let e2n = self.edge_to_node_sparse();
        e2n.matmul(&e2n.transpose())
    }

    /// Slot of every real half-edge within its cell's `cell_to_edge` row.
    fn halfedge_local_slots(&self) -> Vec<usize> {
        let mut local = vec![0usize; self.halfedges.len()];
        for c in self.cell_ids() {
            let start = self.next(self.cell_halfedge(c));
            for (i, he) in self.cycle(start).enumerate() {
                local[he.index()] = i;
            }
        }
        local
    }

    // ==================== Node queries ====================

    /// Neighbouring nodes of every node, ascending.
    pub fn node_to_node(&self) -> Ragged {
        self.node_to_node_sparse().into_ragged()
    }

    /// Node adjacency as a symmetric `NN × NN` matrix.
    pub fn node_to_node_sparse(&self) -> BoolCsrMatrix {
        let pairs = self
            .edge_to_node()
            .into_iter()
            .flat_map(|[a, b]| [(a, b), (b, a)])
            .collect();
        BoolCsrMatrix::from_pairs(self.num_nodes(), self.num_nodes(), pairs)
    }

    /// Cells around every node, ascending.
    pub fn node_to_cell(&self) -> Ragged {
        self.node_to_cell_sparse().into_ragged()
    }

    /// Node-cell incidence as a `NN × NC` matrix.
    pub fn node_to_cell_sparse(&self) -> BoolCsrMatrix {
        let pairs = self
            .halfedges
            .iter()
            .filter(|he| !he.is_exterior())
            .map(|he| (he.to.index(), he.cell.index()))
            .collect();
        BoolCsrMatrix::from_pairs(self.num_nodes(), self.num_cells, pairs)
    }

    // ==================== Boundary ====================

    /// Whether each edge lies on the boundary.
    pub fn boundary_edge_flag(&self) -> Vec<bool> {
        self.main_halfedges()
            .map(|he| self.is_boundary_halfedge(he))
            .collect()
    }

    /// Whether each node lies on the boundary.
    pub fn boundary_node_flag(&self) -> Vec<bool> {
        let mut flag = vec![false; self.num_nodes()];
        for he in &self.halfedges {
            if he.is_exterior() {
                flag[he.to.index()] = true;
            }
        }
        flag
    }

    /// Whether each cell has at least one boundary edge.
    pub fn boundary_cell_flag(&self) -> Vec<bool> {
        let mut flag = vec![false; self.num_cells];
        for he in &self.halfedges {
            if he.is_exterior() {
                let inner = self.halfedges[he.twin.index()].cell;
                if !inner.is_exterior() {
                    flag[inner.index()] = true;
                }
            }
        }
        flag
    }

    /// Ids of the boundary edges, ascending.
    pub fn boundary_edge_index(&self) -> Vec<usize> {
        flagged(&self.boundary_edge_flag())
    }

    /// Ids of the boundary nodes, ascending.
    pub fn boundary_node_index(&self) -> Vec<usize> {
        flagged(&self.boundary_node_flag())
    }

    /// Ids of the boundary cells, ascending.
    pub fn boundary_cell_index(&self) -> Vec<usize> {
        flagged(&self.boundary_cell_flag())
    }

    /// Endpoints of the boundary edges, in boundary edge id order.
    pub fn boundary_edge(&self) -> Vec<[usize; 2]> {
        self.edge_to_node()
            .into_iter()
            .zip(self.boundary_edge_flag())
            .filter_map(|(nodes, bd)| bd.then_some(nodes))
            .collect()
    }
}

fn flagged(flag: &[bool]) -> Vec<usize> {
    flag.iter()
        .enumerate()
        .filter_map(|(i, &f)| f.then_some(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::tests::{
        grid, grid_with_hole, is_rotation, square_and_triangle, two_squares, unit_square,
    };

    #[test]
    fn test_halfedge_to_edge() {
        let mesh = two_squares();
        let he2e = mesh.halfedge_to_edge();
        assert_eq!(he2e.len(), 14);
        for he in mesh.halfedge_ids() {
            assert_eq!(he2e[he.index()], he2e[mesh.twin(he).index()]);
        }
        assert_eq!(mesh.edge_halfedges().len(), 7);
        assert_eq!(mesh.edge_halfedge(EdgeId::new(3)), HalfEdgeId::new(3));
        assert!(!mesh.edge_halfedge(EdgeId::new(7)).is_valid());
    }

    #[test]
    fn test_cell_to_node() {
        let mesh = two_squares();
        let c2n = mesh.cell_to_node();
        assert_eq!(c2n.len(), 2);
        assert!(is_rotation(&[0, 1, 4, 3], c2n.row(0)));
        assert!(is_rotation(&[1, 2, 5, 4], c2n.row(1)));

        let sparse = mesh.cell_to_node_sparse();
        assert_eq!(sparse.row(0), &[0, 1, 3, 4]);
        assert_eq!(sparse.row(1), &[1, 2, 4, 5]);
    }

    #[test]
    fn test_cell_to_edge_alignment() {
        let mesh = square_and_triangle();
        let c2n = mesh.cell_to_node();
        let c2e = mesh.cell_to_edge();
        let e2n = mesh.edge_to_node();

        for c in 0..mesh.num_cells() {
            let nodes = c2n.row(c);
            let edges = c2e.row(c);
            assert_eq!(nodes.len(), edges.len());
            for i in 0..nodes.len() {
                let mut expected = [nodes[i], nodes[(i + 1) % nodes.len()]];
                let mut found = e2n[edges[i]];
                expected.sort_unstable();
                found.sort_unstable();
                assert_eq!(expected, found);
            }
        }
        assert_eq!(mesh.cell_to_edge_sparse().nnz(), 7);
    }

    #[test]
    fn test_cell_to_cell() {
        let mesh = grid(2);
        let c2c = mesh.cell_to_cell();
        assert_eq!(c2c.row(0), &[1, 2]);
        assert_eq!(c2c.row(3), &[1, 2]);
        assert!(mesh.cell_to_cell_sparse().contains(2, 0));
        assert!(unit_square().cell_to_cell().row(0).is_empty());
    }

    #[test]
    fn test_edge_to_node() {
        let mesh = unit_square();
        assert_eq!(mesh.edge_to_node(), vec![[0, 1], [1, 2], [2, 3], [3, 0]]);
        let sparse = mesh.edge_to_node_sparse();
        assert_eq!(sparse.row(3), &[0, 3]);
    }

    #[test]
    fn test_edge_to_cell() {
        let mesh = two_squares();
        let e2c = mesh.edge_to_cell();
        let c2e = mesh.cell_to_edge();
        // Edge 1 is the shared one.
        assert_eq!(&e2c[1][..2], &[0, 1]);
        for (e, &[c0, c1, l0, l1]) in e2c.iter().enumerate() {
            assert_eq!(c2e.row(c0)[l0], e);
            assert_eq!(c2e.row(c1)[l1], e);
        }
        let bd = e2c.iter().filter(|r| r[0] == r[1]).count();
        assert_eq!(bd, 6);

        let sparse = mesh.edge_to_cell_sparse();
        assert_eq!(sparse.row(1), &[0, 1]);
        assert_eq!(sparse.row(0), &[0]);
    }

    #[test]
    fn test_edge_to_edge() {
        let mesh = unit_square();
        let e2e = mesh.edge_to_edge_sparse();
        // Every edge touches itself and its two neighbours, not its opposite.
        for e in 0..4 {
            assert_eq!(e2e.row(e).len(), 3);
            assert!(e2e.contains(e, e));
            assert!(!e2e.contains(e, (e + 2) % 4));
        }
    }

    #[test]
    fn test_node_queries() {
        let mesh = two_squares();
        let n2n = mesh.node_to_node();
        assert_eq!(n2n.row(1), &[0, 2, 4]);
        assert_eq!(n2n.row(3), &[0, 4]);

        let n2c = mesh.node_to_cell();
        assert_eq!(n2c.row(1), &[0, 1]);
        assert_eq!(n2c.row(0), &[0]);
        assert_eq!(mesh.node_to_cell_sparse().nnz(), 8);
    }

    #[test]
    fn test_num_vertices_of_cells() {
        assert_eq!(square_and_triangle().num_vertices_of_cells(), vec![4, 3]);
        assert_eq!(grid(2).num_vertices_of_cells(), vec![4; 4]);
    }

    #[test]
    fn test_boundary() {
        let mesh = grid(2);
        assert_eq!(mesh.boundary_edge_index().len(), 8);
        assert_eq!(mesh.boundary_node_index(), vec![0, 1, 2, 3, 5, 6, 7, 8]);
        assert!(!mesh.boundary_node_flag()[4]);
        assert_eq!(mesh.boundary_cell_index(), vec![0, 1, 2, 3]);

        let mesh = two_squares();
        let flag = mesh.boundary_edge_flag();
        assert!(!flag[1]);
        assert_eq!(flag.iter().filter(|&&b| b).count(), 6);

        let bd = mesh.boundary_edge();
        assert_eq!(bd.len(), 6);
        assert!(!bd.contains(&[1, 4]));
        assert!(bd.contains(&[0, 1]));
    }

    #[test]
    fn test_boundary_around_hole() {
        let mesh = grid_with_hole();
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_cells(), 8);
        assert_eq!(mesh.num_edges(), 24);

        // 12 outer edges plus the 4 around the hole.
        let bd = mesh.boundary_edge();
        assert_eq!(bd.len(), 16);
        for side in [[5, 6], [6, 10], [10, 9], [9, 5]] {
            let [a, b] = side;
            assert!(bd.contains(&[a, b]) || bd.contains(&[b, a]), "{:?}", side);
        }
        assert_eq!(mesh.boundary_node_index(), (0..16).collect::<Vec<_>>());
        assert_eq!(mesh.boundary_cell_index(), (0..8).collect::<Vec<_>>());

        // No adjacency across the hole.
        let c2c = mesh.cell_to_cell();
        assert_eq!(c2c.row(1), &[0, 2]);
        assert_eq!(c2c.row(3), &[0, 5]);

        let cells = mesh.cell_to_node().to_vecs();
        let pmesh = crate::mesh::PolygonMesh::from_polygons(mesh.nodes().to_vec(), &cells).unwrap();
        let (next, prev) = pmesh.boundary_edge_to_edge().unwrap();
        assert_eq!(next.iter().flatten().count(), 16);
        assert_eq!(prev.iter().flatten().count(), 16);
    }
}
