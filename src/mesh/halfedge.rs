//! Half-edge polygon mesh data structure.
//!
//! The topology lives in one flat table with one record per half-edge. Each
//! record stores the node it points **to**, the **cell** it bounds, the
//! **next** and **prev** half-edges around that cell, its **twin**, and
//! whether it is the **main** (canonical) half-edge of its edge.
//!
//! # Boundary Handling
//!
//! Every edge has two half-edges, including edges on the boundary. The
//! half-edge facing away from the mesh is bound to the exterior face
//! ([`CellId::exterior`]); exterior half-edges are linked into their own cycles
//! along each boundary loop.
//!
//! # Derived Entities
//!
//! Edges and cells are not stored. Edge `k` is the `k`-th main half-edge in id
//! order together with its twin; a cell is the `next`-cycle of half-edges
//! carrying its id. One representative half-edge per cell is cached as a
//! traversal seed.

use nalgebra::Point2;

use super::index::{ensure_capacity, CellId, EdgeId, HalfEdgeId, MeshIndex, NodeId};
use crate::error::{MeshError, Result};

/// A half-edge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The node this half-edge points to.
    pub to: NodeId<I>,

    /// The cell this half-edge bounds ([`CellId::exterior`] on the outside).
    pub cell: CellId<I>,

    /// The next half-edge around the cell (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the cell.
    pub prev: HalfEdgeId<I>,

    /// The opposite half-edge of the same edge.
    pub twin: HalfEdgeId<I>,

    /// Whether this is the canonical half-edge of its edge.
    pub is_main: bool,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            to: NodeId::invalid(),
            cell: CellId::exterior(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            twin: HalfEdgeId::invalid(),
            is_main: false,
        }
    }

    /// Check if this half-edge bounds the exterior face.
    #[inline]
    pub fn is_exterior(&self) -> bool {
        self.cell.is_exterior()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A 2D polygon mesh stored as a half-edge table.
///
/// Node coordinates and the half-edge table are owned by the mesh. Queries
/// borrow it immutably; refinement takes `&mut` and replaces the table as a
/// whole.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    /// Node coordinates, indexed by node id.
    pub(crate) nodes: Vec<Point2<f64>>,

    /// All half-edges in the mesh.
    pub(crate) halfedges: Vec<HalfEdge<I>>,

    /// One half-edge per cell, used as a traversal seed.
    pub(crate) cell2hedge: Vec<HalfEdgeId<I>>,

    /// Number of real (non-exterior) cells.
    pub(crate) num_cells: usize,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            halfedges: Vec::new(),
            cell2hedge: Vec::new(),
            num_cells: 0,
        }
    }

    /// Assemble a mesh from its parts and index the cells.
    ///
    /// Callers guarantee the table is consistent.
    pub(crate) fn from_parts_unchecked(
        nodes: Vec<Point2<f64>>,
        halfedges: Vec<HalfEdge<I>>,
        num_cells: usize,
    ) -> Self {
        let mut mesh = Self::new();
        mesh.reinit(nodes, halfedges, num_cells);
        mesh
    }

    /// Replace the whole table and rebuild the cell index.
    pub(crate) fn reinit(
        &mut self,
        nodes: Vec<Point2<f64>>,
        halfedges: Vec<HalfEdge<I>>,
        num_cells: usize,
    ) {
        self.nodes = nodes;
        self.halfedges = halfedges;
        self.num_cells = num_cells;
        self.rebuild_cell_index();
    }

    /// Rebuild `cell2hedge` with one scan over the table (last writer wins).
    fn rebuild_cell_index(&mut self) {
        self.cell2hedge = vec![HalfEdgeId::invalid(); self.num_cells];
        for (i, he) in self.halfedges.iter().enumerate() {
            if !he.is_exterior() && he.cell.index() < self.num_cells {
                self.cell2hedge[he.cell.index()] = HalfEdgeId::new(i);
            }
        }
    }

    /// Build a mesh from a raw `(2·NE, 6)` table.
    ///
    /// Columns are `to, cell, next, prev, twin, is_main`. The exterior face is
    /// encoded as `num_cells` in the `cell` column and `is_main` as `0`/`1`.
    /// Shapes, index ranges and all structural invariants are checked.
    pub fn from_table(
        nodes: Vec<Point2<f64>>,
        table: &[[usize; 6]],
        num_cells: usize,
    ) -> Result<Self> {
        if table.len() % 2 != 0 {
            return Err(MeshError::shape("halfedge table", table.len() + 1, table.len()));
        }
        let nhe = table.len();
        let nn = nodes.len();
        ensure_capacity::<I>("node", nn)?;
        ensure_capacity::<I>("halfedge", nhe)?;
        ensure_capacity::<I>("cell", num_cells)?;

        let mut halfedges = Vec::with_capacity(nhe);
        for row in table {
            let [to, cell, next, prev, twin, main] = *row;
            if to >= nn {
                return Err(MeshError::out_of_range("node", to, nn));
            }
            if cell > num_cells {
                return Err(MeshError::out_of_range("cell", cell, num_cells + 1));
            }
            for link in [next, prev, twin] {
                if link >= nhe {
                    return Err(MeshError::out_of_range("halfedge", link, nhe));
                }
            }
            if main > 1 {
                return Err(MeshError::out_of_range("is_main flag", main, 2));
            }
            halfedges.push(HalfEdge {
                to: NodeId::new(to),
                cell: if cell == num_cells {
                    CellId::exterior()
                } else {
                    CellId::new(cell)
                },
                next: HalfEdgeId::new(next),
                prev: HalfEdgeId::new(prev),
                twin: HalfEdgeId::new(twin),
                is_main: main == 1,
            });
        }

        let mesh = Self::from_parts_unchecked(nodes, halfedges, num_cells);
        mesh.validate().check()?;
        Ok(mesh)
    }

    /// Export the raw `(2·NE, 6)` table (inverse of [`HalfEdgeMesh::from_table`]).
    pub fn to_table(&self) -> Vec<[usize; 6]> {
        self.halfedges
            .iter()
            .map(|he| {
                [
                    he.to.index(),
                    self.cell_slot(he.cell),
                    he.next.index(),
                    he.prev.index(),
                    he.twin.index(),
                    he.is_main as usize,
                ]
            })
            .collect()
    }

    // ==================== Accessors ====================

    /// Get the number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.halfedges.len() / 2
    }

    /// Get the number of cells (the exterior face is not counted).
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// Get all node coordinates.
    #[inline]
    pub fn nodes(&self) -> &[Point2<f64>] {
        &self.nodes
    }

    /// Get the position of a node.
    #[inline]
    pub fn position(&self, v: NodeId<I>) -> &Point2<f64> {
        &self.nodes[v.index()]
    }

    /// Set the position of a node.
    #[inline]
    pub fn set_position(&mut self, v: NodeId<I>, pos: Point2<f64>) {
        self.nodes[v.index()] = pos;
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get the raw half-edge records.
    #[inline]
    pub fn halfedge_table(&self) -> &[HalfEdge<I>] {
        &self.halfedges
    }

    /// Get the representative half-edge of a cell.
    #[inline]
    pub fn cell_halfedge(&self, c: CellId<I>) -> HalfEdgeId<I> {
        self.cell2hedge[c.index()]
    }

    /// Map a cell id to an accumulator slot; the exterior uses slot `num_cells`.
    #[inline]
    pub(crate) fn cell_slot(&self, c: CellId<I>) -> usize {
        if c.is_exterior() {
            self.num_cells
        } else {
            c.index()
        }
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the cell.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the cell.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the node a half-edge points to.
    #[inline]
    pub fn to(&self, he: HalfEdgeId<I>) -> NodeId<I> {
        self.halfedge(he).to
    }

    /// Get the node a half-edge starts from.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> NodeId<I> {
        self.to(self.twin(he))
    }

    /// Get the cell of a half-edge.
    #[inline]
    pub fn cell_of(&self, he: HalfEdgeId<I>) -> CellId<I> {
        self.halfedge(he).cell
    }

    /// Check if a half-edge is the canonical one of its edge.
    #[inline]
    pub fn is_main(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_main
    }

    /// Check if a half-edge bounds the exterior face.
    #[inline]
    pub fn is_exterior_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_exterior()
    }

    /// Check if the edge of a half-edge lies on the mesh boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.is_exterior_halfedge(he) || self.is_exterior_halfedge(self.twin(he))
    }

    /// Get the main half-edge of the edge containing `he`.
    #[inline]
    pub fn main_of(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        if self.is_main(he) {
            he
        } else {
            self.twin(he)
        }
    }

    // ==================== Iteration ====================

    /// Iterate over all node IDs.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId<I>> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all half-edges with their IDs.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId<I>, &HalfEdge<I>)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// Iterate over all cell IDs.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId<I>> + '_ {
        (0..self.num_cells).map(CellId::new)
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.num_edges()).map(EdgeId::new)
    }

    /// Iterate over the main half-edges in id order.
    ///
    /// The `k`-th item is the canonical half-edge of edge `k`.
    pub fn main_halfedges(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedges()
            .filter(|(_, he)| he.is_main)
            .map(|(id, _)| id)
    }

    /// Iterate over half-edges around a cell.
    pub fn cell_halfedges(&self, c: CellId<I>) -> CellHalfEdgeIter<'_, I> {
        CellHalfEdgeIter::new(self, self.cell_halfedge(c))
    }

    /// Iterate over the `next`-cycle starting at any half-edge.
    ///
    /// Works for exterior loops as well.
    pub fn cycle(&self, start: HalfEdgeId<I>) -> CellHalfEdgeIter<'_, I> {
        CellHalfEdgeIter::new(self, start)
    }

    /// Iterate over the nodes of a cell in counter-clockwise order.
    pub fn cell_nodes(&self, c: CellId<I>) -> impl Iterator<Item = NodeId<I>> + '_ {
        self.cell_halfedges(c).map(|he| self.to(he))
    }

    /// Get the number of vertices of a cell by walking its cycle.
    pub fn cell_vertex_count(&self, c: CellId<I>) -> usize {
        self.cell_halfedges(c).count()
    }

    /// Get the position of every node of a cell.
    pub fn cell_positions(&self, c: CellId<I>) -> Vec<Point2<f64>> {
        self.cell_nodes(c).map(|v| *self.position(v)).collect()
    }
}

/// Iterator over the half-edges of one `next`-cycle.
pub struct CellHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> CellHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, start: HalfEdgeId<I>) -> Self {
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for CellHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::tests::{two_squares, unit_square};

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_nodes(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_cells(), 0);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_sizes() {
        let mesh = two_squares();
        assert_eq!(mesh.num_nodes(), 6);
        assert_eq!(mesh.num_edges(), 7);
        assert_eq!(mesh.num_halfedges(), 14);
        assert_eq!(mesh.num_cells(), 2);
        assert_eq!(mesh.main_halfedges().count(), 7);
    }

    #[test]
    fn test_cell_cycle() {
        let mesh = unit_square();
        let c = CellId::new(0);
        assert_eq!(mesh.cell_vertex_count(c), 4);
        for he in mesh.cell_halfedges(c) {
            assert_eq!(mesh.cell_of(he), c);
            assert_eq!(mesh.origin(he), mesh.to(mesh.prev(he)));
        }
    }

    #[test]
    fn test_exterior_cycle() {
        let mesh = unit_square();
        let outside: Vec<_> = mesh
            .halfedge_ids()
            .filter(|&he| mesh.is_exterior_halfedge(he))
            .collect();
        assert_eq!(outside.len(), 4);

        let walked: Vec<_> = mesh.cycle(outside[0]).collect();
        assert_eq!(walked.len(), 4);
        assert!(walked.iter().all(|&he| mesh.is_exterior_halfedge(he)));
        assert!(walked.iter().all(|&he| mesh.is_boundary_halfedge(he)));
    }

    #[test]
    fn test_table_roundtrip() {
        let mesh = two_squares();
        let table = mesh.to_table();
        assert_eq!(table.len(), 14);
        // Exterior is encoded as num_cells.
        assert!(table.iter().any(|row| row[1] == 2));

        let copy = HalfEdgeMesh::<u32>::from_table(mesh.nodes().to_vec(), &table, 2).unwrap();
        assert_eq!(copy.to_table(), table);
        assert_eq!(copy.cell_to_node(), mesh.cell_to_node());
    }

    #[test]
    fn test_from_table_rejects_bad_shapes() {
        let mesh = unit_square();
        let mut table = mesh.to_table();

        let odd = &table[..7];
        assert!(matches!(
            HalfEdgeMesh::<u32>::from_table(mesh.nodes().to_vec(), odd, 1),
            Err(MeshError::ShapeMismatch { .. })
        ));

        table[0][0] = 99;
        assert!(matches!(
            HalfEdgeMesh::<u32>::from_table(mesh.nodes().to_vec(), &table, 1),
            Err(MeshError::IndexOutOfRange { what: "node", .. })
        ));
    }

    #[test]
    fn test_from_table_rejects_broken_links() {
        let mesh = unit_square();
        let mut table = mesh.to_table();
        // Point the twin of half-edge 0 at itself.
        table[0][4] = 0;
        assert!(matches!(
            HalfEdgeMesh::<u32>::from_table(mesh.nodes().to_vec(), &table, 1),
            Err(MeshError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn test_from_table_rejects_cell_with_two_cycles() {
        let mesh = two_squares();
        // Give both squares id 0 and move the exterior down to 1.
        let table: Vec<[usize; 6]> = mesh
            .to_table()
            .into_iter()
            .map(|mut row| {
                row[1] = row[1].saturating_sub(1);
                row
            })
            .collect();
        let result = HalfEdgeMesh::<u32>::from_table(mesh.nodes().to_vec(), &table, 1);
        match result {
            Err(MeshError::InvalidTopology { details }) => {
                assert!(details.contains("cell 0"), "{}", details)
            }
            other => panic!("unexpected result {:?}", other.map(|m| m.cell_to_node())),
        }
    }

    #[test]
    fn test_from_table_rejects_ids_past_capacity() {
        let mesh = unit_square();
        let mut nodes = mesh.nodes().to_vec();
        nodes.resize(70_000, Point2::origin());
        assert_eq!(
            HalfEdgeMesh::<u16>::from_table(nodes, &mesh.to_table(), 1).map(|m| m.num_nodes()),
            Err(MeshError::out_of_range("node", 69_999, 65_535))
        );
    }
}
