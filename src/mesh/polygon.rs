//! Conventional (face-vertex) polygon meshes.
//!
//! [`PolygonMesh`] is the representation the half-edge builder starts from:
//! node coordinates, a flattened cell-vertex list with offsets, an explicit
//! edge list, the cell→edge incidence aligned with the cell-vertex list, and
//! the edge→cell adjacency.
//!
//! # Conventions
//!
//! - Cells list their vertices counter-clockwise.
//! - Slot `i` of a cell is the edge from vertex `i` to vertex `i + 1`.
//! - `edge_to_cell[e] = [c0, c1, local0, local1]`: the edge is oriented as in
//!   `c0` at slot `local0`, and reversed in `c1` at slot `local1`. A boundary
//!   edge repeats its only cell: `c1 == c0`, `local1 == local0`.

use std::collections::HashMap;

use nalgebra::Point2;

use crate::error::{MeshError, Result};

/// A polygon mesh in conventional face-vertex form.
#[derive(Debug, Clone)]
pub struct PolygonMesh {
    nodes: Vec<Point2<f64>>,
    edges: Vec<[usize; 2]>,
    cells: Vec<usize>,
    cell_location: Vec<usize>,
    cell_to_edge: Vec<usize>,
    edge_to_cell: Vec<[usize; 4]>,
}

impl PolygonMesh {
    /// Build a polygon mesh from nodes and a flattened cell-vertex list.
    ///
    /// Edges are numbered in order of first appearance and oriented as in the
    /// first cell that lists them.
    ///
    /// # Example
    /// ```
    /// use heron::mesh::PolygonMesh;
    /// use nalgebra::Point2;
    ///
    /// let nodes = vec![
    ///     Point2::new(0.0, 0.0),
    ///     Point2::new(1.0, 0.0),
    ///     Point2::new(1.0, 1.0),
    ///     Point2::new(0.0, 1.0),
    /// ];
    /// let pmesh = PolygonMesh::new(nodes, vec![0, 1, 2, 3], vec![0, 4]).unwrap();
    /// assert_eq!(pmesh.num_edges(), 4);
    /// assert_eq!(pmesh.edges()[0], [0, 1]);
    /// ```
    pub fn new(nodes: Vec<Point2<f64>>, cells: Vec<usize>, cell_location: Vec<usize>) -> Result<Self> {
        validate_cells(nodes.len(), &cells, &cell_location)?;

        let nc = cell_location.len() - 1;
        let mut edges: Vec<[usize; 2]> = Vec::new();
        let mut edge_to_cell: Vec<[usize; 4]> = Vec::new();
        let mut cell_to_edge = vec![0usize; cells.len()];

        // Undirected edge (min, max) -> edge index
        let mut edge_map: HashMap<(usize, usize), usize> = HashMap::new();
        // Number of cells seen per edge, to detect non-manifold edges
        let mut seen: Vec<u8> = Vec::new();

        for c in 0..nc {
            let (start, end) = (cell_location[c], cell_location[c + 1]);
            let nv = end - start;
            for i in 0..nv {
                let v0 = cells[start + i];
                let v1 = cells[start + (i + 1) % nv];
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };

                match edge_map.get(&key) {
                    None => {
                        let e = edges.len();
                        edge_map.insert(key, e);
                        edges.push([v0, v1]);
                        edge_to_cell.push([c, c, i, i]);
                        seen.push(1);
                        cell_to_edge[start + i] = e;
                    }
                    Some(&e) => {
                        if seen[e] >= 2 {
                            return Err(MeshError::NonManifoldEdge { v0, v1 });
                        }
                        if edges[e] == [v0, v1] {
                            return Err(MeshError::InconsistentOrientation { v0, v1 });
                        }
                        seen[e] += 1;
                        edge_to_cell[e][1] = c;
                        edge_to_cell[e][3] = i;
                        cell_to_edge[start + i] = e;
                    }
                }
            }
        }

        let pmesh = Self {
            nodes,
            edges,
            cells,
            cell_location,
            cell_to_edge,
            edge_to_cell,
        };
        // Reject pinched boundaries up front.
        pmesh.boundary_edge_to_edge()?;
        log::trace!(
            "polygon mesh: {} nodes, {} edges, {} cells",
            pmesh.num_nodes(),
            pmesh.num_edges(),
            pmesh.num_cells()
        );
        Ok(pmesh)
    }

    /// Build a polygon mesh from nodes and nested cell-vertex lists.
    ///
    /// # Example
    /// ```
    /// use heron::mesh::PolygonMesh;
    /// use nalgebra::Point2;
    ///
    /// let nodes = vec![
    ///     Point2::new(0.0, 0.0),
    ///     Point2::new(1.0, 0.0),
    ///     Point2::new(1.0, 1.0),
    ///     Point2::new(0.0, 1.0),
    /// ];
    /// let pmesh = PolygonMesh::from_polygons(nodes, &[vec![0, 1, 2], vec![0, 2, 3]]).unwrap();
    /// assert_eq!(pmesh.num_cells(), 2);
    /// assert_eq!(pmesh.num_edges(), 5);
    /// ```
    pub fn from_polygons<C: AsRef<[usize]>>(nodes: Vec<Point2<f64>>, polygons: &[C]) -> Result<Self> {
        let mut cells = Vec::new();
        let mut cell_location = Vec::with_capacity(polygons.len() + 1);
        cell_location.push(0);
        for p in polygons {
            cells.extend_from_slice(p.as_ref());
            cell_location.push(cells.len());
        }
        Self::new(nodes, cells, cell_location)
    }

    /// Assemble a polygon mesh from precomputed arrays.
    ///
    /// Every array is checked for shape, index range and consistency with the
    /// others before it is accepted.
    pub fn from_parts(
        nodes: Vec<Point2<f64>>,
        edges: Vec<[usize; 2]>,
        cells: Vec<usize>,
        cell_location: Vec<usize>,
        cell_to_edge: Vec<usize>,
        edge_to_cell: Vec<[usize; 4]>,
    ) -> Result<Self> {
        validate_cells(nodes.len(), &cells, &cell_location)?;
        let nn = nodes.len();
        let ne = edges.len();
        let nc = cell_location.len() - 1;

        MeshError::ensure_len("cell_to_edge", cells.len(), cell_to_edge.len())?;
        MeshError::ensure_len("edge_to_cell", ne, edge_to_cell.len())?;

        for edge in &edges {
            for &v in edge {
                if v >= nn {
                    return Err(MeshError::out_of_range("node", v, nn));
                }
            }
        }
        for &e in &cell_to_edge {
            if e >= ne {
                return Err(MeshError::out_of_range("edge", e, ne));
            }
        }

        let pmesh = Self {
            nodes,
            edges,
            cells,
            cell_location,
            cell_to_edge,
            edge_to_cell,
        };

        let mismatch = |e: usize, why: &str| MeshError::InvalidTopology {
            details: format!("edge {}: {}", e, why),
        };
        let mut uses = vec![0usize; ne];
        for &e in &pmesh.cell_to_edge {
            uses[e] += 1;
        }

        for (e, &[c0, c1, l0, l1]) in pmesh.edge_to_cell.iter().enumerate() {
            for c in [c0, c1] {
                if c >= nc {
                    return Err(MeshError::out_of_range("cell", c, nc));
                }
            }
            for (c, l) in [(c0, l0), (c1, l1)] {
                if l >= pmesh.num_vertices_of_cell(c) {
                    return Err(MeshError::out_of_range("local edge", l, pmesh.num_vertices_of_cell(c)));
                }
            }

            let [a, b] = pmesh.edges[e];
            let slot0 = pmesh.cell_location[c0] + l0;
            if pmesh.cell_to_edge[slot0] != e || pmesh.slot_nodes(c0, l0) != (a, b) {
                return Err(mismatch(e, "not oriented as in its first cell"));
            }
            if c0 == c1 {
                if l0 != l1 {
                    return Err(mismatch(e, "boundary edge has two different slots"));
                }
                if uses[e] != 1 {
                    return Err(mismatch(e, "boundary edge listed by more than one cell slot"));
                }
            } else {
                let slot1 = pmesh.cell_location[c1] + l1;
                if pmesh.cell_to_edge[slot1] != e || pmesh.slot_nodes(c1, l1) != (b, a) {
                    return Err(mismatch(e, "not reversed in its second cell"));
                }
                if uses[e] != 2 {
                    return Err(mismatch(e, "interior edge not listed by exactly two cell slots"));
                }
            }
        }

        pmesh.boundary_edge_to_edge()?;
        Ok(pmesh)
    }

    // ==================== Accessors ====================

    /// Get the number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of cells.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cell_location.len() - 1
    }

    /// Get the node coordinates.
    #[inline]
    pub fn nodes(&self) -> &[Point2<f64>] {
        &self.nodes
    }

    /// Get the edges as `[from, to]` node pairs.
    #[inline]
    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    /// Get the flattened cell-vertex list.
    #[inline]
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    /// Get the cell offsets into [`PolygonMesh::cells`].
    #[inline]
    pub fn cell_location(&self) -> &[usize] {
        &self.cell_location
    }

    /// Get the vertices of cell `c`.
    #[inline]
    pub fn cell(&self, c: usize) -> &[usize] {
        &self.cells[self.cell_location[c]..self.cell_location[c + 1]]
    }

    /// Get the number of vertices of cell `c`.
    #[inline]
    pub fn num_vertices_of_cell(&self, c: usize) -> usize {
        self.cell_location[c + 1] - self.cell_location[c]
    }

    /// Get the cell→edge incidence, aligned with [`PolygonMesh::cells`].
    #[inline]
    pub fn cell_to_edge(&self) -> &[usize] {
        &self.cell_to_edge
    }

    /// Get the edge→cell adjacency `[c0, c1, local0, local1]`.
    #[inline]
    pub fn edge_to_cell(&self) -> &[[usize; 4]] {
        &self.edge_to_cell
    }

    /// Check whether edge `e` lies on the boundary.
    #[inline]
    pub fn is_boundary_edge(&self, e: usize) -> bool {
        self.edge_to_cell[e][0] == self.edge_to_cell[e][1]
    }

    fn slot_nodes(&self, c: usize, local: usize) -> (usize, usize) {
        let cell = self.cell(c);
        (cell[local], cell[(local + 1) % cell.len()])
    }

    // ==================== Derived Relations ====================

    /// Whether the edge at each cell slot is oriented along the cell.
    ///
    /// Aligned with [`PolygonMesh::cells`].
    pub fn cell_to_edge_sign(&self) -> Vec<bool> {
        self.cells
            .iter()
            .zip(&self.cell_to_edge)
            .map(|(&v, &e)| self.edges[e][0] == v)
            .collect()
    }

    /// Link the boundary edges into exterior cycles.
    ///
    /// Returns `(next, prev)` indexed by edge: for a boundary edge `a → b`
    /// (oriented with its cell), the exterior half-edge runs `b → a`; it is
    /// followed by the exterior half-edge of the boundary edge ending at `a`
    /// and preceded by that of the boundary edge starting at `b`. Interior
    /// edges map to `None`.
    pub fn boundary_edge_to_edge(&self) -> Result<(Vec<Option<usize>>, Vec<Option<usize>>)> {
        let ne = self.num_edges();
        let mut ending_at: HashMap<usize, usize> = HashMap::new();
        let mut starting_at: HashMap<usize, usize> = HashMap::new();

        for e in (0..ne).filter(|&e| self.is_boundary_edge(e)) {
            let [a, b] = self.edges[e];
            if starting_at.insert(a, e).is_some() {
                return Err(MeshError::NonManifoldVertex { node: a });
            }
            if ending_at.insert(b, e).is_some() {
                return Err(MeshError::NonManifoldVertex { node: b });
            }
        }

        let mut next = vec![None; ne];
        let mut prev = vec![None; ne];
        for e in (0..ne).filter(|&e| self.is_boundary_edge(e)) {
            let [a, b] = self.edges[e];
            let n = ending_at
                .get(&a)
                .copied()
                .ok_or(MeshError::NonManifoldVertex { node: a })?;
            let p = starting_at
                .get(&b)
                .copied()
                .ok_or(MeshError::NonManifoldVertex { node: b })?;
            next[e] = Some(n);
            prev[e] = Some(p);
        }
        Ok((next, prev))
    }

    /// Total signed area by the shoelace formula over every cell.
    pub fn area(&self) -> f64 {
        (0..self.num_cells())
            .map(|c| {
                let cell = self.cell(c);
                let n = cell.len();
                let twice: f64 = (0..n)
                    .map(|i| {
                        let p = self.nodes[cell[i]];
                        let q = self.nodes[cell[(i + 1) % n]];
                        p.x * q.y - q.x * p.y
                    })
                    .sum();
                0.5 * twice
            })
            .sum()
    }
}

/// Check offsets, vertex ranges and per-cell degeneracy.
fn validate_cells(nn: usize, cells: &[usize], cell_location: &[usize]) -> Result<()> {
    if cell_location.len() < 2 {
        return Err(MeshError::EmptyMesh);
    }
    if cell_location[0] != 0 {
        return Err(MeshError::InvalidTopology {
            details: format!("cell_location must start at 0, found {}", cell_location[0]),
        });
    }
    let last = cell_location[cell_location.len() - 1];
    MeshError::ensure_len("cells", last, cells.len())?;

    for (c, w) in cell_location.windows(2).enumerate() {
        if w[1] < w[0] || w[1] - w[0] < 3 {
            return Err(MeshError::DegenerateCell { cell: c });
        }
        let cell = &cells[w[0]..w[1]];
        for (i, &v) in cell.iter().enumerate() {
            if v >= nn {
                return Err(MeshError::InvalidVertexIndex { cell: c, vertex: v });
            }
            if cell[..i].contains(&v) {
                return Err(MeshError::DegenerateCell { cell: c });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_square_nodes() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 1.0),
        ]
    }

    fn two_squares() -> PolygonMesh {
        PolygonMesh::from_polygons(two_square_nodes(), &[[0, 1, 4, 3], [1, 2, 5, 4]]).unwrap()
    }

    #[test]
    fn test_edges_and_adjacency() {
        let pmesh = two_squares();
        assert_eq!(pmesh.num_nodes(), 6);
        assert_eq!(pmesh.num_cells(), 2);
        assert_eq!(pmesh.num_edges(), 7);

        // Shared edge 1 -> 4 is edge 1, reversed in cell 1 at slot 3.
        assert_eq!(pmesh.edges()[1], [1, 4]);
        assert_eq!(pmesh.edge_to_cell()[1], [0, 1, 1, 3]);
        assert!(!pmesh.is_boundary_edge(1));
        assert_eq!(pmesh.cell_to_edge(), &[0, 1, 2, 3, 4, 5, 6, 1]);

        let sign = pmesh.cell_to_edge_sign();
        assert!(sign[..7].iter().all(|&s| s));
        assert!(!sign[7]);

        let boundary = (0..7).filter(|&e| pmesh.is_boundary_edge(e)).count();
        assert_eq!(boundary, 6);
    }

    #[test]
    fn test_boundary_cycle() {
        let pmesh = two_squares();
        let (next, prev) = pmesh.boundary_edge_to_edge().unwrap();
        assert_eq!(next[1], None);

        // Edge 0 is 0 -> 1; the boundary edge ending at 0 is 3 -> 0 (edge 3).
        assert_eq!(next[0], Some(3));
        // The boundary edge starting at 1 is 1 -> 2 (edge 4).
        assert_eq!(prev[0], Some(4));

        for e in (0..7).filter(|&e| pmesh.is_boundary_edge(e)) {
            let n = next[e].unwrap();
            assert_eq!(prev[n], Some(e));
        }
    }

    #[test]
    fn test_area() {
        assert!((two_squares().area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_vertex_index() {
        let result = PolygonMesh::from_polygons(two_square_nodes(), &[[0, 1, 9]]);
        assert_eq!(result.unwrap_err(), MeshError::InvalidVertexIndex { cell: 0, vertex: 9 });
    }

    #[test]
    fn test_degenerate_cell() {
        let result = PolygonMesh::from_polygons(two_square_nodes(), &[vec![0, 1, 0, 3]]);
        assert_eq!(result.unwrap_err(), MeshError::DegenerateCell { cell: 0 });

        let result = PolygonMesh::from_polygons(two_square_nodes(), &[vec![0, 1]]);
        assert_eq!(result.unwrap_err(), MeshError::DegenerateCell { cell: 0 });
    }

    #[test]
    fn test_empty() {
        let result = PolygonMesh::new(two_square_nodes(), vec![], vec![0]);
        assert_eq!(result.unwrap_err(), MeshError::EmptyMesh);
    }

    #[test]
    fn test_bad_offsets() {
        let result = PolygonMesh::new(two_square_nodes(), vec![0, 1, 4, 3], vec![0, 5]);
        assert!(matches!(result, Err(MeshError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_inconsistent_orientation() {
        // Second square listed clockwise.
        let result = PolygonMesh::from_polygons(two_square_nodes(), &[[0, 1, 4, 3], [1, 4, 5, 2]]);
        assert_eq!(result.unwrap_err(), MeshError::InconsistentOrientation { v0: 1, v1: 4 });
    }

    #[test]
    fn test_non_manifold_edge() {
        let mut nodes = two_square_nodes();
        nodes.push(Point2::new(1.0, -1.0));
        nodes.push(Point2::new(1.5, 0.5));
        // Three triangles on edge 0-1.
        let result = PolygonMesh::from_polygons(nodes, &[[0, 1, 4], [1, 0, 6], [0, 1, 7]]);
        assert!(matches!(
            result,
            Err(MeshError::NonManifoldEdge { .. }) | Err(MeshError::InconsistentOrientation { .. })
        ));
    }

    #[test]
    fn test_pinched_boundary() {
        // Two triangles touching only at node 0.
        let nodes = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(-1.0, 0.0),
            Point2::new(-1.0, -1.0),
        ];
        let result = PolygonMesh::from_polygons(nodes, &[[0, 1, 2], [0, 3, 4]]);
        assert!(matches!(result, Err(MeshError::NonManifoldVertex { node: 0 })));
    }

    #[test]
    fn test_from_parts_roundtrip() {
        let p = two_squares();
        let copy = PolygonMesh::from_parts(
            p.nodes().to_vec(),
            p.edges().to_vec(),
            p.cells().to_vec(),
            p.cell_location().to_vec(),
            p.cell_to_edge().to_vec(),
            p.edge_to_cell().to_vec(),
        )
        .unwrap();
        assert_eq!(copy.edges(), p.edges());
    }

    #[test]
    fn test_from_parts_rejects_mismatch() {
        let p = two_squares();

        let short = PolygonMesh::from_parts(
            p.nodes().to_vec(),
            p.edges().to_vec(),
            p.cells().to_vec(),
            p.cell_location().to_vec(),
            p.cell_to_edge()[..7].to_vec(),
            p.edge_to_cell().to_vec(),
        );
        assert_eq!(short.unwrap_err(), MeshError::shape("cell_to_edge", 8, 7));

        let mut flipped = p.edges().to_vec();
        flipped[0] = [1, 0];
        let result = PolygonMesh::from_parts(
            p.nodes().to_vec(),
            flipped,
            p.cells().to_vec(),
            p.cell_location().to_vec(),
            p.cell_to_edge().to_vec(),
            p.edge_to_cell().to_vec(),
        );
        assert!(matches!(result, Err(MeshError::InvalidTopology { .. })));

        let mut e2c = p.edge_to_cell().to_vec();
        e2c[2][0] = 5;
        let result = PolygonMesh::from_parts(
            p.nodes().to_vec(),
            p.edges().to_vec(),
            p.cells().to_vec(),
            p.cell_location().to_vec(),
            p.cell_to_edge().to_vec(),
            e2c,
        );
        assert_eq!(result.unwrap_err(), MeshError::out_of_range("cell", 5, 2));
    }
}
