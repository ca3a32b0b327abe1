//! Mesh construction utilities.
//!
//! Half-edge meshes are built from a conventional [`PolygonMesh`] by direct
//! index arithmetic: every link of the new table is read off the polygon
//! mesh's own cell/edge adjacency, so no hashing or searching is needed once
//! the polygon mesh exists.

use nalgebra::Point2;

use super::halfedge::{HalfEdge, HalfEdgeMesh};
use super::index::{ensure_capacity, CellId, HalfEdgeId, MeshIndex, NodeId};
use super::polygon::PolygonMesh;
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from a conventional polygon mesh.
///
/// Half-edge `e` (for `e < NE`) is edge `e` as stored, bound to its first cell;
/// half-edge `e + NE` is its mirror, bound to the second cell or to the
/// exterior for boundary edges. The first `NE` half-edges are main.
///
/// # Errors
///
/// Returns [`MeshError::IndexOutOfRange`] if the nodes, half-edges or cells
/// do not fit in `I`.
pub fn build_from_polygon_mesh<I: MeshIndex>(pmesh: &PolygonMesh) -> Result<HalfEdgeMesh<I>> {
    let ne = pmesh.num_edges();
    let nc = pmesh.num_cells();
    ensure_capacity::<I>("node", pmesh.num_nodes())?;
    ensure_capacity::<I>("halfedge", 2 * ne)?;
    ensure_capacity::<I>("cell", nc)?;
    let edges = pmesh.edges();
    let location = pmesh.cell_location();
    let cell_to_edge = pmesh.cell_to_edge();
    let sign = pmesh.cell_to_edge_sign();
    let (bd_next, bd_prev) = pmesh.boundary_edge_to_edge()?;

    // Half-edge id of the edge at a cell slot, as seen from that cell.
    let slot_halfedge = |idx: usize| -> HalfEdgeId<I> {
        let e = cell_to_edge[idx];
        HalfEdgeId::new(if sign[idx] { e } else { e + ne })
    };
    // Neighbouring slot of `local` in cell `c`, one step forward or back.
    let rotate = |c: usize, local: usize, forward: bool| -> usize {
        let nv = pmesh.num_vertices_of_cell(c);
        let l = if forward { (local + 1) % nv } else { (local + nv - 1) % nv };
        location[c] + l
    };

    let mut halfedges = vec![HalfEdge::<I>::new(); 2 * ne];

    for (e, &[c0, c1, l0, l1]) in pmesh.edge_to_cell().iter().enumerate() {
        let [a, b] = edges[e];

        halfedges[e] = HalfEdge {
            to: NodeId::new(b),
            cell: CellId::new(c0),
            next: slot_halfedge(rotate(c0, l0, true)),
            prev: slot_halfedge(rotate(c0, l0, false)),
            twin: HalfEdgeId::new(e + ne),
            is_main: true,
        };

        let mirror = &mut halfedges[e + ne];
        mirror.to = NodeId::new(a);
        mirror.twin = HalfEdgeId::new(e);
        mirror.is_main = false;
        if c0 != c1 {
            mirror.cell = CellId::new(c1);
            mirror.next = slot_halfedge(rotate(c1, l1, true));
            mirror.prev = slot_halfedge(rotate(c1, l1, false));
        } else {
            let (Some(n), Some(p)) = (bd_next[e], bd_prev[e]) else {
                return Err(MeshError::InvalidTopology {
                    details: format!("boundary edge {} is not on a boundary loop", e),
                });
            };
            mirror.cell = CellId::exterior();
            mirror.next = HalfEdgeId::new(ne + n);
            mirror.prev = HalfEdgeId::new(ne + p);
        }
    }

    let mesh = HalfEdgeMesh::from_parts_unchecked(pmesh.nodes().to_vec(), halfedges, nc);
    log::debug!(
        "built half-edge mesh: {} nodes, {} edges, {} cells",
        mesh.num_nodes(),
        mesh.num_edges(),
        mesh.num_cells()
    );
    Ok(mesh)
}

/// Build a half-edge mesh from nodes and counter-clockwise polygon cells.
///
/// # Arguments
/// * `nodes` - Node positions
/// * `cells` - Cells as lists of node indices, counter-clockwise
///
/// # Example
/// ```
/// use heron::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point2;
///
/// let nodes = vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(1.0, 1.0),
///     Point2::new(0.0, 1.0),
///     Point2::new(2.0, 0.5),
/// ];
/// let cells = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&nodes, &cells).unwrap();
/// assert_eq!(mesh.num_nodes(), 5);
/// assert_eq!(mesh.num_cells(), 2);
/// assert_eq!(mesh.num_edges(), 6);
/// ```
pub fn build_from_polygons<I: MeshIndex, C: AsRef<[usize]>>(
    nodes: &[Point2<f64>],
    cells: &[C],
) -> Result<HalfEdgeMesh<I>> {
    let pmesh = PolygonMesh::from_polygons(nodes.to_vec(), cells)?;
    build_from_polygon_mesh(&pmesh)
}

/// Convert a half-edge mesh back to nodes and cell-vertex lists.
///
/// Each cell starts at the target of its representative half-edge, so the
/// vertex lists match the input of [`build_from_polygons`] up to rotation.
pub fn to_polygons<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point2<f64>>, Vec<Vec<usize>>) {
    let nodes = mesh.nodes().to_vec();
    let cells = mesh.cell_to_node().to_vecs();
    (nodes, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::tests::{
        grid_polygons, is_rotation, square_and_triangle, two_squares, unit_square,
    };

    #[test]
    fn test_single_square() {
        let mesh = unit_square();

        assert_eq!(mesh.num_nodes(), 4);
        assert_eq!(mesh.num_cells(), 1);
        // 4 interior half-edges + 4 exterior half-edges
        assert_eq!(mesh.num_halfedges(), 8);
        assert!(mesh.is_valid());

        for e in 0..4 {
            let he = mesh.halfedge(HalfEdgeId::new(e));
            assert!(he.is_main);
            assert_eq!(he.cell, CellId::new(0));
            assert_eq!(he.twin, HalfEdgeId::new(e + 4));
            assert!(mesh.halfedge(he.twin).is_exterior());
        }
    }

    #[test]
    fn test_exterior_links() {
        let mesh = unit_square();
        // Mirror of edge 0 (0 -> 1) runs 1 -> 0 and continues along 0 -> 3.
        let he = HalfEdgeId::<u32>::new(4);
        assert_eq!(mesh.to(he), NodeId::new(0));
        assert_eq!(mesh.to(mesh.next(he)), NodeId::new(3));
        assert_eq!(mesh.to(mesh.prev(he)), NodeId::new(1));
    }

    #[test]
    fn test_two_squares() {
        let mesh = two_squares();
        assert_eq!(mesh.num_nodes(), 6);
        assert_eq!(mesh.num_cells(), 2);
        // 8 interior half-edges + 6 exterior half-edges
        assert_eq!(mesh.num_halfedges(), 14);
        assert!(mesh.is_valid());

        // Shared edge 1: main half-edge in cell 0, mirror in cell 1.
        let shared = HalfEdgeId::<u32>::new(1);
        assert_eq!(mesh.cell_of(shared), CellId::new(0));
        assert_eq!(mesh.cell_of(mesh.twin(shared)), CellId::new(1));
    }

    #[test]
    fn test_roundtrip() {
        let nodes = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
            Point2::new(2.0, 0.5),
        ];
        let cells = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
        let mesh: HalfEdgeMesh = build_from_polygons(&nodes, &cells).unwrap();

        let (out_nodes, out_cells) = to_polygons(&mesh);
        assert_eq!(out_nodes, nodes);
        assert_eq!(out_cells.len(), cells.len());
        for (a, b) in cells.iter().zip(&out_cells) {
            assert!(is_rotation(a, b), "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_mixed_cells_valid() {
        let mesh = square_and_triangle();
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_vertices_of_cells(), vec![4, 3]);
    }

    #[test]
    fn test_small_index_type() {
        let nodes = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        let mesh: HalfEdgeMesh<u16> = build_from_polygons(&nodes, &[[0, 1, 2]]).unwrap();
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_halfedges(), 6);
    }

    #[test]
    fn test_too_many_halfedges_for_u16() {
        // 2 · 33024 half-edges; u16 ids stop at 65534.
        let (nodes, cells) = grid_polygons(128);
        let result: Result<HalfEdgeMesh<u16>> = build_from_polygons(&nodes, &cells);
        assert_eq!(
            result.map(|m| m.num_halfedges()),
            Err(MeshError::out_of_range("halfedge", 66047, 65535))
        );

        let fits: HalfEdgeMesh<u32> = build_from_polygons(&nodes, &cells).unwrap();
        assert_eq!(fits.num_halfedges(), 66048);
    }

    #[test]
    fn test_invalid_input() {
        let nodes = vec![Point2::new(0.0, 0.0)];
        let result: Result<HalfEdgeMesh> = build_from_polygons(&nodes, &[[0, 1, 2]]);
        assert!(matches!(result, Err(MeshError::InvalidVertexIndex { .. })));
    }
}
