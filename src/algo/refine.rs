//! Adaptive refinement of marked cells.
//!
//! Refinement runs in two phases over the half-edge table:
//!
//! 1. **Edge split**: every edge touching a marked cell gets a midpoint node.
//!    Both sides of an edge are always split together, so neighbouring
//!    unmarked cells simply gain a vertex and the mesh stays conforming.
//! 2. **Cell split**: every marked cell gets a node at its barycenter and is
//!    cut into wedges by spokes running from its boundary to that node.
//!
//! Cell ids are then compacted. Node ids only grow: midpoints come first, in
//! edge order, followed by one center per marked cell, in cell order.
//!
//! # Example
//!
//! ```
//! use heron::prelude::*;
//! use heron::algo::refine::{refine_cells, RefineOptions};
//! use nalgebra::Point2;
//!
//! let nodes = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! let mut mesh: HalfEdgeMesh = build_from_polygons(&nodes, &[[0, 1, 2, 3]]).unwrap();
//!
//! refine_cells(&mut mesh, &[0], &RefineOptions::default()).unwrap();
//! assert_eq!(mesh.num_cells(), 8);
//! assert!((mesh.total_area() - 1.0).abs() < 1e-12);
//! ```

use nalgebra::Point2;

use crate::error::{MeshError, Result};
use crate::mesh::{
    ensure_capacity, CellId, EntityKind, HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, NodeId,
};

/// How a marked cell is cut around its barycenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellSplit {
    /// A spoke at every vertex of the split boundary. A cell with `V`
    /// vertices becomes `2V` triangles.
    #[default]
    Fan,
    /// Spokes only at the new edge midpoints. A cell with `V` vertices
    /// becomes `V` quadrilaterals.
    Quad,
}

/// Options for refinement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefineOptions {
    /// Only split edges; marked cells keep their ids and gain vertices.
    pub edge_only: bool,

    /// Split pattern for marked cells. Ignored when `edge_only` is set.
    pub cell_split: CellSplit,
}

impl RefineOptions {
    /// Create options that split both edges and cells with the fan pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options that only split edges.
    pub fn edge_only() -> Self {
        Self {
            edge_only: true,
            ..Self::default()
        }
    }

    /// Set whether only edges are split.
    pub fn with_edge_only(mut self, edge_only: bool) -> Self {
        self.edge_only = edge_only;
        self
    }

    /// Set the cell split pattern.
    pub fn with_cell_split(mut self, cell_split: CellSplit) -> Self {
        self.cell_split = cell_split;
        self
    }
}

/// Mark the half-edges that refinement will split.
///
/// A half-edge is marked iff its cell or its twin's cell is marked, so both
/// sides of an edge always agree.
pub fn mark_halfedges<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, is_marked_cell: &[bool]) -> Result<Vec<bool>> {
    MeshError::ensure_len("is_marked_cell", mesh.num_cells(), is_marked_cell.len())?;

    let marked = |c: CellId<I>| !c.is_exterior() && is_marked_cell[c.index()];
    Ok(mesh
        .halfedge_table()
        .iter()
        .map(|he| marked(he.cell) || marked(mesh.cell_of(he.twin)))
        .collect())
}

/// Refine the marked cells of a mesh in place.
///
/// # Arguments
///
/// * `mesh` - The mesh to refine (replaced as a whole on success)
/// * `is_marked_cell` - One flag per cell
/// * `options` - Refinement parameters
///
/// # Errors
///
/// Returns [`MeshError::ShapeMismatch`] if `is_marked_cell` does not have one
/// entry per cell, and [`MeshError::IndexOutOfRange`] if the refined mesh
/// would need more ids than `I` can hold. The mesh is left untouched on error.
pub fn refine<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    is_marked_cell: &[bool],
    options: &RefineOptions,
) -> Result<()> {
    let marked_halfedges = mark_halfedges(mesh, is_marked_cell)?;
    ensure_refined_capacity(mesh, is_marked_cell, &marked_halfedges, options)?;

    let nn = mesh.num_nodes();
    let nc = mesh.num_cells();
    let ne = mesh.num_edges();

    // Barycenters and traversal seeds are taken from the unsplit cells.
    let (seeds, centers): (Vec<HalfEdgeId<I>>, Vec<Point2<f64>>) = if options.edge_only {
        (Vec::new(), Vec::new())
    } else {
        let barycenter = mesh.entity_barycenter(EntityKind::Cell);
        mesh.cell_ids()
            .filter(|c| is_marked_cell[c.index()])
            .map(|c| (mesh.cell_halfedge(c), barycenter[c.index()]))
            .unzip()
    };

    let (mut nodes, mut halfedges) = split_edges(mesh, &marked_halfedges);
    log::trace!(
        "edge split: {} midpoints, {} half-edges",
        nodes.len() - nn,
        halfedges.len()
    );

    let mut num_cells = nc;
    if !options.edge_only {
        num_cells = split_cells(
            &mut nodes,
            &mut halfedges,
            &seeds,
            &centers,
            nn,
            nc,
            options.cell_split,
        );
        log::trace!(
            "cell split: {} centers, {} cell ids before compaction",
            centers.len(),
            num_cells
        );
    }
    let num_cells = compact_cells(&mut halfedges, num_cells);

    mesh.reinit(nodes, halfedges, num_cells);
    log::debug!(
        "refined {} cells: {} -> {} nodes, {} -> {} edges, {} -> {} cells",
        is_marked_cell.iter().filter(|&&m| m).count(),
        nn,
        mesh.num_nodes(),
        ne,
        mesh.num_edges(),
        nc,
        mesh.num_cells()
    );
    Ok(())
}

/// Refine the listed cells.
///
/// # Errors
///
/// Returns [`MeshError::IndexOutOfRange`] if a cell id is not in the mesh.
pub fn refine_cells<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    cells: &[usize],
    options: &RefineOptions,
) -> Result<()> {
    let nc = mesh.num_cells();
    let mut is_marked_cell = vec![false; nc];
    for &c in cells {
        if c >= nc {
            return Err(MeshError::out_of_range("cell", c, nc));
        }
        is_marked_cell[c] = true;
    }
    refine(mesh, &is_marked_cell, options)
}

/// Refine every cell, `times` times over, with the default options.
pub fn refine_uniform<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, times: usize) -> Result<()> {
    let options = RefineOptions::default();
    for _ in 0..times {
        let is_marked_cell = vec![true; mesh.num_cells()];
        refine(mesh, &is_marked_cell, &options)?;
    }
    Ok(())
}

/// Check that every id the refined mesh hands out fits in `I`.
///
/// Wedges are numbered from `NC` before compaction, so the cell bound covers
/// the retired ids of the split cells as well.
fn ensure_refined_capacity<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    is_marked_cell: &[bool],
    marked_halfedges: &[bool],
    options: &RefineOptions,
) -> Result<()> {
    let split = marked_halfedges.iter().filter(|&&m| m).count();
    let (centers, spokes) = if options.edge_only {
        (0, 0)
    } else {
        let per_vertex = match options.cell_split {
            CellSplit::Fan => 2,
            CellSplit::Quad => 1,
        };
        mesh.num_vertices_of_cells()
            .iter()
            .zip(is_marked_cell)
            .filter(|(_, &m)| m)
            .fold((0, 0), |(n, k), (&nv, _)| (n + 1, k + per_vertex * nv))
    };

    ensure_capacity::<I>("node", mesh.num_nodes() + split / 2 + centers)?;
    ensure_capacity::<I>("halfedge", mesh.num_halfedges() + split + 2 * spokes)?;
    ensure_capacity::<I>("cell", mesh.num_cells() + spokes)
}

/// Split every marked half-edge at its midpoint.
///
/// A marked half-edge `h` from `a` to `b` keeps its id and becomes `m -> b`;
/// the new half-edge `a -> m` is appended with id `NHE + rank(h)`.
fn split_edges<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    marked: &[bool],
) -> (Vec<Point2<f64>>, Vec<HalfEdge<I>>) {
    let old = mesh.halfedge_table();
    let nhe = old.len();

    // Step 1: Ids of the new first halves
    let mut first_half = vec![HalfEdgeId::<I>::invalid(); nhe];
    let mut count = 0;
    for (i, &m) in marked.iter().enumerate() {
        if m {
            first_half[i] = HalfEdgeId::new(nhe + count);
            count += 1;
        }
    }

    // Step 2: One midpoint per marked edge, shared by both half-edges
    let mut nodes = mesh.nodes().to_vec();
    let mut midpoint = vec![NodeId::<I>::invalid(); nhe];
    for (i, he) in old.iter().enumerate() {
        if he.is_main && marked[i] {
            let a = nodes[old[he.twin.index()].to.index()];
            let b = nodes[he.to.index()];
            let m = NodeId::new(nodes.len());
            nodes.push(nalgebra::center(&a, &b));
            midpoint[i] = m;
            midpoint[he.twin.index()] = m;
        }
    }

    // Step 3: Insert the first halves and rewire the twins
    let mut halfedges = old.to_vec();
    halfedges.resize(nhe + count, HalfEdge::new());
    for (i, he) in old.iter().enumerate() {
        if !marked[i] {
            continue;
        }
        let first = first_half[i];
        halfedges[first.index()] = HalfEdge {
            to: midpoint[i],
            cell: he.cell,
            next: HalfEdgeId::new(i),
            prev: he.prev,
            twin: he.twin,
            is_main: he.is_main,
        };
        halfedges[i].prev = first;
        halfedges[i].twin = first_half[he.twin.index()];
    }

    // Step 4: `next` is the inverse of `prev`
    for i in 0..halfedges.len() {
        let p = halfedges[i].prev.index();
        halfedges[p].next = HalfEdgeId::new(i);
    }

    (nodes, halfedges)
}

/// Cut every marked cell into wedges around its barycenter.
///
/// Wedges get fresh cell ids starting at `nc`. Returns the number of cell ids
/// in use, including the retired ids of the split cells.
fn split_cells<I: MeshIndex>(
    nodes: &mut Vec<Point2<f64>>,
    halfedges: &mut Vec<HalfEdge<I>>,
    seeds: &[HalfEdgeId<I>],
    centers: &[Point2<f64>],
    nn: usize,
    nc: usize,
    pattern: CellSplit,
) -> usize {
    let mut next_cell = nc;

    for (&seed, &center) in seeds.iter().zip(centers) {
        // Step 1: The split boundary of the cell
        let mut cycle = vec![seed];
        let mut h = halfedges[seed.index()].next;
        while h != seed {
            cycle.push(h);
            h = halfedges[h.index()].next;
        }
        let n = cycle.len();

        // Step 2: Positions whose half-edge ends at a spoke vertex
        let anchors: Vec<usize> = (0..n)
            .filter(|&p| match pattern {
                CellSplit::Fan => true,
                CellSplit::Quad => halfedges[cycle[p].index()].to.index() >= nn,
            })
            .collect();
        let k = anchors.len();
        debug_assert!(k >= 3, "marked cell with {} spoke vertices", k);

        let z = NodeId::new(nodes.len());
        nodes.push(center);

        // Spoke `a` runs from anchor `a` to the center (main) and back.
        let base = halfedges.len();
        let spoke_out = |a: usize| HalfEdgeId::<I>::new(base + 2 * a);
        let spoke_in = |a: usize| HalfEdgeId::<I>::new(base + 2 * a + 1);
        halfedges.resize(base + 2 * k, HalfEdge::new());

        // Step 3: Wedge `a` is the chain after anchor `a - 1` up to anchor `a`,
        // closed by spoke `a` outwards and spoke `a - 1` back.
        for a in 0..k {
            let before = (a + k - 1) % k;
            let cell = CellId::new(next_cell + a);
            let end = anchors[a];
            let start = (anchors[before] + 1) % n;

            let mut p = start;
            loop {
                halfedges[cycle[p].index()].cell = cell;
                if p == end {
                    break;
                }
                p = (p + 1) % n;
            }

            let first = cycle[start];
            let last = cycle[end];
            let back_to = halfedges[cycle[anchors[before]].index()].to;

            halfedges[last.index()].next = spoke_out(a);
            halfedges[first.index()].prev = spoke_in(before);
            halfedges[spoke_out(a).index()] = HalfEdge {
                to: z,
                cell,
                next: spoke_in(before),
                prev: last,
                twin: spoke_in(a),
                is_main: true,
            };
            halfedges[spoke_in(before).index()] = HalfEdge {
                to: back_to,
                cell,
                next: first,
                prev: spoke_out(a),
                twin: spoke_out(before),
                is_main: false,
            };
        }

        next_cell += k;
    }

    next_cell
}

/// Relabel the cell ids in use densely, keeping their order.
///
/// Returns the new number of cells.
fn compact_cells<I: MeshIndex>(halfedges: &mut [HalfEdge<I>], num_cells: usize) -> usize {
    let mut used = vec![false; num_cells];
    for he in halfedges.iter().filter(|he| !he.is_exterior()) {
        used[he.cell.index()] = true;
    }

    let mut relabel = vec![CellId::<I>::exterior(); num_cells];
    let mut count = 0;
    for (c, _) in used.iter().enumerate().filter(|(_, &u)| u) {
        relabel[c] = CellId::new(count);
        count += 1;
    }

    for he in halfedges.iter_mut().filter(|he| !he.is_exterior()) {
        he.cell = relabel[he.cell.index()];
    }
    count
}
