//! Half-edge table validation.
//!
//! Checks every structural invariant of the table and collects the
//! violations into a report instead of stopping at the first one.

use thiserror::Error;

use super::halfedge::HalfEdgeMesh;
use super::index::MeshIndex;
use crate::error::{MeshError, Result};

/// A single invariant violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A link points outside the table.
    #[error("half-edge {halfedge}: {field} = {value} out of range")]
    LinkOutOfRange {
        /// The offending half-edge.
        halfedge: usize,
        /// Which field.
        field: &'static str,
        /// The stored value.
        value: usize,
    },

    /// `twin(h) == h`.
    #[error("half-edge {halfedge} is its own twin")]
    SelfTwin {
        /// The offending half-edge.
        halfedge: usize,
    },

    /// `twin(twin(h)) != h`.
    #[error("twin of half-edge {halfedge} does not point back")]
    TwinMismatch {
        /// The offending half-edge.
        halfedge: usize,
    },

    /// `next(prev(h)) != h` or `prev(next(h)) != h`.
    #[error("next/prev links of half-edge {halfedge} are not inverse")]
    NextPrevMismatch {
        /// The offending half-edge.
        halfedge: usize,
    },

    /// Both or neither half-edge of an edge are main.
    #[error("edge of half-edge {halfedge} does not have exactly one main half-edge")]
    MainFlag {
        /// The offending half-edge.
        halfedge: usize,
    },

    /// `next(h)` bounds a different cell.
    #[error("half-edge {halfedge} and its successor bound different cells")]
    CellMismatch {
        /// The offending half-edge.
        halfedge: usize,
    },

    /// `to(twin(h)) != to(prev(h))`.
    #[error("origin of half-edge {halfedge} is inconsistent")]
    OriginMismatch {
        /// The offending half-edge.
        halfedge: usize,
    },

    /// Both half-edges of an edge bound the exterior.
    #[error("edge of half-edge {halfedge} has no real cell")]
    DanglingEdge {
        /// The offending half-edge.
        halfedge: usize,
    },

    /// A cell has no representative half-edge.
    #[error("cell {cell} has no half-edges")]
    EmptyCell {
        /// The offending cell.
        cell: usize,
    },

    /// Walking a cell's `next` links does not return to the start.
    #[error("cell {cell} is not a closed cycle")]
    OpenLoop {
        /// The offending cell.
        cell: usize,
    },

    /// Half-edges labelled with a cell lie outside the cycle of that cell.
    #[error("cell {cell} labels {labelled} half-edges but its cycle has {count}")]
    DetachedHalfEdges {
        /// The offending cell.
        cell: usize,
        /// Length of its cycle.
        count: usize,
        /// Number of half-edges carrying its id.
        labelled: usize,
    },

    /// A cell's cycle has fewer than three half-edges.
    #[error("cell {cell} has only {count} half-edges")]
    ShortCycle {
        /// The offending cell.
        cell: usize,
        /// Length of its cycle.
        count: usize,
    },
}

/// Outcome of [`HalfEdgeMesh::validate`].
#[derive(Debug, Default, Clone)]
pub struct ValidationReport {
    /// Every violation found.
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// Whether no violation was found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Convert a failed report into [`MeshError::InvalidTopology`].
    pub fn check(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        let mut details = self
            .errors
            .iter()
            .take(5)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        if self.errors.len() > 5 {
            details.push_str(&format!("; and {} more", self.errors.len() - 5));
        }
        Err(MeshError::InvalidTopology { details })
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Check all structural invariants of the table.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        // Everything below follows links, so bail out if any is dangling.
        self.validate_ranges(&mut report);
        if !report.is_valid() {
            return report;
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            self.validate_halfedge(i, he.twin.index(), &mut report);
        }
        let labelled = self.num_vertices_of_cells();
        for (c, &n) in labelled.iter().enumerate() {
            self.validate_cell(c, n, &mut report);
        }

        report
    }

    /// Quick check that all invariants hold.
    pub fn is_valid(&self) -> bool {
        self.validate().is_valid()
    }

    fn validate_ranges(&self, report: &mut ValidationReport) {
        let nhe = self.halfedges.len();
        let nn = self.nodes.len();
        if nhe % 2 != 0 {
            report.add_error(ValidationError::LinkOutOfRange {
                halfedge: nhe,
                field: "count",
                value: nhe,
            });
        }
        for (i, he) in self.halfedges.iter().enumerate() {
            let links = [
                ("to", he.to.index(), he.to.is_valid() && he.to.index() < nn),
                ("next", he.next.index(), he.next.is_valid() && he.next.index() < nhe),
                ("prev", he.prev.index(), he.prev.is_valid() && he.prev.index() < nhe),
                ("twin", he.twin.index(), he.twin.is_valid() && he.twin.index() < nhe),
                (
                    "cell",
                    he.cell.index(),
                    he.cell.is_exterior() || he.cell.index() < self.num_cells,
                ),
            ];
            for (field, value, ok) in links {
                if !ok {
                    report.add_error(ValidationError::LinkOutOfRange {
                        halfedge: i,
                        field,
                        value,
                    });
                }
            }
        }
        if self.cell2hedge.len() != self.num_cells {
            report.add_error(ValidationError::LinkOutOfRange {
                halfedge: self.cell2hedge.len(),
                field: "cell index",
                value: self.num_cells,
            });
        }
    }

    fn validate_halfedge(&self, i: usize, twin: usize, report: &mut ValidationReport) {
        let he = &self.halfedges[i];
        let tw = &self.halfedges[twin];

        if twin == i {
            report.add_error(ValidationError::SelfTwin { halfedge: i });
        } else if tw.twin.index() != i {
            report.add_error(ValidationError::TwinMismatch { halfedge: i });
        } else {
            if he.is_main == tw.is_main {
                report.add_error(ValidationError::MainFlag { halfedge: i });
            }
            if he.is_exterior() && tw.is_exterior() {
                report.add_error(ValidationError::DanglingEdge { halfedge: i });
            }
        }

        let next = &self.halfedges[he.next.index()];
        let prev = &self.halfedges[he.prev.index()];
        if next.prev.index() != i || prev.next.index() != i {
            report.add_error(ValidationError::NextPrevMismatch { halfedge: i });
        }
        if next.cell != he.cell {
            report.add_error(ValidationError::CellMismatch { halfedge: i });
        }
        if tw.to != prev.to {
            report.add_error(ValidationError::OriginMismatch { halfedge: i });
        }
    }

    fn validate_cell(&self, c: usize, labelled: usize, report: &mut ValidationReport) {
        let start = self.cell2hedge[c];
        if !start.is_valid() {
            report.add_error(ValidationError::EmptyCell { cell: c });
            return;
        }

        // A cycle can never be longer than the table.
        let max_count = self.halfedges.len();
        let mut current = start;
        let mut count = 0;
        loop {
            let he = &self.halfedges[current.index()];
            if he.cell.index() != c || he.is_exterior() {
                report.add_error(ValidationError::OpenLoop { cell: c });
                return;
            }
            current = he.next;
            count += 1;
            if current == start {
                break;
            }
            if count > max_count {
                report.add_error(ValidationError::OpenLoop { cell: c });
                return;
            }
        }

        if count < 3 {
            report.add_error(ValidationError::ShortCycle { cell: c, count });
        }
        if count != labelled {
            report.add_error(ValidationError::DetachedHalfEdges {
                cell: c,
                count,
                labelled,
            });
        }
    }
}
