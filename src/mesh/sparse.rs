//! Sparse boolean incidence matrices.
//!
//! A lightweight CSR matrix without values: an entry is either present or not.
//! Duplicate entries collapse to one, so union of incidences is simply
//! concatenating index pairs.

use super::ragged::Ragged;

/// Compressed Sparse Row (CSR) boolean matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolCsrMatrix {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Row pointers: `row_ptr[i]` is the index in `col_idx` where row i starts.
    /// Length is rows + 1, with row_ptr[rows] = nnz.
    row_ptr: Vec<usize>,
    /// Column indices, sorted within each row.
    col_idx: Vec<usize>,
}

impl BoolCsrMatrix {
    /// Create a matrix from `(row, col)` pairs.
    ///
    /// Duplicate pairs are merged.
    ///
    /// # Panics
    /// Panics if a pair lies outside `rows × cols`.
    pub fn from_pairs(rows: usize, cols: usize, mut pairs: Vec<(usize, usize)>) -> Self {
        pairs.sort_unstable();
        pairs.dedup();

        let mut row_ptr = vec![0usize; rows + 1];
        let mut col_idx = Vec::with_capacity(pairs.len());

        for &(r, c) in &pairs {
            assert!(r < rows && c < cols, "entry ({}, {}) outside {}x{}", r, c, rows, cols);
            row_ptr[r + 1] += 1;
            col_idx.push(c);
        }
        for r in 0..rows {
            row_ptr[r + 1] += row_ptr[r];
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
        }
    }

    /// Create an empty matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_pairs(rows, cols, Vec::new())
    }

    /// Get the number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Get the number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.col_idx.len()
    }

    /// Column indices of row `i`, ascending.
    #[inline]
    pub fn row(&self, i: usize) -> &[usize] {
        &self.col_idx[self.row_ptr[i]..self.row_ptr[i + 1]]
    }

    /// Check whether entry `(i, j)` is set.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        i < self.rows && self.row(i).binary_search(&j).is_ok()
    }

    /// Iterate over all set entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows).flat_map(move |i| self.row(i).iter().map(move |&j| (i, j)))
    }

    /// Transpose the matrix.
    pub fn transpose(&self) -> Self {
        let pairs = self.iter().map(|(i, j)| (j, i)).collect();
        Self::from_pairs(self.cols, self.rows, pairs)
    }

    /// Boolean matrix product `self · other`.
    ///
    /// # Panics
    /// Panics if the inner dimensions differ.
    pub fn matmul(&self, other: &BoolCsrMatrix) -> Self {
        assert_eq!(self.cols, other.rows, "Matrix dimension mismatch");

        let mut pairs = Vec::new();
        for i in 0..self.rows {
            for &k in self.row(i) {
                pairs.extend(other.row(k).iter().map(|&j| (i, j)));
            }
        }
        Self::from_pairs(self.rows, other.cols, pairs)
    }

    /// Convert to a dense boolean matrix (row-major). Intended for small meshes.
    pub fn to_dense(&self) -> Vec<Vec<bool>> {
        let mut dense = vec![vec![false; self.cols]; self.rows];
        for (i, j) in self.iter() {
            dense[i][j] = true;
        }
        dense
    }

    /// Convert the sparsity pattern into a ragged array of column lists.
    pub fn into_ragged(self) -> Ragged {
        Ragged::from_raw_parts(self.col_idx, self.row_ptr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_merges_duplicates() {
        let m = BoolCsrMatrix::from_pairs(3, 4, vec![(2, 1), (0, 3), (0, 1), (2, 1)]);
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.row(0), &[1, 3]);
        assert!(m.row(1).is_empty());
        assert_eq!(m.row(2), &[1]);
        assert!(m.contains(0, 3));
        assert!(!m.contains(1, 1));
    }

    #[test]
    fn test_transpose() {
        let m = BoolCsrMatrix::from_pairs(2, 3, vec![(0, 2), (1, 0)]);
        let t = m.transpose();
        assert_eq!(t.nrows(), 3);
        assert_eq!(t.ncols(), 2);
        assert!(t.contains(2, 0));
        assert!(t.contains(0, 1));
        assert_eq!(t.nnz(), 2);
    }

    #[test]
    fn test_matmul() {
        // Path graph 0-1-2 as an edge-node incidence.
        let e2n = BoolCsrMatrix::from_pairs(2, 3, vec![(0, 0), (0, 1), (1, 1), (1, 2)]);
        let e2e = e2n.matmul(&e2n.transpose());
        assert_eq!(e2e.to_dense(), vec![vec![true, true], vec![true, true]]);
    }

    #[test]
    fn test_into_ragged() {
        let m = BoolCsrMatrix::from_pairs(2, 2, vec![(1, 0), (1, 1)]);
        let r = m.into_ragged();
        assert_eq!(r.row(0), &[] as &[usize]);
        assert_eq!(r.row(1), &[0, 1]);
    }
}
