//! Ragged (variable-length row) arrays.
//!
//! Polygon cells have varying vertex counts, so per-cell incidence is stored
//! flat with an offset array: row `i` is `data[location[i]..location[i + 1]]`.

use crate::error::{MeshError, Result};

/// A flattened array of variable-length rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ragged {
    data: Vec<usize>,
    location: Vec<usize>,
}

impl Ragged {
    /// Create a ragged array from flat data and `len + 1` offsets.
    ///
    /// Offsets must start at zero, be non-decreasing and end at `data.len()`.
    pub fn new(data: Vec<usize>, location: Vec<usize>) -> Result<Self> {
        let Some(&last) = location.last() else {
            return Err(MeshError::shape("location", 1, 0));
        };
        if location[0] != 0 {
            return Err(MeshError::InvalidTopology {
                details: format!("location must start at 0, found {}", location[0]),
            });
        }
        if location.windows(2).any(|w| w[1] < w[0]) {
            return Err(MeshError::InvalidTopology {
                details: "location must be non-decreasing".to_string(),
            });
        }
        MeshError::ensure_len("ragged data", last, data.len())?;
        Ok(Self { data, location })
    }

    /// Wrap offsets already known to be valid.
    pub(crate) fn from_raw_parts(data: Vec<usize>, location: Vec<usize>) -> Self {
        debug_assert_eq!(location.last().copied(), Some(data.len()));
        Self { data, location }
    }

    /// Build a ragged array from nested rows.
    pub fn from_rows<R: AsRef<[usize]>>(rows: &[R]) -> Self {
        let mut data = Vec::new();
        let mut location = Vec::with_capacity(rows.len() + 1);
        location.push(0);
        for row in rows {
            data.extend_from_slice(row.as_ref());
            location.push(data.len());
        }
        Self { data, location }
    }

    /// Build the offsets from per-row counts, leaving the data zeroed.
    pub(crate) fn with_counts(counts: &[usize]) -> Self {
        let mut location = Vec::with_capacity(counts.len() + 1);
        location.push(0);
        let mut total = 0;
        for &c in counts {
            total += c;
            location.push(total);
        }
        Self {
            data: vec![0; total],
            location,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.location.len().saturating_sub(1)
    }

    /// Whether there are no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get row `i`.
    #[inline]
    pub fn row(&self, i: usize) -> &[usize] {
        &self.data[self.location[i]..self.location[i + 1]]
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, i: usize) -> &mut [usize] {
        &mut self.data[self.location[i]..self.location[i + 1]]
    }

    /// Length of row `i`.
    #[inline]
    pub fn row_len(&self, i: usize) -> usize {
        self.location[i + 1] - self.location[i]
    }

    /// Iterate over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }

    /// The flat data.
    #[inline]
    pub fn data(&self) -> &[usize] {
        &self.data
    }

    /// The row offsets (`len + 1` entries).
    #[inline]
    pub fn location(&self) -> &[usize] {
        &self.location
    }

    /// Split into `(data, location)`.
    pub fn into_parts(self) -> (Vec<usize>, Vec<usize>) {
        (self.data, self.location)
    }

    /// Copy into nested vectors.
    pub fn to_vecs(&self) -> Vec<Vec<usize>> {
        self.rows().map(<[usize]>::to_vec).collect()
    }
}
