//! Sparse matrix assembly.
//!
//! Stuffing builds `P` and `A` row by row as coordinate entries, then
//! compresses them to CSC for Clarabel.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CscMatrix};

/// Accumulates `(row, col, value)` entries for a sparse matrix.
#[derive(Debug, Clone, Default)]
pub struct Triplets {
    entries: Vec<(usize, usize, f64)>,
}

impl Triplets {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an entry. Zero values are skipped.
    pub fn push(&mut self, row: usize, col: usize, val: f64) {
        if val != 0.0 {
            self.entries.push((row, col, val));
        }
    }

    /// Append entries from another accumulator, shifting their rows.
    pub fn extend_shifted(&mut self, other: &Triplets, row_offset: usize) {
        self.entries.extend(
            other
                .entries
                .iter()
                .map(|&(r, c, v)| (r + row_offset, c, v)),
        );
    }

    /// Number of stored entries, counting duplicates separately.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compress into an `nrows x ncols` CSC matrix.
    ///
    /// Entries at the same position are summed. Entries outside the shape
    /// are dropped.
    pub fn to_csc(&self, nrows: usize, ncols: usize) -> CscMatrix<f64> {
        if self.entries.is_empty() {
            return CscMatrix::zeros(nrows, ncols);
        }
        let mut coo = CooMatrix::new(nrows, ncols);
        for &(row, col, val) in &self.entries {
            if row < nrows && col < ncols {
                coo.push(row, col, val);
            }
        }
        CscMatrix::from(&coo)
    }
}

impl FromIterator<(usize, usize, f64)> for Triplets {
    fn from_iter<I: IntoIterator<Item = (usize, usize, f64)>>(iter: I) -> Self {
        let mut t = Triplets::new();
        for (row, col, val) in iter {
            t.push(row, col, val);
        }
        t
    }
}

/// Convert a CSC matrix to a dense matrix.
pub fn csc_to_dense(sparse: &CscMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from(sparse)
}

/// Expand an upper-triangular CSC matrix into a dense symmetric one.
pub fn upper_to_symmetric(upper: &CscMatrix<f64>) -> DMatrix<f64> {
    let mut dense = csc_to_dense(upper);
    for (row, col, val) in upper.triplet_iter() {
        if row != col {
            dense[(col, row)] += *val;
        }
    }
    dense
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_zero_and_sum_duplicates() {
        let mut t = Triplets::new();
        t.push(0, 0, 1.0);
        t.push(0, 0, 2.0);
        t.push(1, 1, 0.0);
        assert_eq!(t.len(), 2);

        let m = t.to_csc(2, 2);
        assert_eq!(m.nnz(), 1);
        let dense = csc_to_dense(&m);
        assert_eq!(dense[(0, 0)], 3.0);
        assert_eq!(dense[(1, 1)], 0.0);
    }

    #[test]
    fn test_empty_has_shape() {
        let m = Triplets::new().to_csc(3, 2);
        assert_eq!((m.nrows(), m.ncols(), m.nnz()), (3, 2, 0));
    }

    #[test]
    fn test_extend_shifted() {
        let mut a: Triplets = [(0, 0, 1.0)].into_iter().collect();
        let b: Triplets = [(0, 1, 2.0)].into_iter().collect();
        a.extend_shifted(&b, 3);

        let dense = csc_to_dense(&a.to_csc(4, 2));
        assert_eq!(dense[(3, 1)], 2.0);
        assert_eq!(dense[(0, 0)], 1.0);
    }

    #[test]
    fn test_upper_to_symmetric() {
        let upper: Triplets = [(0, 0, 2.0), (0, 1, 1.0), (1, 1, 3.0)].into_iter().collect();
        let sym = upper_to_symmetric(&upper.to_csc(2, 2));
        assert_eq!(sym[(1, 0)], 1.0);
        assert_eq!(sym[(0, 1)], 1.0);
        assert_eq!(sym[(1, 1)], 3.0);
    }
}
