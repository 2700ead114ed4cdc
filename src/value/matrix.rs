//! Dense square matrix values and the row operations used by transforms.
//!
//! The matrix is an input shape, not a linear-algebra library: the only
//! operations here are the structural rewrites relations need (transpose,
//! row scaling, row swaps, permutations). Numeric behavior such as
//! determinants belongs to the system under test.

use serde::Serialize;

/// A dense row-major matrix of `f64` entries.
///
/// Invariant: every row has the same length. All constructors uphold this;
/// transforms produce new matrices and never mutate in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix {
    rows: Vec<Vec<f64>>,
}

impl Matrix {
    /// Builds a matrix from rows. Returns `None` if rows are ragged.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self { rows })
    }

    /// The `n`-by-`n` identity matrix.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let rows = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        Self { rows }
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// True when the matrix is square (the 0x0 matrix is square).
    #[must_use]
    pub fn is_square(&self) -> bool {
        self.row_count() == self.col_count()
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.row_count() * self.col_count()
    }

    /// True for the 0x0 matrix.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row slices, outermost first.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Entry at `(row, col)`, if in bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// The transposed matrix.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let (n, m) = (self.row_count(), self.col_count());
        let rows = (0..m)
            .map(|j| (0..n).map(|i| self.rows[i][j]).collect())
            .collect();
        Self { rows }
    }

    /// A copy with row `index` multiplied by `factor`.
    ///
    /// Returns `None` when the row does not exist; the caller maps that to a
    /// transform-undefined skip, not an error.
    #[must_use]
    pub fn scale_row(&self, index: usize, factor: f64) -> Option<Self> {
        if index >= self.row_count() {
            return None;
        }
        let mut rows = self.rows.clone();
        for entry in &mut rows[index] {
            *entry *= factor;
        }
        Some(Self { rows })
    }

    /// A copy with rows `a` and `b` exchanged. `None` if either is out of
    /// bounds or they are the same row.
    #[must_use]
    pub fn swap_rows(&self, a: usize, b: usize) -> Option<Self> {
        if a == b || a >= self.row_count() || b >= self.row_count() {
            return None;
        }
        let mut rows = self.rows.clone();
        rows.swap(a, b);
        Some(Self { rows })
    }

    /// A copy with rows rearranged by `permutation` (a bijection on row
    /// indices). `None` if `permutation` is not a valid permutation.
    #[must_use]
    pub fn permute_rows(&self, permutation: &[usize]) -> Option<Self> {
        if permutation.len() != self.row_count() {
            return None;
        }
        let mut seen = vec![false; permutation.len()];
        for &p in permutation {
            if p >= permutation.len() || seen[p] {
                return None;
            }
            seen[p] = true;
        }
        let rows = permutation.iter().map(|&p| self.rows[p].clone()).collect();
        Some(Self { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap()
    }

    #[test]
    fn ragged_rows_rejected() {
        assert!(Matrix::from_rows(vec![vec![1.0], vec![2.0, 3.0]]).is_none());
    }

    #[test]
    fn empty_matrix_is_square() {
        let m = Matrix::from_rows(vec![]).unwrap();
        assert!(m.is_square());
        assert!(m.is_empty());
        assert_eq!(m.len(), 0);
    }

    #[test]
    fn transpose_swaps_entries() {
        let t = sample().transpose();
        assert_eq!(t.get(0, 1), Some(3.0));
        assert_eq!(t.get(1, 0), Some(2.0));
        assert_eq!(t.transpose(), sample());
    }

    #[test]
    fn scale_row_out_of_bounds_is_none() {
        assert!(sample().scale_row(2, 3.0).is_none());
        let scaled = sample().scale_row(0, 3.0).unwrap();
        assert_eq!(scaled.get(0, 0), Some(3.0));
        assert_eq!(scaled.get(1, 0), Some(3.0));
    }

    #[test]
    fn swap_rows_requires_distinct_in_bounds() {
        assert!(sample().swap_rows(0, 0).is_none());
        assert!(sample().swap_rows(0, 5).is_none());
        let swapped = sample().swap_rows(0, 1).unwrap();
        assert_eq!(swapped.get(0, 0), Some(3.0));
    }

    #[test]
    fn permute_rows_validates_bijection() {
        assert!(sample().permute_rows(&[0]).is_none());
        assert!(sample().permute_rows(&[0, 0]).is_none());
        assert!(sample().permute_rows(&[2, 0]).is_none());
        let p = sample().permute_rows(&[1, 0]).unwrap();
        assert_eq!(p, sample().swap_rows(0, 1).unwrap());
    }

    #[test]
    fn identity_diagonal() {
        let id = Matrix::identity(3);
        assert_eq!(id.get(1, 1), Some(1.0));
        assert_eq!(id.get(0, 2), Some(0.0));
        assert!(id.is_square());
    }
}
