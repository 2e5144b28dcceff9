//! Position-by-value frequency matrix.
//!
//! [`FrequencyMatrix`] stores raw integer counts: cell `(j, v)` is the
//! number of learning vectors that placed value `v` at position `j`.
//! Sampling reads it through a [`WeightView`], which adds the smoothing
//! offset on the fly so the caller's counts are never touched.

/// An `rows × cols` matrix of non-negative counts, stored row-major.
///
/// Square in permutation mode, rectangular when positions draw
/// independent values from `0..cols`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyMatrix {
    rows: usize,
    cols: usize,
    counts: Vec<u32>,
}

impl FrequencyMatrix {
    /// Creates an all-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            counts: vec![0; rows * cols],
        }
    }

    /// Builds a matrix from explicit rows.
    ///
    /// # Panics
    /// Panics if the rows have different lengths.
    pub fn from_rows(rows: &[Vec<u32>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|r| r.len() == cols),
            "all rows must have the same length"
        );
        Self {
            rows: rows.len(),
            cols,
            counts: rows.iter().flatten().copied().collect(),
        }
    }

    /// Number of rows (positions).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (values).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `true` when the matrix is square.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Length of a vector sampled from this matrix: `min(rows, cols)`.
    pub fn sample_size(&self) -> usize {
        self.rows.min(self.cols)
    }

    /// Count at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.counts[row * self.cols + col]
    }

    /// Counts of one row.
    pub fn row(&self, row: usize) -> &[u32] {
        &self.counts[row * self.cols..(row + 1) * self.cols]
    }

    /// Sum of one row.
    pub fn row_sum(&self, row: usize) -> u64 {
        self.row(row).iter().map(|&c| c as u64).sum()
    }

    /// Adds one observation of `value` at `position`.
    pub(crate) fn increment(&mut self, position: usize, value: usize) {
        self.counts[position * self.cols + value] += 1;
    }

    /// Row-normalised probabilities for reporting.
    ///
    /// An all-zero row yields all zeros.
    pub fn probabilities(&self, row: usize) -> Vec<f64> {
        let total = self.row_sum(row);
        if total == 0 {
            return vec![0.0; self.cols];
        }
        self.row(row)
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect()
    }

    /// Read-only weighted view with `offset` added to every cell.
    pub fn weights(&self, offset: f64) -> WeightView<'_> {
        WeightView {
            matrix: self,
            offset,
        }
    }
}

/// Borrowed view of a [`FrequencyMatrix`] with an additive offset.
///
/// This is how smoothing is applied: the offset lives in the view and the
/// underlying counts stay untouched.
#[derive(Debug, Clone, Copy)]
pub struct WeightView<'a> {
    matrix: &'a FrequencyMatrix,
    offset: f64,
}

impl WeightView<'_> {
    /// Weight at `(row, col)`: count plus offset.
    #[inline]
    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.matrix.get(row, col) as f64 + self.offset
    }

    /// Offset applied to every cell.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Total weight of a row, offset included.
    pub fn row_total(&self, row: usize) -> f64 {
        self.matrix.row_sum(row) as f64 + self.offset * self.matrix.cols() as f64
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.matrix.cols()
    }
}
