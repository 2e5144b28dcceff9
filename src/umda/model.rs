//! Learning the univariate frequency model.

use super::matrix::FrequencyMatrix;
use crate::error::UmdaError;
use tracing::debug;

/// Target shape of a learned matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixShape {
    /// Explicit `rows × cols`.
    Explicit { rows: usize, cols: usize },

    /// Number of distinct values; rows are inferred from the vector length.
    ///
    /// With an empty population there is no length to infer from, so the
    /// matrix has zero rows.
    Values(usize),
}

impl From<(usize, usize)> for MatrixShape {
    fn from((rows, cols): (usize, usize)) -> Self {
        MatrixShape::Explicit { rows, cols }
    }
}

impl From<usize> for MatrixShape {
    fn from(values: usize) -> Self {
        MatrixShape::Values(values)
    }
}

/// Univariate marginal frequency model.
///
/// # References
///
/// - Mühlenbein & Paaß (1996), "From Recombination of Genes to the
///   Estimation of Distributions I. Binary Parameters"
pub struct FrequencyModel;

impl FrequencyModel {
    /// Counts, for each position, how often each value occurs there.
    ///
    /// `freq[position][value] += 1` over every member and position. For a
    /// population of `k` permutations every row sums to `k`. An empty
    /// population yields an all-zero matrix.
    ///
    /// # Errors
    /// - [`UmdaError::ShapeMismatch`] if a vector's length differs from the
    ///   row count.
    /// - [`UmdaError::ValueOutOfRange`] if a value is `>= cols`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_eda::umda::FrequencyModel;
    ///
    /// let pop = vec![vec![0, 1, 2], vec![2, 1, 0]];
    /// let m = FrequencyModel::learn(&pop, (3, 3)).unwrap();
    /// assert_eq!(m.row(0), &[1, 0, 1]);
    /// assert_eq!(m.row(1), &[0, 2, 0]);
    /// ```
    pub fn learn<V, S>(population: &[V], shape: S) -> Result<FrequencyMatrix, UmdaError>
    where
        V: AsRef<[usize]>,
        S: Into<MatrixShape>,
    {
        let (rows, cols) = match shape.into() {
            MatrixShape::Explicit { rows, cols } => (rows, cols),
            MatrixShape::Values(cols) => {
                let rows = population.first().map_or(0, |v| v.as_ref().len());
                (rows, cols)
            }
        };

        let mut freq = FrequencyMatrix::zeros(rows, cols);
        for individual in population {
            let individual = individual.as_ref();
            if individual.len() != rows {
                return Err(UmdaError::ShapeMismatch {
                    what: "individual length",
                    expected: rows,
                    actual: individual.len(),
                });
            }
            for (position, &value) in individual.iter().enumerate() {
                if value >= cols {
                    return Err(UmdaError::ValueOutOfRange {
                        position,
                        value,
                        limit: cols,
                    });
                }
                freq.increment(position, value);
            }
        }

        debug!(rows, cols, individuals = population.len(), "learned frequency matrix");
        Ok(freq)
    }
}
