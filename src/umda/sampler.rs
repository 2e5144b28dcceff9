//! Drawing one candidate from a frequency matrix.
//!
//! [`ConstrainedSampler`] is a roulette wheel per position. In
//! [`SamplingMode::Permutation`] a value chosen for one position is removed
//! from the wheel of every later position, so the result is always a valid
//! permutation. In [`SamplingMode::Independent`] every position spins its
//! own full wheel.
//!
//! # Variants
//!
//! | mode          | order        | smoothing      |
//! |---------------|--------------|----------------|
//! | `Permutation` | `Sequential` | `None`         |
//! | `Permutation` | `Sequential` | `Additive(1)`  |
//! | `Permutation` | `Randomized` | `Additive(1)`  |
//! | `Independent` | `Sequential` | `None`         |
//! | `Independent` | `Randomized` | `None`         |
//!
//! Any combination is allowed; these are the usual ones.

use super::matrix::{FrequencyMatrix, WeightView};
use crate::error::UmdaError;
use crate::random::random_permutation;
use rand::Rng;

/// Value-domain constraint across positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingMode {
    /// Each value is used at most once; the draw is a permutation of
    /// `0..size`.
    #[default]
    Permutation,

    /// Each position draws independently from `0..cols`.
    Independent,
}

/// Order in which positions claim their values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitOrder {
    /// Positions `0..size` in order.
    #[default]
    Sequential,

    /// A fresh random permutation of positions for every draw.
    Randomized,
}

/// Additive correction applied to every cell while drawing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Smoothing {
    /// Raw counts. A zero-weight row is a caller error.
    #[default]
    None,

    /// Adds a constant to every cell of the view used for the draw.
    Additive(f64),
}

impl Smoothing {
    /// Laplace correction (`+1`).
    pub fn laplace() -> Self {
        Smoothing::Additive(1.0)
    }

    /// The offset added to each cell.
    pub fn offset(self) -> f64 {
        match self {
            Smoothing::None => 0.0,
            Smoothing::Additive(c) => c,
        }
    }

    pub(crate) fn validate(self) -> Result<(), UmdaError> {
        let c = self.offset();
        if !c.is_finite() || c < 0.0 {
            return Err(UmdaError::InvalidConfig(format!(
                "smoothing must be finite and non-negative, got {c}"
            )));
        }
        Ok(())
    }
}

/// Produces one raw candidate vector from a matrix.
///
/// Implemented by [`ConstrainedSampler`]; implement it for custom draw
/// schemes and plug them into
/// [`PopulationSampler::new`](super::PopulationSampler::new).
pub trait DrawStrategy {
    /// Draws one vector of length `size`.
    fn draw<R: Rng>(
        &self,
        matrix: &FrequencyMatrix,
        size: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, UmdaError>;
}

/// Roulette-wheel sampler with configurable constraint, order and smoothing.
///
/// # Examples
///
/// ```
/// use u_eda::random::create_rng;
/// use u_eda::umda::{ConstrainedSampler, FrequencyModel, Smoothing, VisitOrder};
///
/// let pop = vec![vec![0, 1, 2, 3], vec![1, 0, 3, 2]];
/// let matrix = FrequencyModel::learn(&pop, (4, 4)).unwrap();
///
/// let sampler = ConstrainedSampler::permutation()
///     .with_order(VisitOrder::Randomized)
///     .with_smoothing(Smoothing::laplace());
/// let mut rng = create_rng(42);
/// let mut perm = sampler.draw_one(&matrix, 4, &mut rng).unwrap();
/// perm.sort();
/// assert_eq!(perm, vec![0, 1, 2, 3]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstrainedSampler {
    /// Cross-position constraint.
    pub mode: SamplingMode,

    /// Position visit order.
    pub order: VisitOrder,

    /// Additive smoothing.
    pub smoothing: Smoothing,
}

impl ConstrainedSampler {
    pub fn new(mode: SamplingMode, order: VisitOrder, smoothing: Smoothing) -> Self {
        Self {
            mode,
            order,
            smoothing,
        }
    }

    /// Sequential, unsmoothed, permutation-constrained.
    pub fn permutation() -> Self {
        Self::new(SamplingMode::Permutation, VisitOrder::Sequential, Smoothing::None)
    }

    /// Sequential, unsmoothed, unconstrained.
    pub fn independent() -> Self {
        Self::new(SamplingMode::Independent, VisitOrder::Sequential, Smoothing::None)
    }

    pub fn with_mode(mut self, mode: SamplingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_order(mut self, order: VisitOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Draws one candidate of length `size`.
    ///
    /// In permutation mode the result is a permutation of `0..size`; in
    /// independent mode each entry lies in `0..matrix.cols()`.
    ///
    /// The matrix is only read. Smoothing is applied through a
    /// [`WeightView`].
    ///
    /// # Errors
    /// - [`UmdaError::DegenerateDistribution`] if a visited row has zero
    ///   total weight and smoothing is disabled.
    /// - [`UmdaError::ShapeMismatch`] if `size` exceeds the matrix rows, or
    ///   differs from the column count in permutation mode.
    /// - [`UmdaError::InvalidConfig`] for negative or non-finite smoothing.
    pub fn draw_one<R: Rng>(
        &self,
        matrix: &FrequencyMatrix,
        size: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, UmdaError> {
        self.smoothing.validate()?;
        if size > matrix.rows() {
            return Err(UmdaError::ShapeMismatch {
                what: "sample size against matrix rows",
                expected: matrix.rows(),
                actual: size,
            });
        }
        let (domain, exclusive) = match self.mode {
            SamplingMode::Permutation => {
                if size != matrix.cols() {
                    return Err(UmdaError::ShapeMismatch {
                        what: "permutation size against matrix columns",
                        expected: matrix.cols(),
                        actual: size,
                    });
                }
                (size, true)
            }
            SamplingMode::Independent => (matrix.cols(), false),
        };

        let weights = matrix.weights(self.smoothing.offset());
        let mut state = PartialAssignment::new(size, domain);

        let positions: Vec<usize> = match self.order {
            VisitOrder::Sequential => (0..size).collect(),
            VisitOrder::Randomized => random_permutation(size, rng),
        };

        for position in positions {
            let value = spin(&weights, position, domain, &state, exclusive, rng)?;
            state.assign(position, value, exclusive);
        }

        Ok(state.into_vec())
    }
}

impl DrawStrategy for ConstrainedSampler {
    fn draw<R: Rng>(
        &self,
        matrix: &FrequencyMatrix,
        size: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, UmdaError> {
        self.draw_one(matrix, size, rng)
    }
}

/// A candidate under construction.
///
/// `slots[j]` is `None` until position `j` has been visited. `used[v]`
/// tracks consumed values in permutation mode.
#[derive(Debug)]
struct PartialAssignment {
    slots: Vec<Option<usize>>,
    used: Vec<bool>,
}

impl PartialAssignment {
    fn new(size: usize, domain: usize) -> Self {
        Self {
            slots: vec![None; size],
            used: vec![false; domain],
        }
    }

    #[inline]
    fn is_used(&self, value: usize) -> bool {
        self.used[value]
    }

    fn assign(&mut self, position: usize, value: usize, exclusive: bool) {
        self.slots[position] = Some(value);
        if exclusive {
            self.used[value] = true;
        }
    }

    /// Every position is visited exactly once, so no slot is left empty.
    fn into_vec(self) -> Vec<usize> {
        self.slots.into_iter().flatten().collect()
    }
}

/// One roulette-wheel spin for `position`.
///
/// Draws `r` uniformly from `[0, s_max)` where `s_max` is the eligible
/// weight, then walks eligible values in increasing order and returns the
/// first whose running sum reaches `r`. `r == 0` selects the smallest
/// eligible value directly; this also covers a row whose remaining
/// eligible values all have zero weight.
fn spin<R: Rng>(
    weights: &WeightView<'_>,
    position: usize,
    domain: usize,
    state: &PartialAssignment,
    exclusive: bool,
    rng: &mut R,
) -> Result<usize, UmdaError> {
    if weights.row_total(position) <= 0.0 {
        return Err(UmdaError::DegenerateDistribution { position });
    }

    let eligible = |v: &usize| !exclusive || !state.is_used(*v);

    let s_max: f64 = (0..domain)
        .filter(eligible)
        .map(|v| weights.weight(position, v))
        .sum();

    let r = if s_max > 0.0 {
        rng.random_range(0.0..s_max)
    } else {
        0.0
    };

    if r == 0.0 {
        return (0..domain)
            .find(eligible)
            .ok_or(UmdaError::ShapeMismatch {
                what: "eligible values",
                expected: 1,
                actual: 0,
            });
    }

    let mut acc = 0.0;
    let mut last_positive = None;
    for v in (0..domain).filter(eligible) {
        let w = weights.weight(position, v);
        if w > 0.0 {
            last_positive = Some(v);
        }
        acc += w;
        if acc >= r {
            return Ok(v);
        }
    }

    // Rounding in the running sum can leave it just short of `r`.
    last_positive.ok_or(UmdaError::DegenerateDistribution { position })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use crate::umda::FrequencyModel;
    use std::collections::HashSet;

    fn is_valid_permutation(perm: &[usize], n: usize) -> bool {
        if perm.len() != n {
            return false;
        }
        let set: HashSet<usize> = perm.iter().copied().collect();
        set.len() == n && perm.iter().all(|&v| v < n)
    }

    fn identity_matrix(n: usize, weight: u32) -> FrequencyMatrix {
        let rows: Vec<Vec<u32>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { weight } else { 0 }).collect())
            .collect();
        FrequencyMatrix::from_rows(&rows)
    }

    #[test]
    fn test_permutation_draws_are_valid() {
        let pop = vec![
            vec![0, 1, 2, 3, 4, 5],
            vec![5, 4, 3, 2, 1, 0],
            vec![2, 0, 1, 5, 3, 4],
        ];
        let m = FrequencyModel::learn(&pop, (6, 6)).unwrap();
        let mut rng = create_rng(42);

        for sampler in [
            ConstrainedSampler::permutation(),
            ConstrainedSampler::permutation().with_smoothing(Smoothing::laplace()),
            ConstrainedSampler::permutation()
                .with_smoothing(Smoothing::laplace())
                .with_order(VisitOrder::Randomized),
            ConstrainedSampler::permutation().with_order(VisitOrder::Randomized),
        ] {
            for _ in 0..200 {
                let p = sampler.draw_one(&m, 6, &mut rng).unwrap();
                assert!(is_valid_permutation(&p, 6), "{sampler:?} produced {p:?}");
            }
        }
    }

    #[test]
    fn test_deterministic_matrix_reproduces_identity() {
        let m = identity_matrix(5, 3);
        let mut rng = create_rng(1);
        for _ in 0..50 {
            let p = ConstrainedSampler::permutation()
                .draw_one(&m, 5, &mut rng)
                .unwrap();
            assert_eq!(p, vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_randomized_order_on_deterministic_matrix() {
        let m = identity_matrix(4, 2);
        let mut rng = create_rng(9);
        let sampler = ConstrainedSampler::permutation().with_order(VisitOrder::Randomized);
        for _ in 0..50 {
            assert_eq!(sampler.draw_one(&m, 4, &mut rng).unwrap(), vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_zero_eligible_weight_picks_smallest_unused() {
        // Row 1 only has weight on value 0, which row 0 always claims.
        let m = FrequencyMatrix::from_rows(&[vec![5, 0, 0], vec![4, 0, 0], vec![0, 0, 1]]);
        let mut rng = create_rng(3);
        for _ in 0..20 {
            let p = ConstrainedSampler::permutation()
                .draw_one(&m, 3, &mut rng)
                .unwrap();
            assert_eq!(p, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_zero_row_without_smoothing_fails() {
        let m = FrequencyMatrix::from_rows(&[vec![1, 0], vec![0, 0]]);
        let mut rng = create_rng(42);
        let err = ConstrainedSampler::permutation()
            .draw_one(&m, 2, &mut rng)
            .unwrap_err();
        assert!(matches!(err, UmdaError::DegenerateDistribution { position: 1 }));

        let err = ConstrainedSampler::independent()
            .draw_one(&m, 2, &mut rng)
            .unwrap_err();
        assert!(matches!(err, UmdaError::DegenerateDistribution { position: 1 }));
    }

    #[test]
    fn test_smoothing_rescues_zero_matrix() {
        let m = FrequencyMatrix::zeros(5, 5);
        let before = m.clone();
        let mut rng = create_rng(42);
        let sampler = ConstrainedSampler::permutation().with_smoothing(Smoothing::laplace());
        for _ in 0..50 {
            let p = sampler.draw_one(&m, 5, &mut rng).unwrap();
            assert!(is_valid_permutation(&p, 5));
        }
        assert_eq!(m, before);
    }

    #[test]
    fn test_independent_mode_allows_repeats() {
        // Every position strongly prefers value 1.
        let m = FrequencyMatrix::from_rows(&[vec![0, 9, 0], vec![0, 9, 0], vec![0, 9, 0]]);
        let mut rng = create_rng(42);
        let p = ConstrainedSampler::independent()
            .draw_one(&m, 3, &mut rng)
            .unwrap();
        assert_eq!(p, vec![1, 1, 1]);
    }

    #[test]
    fn test_independent_rectangular_range() {
        let m = FrequencyMatrix::from_rows(&[vec![1, 1, 1, 1], vec![0, 2, 0, 2], vec![3, 0, 0, 1]]);
        let mut rng = create_rng(5);
        let sampler = ConstrainedSampler::independent().with_order(VisitOrder::Randomized);
        for _ in 0..100 {
            let v = sampler.draw_one(&m, 3, &mut rng).unwrap();
            assert_eq!(v.len(), 3);
            assert!(v.iter().all(|&x| x < 4));
            assert!(v[1] == 1 || v[1] == 3);
            assert!(v[2] == 0 || v[2] == 3);
        }
    }

    #[test]
    fn test_frequencies_follow_weights() {
        let m = FrequencyMatrix::from_rows(&[vec![1, 3], vec![1, 1]]);
        let mut rng = create_rng(42);
        let n = 10000;
        let ones = (0..n)
            .filter(|_| {
                ConstrainedSampler::independent()
                    .draw_one(&m, 1, &mut rng)
                    .unwrap()[0]
                    == 1
            })
            .count();
        let ratio = ones as f64 / n as f64;
        assert!((ratio - 0.75).abs() < 0.03, "expected ~0.75, got {ratio}");
    }

    #[test]
    fn test_size_larger_than_rows() {
        let m = FrequencyMatrix::zeros(3, 3);
        let mut rng = create_rng(42);
        let err = ConstrainedSampler::permutation()
            .with_smoothing(Smoothing::laplace())
            .draw_one(&m, 4, &mut rng)
            .unwrap_err();
        assert!(matches!(err, UmdaError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_permutation_rejects_extra_columns() {
        // All the weight sits in a column a permutation of 0..2 cannot use.
        let m = FrequencyMatrix::from_rows(&[vec![0, 0, 5], vec![0, 0, 5]]);
        let mut rng = create_rng(42);
        let err = ConstrainedSampler::permutation()
            .draw_one(&m, 2, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            UmdaError::ShapeMismatch { expected: 3, actual: 2, .. }
        ));

        let v = ConstrainedSampler::independent()
            .draw_one(&m, 2, &mut rng)
            .unwrap();
        assert_eq!(v, vec![2, 2]);
    }

    #[test]
    fn test_negative_smoothing_rejected() {
        let m = identity_matrix(3, 1);
        let mut rng = create_rng(42);
        let err = ConstrainedSampler::permutation()
            .with_smoothing(Smoothing::Additive(-1.0))
            .draw_one(&m, 3, &mut rng)
            .unwrap_err();
        assert!(matches!(err, UmdaError::InvalidConfig(_)));
    }

    #[test]
    fn test_same_seed_same_draws() {
        let m = FrequencyMatrix::zeros(8, 8);
        let sampler = ConstrainedSampler::permutation()
            .with_smoothing(Smoothing::laplace())
            .with_order(VisitOrder::Randomized);
        let mut a = create_rng(77);
        let mut b = create_rng(77);
        for _ in 0..10 {
            assert_eq!(
                sampler.draw_one(&m, 8, &mut a).unwrap(),
                sampler.draw_one(&m, 8, &mut b).unwrap()
            );
        }
    }
}
