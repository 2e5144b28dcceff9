//! Core trait definitions for the UMDA core.
//!
//! [`Fitness`] and [`Evaluator`] are the contract between the sampler and
//! the problem being optimized. [`UmdaProblem`] is only needed by the
//! reference driver, [`UmdaRunner`](super::UmdaRunner).

use crate::error::{BoxedError, UmdaError};
use rand::Rng;

/// Marker trait for fitness values.
///
/// Fitness must support comparison and be cheaply copyable.
/// Lower fitness is considered better (minimization).
///
/// Equality matters here as well: the duplicate filter uses a fitness
/// match as a necessary (not sufficient) signal that a candidate already
/// exists in the reference population.
pub trait Fitness: PartialOrd + Copy + Send + Sync + std::fmt::Debug + 'static {
    /// Converts the fitness to `f64` for logging and statistics.
    fn to_f64(self) -> f64;
}

impl Fitness for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

impl Fitness for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Fitness for i64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Fitness for u64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// Computes the fitness of a candidate vector.
///
/// Must be total over every vector the sampler can produce and free of
/// visible side effects. Any plain closure `Fn(&[usize]) -> F` is an
/// evaluator; wrap a closure returning `Result` in [`Fallible`] to report
/// failures.
///
/// Panics raised inside an evaluator are not caught.
pub trait Evaluator {
    /// The fitness type produced.
    type Fitness: Fitness;

    /// Evaluates one candidate.
    fn evaluate(&self, candidate: &[usize]) -> Result<Self::Fitness, UmdaError>;
}

impl<Func, F> Evaluator for Func
where
    Func: Fn(&[usize]) -> F,
    F: Fitness,
{
    type Fitness = F;

    fn evaluate(&self, candidate: &[usize]) -> Result<F, UmdaError> {
        Ok(self(candidate))
    }
}

/// Adapts a closure returning `Result<F, E>` into an [`Evaluator`].
///
/// An `Err` is surfaced as [`UmdaError::EvaluatorFailure`] with the
/// original error as its source.
///
/// ```
/// use u_eda::umda::{Evaluator, Fallible};
///
/// let eval = Fallible(|c: &[usize]| -> Result<f64, std::io::Error> {
///     Ok(c.len() as f64)
/// });
/// assert_eq!(eval.evaluate(&[0, 1, 2]).unwrap(), 3.0);
/// ```
pub struct Fallible<Func>(pub Func);

impl<Func, F, E> Evaluator for Fallible<Func>
where
    Func: Fn(&[usize]) -> Result<F, E>,
    F: Fitness,
    E: Into<BoxedError>,
{
    type Fitness = F;

    fn evaluate(&self, candidate: &[usize]) -> Result<F, UmdaError> {
        (self.0)(candidate).map_err(|e| UmdaError::EvaluatorFailure(e.into()))
    }
}

/// Defines a permutation problem for the reference driver.
///
/// # Examples
///
/// ```ignore
/// struct Qap { dist: Vec<Vec<i64>>, flow: Vec<Vec<i64>> }
///
/// impl UmdaProblem for Qap {
///     type Fitness = i64;
///
///     fn size(&self) -> usize { self.dist.len() }
///
///     fn evaluate(&self, p: &[usize]) -> i64 {
///         let n = p.len();
///         (0..n).flat_map(|i| (0..n).map(move |j| (i, j)))
///             .map(|(i, j)| self.dist[i][j] * self.flow[p[i]][p[j]])
///             .sum()
///     }
/// }
/// ```
pub trait UmdaProblem {
    /// The fitness type for this problem.
    type Fitness: Fitness;

    /// Permutation length.
    fn size(&self) -> usize;

    /// Evaluates a permutation. Lower is better.
    fn evaluate(&self, permutation: &[usize]) -> Self::Fitness;

    /// Creates a random individual for the initial population.
    ///
    /// The default is a uniformly random permutation of `0..size()`.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        crate::random::random_permutation(self.size(), rng)
    }

    /// Called at the end of each generation with the best survivor fitness.
    fn on_generation(&self, _generation: usize, _best_fitness: Self::Fitness) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_evaluator() {
        let eval = |c: &[usize]| c.iter().sum::<usize>() as f64;
        assert_eq!(eval.evaluate(&[1, 2, 3]).unwrap(), 6.0);
    }

    #[test]
    fn test_fallible_maps_error() {
        let eval = Fallible(|_: &[usize]| -> Result<i64, std::fmt::Error> { Err(std::fmt::Error) });
        let err = eval.evaluate(&[0]).unwrap_err();
        match err {
            UmdaError::EvaluatorFailure(source) => {
                assert!(source.downcast_ref::<std::fmt::Error>().is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(7u64.to_f64(), 7.0);
        assert_eq!((-3i64).to_f64(), -3.0);
        assert_eq!(0.5f32.to_f64(), 0.5);
    }
}
