//! Filling a batch of new individuals under a wall-clock budget.
//!
//! [`PopulationSampler`] repeatedly draws, transforms and evaluates
//! candidates until the requested number is accepted. With duplicate
//! checking on, a candidate already present in the reference population is
//! rejected and another one is drawn; the loop is bounded only by the
//! timeout, which is checked before every draw.

use super::encoding::{Identity, Transform};
use super::matrix::FrequencyMatrix;
use super::sampler::{ConstrainedSampler, DrawStrategy};
use super::types::{Evaluator, Fitness};
use crate::error::UmdaError;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Per-call sampling parameters.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_eda::umda::FillConfig;
///
/// let config = FillConfig::default()
///     .with_check_repeat(true)
///     .with_timeout(Duration::from_millis(4000));
/// assert_eq!(config.timeout, Some(Duration::from_secs(4)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillConfig {
    /// Reject candidates already present in the reference population.
    pub check_repeat: bool,

    /// Wall-clock budget for the whole batch. `None` = unbounded.
    pub timeout: Option<Duration>,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            check_repeat: true,
            timeout: None,
        }
    }
}

impl FillConfig {
    pub fn with_check_repeat(mut self, check: bool) -> Self {
        self.check_repeat = check;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_timeout_ms(self, millis: u64) -> Self {
        self.with_timeout(Duration::from_millis(millis))
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }
}

/// The population new candidates must not duplicate.
///
/// `fitness[i]` belongs to `population[i]`. Both are only read.
#[derive(Debug, Clone)]
pub struct Reference<'a, F, V = Vec<usize>> {
    population: &'a [V],
    fitness: &'a [F],
}

impl<F> Reference<'_, F> {
    /// A reference with no members; nothing is ever a duplicate.
    pub fn empty() -> Self {
        Self {
            population: Default::default(),
            fitness: Default::default(),
        }
    }
}

impl<'a, F, V> Reference<'a, F, V>
where
    F: Fitness,
    V: AsRef<[usize]>,
{
    /// # Errors
    /// [`UmdaError::ShapeMismatch`] if the slices differ in length.
    pub fn new(population: &'a [V], fitness: &'a [F]) -> Result<Self, UmdaError> {
        if population.len() != fitness.len() {
            return Err(UmdaError::ShapeMismatch {
                what: "reference fitness length",
                expected: population.len(),
                actual: fitness.len(),
            });
        }
        Ok(Self {
            population,
            fitness,
        })
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.population.len()
    }

    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    /// Two-tier duplicate test.
    ///
    /// A fitness match is necessary for equality, so a fitness absent from
    /// the reference settles it cheaply. Only on a fitness hit are the
    /// members compared element-wise. Many fitness ties make the second
    /// tier run often.
    pub fn contains(&self, candidate: &[usize], fitness: F) -> bool {
        if !self.fitness.iter().any(|&f| f == fitness) {
            return false;
        }
        self.population.iter().any(|p| p.as_ref() == candidate)
    }
}

/// Accepted samples of one [`PopulationSampler::fill`] call.
///
/// `fitness[i]` belongs to `samples[i]`; both keep discovery order.
#[derive(Debug, Clone)]
pub struct SampleBatch<F> {
    /// Accepted candidates.
    pub samples: Vec<Vec<usize>>,

    /// Fitness of each accepted candidate.
    pub fitness: Vec<F>,

    /// Candidates drawn, accepted or not.
    pub attempts: usize,

    /// Candidates rejected as duplicates.
    pub rejected: usize,

    /// Wall-clock time spent.
    pub elapsed: Duration,
}

impl<F> SampleBatch<F> {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Budgeted batch sampler.
///
/// Combines a [`DrawStrategy`] with a [`Transform`] applied to every raw
/// draw before evaluation and duplicate checking. Timeout and duplicate
/// semantics are the same for every strategy.
///
/// # Examples
///
/// ```
/// use u_eda::random::create_rng;
/// use u_eda::umda::{ConstrainedSampler, FillConfig, FrequencyModel, PopulationSampler, Reference};
///
/// let survivors = vec![vec![0, 1, 2, 3, 4], vec![4, 3, 2, 1, 0]];
/// let matrix = FrequencyModel::learn(&survivors, (5, 5)).unwrap();
/// let eval = |p: &[usize]| p.iter().enumerate().map(|(i, &v)| (i * v) as f64).sum::<f64>();
///
/// let sampler = PopulationSampler::new(ConstrainedSampler::permutation());
/// let config = FillConfig::default().with_check_repeat(false).with_timeout_ms(1000);
/// let mut rng = create_rng(42);
/// let batch = sampler
///     .fill(&matrix, 3, Reference::empty(), &eval, &config, &mut rng)
///     .unwrap();
/// assert_eq!(batch.samples.len(), 3);
/// assert_eq!(batch.fitness.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct PopulationSampler<S = ConstrainedSampler, T = Identity> {
    strategy: S,
    transform: T,
}

impl<S: DrawStrategy> PopulationSampler<S, Identity> {
    /// Uses `strategy` with no post-draw transform.
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            transform: Identity,
        }
    }
}

impl<S: DrawStrategy, T: Transform> PopulationSampler<S, T> {
    /// Replaces the post-draw transform.
    pub fn with_transform<U: Transform>(self, transform: U) -> PopulationSampler<S, U> {
        PopulationSampler {
            strategy: self.strategy,
            transform,
        }
    }

    /// The draw strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Draws until `n_requested` candidates are accepted.
    ///
    /// Raw draws have length `matrix.sample_size()`.
    ///
    /// # Errors
    /// - [`UmdaError::TimeoutExceeded`] once the budget is spent. The batch
    ///   is all-or-nothing: accepted samples so far are dropped.
    /// - Any error from the draw strategy or the evaluator, unchanged.
    pub fn fill<E, V, R>(
        &self,
        matrix: &FrequencyMatrix,
        n_requested: usize,
        reference: Reference<'_, E::Fitness, V>,
        evaluator: &E,
        config: &FillConfig,
        rng: &mut R,
    ) -> Result<SampleBatch<E::Fitness>, UmdaError>
    where
        E: Evaluator,
        V: AsRef<[usize]>,
        R: Rng,
    {
        self.fill_with_cancel(matrix, n_requested, reference, evaluator, config, rng, None)
    }

    /// Like [`fill`](Self::fill), also stopping when `cancel` is set.
    ///
    /// The flag is polled at the same point as the timeout: before each
    /// new draw. A draw in progress always completes.
    ///
    /// # Errors
    /// As [`fill`](Self::fill), plus [`UmdaError::Cancelled`].
    #[allow(clippy::too_many_arguments)]
    pub fn fill_with_cancel<E, V, R>(
        &self,
        matrix: &FrequencyMatrix,
        n_requested: usize,
        reference: Reference<'_, E::Fitness, V>,
        evaluator: &E,
        config: &FillConfig,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> Result<SampleBatch<E::Fitness>, UmdaError>
    where
        E: Evaluator,
        V: AsRef<[usize]>,
        R: Rng,
    {
        let start = Instant::now();
        let size = matrix.sample_size();

        let mut samples = Vec::with_capacity(n_requested);
        let mut fitness = Vec::with_capacity(n_requested);
        let mut attempts = 0usize;
        let mut rejected = 0usize;

        while samples.len() < n_requested {
            let elapsed = start.elapsed();
            if let Some(timeout) = config.timeout {
                if elapsed >= timeout {
                    warn!(
                        accepted = samples.len(),
                        requested = n_requested,
                        attempts,
                        rejected,
                        "sampling timeout exceeded"
                    );
                    return Err(UmdaError::TimeoutExceeded {
                        elapsed,
                        timeout,
                        accepted: samples.len(),
                        requested: n_requested,
                    });
                }
            }
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    warn!(accepted = samples.len(), requested = n_requested, "sampling cancelled");
                    return Err(UmdaError::Cancelled);
                }
            }

            attempts += 1;
            let raw = self.strategy.draw(matrix, size, rng)?;
            let candidate = self.transform.apply(raw);
            let f = evaluator.evaluate(&candidate)?;

            if config.check_repeat && reference.contains(&candidate, f) {
                rejected += 1;
                trace!(?candidate, "rejected duplicate");
                continue;
            }

            samples.push(candidate);
            fitness.push(f);
        }

        let elapsed = start.elapsed();
        debug!(
            accepted = samples.len(),
            attempts,
            rejected,
            elapsed_ms = elapsed.as_millis() as u64,
            "filled sample batch"
        );

        Ok(SampleBatch {
            samples,
            fitness,
            attempts,
            rejected,
            elapsed,
        })
    }
}
