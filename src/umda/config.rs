//! UMDA driver configuration.

use super::sampler::{ConstrainedSampler, SamplingMode, Smoothing, VisitOrder};
use crate::error::UmdaError;
use std::time::Duration;

/// Configuration for [`UmdaRunner`](super::UmdaRunner).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_eda::umda::{Smoothing, UmdaConfig, VisitOrder};
///
/// let config = UmdaConfig::new(20)
///     .with_population_size(200)
///     .with_survivor_fraction(0.5)
///     .with_max_generations(20)
///     .with_timeout(Duration::from_secs(4))
///     .with_smoothing(Smoothing::laplace())
///     .with_order(VisitOrder::Randomized);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct UmdaConfig {
    /// Permutation length `n`.
    pub problem_size: usize,

    /// Number of individuals kept between generations.
    pub population_size: usize,

    /// Fraction of the population selected to learn the model.
    ///
    /// The same number of new individuals is sampled each generation.
    pub survivor_fraction: f64,

    /// Number of generations.
    pub max_generations: usize,

    /// Sampling budget per generation. `None` = unbounded.
    pub timeout: Option<Duration>,

    /// Reject sampled individuals already in the population.
    pub check_repeat: bool,

    /// `Permutation` samples positions directly under the no-reuse
    /// constraint. `Independent` learns and samples Lehmer digits, which
    /// are decoded back into permutations.
    pub mode: SamplingMode,

    /// Position visit order.
    pub order: VisitOrder,

    /// Additive smoothing.
    pub smoothing: Smoothing,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl UmdaConfig {
    /// Creates a configuration for permutations of length `problem_size`.
    ///
    /// The population defaults to ten times the problem size.
    pub fn new(problem_size: usize) -> Self {
        Self {
            problem_size,
            population_size: problem_size * 10,
            survivor_fraction: 0.5,
            max_generations: 20,
            timeout: Some(Duration::from_secs(4)),
            check_repeat: true,
            mode: SamplingMode::Permutation,
            order: VisitOrder::Sequential,
            smoothing: Smoothing::None,
            seed: None,
        }
    }

    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_survivor_fraction(mut self, f: f64) -> Self {
        self.survivor_fraction = f;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn with_check_repeat(mut self, check: bool) -> Self {
        self.check_repeat = check;
        self
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

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of survivors (and of new samples) per generation.
    pub fn survivor_count(&self) -> usize {
        (self.population_size as f64 * self.survivor_fraction) as usize
    }

    /// The per-candidate sampler described by this configuration.
    pub fn sampler(&self) -> ConstrainedSampler {
        ConstrainedSampler::new(self.mode, self.order, self.smoothing)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), UmdaError> {
        if self.problem_size == 0 {
            return Err(UmdaError::InvalidConfig(
                "problem_size must be at least 1".into(),
            ));
        }
        if self.population_size < 2 {
            return Err(UmdaError::InvalidConfig(
                "population_size must be at least 2".into(),
            ));
        }
        if !(self.survivor_fraction > 0.0 && self.survivor_fraction < 1.0) {
            return Err(UmdaError::InvalidConfig(format!(
                "survivor_fraction must be in (0, 1), got {}",
                self.survivor_fraction
            )));
        }
        if self.survivor_count() == 0 {
            return Err(UmdaError::InvalidConfig(
                "survivor_fraction too small: no survivors".into(),
            ));
        }
        if self.max_generations == 0 {
            return Err(UmdaError::InvalidConfig(
                "max_generations must be at least 1".into(),
            ));
        }
        self.smoothing.validate()
    }
}
