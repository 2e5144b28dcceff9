//! Reference UMDA driver.
//!
//! [`UmdaRunner`] wires the core together the way a permutation EDA is
//! normally run: evaluate → select survivors → learn → sample → merge →
//! truncate → repeat. A sampling timeout ends the run gracefully with the
//! history collected so far.

use super::config::UmdaConfig;
use super::encoding::{encode_lehmer, LehmerDecode};
use super::fill::{FillConfig, PopulationSampler, Reference, SampleBatch};
use super::matrix::FrequencyMatrix;
use super::model::FrequencyModel;
use super::sampler::SamplingMode;
use super::types::{Fitness, UmdaProblem};
use crate::error::UmdaError;
use crate::random::create_rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a UMDA run.
#[derive(Debug, Clone)]
pub struct UmdaResult<F> {
    /// The best permutation in the final population.
    pub best: Vec<usize>,

    /// Fitness of `best`.
    pub best_fitness: F,

    /// Completed generations.
    pub generations: usize,

    /// Whether a sampling timeout ended the run.
    pub timed_out: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Best survivor fitness per generation.
    pub best_history: Vec<f64>,

    /// Mean survivor fitness per generation.
    pub mean_history: Vec<f64>,

    /// The last matrix learned, if any.
    pub last_matrix: Option<FrequencyMatrix>,
}

/// Executes the UMDA loop.
///
/// # Usage
///
/// ```ignore
/// let problem = Qap::load("tai20b.dat")?;
/// let config = UmdaConfig::new(20).with_seed(42);
/// let result = UmdaRunner::run(&problem, &config)?;
/// println!("best: {:?}", result.best_fitness);
/// ```
pub struct UmdaRunner;

impl UmdaRunner {
    /// Runs UMDA.
    ///
    /// # Errors
    /// Invalid configuration, invalid individuals from
    /// [`UmdaProblem::create_individual`], or a degenerate matrix.
    /// A sampling timeout is not an error; see [`UmdaResult::timed_out`].
    pub fn run<P: UmdaProblem>(
        problem: &P,
        config: &UmdaConfig,
    ) -> Result<UmdaResult<P::Fitness>, UmdaError> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs UMDA with an optional cancellation token.
    ///
    /// The flag is checked at the start of every generation and before
    /// every draw.
    pub fn run_with_cancel<P: UmdaProblem>(
        problem: &P,
        config: &UmdaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<UmdaResult<P::Fitness>, UmdaError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        let n = config.problem_size;
        let n_surv = config.survivor_count();
        let fill_config = FillConfig {
            check_repeat: config.check_repeat,
            timeout: config.timeout,
        };
        let sampler = config.sampler();
        let evaluate = |p: &[usize]| problem.evaluate(p);

        let mut population: Vec<Vec<usize>> = (0..config.population_size)
            .map(|_| problem.create_individual(&mut rng))
            .collect();
        if let Some(bad) = population.iter().find(|p| p.len() != n) {
            return Err(UmdaError::ShapeMismatch {
                what: "initial individual length",
                expected: n,
                actual: bad.len(),
            });
        }
        let mut fitness: Vec<P::Fitness> = population.iter().map(|p| problem.evaluate(p)).collect();

        let mut best_history = Vec::with_capacity(config.max_generations);
        let mut mean_history = Vec::with_capacity(config.max_generations);
        let mut last_matrix = None;
        let mut generations = 0usize;
        let mut timed_out = false;
        let mut cancelled = false;

        for gen in 0..config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            let order = ranking(&fitness);
            let survivors: Vec<Vec<usize>> =
                order[..n_surv].iter().map(|&i| population[i].clone()).collect();

            let best = fitness[order[0]];
            let mean = order[..n_surv]
                .iter()
                .map(|&i| fitness[i].to_f64())
                .sum::<f64>()
                / n_surv as f64;
            best_history.push(best.to_f64());
            mean_history.push(mean);
            info!(generation = gen + 1, best = best.to_f64(), mean, "umda generation");
            problem.on_generation(gen + 1, best);

            let reference = Reference::new(&population, &fitness)?;
            let cancel_flag = cancel.as_deref();
            let (matrix, sampled) = match config.mode {
                SamplingMode::Permutation => {
                    let matrix = FrequencyModel::learn(&survivors, (n, n))?;
                    let sampled = PopulationSampler::new(sampler).fill_with_cancel(
                        &matrix,
                        n_surv,
                        reference,
                        &evaluate,
                        &fill_config,
                        &mut rng,
                        cancel_flag,
                    );
                    (matrix, sampled)
                }
                SamplingMode::Independent => {
                    let encoded: Vec<Vec<usize>> =
                        survivors.iter().map(|p| encode_lehmer(p)).collect();
                    let matrix = FrequencyModel::learn(&encoded, (n - 1, n))?;
                    let sampled = PopulationSampler::new(sampler)
                        .with_transform(LehmerDecode)
                        .fill_with_cancel(
                            &matrix,
                            n_surv,
                            reference,
                            &evaluate,
                            &fill_config,
                            &mut rng,
                            cancel_flag,
                        );
                    (matrix, sampled)
                }
            };
            last_matrix = Some(matrix);

            let batch: SampleBatch<P::Fitness> = match sampled {
                Ok(batch) => batch,
                Err(UmdaError::TimeoutExceeded { .. }) => {
                    warn!(generation = gen + 1, "stopping run: sampling timeout");
                    timed_out = true;
                    break;
                }
                Err(UmdaError::Cancelled) => {
                    cancelled = true;
                    break;
                }
                Err(e) => return Err(e),
            };

            population.extend(batch.samples);
            fitness.extend(batch.fitness);
            truncate(&mut population, &mut fitness, config.population_size);
            generations = gen + 1;
        }

        let best_idx = ranking(&fitness)[0];
        Ok(UmdaResult {
            best: population[best_idx].clone(),
            best_fitness: fitness[best_idx],
            generations,
            timed_out,
            cancelled,
            best_history,
            mean_history,
            last_matrix,
        })
    }
}

/// Indices sorted by fitness, best first.
fn ranking<F: Fitness>(fitness: &[F]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    order.sort_by(|&a, &b| compare_fitness(&fitness[a], &fitness[b]));
    order
}

/// Total order over fitness values: values not comparable with themselves
/// (NaN) rank after everything else and tie with each other.
fn compare_fitness<F: Fitness>(a: &F, b: &F) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a.partial_cmp(a), b.partial_cmp(b)) {
        (None, None) => Ordering::Equal,
        (None, _) => Ordering::Greater,
        (_, None) => Ordering::Less,
        _ => a.partial_cmp(b).unwrap_or(Ordering::Equal),
    }
}

/// Keeps the `keep` best individuals, in ranking order.
fn truncate<F: Fitness>(population: &mut Vec<Vec<usize>>, fitness: &mut Vec<F>, keep: usize) {
    let order = ranking(fitness);
    let mut kept_pop = Vec::with_capacity(keep);
    let mut kept_fit = Vec::with_capacity(keep);
    for &i in order.iter().take(keep) {
        kept_pop.push(std::mem::take(&mut population[i]));
        kept_fit.push(fitness[i]);
    }
    *population = kept_pop;
    *fitness = kept_fit;
}
