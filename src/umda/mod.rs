//! Univariate Marginal Distribution Algorithm (UMDA) for permutations.
//!
//! UMDA learns, from a set of elite permutations, how often each value
//! appears at each position, and samples new candidates from that model.
//! Positions are treated as independent; the no-reuse constraint of a
//! permutation is enforced while sampling.
//!
//! # Core
//!
//! - [`FrequencyModel`]: learns a [`FrequencyMatrix`] from a population
//! - [`ConstrainedSampler`]: draws one candidate (roulette wheel per position)
//! - [`PopulationSampler`]: fills a batch under a wall-clock budget,
//!   rejecting duplicates of a reference population
//!
//! # Extension Points
//!
//! - [`DrawStrategy`]: custom per-candidate draw schemes
//! - [`Transform`]: post-draw mapping, e.g. [`LehmerDecode`]
//! - [`Evaluator`]: fitness of a candidate; any `Fn(&[usize]) -> F`
//!
//! # Driver
//!
//! [`UmdaRunner`] runs the full generational loop for a [`UmdaProblem`].
//!
//! # References
//!
//! - Mühlenbein & Paaß (1996), "From Recombination of Genes to the
//!   Estimation of Distributions I. Binary Parameters"
//! - Larrañaga & Lozano (2002), *Estimation of Distribution Algorithms*
//! - Ceberio, Irurozki, Mendiburu & Lozano (2012), "A review on estimation
//!   of distribution algorithms in permutation-based combinatorial
//!   optimization problems"

mod config;
mod encoding;
mod fill;
mod matrix;
mod model;
mod runner;
mod sampler;
mod types;

pub use config::UmdaConfig;
pub use encoding::{decode_lehmer, encode_lehmer, Identity, LehmerDecode, Transform};
pub use fill::{FillConfig, PopulationSampler, Reference, SampleBatch};
pub use matrix::{FrequencyMatrix, WeightView};
pub use model::{FrequencyModel, MatrixShape};
pub use runner::{UmdaResult, UmdaRunner};
pub use sampler::{ConstrainedSampler, DrawStrategy, SamplingMode, Smoothing, VisitOrder};
pub use types::{Evaluator, Fallible, Fitness, UmdaProblem};
