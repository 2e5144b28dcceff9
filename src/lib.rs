//! Estimation-of-distribution core for permutation-encoded optimization.
//!
//! Provides the UMDA building blocks used by permutation EDAs on problems
//! such as the Quadratic Assignment Problem:
//!
//! - **Frequency model**: position × value counts learned from elite
//!   permutations.
//! - **Constrained sampling**: roulette-wheel draws that respect the
//!   permutation constraint, with sequential or randomized position order
//!   and optional additive smoothing.
//! - **Budgeted population sampling**: fills a batch of new, non-duplicate
//!   individuals under a wall-clock timeout.
//!
//! # Architecture
//!
//! Everything is single-threaded and synchronous. Timeouts and
//! cancellation are cooperative: they are checked between draws, never
//! during one. Problem evaluation, instance loading, and reporting belong
//! to the caller.

pub mod error;
pub mod random;
pub mod umda;

pub use error::UmdaError;
