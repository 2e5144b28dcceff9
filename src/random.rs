//! Seeded random number generation.
//!
//! RNG construction and shuffling come from `u_numflow::random`; this module
//! adds the permutation helpers the samplers need.

use rand::Rng;

pub use u_numflow::random::{create_rng, shuffle};

/// Returns a uniformly random permutation of `0..n`.
pub fn random_permutation<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    shuffle(&mut perm, rng);
    perm
}
