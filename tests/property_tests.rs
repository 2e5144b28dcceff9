//! Property-based tests for the frequency model and constrained sampler.

use proptest::prelude::*;
use std::collections::HashSet;
use u_eda::random::create_rng;
use u_eda::umda::{
    decode_lehmer, encode_lehmer, ConstrainedSampler, FrequencyModel, Smoothing, VisitOrder,
};

fn permutation(n: usize) -> impl Strategy<Value = Vec<usize>> {
    Just((0..n).collect::<Vec<usize>>()).prop_shuffle()
}

fn population() -> impl Strategy<Value = (usize, Vec<Vec<usize>>)> {
    (1usize..10, 0usize..12).prop_flat_map(|(n, k)| {
        (Just(n), prop::collection::vec(permutation(n), k))
    })
}

fn is_valid_permutation(perm: &[usize], n: usize) -> bool {
    let set: HashSet<usize> = perm.iter().copied().collect();
    perm.len() == n && set.len() == n && perm.iter().all(|&v| v < n)
}

proptest! {
    #[test]
    fn rows_and_columns_sum_to_population_size((n, pop) in population()) {
        let m = FrequencyModel::learn(&pop, (n, n)).unwrap();
        for r in 0..n {
            prop_assert_eq!(m.row_sum(r), pop.len() as u64);
        }
        for c in 0..n {
            let col: u64 = (0..n).map(|r| m.get(r, c) as u64).sum();
            prop_assert_eq!(col, pop.len() as u64);
        }
    }

    #[test]
    fn permutation_draws_are_valid(
        (n, pop) in population(),
        seed in any::<u64>(),
        randomized in any::<bool>(),
    ) {
        let m = FrequencyModel::learn(&pop, (n, n)).unwrap();
        let order = if randomized { VisitOrder::Randomized } else { VisitOrder::Sequential };
        // An empty population needs smoothing to be sampleable.
        let smoothing = if pop.is_empty() { Smoothing::laplace() } else { Smoothing::None };
        let sampler = ConstrainedSampler::permutation()
            .with_order(order)
            .with_smoothing(smoothing);
        let mut rng = create_rng(seed);
        for _ in 0..10 {
            let p = sampler.draw_one(&m, n, &mut rng).unwrap();
            prop_assert!(is_valid_permutation(&p, n), "invalid draw {:?}", p);
        }
    }

    #[test]
    fn draws_only_use_observed_values((n, pop) in population(), seed in any::<u64>()) {
        prop_assume!(!pop.is_empty());
        let m = FrequencyModel::learn(&pop, (n, n)).unwrap();
        let mut rng = create_rng(seed);
        let v = ConstrainedSampler::independent().draw_one(&m, n, &mut rng).unwrap();
        for (j, &x) in v.iter().enumerate() {
            prop_assert!(m.get(j, x) > 0, "position {} drew unseen value {}", j, x);
        }
    }

    #[test]
    fn lehmer_round_trip(p in (1usize..12).prop_flat_map(permutation)) {
        prop_assert_eq!(decode_lehmer(&encode_lehmer(&p)), p);
    }

    #[test]
    fn lehmer_decode_is_total(digits in prop::collection::vec(0usize..20, 0..10)) {
        let p = decode_lehmer(&digits);
        prop_assert!(is_valid_permutation(&p, digits.len() + 1));
    }
}
