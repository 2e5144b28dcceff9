//! Post-draw transforms and the reference-list (Lehmer) encoding.
//!
//! A permutation of `0..n` can be written as `n - 1` digits where digit
//! `j` counts the later elements smaller than `perm[j]`. Digit `j` lies in
//! `0..n - j`, so positions are independent of each other: an
//! `(n - 1) × n` matrix learned from encoded survivors can be sampled in
//! [`SamplingMode::Independent`](super::SamplingMode::Independent) and
//! decoded back with [`LehmerDecode`].
//!
//! # References
//!
//! - Lehmer (1960), "Teaching combinatorial tricks to a computer"
//! - Ceberio, Irurozki, Mendiburu & Lozano (2014), "Extending distance-based
//!   ranking models in estimation of distribution algorithms"

/// Maps a raw draw to the final candidate before evaluation.
///
/// Any closure `Fn(Vec<usize>) -> Vec<usize>` is a transform.
pub trait Transform {
    /// Transforms one raw candidate.
    fn apply(&self, raw: Vec<usize>) -> Vec<usize>;
}

impl<F> Transform for F
where
    F: Fn(Vec<usize>) -> Vec<usize>,
{
    fn apply(&self, raw: Vec<usize>) -> Vec<usize> {
        self(raw)
    }
}

/// Leaves the draw unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for Identity {
    fn apply(&self, raw: Vec<usize>) -> Vec<usize> {
        raw
    }
}

/// Decodes Lehmer digits into a permutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LehmerDecode;

impl Transform for LehmerDecode {
    fn apply(&self, raw: Vec<usize>) -> Vec<usize> {
        decode_lehmer(&raw)
    }
}

/// Encodes a permutation as `n - 1` Lehmer digits.
///
/// ```
/// use u_eda::umda::encode_lehmer;
///
/// assert_eq!(encode_lehmer(&[2, 0, 3, 1]), vec![2, 0, 1]);
/// assert_eq!(encode_lehmer(&[0, 1, 2]), vec![0, 0]);
/// ```
pub fn encode_lehmer(perm: &[usize]) -> Vec<usize> {
    let n = perm.len();
    (0..n.saturating_sub(1))
        .map(|j| perm[j + 1..].iter().filter(|&&x| x < perm[j]).count())
        .collect()
}

/// Decodes `n - 1` Lehmer digits into a permutation of `0..n`.
///
/// Digit `j` selects the `digit`-th smallest value not yet placed. A digit
/// past the end of the remaining values selects the largest remaining
/// one, so every input decodes to a valid permutation.
///
/// ```
/// use u_eda::umda::decode_lehmer;
///
/// assert_eq!(decode_lehmer(&[2, 0, 1]), vec![2, 0, 3, 1]);
/// ```
pub fn decode_lehmer(digits: &[usize]) -> Vec<usize> {
    let n = digits.len() + 1;
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut perm = Vec::with_capacity(n);
    for &d in digits {
        let idx = d.min(remaining.len() - 1);
        perm.push(remaining.remove(idx));
    }
    perm.extend(remaining);
    perm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{create_rng, random_permutation};

    #[test]
    fn test_encode_decode_inverse() {
        let mut rng = create_rng(42);
        for n in 1..10 {
            for _ in 0..20 {
                let p = random_permutation(n, &mut rng);
                let digits = encode_lehmer(&p);
                assert_eq!(digits.len(), n - 1);
                for (j, &d) in digits.iter().enumerate() {
                    assert!(d < n - j);
                }
                assert_eq!(decode_lehmer(&digits), p);
            }
        }
    }

    #[test]
    fn test_identity_and_reverse() {
        assert_eq!(encode_lehmer(&[0, 1, 2, 3]), vec![0, 0, 0]);
        assert_eq!(encode_lehmer(&[3, 2, 1, 0]), vec![3, 2, 1]);
    }

    #[test]
    fn test_out_of_range_digits_saturate() {
        assert_eq!(decode_lehmer(&[9, 9, 9]), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_transforms() {
        assert_eq!(Identity.apply(vec![1, 0]), vec![1, 0]);
        assert_eq!(LehmerDecode.apply(vec![1]), vec![1, 0]);
        let reverse = |mut v: Vec<usize>| {
            v.reverse();
            v
        };
        assert_eq!(reverse.apply(vec![0, 1, 2]), vec![2, 1, 0]);
    }
}
