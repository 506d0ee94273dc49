use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::errors::{PipelineError, Result};

/// Train/test partition of one dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// Partition `records` so that `round(n * holdout)` of them land in `test`.
///
/// Membership comes from a shuffle seeded with `seed`, so the same input,
/// holdout and seed always produce the same partition. Each side keeps the
/// input order of its members.
pub fn split<T>(records: Vec<T>, holdout: f32, seed: u64) -> Result<Split<T>> {
    if !(holdout > 0.0 && holdout <= 1.0) {
        return Err(PipelineError::InvalidHoldout(holdout));
    }
    let total = records.len();
    let test_len = ((total as f64) * f64::from(holdout)).round() as usize;
    let test_len = test_len.min(total);

    let mut order: Vec<usize> = (0..total).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    let mut in_test = vec![false; total];
    for &idx in &order[..test_len] {
        in_test[idx] = true;
    }

    let mut train = Vec::with_capacity(total - test_len);
    let mut test = Vec::with_capacity(test_len);
    for (record, held_out) in records.into_iter().zip(in_test) {
        if held_out {
            test.push(record);
        } else {
            train.push(record);
        }
    }
    tracing::debug!(
        "split {} records: {} train, {} test (holdout {})",
        total,
        train.len(),
        test.len(),
        holdout
    );
    Ok(Split { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_size_is_rounded_fraction() {
        let parts = split((0..200).collect::<Vec<_>>(), 0.01, 7).unwrap();
        assert_eq!(parts.test.len(), 2);
        assert_eq!(parts.train.len(), 198);

        let parts = split((0..200).collect::<Vec<_>>(), 0.99, 7).unwrap();
        assert_eq!(parts.test.len(), 198);
        assert_eq!(parts.train.len(), 2);
    }

    #[test]
    fn partition_is_disjoint_and_complete() {
        let parts = split((0..137).collect::<Vec<_>>(), 0.3, 11).unwrap();
        let train: HashSet<_> = parts.train.iter().copied().collect();
        let test: HashSet<_> = parts.test.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 137);
        assert_eq!(train.union(&test).count(), 137);
    }

    #[test]
    fn same_seed_same_partition() {
        let a = split((0..50).collect::<Vec<_>>(), 0.5, 42).unwrap();
        let b = split((0..50).collect::<Vec<_>>(), 0.5, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn members_keep_input_order() {
        let parts = split((0..40).collect::<Vec<_>>(), 0.25, 3).unwrap();
        assert!(parts.train.windows(2).all(|w| w[0] < w[1]));
        assert!(parts.test.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn full_holdout_keeps_everything_for_test() {
        let parts = split(vec!["a", "b", "c"], 1.0, 0).unwrap();
        assert!(parts.train.is_empty());
        assert_eq!(parts.test, vec!["a", "b", "c"]);
    }

    #[test]
    fn out_of_range_holdout_is_rejected() {
        for holdout in [0.0, -0.5, 1.5, f32::NAN] {
            let result = split(vec![1, 2, 3], holdout, 0);
            assert!(matches!(result, Err(PipelineError::InvalidHoldout(_))));
        }
    }

    #[test]
    fn empty_dataset_splits_into_empty_sets() {
        let parts = split(Vec::<u8>::new(), 0.5, 1).unwrap();
        assert!(parts.train.is_empty());
        assert!(parts.test.is_empty());
    }
}
