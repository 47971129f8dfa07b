//! Small numeric helpers shared by every aggregate.

/// Lower-middle element of an ascending slice: the middle for odd lengths,
/// the lower of the two middles for even lengths. Never interpolates.
///
/// Index `(n-1)/2`, so `[10, 20, 30, 40]` gives 20. Picking `n/2` (30) would
/// match an upper-middle reading of the same data; the lower middle is kept.
pub fn lower_median(sorted: &[u64]) -> Option<u64> {
    if sorted.is_empty() {
        return None;
    }
    Some(sorted[(sorted.len() - 1) / 2])
}

/// Sorts a copy of `values` and takes its [`lower_median`].
pub fn median_of(values: &[u64]) -> u64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    lower_median(&sorted).unwrap_or(0)
}

/// Integer mean truncated toward zero; 0 for an empty set.
pub fn truncated_mean(total: u64, count: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    total / count as u64
}

pub fn saturating_sum<I: IntoIterator<Item = u64>>(values: I) -> u64 {
    values.into_iter().fold(0u64, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn even_count_takes_lower_middle() {
        assert_eq!(median_of(&[40, 10, 30, 20]), 20);
        assert_eq!(lower_median(&[10, 20, 30, 40]), Some(20));
    }

    #[test]
    fn odd_count_takes_middle() {
        assert_eq!(median_of(&[5, 1, 3]), 3);
        assert_eq!(median_of(&[7]), 7);
        assert_eq!(lower_median(&[]), None);
    }

    #[test]
    fn mean_truncates() {
        assert_eq!(truncated_mean(10, 3), 3);
        assert_eq!(truncated_mean(0, 0), 0);
        assert_eq!(truncated_mean(u64::MAX, 1), u64::MAX);
    }

    proptest! {
        #[test]
        fn proptest_median_is_a_member(values in proptest::collection::vec(0u64..1_000_000, 1..64)) {
            let median = median_of(&values);
            prop_assert!(values.contains(&median));

            let below = values.iter().filter(|v| **v < median).count();
            let at_or_below = values.iter().filter(|v| **v <= median).count();
            // At most half the values sit strictly below the lower-middle,
            // and at least half sit at or below it.
            prop_assert!(below * 2 < values.len());
            prop_assert!(at_or_below * 2 >= values.len());
        }
    }
}
