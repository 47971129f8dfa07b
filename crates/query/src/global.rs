use crate::aggregate::FoundationStats;
use crate::stats::{median_of, saturating_sum, truncated_mean};
use grantscope_record_store::Grant;
use serde::Serialize;
use std::collections::BTreeSet;

/// Dataset-wide summary. All zero when no grant carries an amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalStats {
    pub total_grants: usize,
    pub total_foundations: usize,
    pub total_amount: u64,
    pub avg_grant: u64,
    pub min_grant: u64,
    pub max_grant: u64,
    pub states: Vec<String>,
    pub avg_grants_per_foundation: u64,
    pub median_grants_per_foundation: u64,
    pub avg_total_per_foundation: u64,
    pub median_total_per_foundation: u64,
}

impl GlobalStats {
    /// `grants` is every grant in the dataset; `per_foundation` the stats of
    /// every foundation that has at least one reported grant.
    pub fn compute<'a, G, F>(grants: G, total_foundations: usize, per_foundation: F) -> Self
    where
        G: IntoIterator<Item = &'a Grant>,
        F: IntoIterator<Item = &'a FoundationStats>,
    {
        let mut amounts = Vec::new();
        let mut states = BTreeSet::new();
        for grant in grants {
            let Some(amount) = grant.reported_amount() else {
                continue;
            };
            amounts.push(amount);
            if let Some(state) = grant.state() {
                states.insert(state.to_string());
            }
        }

        if amounts.is_empty() {
            return Self::default();
        }

        let total_amount = saturating_sum(amounts.iter().copied());
        let (counts, totals): (Vec<u64>, Vec<u64>) = per_foundation
            .into_iter()
            .map(|stats| (stats.grant_count as u64, stats.total_amount))
            .unzip();

        Self {
            total_grants: amounts.len(),
            total_foundations,
            total_amount,
            avg_grant: truncated_mean(total_amount, amounts.len()),
            min_grant: amounts.iter().copied().min().unwrap_or(0),
            max_grant: amounts.iter().copied().max().unwrap_or(0),
            states: states.into_iter().collect(),
            avg_grants_per_foundation: truncated_mean(saturating_sum(counts.iter().copied()), counts.len()),
            median_grants_per_foundation: median_of(&counts),
            avg_total_per_foundation: truncated_mean(saturating_sum(totals.iter().copied()), totals.len()),
            median_total_per_foundation: median_of(&totals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_grants;
    use grantscope_record_store::Ein;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_dataset_is_all_zero() {
        let stats = GlobalStats::compute(&Vec::<Grant>::new(), 0, &Vec::<FoundationStats>::new());
        assert_eq!(stats, GlobalStats::default());
        assert!(stats.states.is_empty());
    }

    #[test]
    fn summarizes_grants_and_foundations() {
        let grants = vec![
            Grant::new(Ein::new(1), Some(100)).located("Austin", "TX"),
            Grant::new(Ein::new(1), Some(300)).located("Boise", "ID"),
            Grant::new(Ein::new(2), Some(50)).located("Dallas", "TX"),
            Grant::new(Ein::new(2), None).located("Reno", "NV"),
        ];
        let first = aggregate_grants(grants.iter().filter(|g| g.foundation_ein == Ein::new(1))).unwrap();
        let second = aggregate_grants(grants.iter().filter(|g| g.foundation_ein == Ein::new(2))).unwrap();

        let stats = GlobalStats::compute(&grants, 2, [&first, &second]);

        assert_eq!(stats.total_grants, 3);
        assert_eq!(stats.total_foundations, 2);
        assert_eq!(stats.total_amount, 450);
        assert_eq!(stats.avg_grant, 150);
        assert_eq!(stats.min_grant, 50);
        assert_eq!(stats.max_grant, 300);
        assert_eq!(stats.states, vec!["ID", "TX"]);
        assert_eq!(stats.avg_grants_per_foundation, 1);
        assert_eq!(stats.median_grants_per_foundation, 1);
        assert_eq!(stats.avg_total_per_foundation, 225);
        assert_eq!(stats.median_total_per_foundation, 50);
    }
}
