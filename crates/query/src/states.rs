use crate::stats::{median_of, saturating_sum, truncated_mean};
use grantscope_record_store::Grant;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-state subtotal of one foundation's giving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateStat {
    pub state: String,
    pub grant_count: usize,
    pub total_amount: u64,
    pub avg_grant: u64,
    pub median_grant: u64,
}

/// Groups reported grants by recipient state. Grants without a state are
/// left out. Most grants first; equal counts fall back to state name.
pub fn state_breakdown<'a, I>(grants: I) -> Vec<StateStat>
where
    I: IntoIterator<Item = &'a Grant>,
{
    let mut by_state: BTreeMap<&str, Vec<u64>> = BTreeMap::new();
    for grant in grants {
        if let (Some(state), Some(amount)) = (grant.state(), grant.reported_amount()) {
            by_state.entry(state).or_default().push(amount);
        }
    }

    let mut breakdown: Vec<StateStat> = by_state
        .into_iter()
        .map(|(state, amounts)| {
            let total_amount = saturating_sum(amounts.iter().copied());
            StateStat {
                state: state.to_string(),
                grant_count: amounts.len(),
                total_amount,
                avg_grant: truncated_mean(total_amount, amounts.len()),
                median_grant: median_of(&amounts),
            }
        })
        .collect();
    // BTreeMap iteration already yields states ascending; the sort is stable.
    breakdown.sort_by(|a, b| b.grant_count.cmp(&a.grant_count));
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantscope_record_store::Ein;
    use pretty_assertions::assert_eq;

    fn grant(state: &str, amount: Option<u64>) -> Grant {
        Grant::new(Ein::new(3), amount).located("", state)
    }

    #[test]
    fn groups_and_orders_by_count() {
        let grants = vec![
            grant("NY", Some(10)),
            grant("CA", Some(40)),
            grant("NY", Some(30)),
            grant("NY", Some(20)),
            grant("CA", Some(10)),
            grant("WA", Some(5)),
            grant("", Some(99)),
            grant("WA", None),
        ];
        let breakdown = state_breakdown(&grants);

        assert_eq!(
            breakdown,
            vec![
                StateStat {
                    state: "NY".to_string(),
                    grant_count: 3,
                    total_amount: 60,
                    avg_grant: 20,
                    median_grant: 20,
                },
                StateStat {
                    state: "CA".to_string(),
                    grant_count: 2,
                    total_amount: 50,
                    avg_grant: 25,
                    median_grant: 10,
                },
                StateStat {
                    state: "WA".to_string(),
                    grant_count: 1,
                    total_amount: 5,
                    avg_grant: 5,
                    median_grant: 5,
                },
            ]
        );
    }

    #[test]
    fn no_states_means_empty_breakdown() {
        assert!(state_breakdown(&[grant("", Some(1))]).is_empty());
    }
}
