use crate::error::{self, check_range};
use grantscope_record_store::{Ein, Grant, GrantFilter};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Grant search predicates as they arrive from a caller. All optional,
/// combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GrantQuery {
    /// Substring of the granting foundation's name.
    #[serde(alias = "foundation_name")]
    pub foundation: Option<String>,
    pub min_amount: Option<u64>,
    pub max_amount: Option<u64>,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl GrantQuery {
    pub fn foundation_name(&self) -> Option<&str> {
        self.foundation
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn validate(&self) -> error::Result<()> {
        check_range("amount", self.min_amount, self.max_amount)
    }

    /// Row predicates, restricted to `foundations` once the name predicate has
    /// been resolved to EINs.
    pub fn to_filter(&self, foundations: Option<BTreeSet<Ein>>) -> GrantFilter {
        GrantFilter {
            foundations,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            state: self.state.clone(),
            city: self.city.clone(),
        }
        .normalized()
    }
}

/// Applies `filter` to whatever the provider returned and orders the survivors
/// by amount descending. Grants without an amount go last; ties keep provider
/// order.
pub fn rank_grants(grants: Vec<Grant>, filter: &GrantFilter) -> Vec<Grant> {
    let mut matched: Vec<Grant> = grants
        .into_iter()
        .filter(|grant| filter.matches(grant))
        .collect();
    matched.sort_by(|a, b| b.grant_amount.cmp(&a.grant_amount));
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn grants() -> Vec<Grant> {
        vec![
            Grant::new(Ein::new(1), Some(500)).located("Springfield", "IL"),
            Grant::new(Ein::new(1), None).located("Chicago", "IL"),
            Grant::new(Ein::new(2), Some(900)).located("SPRINGDALE", "AR"),
            Grant::new(Ein::new(2), Some(500)).located("Austin", "TX"),
            Grant::new(Ein::new(3), Some(50)).located("Springfield", "MO"),
        ]
    }

    #[test]
    fn sorts_by_amount_descending_with_unreported_last() {
        let ranked = rank_grants(grants(), &GrantFilter::default());
        let amounts: Vec<Option<u64>> = ranked.iter().map(|g| g.grant_amount).collect();
        assert_eq!(amounts, vec![Some(900), Some(500), Some(500), Some(50), None]);
        // Equal amounts keep provider order.
        assert_eq!(ranked[1].recipient_city.as_deref(), Some("Springfield"));
        assert_eq!(ranked[2].recipient_city.as_deref(), Some("Austin"));
    }

    #[test]
    fn city_query_matches_any_case() {
        let query = GrantQuery {
            city: Some("spring".to_string()),
            ..GrantQuery::default()
        };
        let ranked = rank_grants(grants(), &query.to_filter(None));
        let cities: Vec<&str> = ranked.iter().filter_map(|g| g.city()).collect();
        assert_eq!(cities, vec!["SPRINGDALE", "Springfield", "Springfield"]);
    }

    #[test]
    fn query_normalizes_state() {
        let query = GrantQuery {
            state: Some("il".to_string()),
            foundation: Some("   ".to_string()),
            ..GrantQuery::default()
        };
        assert_eq!(query.foundation_name(), None);
        let filter = query.to_filter(Some(BTreeSet::from([Ein::new(1)])));
        assert_eq!(filter.state.as_deref(), Some("IL"));
        assert_eq!(rank_grants(grants(), &filter).len(), 2);
    }

    #[test]
    fn deserializes_foundation_name_alias() {
        let query: GrantQuery =
            serde_json::from_value(serde_json::json!({"foundation_name": "Gates", "min_amount": 10}))
                .unwrap();
        assert_eq!(query.foundation_name(), Some("Gates"));
        assert_eq!(query.min_amount, Some(10));
    }

    fn arb_grant() -> impl Strategy<Value = Grant> {
        (
            1u32..4,
            proptest::option::of(0u64..1_000),
            prop::sample::select(vec!["CA", "ny", "TX", ""]),
            prop::sample::select(vec!["Springfield", "Austin", "spring hill", ""]),
        )
            .prop_map(|(ein, amount, state, city)| Grant::new(Ein::new(ein), amount).located(city, state))
    }

    fn arb_query() -> impl Strategy<Value = GrantQuery> {
        (
            proptest::option::of(0u64..1_000),
            proptest::option::of(0u64..1_000),
            proptest::option::of(prop::sample::select(vec!["ca", "NY", "tx"])),
            proptest::option::of(prop::sample::select(vec!["spring", "AUS", "x"])),
        )
            .prop_map(|(min_amount, max_amount, state, city)| GrantQuery {
                foundation: None,
                min_amount,
                max_amount,
                state: state.map(str::to_string),
                city: city.map(str::to_string),
            })
    }

    fn both(p: &GrantQuery, q: &GrantQuery) -> GrantQuery {
        GrantQuery {
            foundation: None,
            min_amount: p.min_amount.max(q.min_amount),
            max_amount: match (p.max_amount, q.max_amount) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
            state: p.state.clone().or_else(|| q.state.clone()),
            city: p.city.clone().or_else(|| q.city.clone()),
        }
    }

    proptest! {
        #[test]
        fn conjunction_is_subset_of_each_side(
            rows in proptest::collection::vec(arb_grant(), 0..24),
            p in arb_query(),
            q in arb_query(),
        ) {
            // Only combine when text predicates do not collide.
            prop_assume!(p.state.is_none() || q.state.is_none());
            prop_assume!(p.city.is_none() || q.city.is_none());

            let p_filter = p.to_filter(None);
            let q_filter = q.to_filter(None);
            let pq_filter = both(&p, &q).to_filter(None);

            for grant in rank_grants(rows.clone(), &pq_filter) {
                prop_assert!(p_filter.matches(&grant));
                prop_assert!(q_filter.matches(&grant));
            }
        }

        #[test]
        fn ranking_is_idempotent(rows in proptest::collection::vec(arb_grant(), 0..24), p in arb_query()) {
            let filter = p.to_filter(None);
            let once = rank_grants(rows.clone(), &filter);
            let twice = rank_grants(rows, &filter);
            prop_assert_eq!(once, twice);
        }
    }
}
