//! Per-foundation rollups.
//!
//! Every aggregate walks grants in one canonical order: reported amount
//! descending, stable over provider order. First-seen tie breaks (cities,
//! purposes, primary state) are therefore deterministic for a given dataset.

use crate::stats::{lower_median, saturating_sum, truncated_mean};
use grantscope_record_store::Grant;
use serde::{Serialize, Serializer};
use std::collections::{BTreeSet, HashMap, HashSet};

pub const MAX_CITIES_SERVED: usize = 10;
pub const TOP_PURPOSES: usize = 3;

/// Derived statistics over one foundation's reported grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundationStats {
    pub grant_count: usize,
    pub total_amount: u64,
    pub median_grant: u64,
    pub avg_grant: u64,
    pub min_grant: u64,
    pub max_grant: u64,
    /// Sorted ascending.
    pub states_served: Vec<String>,
    pub cities_served: Vec<String>,
    pub top_purposes: Vec<String>,
    #[serde(serialize_with = "empty_if_none")]
    pub latest_period: Option<String>,
    #[serde(serialize_with = "empty_if_none")]
    pub primary_state: Option<String>,
}

impl FoundationStats {
    /// Stats of a foundation that exists but has no reported grants.
    pub fn empty() -> Self {
        Self {
            grant_count: 0,
            total_amount: 0,
            median_grant: 0,
            avg_grant: 0,
            min_grant: 0,
            max_grant: 0,
            states_served: Vec::new(),
            cities_served: Vec::new(),
            top_purposes: Vec::new(),
            latest_period: None,
            primary_state: None,
        }
    }

    pub fn serves_state(&self, state: &str) -> bool {
        self.states_served
            .iter()
            .any(|served| served.eq_ignore_ascii_case(state))
    }
}

pub(crate) fn empty_if_none<S: Serializer>(
    value: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

/// Reported grants paired with their amount, amount descending.
pub fn canonical_order<'a, I>(grants: I) -> Vec<(&'a Grant, u64)>
where
    I: IntoIterator<Item = &'a Grant>,
{
    let mut ordered: Vec<(&Grant, u64)> = grants
        .into_iter()
        .filter_map(|grant| grant.reported_amount().map(|amount| (grant, amount)))
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));
    ordered
}

/// Rolls up one foundation's grants. `None` when none carries an amount.
pub fn aggregate_grants<'a, I>(grants: I) -> Option<FoundationStats>
where
    I: IntoIterator<Item = &'a Grant>,
{
    let ordered = canonical_order(grants);
    if ordered.is_empty() {
        return None;
    }

    let mut amounts: Vec<u64> = ordered.iter().map(|(_, amount)| *amount).collect();
    amounts.sort_unstable();
    let grant_count = amounts.len();
    let total_amount = saturating_sum(amounts.iter().copied());

    let mut states_served = BTreeSet::new();
    let mut cities_served = Vec::new();
    let mut seen_cities = HashSet::new();
    let mut purposes: Vec<(&str, usize)> = Vec::new();
    let mut purpose_slots: HashMap<&str, usize> = HashMap::new();
    let mut state_totals: Vec<(&str, u64)> = Vec::new();
    let mut state_slots: HashMap<&str, usize> = HashMap::new();
    let mut latest_period: Option<&str> = None;

    for (grant, amount) in &ordered {
        if let Some(state) = grant.state() {
            states_served.insert(state.to_string());
            let slot = *state_slots.entry(state).or_insert_with(|| {
                state_totals.push((state, 0));
                state_totals.len() - 1
            });
            state_totals[slot].1 = state_totals[slot].1.saturating_add(*amount);
        }

        if let Some(city) = grant.city() {
            if cities_served.len() < MAX_CITIES_SERVED && seen_cities.insert(city) {
                cities_served.push(city.to_string());
            }
        }

        if let Some(purpose) = grant.purpose_text() {
            let slot = *purpose_slots.entry(purpose).or_insert_with(|| {
                purposes.push((purpose, 0));
                purposes.len() - 1
            });
            purposes[slot].1 += 1;
        }

        if let Some(period) = grant.period_text() {
            if latest_period.map_or(true, |latest| period > latest) {
                latest_period = Some(period);
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    purposes.sort_by(|a, b| b.1.cmp(&a.1));
    let top_purposes = purposes
        .into_iter()
        .take(TOP_PURPOSES)
        .map(|(purpose, _)| purpose.to_string())
        .collect();

    let mut primary_state: Option<(&str, u64)> = None;
    for (state, total) in state_totals {
        if primary_state.map_or(true, |(_, best)| total > best) {
            primary_state = Some((state, total));
        }
    }

    Some(FoundationStats {
        grant_count,
        total_amount,
        median_grant: lower_median(&amounts).unwrap_or(0),
        avg_grant: truncated_mean(total_amount, grant_count),
        min_grant: amounts[0],
        max_grant: amounts[grant_count - 1],
        states_served: states_served.into_iter().collect(),
        cities_served,
        top_purposes,
        latest_period: latest_period.map(str::to_string),
        primary_state: primary_state.map(|(state, _)| state.to_string()),
    })
}
