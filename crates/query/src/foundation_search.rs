use crate::error::{self, check_range};
use crate::snapshot::FoundationEntry;
use crate::views::FoundationSummary;
use grantscope_protocol::{PageEnvelope, PageRequest};
use grantscope_record_store::contains_ignore_case;
use serde::Deserialize;

/// Predicates over per-foundation aggregates. All optional, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FoundationQuery {
    #[serde(alias = "foundation", alias = "name")]
    pub foundation_name: Option<String>,
    /// A state the foundation has made grants into.
    pub state: Option<String>,
    pub min_total: Option<u64>,
    pub max_total: Option<u64>,
    pub min_grants: Option<usize>,
    pub min_median: Option<u64>,
    pub max_median: Option<u64>,
}

fn needle(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

impl FoundationQuery {
    pub fn validate(&self) -> error::Result<()> {
        check_range("total", self.min_total, self.max_total)?;
        check_range("median", self.min_median, self.max_median)
    }

    pub fn matches(&self, entry: &FoundationEntry) -> bool {
        let stats = &entry.stats;
        if let Some(name) = needle(&self.foundation_name) {
            if !contains_ignore_case(entry.name(), name) {
                return false;
            }
        }
        if let Some(state) = needle(&self.state) {
            if !stats.serves_state(state) {
                return false;
            }
        }
        if self.min_total.is_some_and(|min| stats.total_amount < min)
            || self.max_total.is_some_and(|max| stats.total_amount > max)
        {
            return false;
        }
        if self.min_grants.is_some_and(|min| stats.grant_count < min) {
            return false;
        }
        if self.min_median.is_some_and(|min| stats.median_grant < min)
            || self.max_median.is_some_and(|max| stats.median_grant > max)
        {
            return false;
        }
        true
    }
}

/// `entries` is already ordered by total amount descending.
pub fn search_foundations(
    entries: &[FoundationEntry],
    query: &FoundationQuery,
    page: PageRequest,
) -> PageEnvelope<FoundationSummary> {
    let matched: Vec<&FoundationEntry> = entries.iter().filter(|entry| query.matches(entry)).collect();
    let results = page
        .slice(&matched)
        .iter()
        .map(|entry| entry.summary())
        .collect();
    PageEnvelope::new(results, matched.len(), page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::AggregateSnapshot;
    use grantscope_record_store::{Ein, Foundation, Grant};
    use pretty_assertions::assert_eq;

    fn snapshot() -> AggregateSnapshot {
        let foundations = vec![
            Foundation::new(Ein::new(1), "Alpha Family Foundation"),
            Foundation::new(Ein::new(2), "Beta Trust"),
            Foundation::new(Ein::new(3), "Gamma Family Fund"),
            Foundation::new(Ein::new(4), "Dormant Foundation"),
        ];
        let grants = vec![
            Grant::new(Ein::new(1), Some(100)).located("Austin", "TX"),
            Grant::new(Ein::new(1), Some(300)).located("Reno", "NV"),
            Grant::new(Ein::new(2), Some(1_000)).located("Boston", "MA"),
            Grant::new(Ein::new(3), Some(50)).located("Dallas", "TX"),
            Grant::new(Ein::new(4), None),
        ];
        AggregateSnapshot::from_records(1, foundations, &grants)
    }

    fn names(page: &PageEnvelope<FoundationSummary>) -> Vec<&str> {
        page.results.iter().map(|row| row.name.as_str()).collect()
    }

    #[test]
    fn orders_by_total_and_excludes_zero_grant_foundations() {
        let snapshot = snapshot();
        let page = search_foundations(snapshot.entries(), &FoundationQuery::default(), PageRequest::default());

        assert_eq!(page.total, 3);
        assert_eq!(names(&page), vec!["Beta Trust", "Alpha Family Foundation", "Gamma Family Fund"]);
    }

    #[test]
    fn predicates_combine_with_and() {
        let snapshot = snapshot();
        let query = FoundationQuery {
            foundation_name: Some("family".to_string()),
            state: Some("tx".to_string()),
            min_total: Some(100),
            ..FoundationQuery::default()
        };
        let page = search_foundations(snapshot.entries(), &query, PageRequest::default());
        assert_eq!(names(&page), vec!["Alpha Family Foundation"]);
    }

    #[test]
    fn median_and_count_bounds() {
        let snapshot = snapshot();
        let query = FoundationQuery {
            min_grants: Some(2),
            max_median: Some(100),
            ..FoundationQuery::default()
        };
        let page = search_foundations(snapshot.entries(), &query, PageRequest::default());
        assert_eq!(names(&page), vec!["Alpha Family Foundation"]);
        assert_eq!(page.results[0].stats.median_grant, 100);
    }

    #[test]
    fn pages_past_the_end_are_empty() {
        let snapshot = snapshot();
        let page = search_foundations(
            snapshot.entries(),
            &FoundationQuery::default(),
            PageRequest::new(Some(2), Some(2)),
        );
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(names(&page), vec!["Gamma Family Fund"]);

        let beyond = search_foundations(
            snapshot.entries(),
            &FoundationQuery::default(),
            PageRequest::new(Some(9), Some(2)),
        );
        assert!(beyond.results.is_empty());
        assert_eq!(beyond.total, 3);
    }
}
