use grantscope_record_store::Officer;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfficerView {
    pub name: String,
    pub title: String,
    pub compensation: u64,
    pub benefits: u64,
    pub other_compensation: u64,
    pub total_compensation: u64,
    pub hours_per_week: f64,
    pub is_paid: bool,
}

impl OfficerView {
    pub fn new(officer: &Officer) -> Self {
        let compensation = officer.compensation.unwrap_or(0);
        let benefits = officer.benefits.unwrap_or(0);
        let other_compensation = officer.other_compensation.unwrap_or(0);
        let total_compensation = compensation
            .saturating_add(benefits)
            .saturating_add(other_compensation);
        Self {
            name: officer.person_name.clone().unwrap_or_default(),
            title: officer.title.clone().unwrap_or_default(),
            compensation,
            benefits,
            other_compensation,
            total_compensation,
            hours_per_week: officer.hours_per_week.unwrap_or(0.0),
            is_paid: total_compensation > 0,
        }
    }
}

/// Keeps the officers listed on the most recent filing. Rows without a tax
/// period are treated as current.
pub fn current_officers(officers: Vec<Officer>) -> Vec<Officer> {
    let latest = officers
        .iter()
        .filter_map(|officer| officer.tax_period.as_deref())
        .max()
        .map(str::to_string);
    match latest {
        None => officers,
        Some(latest) => officers
            .into_iter()
            .filter(|officer| {
                officer
                    .tax_period
                    .as_deref()
                    .map_or(true, |period| period == latest)
            })
            .collect(),
    }
}

/// Highest total compensation first, then title ascending.
pub fn rank_officers(officers: &[Officer]) -> Vec<OfficerView> {
    let mut ranked: Vec<OfficerView> = officers.iter().map(OfficerView::new).collect();
    ranked.sort_by(|a, b| {
        b.total_compensation
            .cmp(&a.total_compensation)
            .then_with(|| a.title.cmp(&b.title))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantscope_record_store::Ein;
    use pretty_assertions::assert_eq;

    fn officer(title: &str, compensation: u64) -> Officer {
        Officer::new(Ein::new(1), format!("{title} person"), title).paid(compensation)
    }

    #[test]
    fn ranks_by_total_then_title() {
        let officers = vec![officer("B", 100), officer("A", 200), officer("Z", 200)];
        let ranked: Vec<(u64, String)> = rank_officers(&officers)
            .into_iter()
            .map(|view| (view.total_compensation, view.title))
            .collect();

        assert_eq!(
            ranked,
            vec![(200, "A".to_string()), (200, "Z".to_string()), (100, "B".to_string())]
        );
    }

    #[test]
    fn total_sums_all_parts() {
        let mut trustee = Officer::new(Ein::new(1), "Kim", "Trustee");
        trustee.benefits = Some(25);
        trustee.other_compensation = Some(5);
        let view = OfficerView::new(&trustee);

        assert_eq!(view.compensation, 0);
        assert_eq!(view.total_compensation, 30);
        assert!(view.is_paid);
    }

    #[test]
    fn volunteer_is_unpaid() {
        let view = OfficerView::new(&Officer::new(Ein::new(1), "Lee", "Director"));
        assert_eq!(view.total_compensation, 0);
        assert!(!view.is_paid);
        assert_eq!(view.hours_per_week, 0.0);
    }

    #[test]
    fn older_filings_are_dropped() {
        let mut old = officer("Chair", 10);
        old.tax_period = Some("2021-12-31".to_string());
        let mut current = officer("Chair", 20);
        current.tax_period = Some("2022-12-31".to_string());
        let undated = officer("Secretary", 0);

        let kept = current_officers(vec![old, current.clone(), undated.clone()]);
        assert_eq!(kept, vec![current, undated]);
    }
}
