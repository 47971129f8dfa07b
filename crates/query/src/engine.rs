use crate::aggregate::{aggregate_grants, FoundationStats};
use crate::error::{QueryError, Result};
use crate::foundation_search::{search_foundations, FoundationQuery};
use crate::global::GlobalStats;
use crate::grant_search::{rank_grants, GrantQuery};
use crate::officers::{current_officers, rank_officers, OfficerView};
use crate::snapshot::{AggregateCache, AggregateSnapshot};
use crate::states::{state_breakdown, StateStat};
use crate::views::{
    FoundationBasic, FoundationDetail, FoundationProfile, FoundationStatsReport,
    FoundationSummary, GrantView, SnapshotInfo,
};
use grantscope_protocol::{PageEnvelope, PageRequest};
use grantscope_record_store::{
    contains_ignore_case, Ein, Foundation, FoundationFilter, Grant, GrantFilter, RecordProvider,
};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const FOUNDATION_NAMES_LIMIT: usize = 50;
pub const TOP_GRANTS: usize = 10;
pub const RECENT_GRANTS: usize = 10;

/// Query surface over one record provider and its aggregate snapshot.
pub struct QueryEngine {
    provider: Arc<dyn RecordProvider>,
    cache: AggregateCache,
}

impl QueryEngine {
    pub fn new(provider: Arc<dyn RecordProvider>) -> Self {
        Self {
            provider,
            cache: AggregateCache::new(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn ensure_loaded(&self) -> Result<Arc<AggregateSnapshot>> {
        self.cache.ensure_loaded(self.provider.as_ref()).await
    }

    /// Re-reads the provider and swaps in a rebuilt snapshot.
    pub async fn refresh(&self) -> Result<SnapshotInfo> {
        self.provider.reload().await?;
        let snapshot = self.cache.refresh(self.provider.as_ref()).await?;
        Ok(snapshot.info())
    }

    /// Version of the snapshot readers currently see, if one was built.
    pub fn loaded_version(&self) -> Option<u64> {
        self.cache.current().map(|snapshot| snapshot.version())
    }

    pub async fn snapshot_info(&self) -> Result<SnapshotInfo> {
        Ok(self.ensure_loaded().await?.info())
    }

    pub async fn search_grants(
        &self,
        query: &GrantQuery,
        page: PageRequest,
    ) -> Result<PageEnvelope<GrantView>> {
        query.validate()?;
        let snapshot = self.ensure_loaded().await?;

        let foundations = match query.foundation_name() {
            None => None,
            Some(name) => {
                let by_name = FoundationFilter::by_name(name);
                let eins: BTreeSet<Ein> = self
                    .provider
                    .foundations(&by_name)
                    .await?
                    .into_iter()
                    .filter(|filing| by_name.matches(filing))
                    .map(|filing| filing.ein)
                    .collect();
                if eins.is_empty() {
                    log::debug!("search_grants: no foundation matches {name:?}");
                    return Ok(PageEnvelope::empty(page));
                }
                Some(eins)
            }
        };

        let filter = query.to_filter(foundations);
        let rows = self.provider.grants(&filter).await?;
        let ranked = rank_grants(rows, &filter);
        log::debug!("search_grants: {} matches for {:?}", ranked.len(), filter);

        let results = page
            .slice(&ranked)
            .iter()
            .map(|grant| GrantView::new(grant, snapshot.foundation_name(grant.foundation_ein)))
            .collect();
        Ok(PageEnvelope::new(results, ranked.len(), page))
    }

    pub async fn get_stats(&self) -> Result<GlobalStats> {
        Ok(self.ensure_loaded().await?.global().clone())
    }

    pub async fn search_foundations(
        &self,
        query: &FoundationQuery,
        page: PageRequest,
    ) -> Result<PageEnvelope<FoundationSummary>> {
        query.validate()?;
        let snapshot = self.ensure_loaded().await?;
        let found = search_foundations(snapshot.entries(), query, page);
        log::debug!("search_foundations: {} matches", found.total);
        Ok(found)
    }

    pub async fn get_foundation_detail(&self, ein: Ein) -> Result<FoundationDetail> {
        let filing = self.latest_filing(ein).await?;
        let grants = self.foundation_grants(ein).await?;
        let stats = aggregate_grants(&grants).unwrap_or_else(FoundationStats::empty);
        let name = filing.name().unwrap_or_default().to_string();

        let grants = rank_grants(grants, &GrantFilter::default())
            .iter()
            .map(|grant| GrantView::new(grant, &name))
            .collect();
        Ok(FoundationDetail {
            profile: FoundationProfile::new(&filing),
            stats,
            grants,
        })
    }

    pub async fn get_foundation_stats(&self, ein: Ein) -> Result<FoundationStatsReport> {
        let filing = self.latest_filing(ein).await?;
        let grants = self.foundation_grants(ein).await?;
        let stats = aggregate_grants(&grants).unwrap_or_else(FoundationStats::empty);
        let name = filing.name().unwrap_or_default();

        // Both lists cover every grant, reported or not.
        let top_grants = rank_grants(grants.clone(), &GrantFilter::default())
            .iter()
            .take(TOP_GRANTS)
            .map(|grant| GrantView::new(grant, name))
            .collect();

        let mut by_period: Vec<&Grant> = grants.iter().collect();
        // Undated grants sort last.
        by_period.sort_by(|a, b| b.period_text().cmp(&a.period_text()));
        let recent_grants = by_period
            .into_iter()
            .take(RECENT_GRANTS)
            .map(|grant| GrantView::new(grant, name))
            .collect();

        let officers = self.get_foundation_officers(ein).await?;

        Ok(FoundationStatsReport {
            profile: FoundationProfile::new(&filing),
            states_data: state_breakdown(&grants),
            stats,
            top_grants,
            recent_grants,
            officers,
        })
    }

    /// Officers of the most recent filing, highest paid first. Empty for an
    /// unknown EIN.
    pub async fn get_foundation_officers(&self, ein: Ein) -> Result<Vec<OfficerView>> {
        let officers: Vec<_> = self
            .provider
            .officers(ein)
            .await?
            .into_iter()
            .filter(|officer| officer.foundation_ein == ein)
            .collect();
        Ok(rank_officers(&current_officers(officers)))
    }

    /// Empty for an unknown EIN.
    pub async fn get_foundation_state_breakdown(&self, ein: Ein) -> Result<Vec<StateStat>> {
        let grants = self.foundation_grants(ein).await?;
        Ok(state_breakdown(&grants))
    }

    /// Sorted unique organization names, optionally narrowed by a
    /// case-insensitive fragment.
    pub async fn foundation_names(&self, fragment: Option<&str>) -> Result<Vec<String>> {
        let snapshot = self.ensure_loaded().await?;
        let fragment = fragment.map(str::trim).filter(|text| !text.is_empty());
        let names: BTreeSet<&str> = snapshot
            .filings()
            .filter_map(Foundation::name)
            .filter(|name| fragment.map_or(true, |needle| contains_ignore_case(name, needle)))
            .collect();
        Ok(names
            .into_iter()
            .take(FOUNDATION_NAMES_LIMIT)
            .map(str::to_string)
            .collect())
    }

    pub async fn get_foundation_basic(&self, ein: Ein) -> Result<FoundationBasic> {
        let snapshot = self.ensure_loaded().await?;
        let filing = snapshot.filing(ein).ok_or(QueryError::NotFound(ein))?;
        let (grant_count, total_amount) = snapshot
            .entry(ein)
            .map(|entry| (entry.stats.grant_count, entry.stats.total_amount))
            .unwrap_or((0, 0));
        Ok(FoundationBasic {
            ein: ein.to_string(),
            name: filing.name().unwrap_or_default().to_string(),
            grant_count,
            total_amount,
        })
    }

    async fn latest_filing(&self, ein: Ein) -> Result<Foundation> {
        let filings: Vec<Foundation> = self
            .provider
            .foundations(&FoundationFilter::by_ein(ein))
            .await?
            .into_iter()
            .filter(|filing| filing.ein == ein)
            .collect();
        Foundation::latest(&filings)
            .cloned()
            .ok_or(QueryError::NotFound(ein))
    }

    async fn foundation_grants(&self, ein: Ein) -> Result<Vec<Grant>> {
        let filter = GrantFilter::for_foundation(ein);
        let grants: Vec<Grant> = self
            .provider
            .grants(&filter)
            .await?
            .into_iter()
            .filter(|grant| filter.matches(grant))
            .collect();
        Ok(grants)
    }
}
