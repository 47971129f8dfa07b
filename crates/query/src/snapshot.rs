//! Versioned, read-only aggregate snapshot and the copy-on-refresh handle
//! readers load it through.
//!
//! A rebuild assembles a complete [`AggregateSnapshot`] off to the side and
//! swaps it in with one atomic store. Readers holding the previous `Arc` keep
//! using it undisturbed.

use crate::aggregate::{aggregate_grants, FoundationStats};
use crate::error::Result;
use crate::global::GlobalStats;
use crate::views::{FoundationSummary, SnapshotInfo};
use arc_swap::ArcSwapOption;
use grantscope_record_store::{Ein, Foundation, FoundationFilter, Grant, GrantFilter, RecordProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// A foundation with at least one reported grant.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundationEntry {
    pub ein: Ein,
    /// Most recent filing.
    pub filing: Foundation,
    pub stats: FoundationStats,
}

impl FoundationEntry {
    pub fn name(&self) -> &str {
        self.filing.name().unwrap_or_default()
    }

    pub fn summary(&self) -> FoundationSummary {
        FoundationSummary {
            ein: self.ein.to_string(),
            name: self.name().to_string(),
            city: self.filing.city.clone().unwrap_or_default(),
            state: self.filing.state.clone().unwrap_or_default(),
            stats: self.stats.clone(),
        }
    }
}

#[derive(Debug)]
pub struct AggregateSnapshot {
    version: u64,
    built_at_ms: u64,
    /// Total amount descending, EIN ascending on ties.
    entries: Vec<FoundationEntry>,
    index: HashMap<Ein, usize>,
    /// Latest filing of every known foundation, with or without grants.
    filings: HashMap<Ein, Foundation>,
    global: GlobalStats,
}

impl AggregateSnapshot {
    pub async fn build(provider: &dyn RecordProvider, version: u64) -> Result<Self> {
        let started = Instant::now();
        let foundations = provider.foundations(&FoundationFilter::default()).await?;
        let grants = provider.grants(&GrantFilter::default()).await?;
        let snapshot = Self::from_records(version, foundations, &grants);
        log::info!(
            "Built aggregate snapshot v{} from {} ({} foundations, {} with grants, {} grants) in {:?}",
            version,
            provider.name(),
            snapshot.filings.len(),
            snapshot.entries.len(),
            grants.len(),
            started.elapsed()
        );
        Ok(snapshot)
    }

    /// Pure construction from already-fetched records.
    pub fn from_records(version: u64, foundations: Vec<Foundation>, grants: &[Grant]) -> Self {
        let mut by_ein: HashMap<Ein, Vec<Foundation>> = HashMap::new();
        for filing in foundations {
            by_ein.entry(filing.ein).or_default().push(filing);
        }
        let filings: HashMap<Ein, Foundation> = by_ein
            .into_iter()
            .filter_map(|(ein, filings)| Foundation::latest(&filings).cloned().map(|latest| (ein, latest)))
            .collect();

        let mut grants_by_ein: HashMap<Ein, Vec<&Grant>> = HashMap::new();
        for grant in grants {
            grants_by_ein.entry(grant.foundation_ein).or_default().push(grant);
        }

        let mut entries: Vec<FoundationEntry> = filings
            .iter()
            .filter_map(|(ein, filing)| {
                let stats = aggregate_grants(grants_by_ein.get(ein)?.iter().copied())?;
                Some(FoundationEntry {
                    ein: *ein,
                    filing: filing.clone(),
                    stats,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.stats
                .total_amount
                .cmp(&a.stats.total_amount)
                .then_with(|| a.ein.cmp(&b.ein))
        });
        let index = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.ein, idx))
            .collect();

        let global = GlobalStats::compute(grants, filings.len(), entries.iter().map(|entry| &entry.stats));

        Self {
            version,
            built_at_ms: now_ms(),
            entries,
            index,
            filings,
            global,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn entries(&self) -> &[FoundationEntry] {
        &self.entries
    }

    pub fn entry(&self, ein: Ein) -> Option<&FoundationEntry> {
        self.index.get(&ein).map(|idx| &self.entries[*idx])
    }

    pub fn filing(&self, ein: Ein) -> Option<&Foundation> {
        self.filings.get(&ein)
    }

    pub fn filings(&self) -> impl Iterator<Item = &Foundation> {
        self.filings.values()
    }

    /// Name from the latest filing, `""` when unknown.
    pub fn foundation_name(&self, ein: Ein) -> &str {
        self.filing(ein)
            .and_then(Foundation::name)
            .unwrap_or_default()
    }

    pub fn global(&self) -> &GlobalStats {
        &self.global
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            version: self.version,
            built_at_ms: self.built_at_ms,
            foundations: self.filings.len(),
            foundations_with_grants: self.entries.len(),
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// Single-assignment handle to the current snapshot.
#[derive(Debug, Default)]
pub struct AggregateCache {
    current: ArcSwapOption<AggregateSnapshot>,
    rebuild: Mutex<()>,
    versions: AtomicU64,
}

impl AggregateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<AggregateSnapshot>> {
        self.current.load_full()
    }

    /// Returns the current snapshot, building the first one if needed.
    pub async fn ensure_loaded(&self, provider: &dyn RecordProvider) -> Result<Arc<AggregateSnapshot>> {
        if let Some(snapshot) = self.current.load_full() {
            return Ok(snapshot);
        }
        let _guard = self.rebuild.lock().await;
        // Another caller may have finished the first build while we waited.
        if let Some(snapshot) = self.current.load_full() {
            return Ok(snapshot);
        }
        self.rebuild_locked(provider).await
    }

    /// Builds a fresh snapshot and swaps it in. Concurrent calls run one at a
    /// time. On failure the previous snapshot stays in place.
    pub async fn refresh(&self, provider: &dyn RecordProvider) -> Result<Arc<AggregateSnapshot>> {
        let _guard = self.rebuild.lock().await;
        self.rebuild_locked(provider).await
    }

    async fn rebuild_locked(&self, provider: &dyn RecordProvider) -> Result<Arc<AggregateSnapshot>> {
        let version = self.versions.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(AggregateSnapshot::build(provider, version).await?);
        self.current.store(Some(Arc::clone(&snapshot)));
        Ok(snapshot)
    }
}
