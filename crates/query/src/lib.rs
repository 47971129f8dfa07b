//! # Grantscope Query
//!
//! Aggregation and query engine over grant disbursement records.
//!
//! ```text
//! RecordProvider ──> AggregateSnapshot (per-foundation stats, global stats)
//!       │                   │
//!       │                   ├─> search_foundations / get_stats / names
//!       │                   └─> foundation names for grant rows
//!       └──> search_grants / foundation detail / officers / state breakdown
//! ```

mod aggregate;
mod engine;
mod error;
mod foundation_search;
mod global;
mod grant_search;
mod officers;
mod snapshot;
mod states;
mod stats;
mod views;

pub use aggregate::{aggregate_grants, FoundationStats, MAX_CITIES_SERVED, TOP_PURPOSES};
pub use engine::{QueryEngine, FOUNDATION_NAMES_LIMIT, RECENT_GRANTS, TOP_GRANTS};
pub use error::{QueryError, Result};
pub use foundation_search::FoundationQuery;
pub use global::GlobalStats;
pub use grant_search::GrantQuery;
pub use officers::OfficerView;
pub use snapshot::{AggregateCache, AggregateSnapshot, FoundationEntry};
pub use states::StateStat;
pub use stats::lower_median;
pub use views::{
    FoundationBasic, FoundationDetail, FoundationProfile, FoundationStatsReport,
    FoundationSummary, GrantView, SnapshotInfo,
};
