//! # Grantscope Record Store
//!
//! Typed grant, foundation and officer records and the [`RecordProvider`]
//! boundary the query engine reads them through.
//!
//! ## Architecture
//!
//! ```text
//! Snapshot JSON / remote table
//!     │
//!     ├──> lenient row decoding
//!     │      └─> Grant / Foundation / Officer
//!     │
//!     └──> RecordProvider
//!            ├─> grants(GrantFilter)        (predicate pushdown)
//!            ├─> foundations(FoundationFilter)
//!            └─> officers(Ein)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use grantscope_record_store::{GrantFilter, MemoryProvider, RecordProvider};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = MemoryProvider::load("records.json").await?;
//!     let filter = GrantFilter {
//!         state: Some("CA".to_string()),
//!         ..GrantFilter::default()
//!     };
//!     for grant in provider.grants(&filter).await? {
//!         println!("{:?} {:?}", grant.recipient_name, grant.grant_amount);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod filter;
mod lenient;
mod model;
mod provider;
mod store;

pub use error::{RecordStoreError, Result};
pub use filter::{contains_ignore_case, FoundationFilter, GrantFilter};
pub use model::{Ein, Foundation, Grant, Officer};
pub use provider::RecordProvider;
pub use store::{FileProvider, MemoryProvider, RECORD_SNAPSHOT_SCHEMA_VERSION};
