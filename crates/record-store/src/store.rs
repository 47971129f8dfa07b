use crate::error::{RecordStoreError, Result};
use crate::filter::{FoundationFilter, GrantFilter};
use crate::model::{Ein, Foundation, Grant, Officer};
use crate::provider::RecordProvider;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const RECORD_SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Record provider that scans in-memory tables, loaded from a JSON snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    foundations: Vec<Foundation>,
    grants: Vec<Grant>,
    officers: Vec<Officer>,
    path: Option<PathBuf>,
    skipped: usize,
}

#[derive(Debug, Serialize)]
struct PersistedRecords<'a> {
    schema_version: u32,
    foundations: &'a [Foundation],
    grants: &'a [Grant],
    officers: &'a [Officer],
}

/// Rows are decoded one at a time so a single malformed row is skipped
/// instead of failing the whole load.
#[derive(Debug, Deserialize)]
struct RawRecords {
    #[serde(default = "default_schema_version")]
    schema_version: u32,
    #[serde(default)]
    foundations: Vec<serde_json::Value>,
    #[serde(default)]
    grants: Vec<serde_json::Value>,
    #[serde(default, alias = "leaders")]
    officers: Vec<serde_json::Value>,
}

fn default_schema_version() -> u32 {
    RECORD_SNAPSHOT_SCHEMA_VERSION
}

impl MemoryProvider {
    pub fn new(foundations: Vec<Foundation>, grants: Vec<Grant>, officers: Vec<Officer>) -> Self {
        Self {
            foundations,
            grants,
            officers,
            path: None,
            skipped: 0,
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading record snapshot from {}", path.display());
        let bytes = tokio::fs::read(path).await?;
        let mut provider = Self::from_json_slice(&bytes)?;
        provider.path = Some(path.to_path_buf());
        log::info!(
            "Loaded {} foundation filings, {} grants, {} officers ({} rows skipped)",
            provider.foundations.len(),
            provider.grants.len(),
            provider.officers.len(),
            provider.skipped
        );
        Ok(provider)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let raw: RawRecords = serde_json::from_slice(bytes)?;
        if raw.schema_version != RECORD_SNAPSHOT_SCHEMA_VERSION {
            return Err(RecordStoreError::SchemaVersion {
                expected: RECORD_SNAPSHOT_SCHEMA_VERSION,
                found: raw.schema_version,
            });
        }

        let mut skipped = 0;
        let foundations = decode_rows("foundation", raw.foundations, &mut skipped);
        let grants = decode_rows("grant", raw.grants, &mut skipped);
        let officers = decode_rows("officer", raw.officers, &mut skipped);

        Ok(Self {
            foundations,
            grants,
            officers,
            path: None,
            skipped,
        })
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let persisted = PersistedRecords {
            schema_version: RECORD_SNAPSHOT_SCHEMA_VERSION,
            foundations: &self.foundations,
            grants: &self.grants,
            officers: &self.officers,
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        log::info!("Record snapshot saved to {}", path.display());
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Rows dropped during load because a required field could not be decoded.
    pub fn skipped_rows(&self) -> usize {
        self.skipped
    }

    pub fn grant_count(&self) -> usize {
        self.grants.len()
    }

    pub fn foundation_count(&self) -> usize {
        self.foundations.len()
    }
}

fn decode_rows<T: DeserializeOwned>(
    kind: &str,
    rows: Vec<serde_json::Value>,
    skipped: &mut usize,
) -> Vec<T> {
    let mut decoded = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        match serde_json::from_value(row) {
            Ok(value) => decoded.push(value),
            Err(err) => {
                *skipped += 1;
                log::warn!("Skipping malformed {kind} row #{idx}: {err}");
            }
        }
    }
    decoded
}

#[async_trait]
impl RecordProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn grants(&self, filter: &GrantFilter) -> Result<Vec<Grant>> {
        let filter = filter.clone().normalized();
        Ok(self
            .grants
            .iter()
            .filter(|grant| filter.matches(grant))
            .cloned()
            .collect())
    }

    async fn foundations(&self, filter: &FoundationFilter) -> Result<Vec<Foundation>> {
        Ok(self
            .foundations
            .iter()
            .filter(|foundation| filter.matches(foundation))
            .cloned()
            .collect())
    }

    async fn officers(&self, ein: Ein) -> Result<Vec<Officer>> {
        Ok(self
            .officers
            .iter()
            .filter(|officer| officer.foundation_ein == ein)
            .cloned()
            .collect())
    }
}

/// Snapshot-file provider whose contents can be re-read in place.
///
/// Queries run against the tables loaded last; `reload` swaps in a freshly
/// decoded copy and leaves the old one untouched if the file is unreadable.
#[derive(Debug)]
pub struct FileProvider {
    path: PathBuf,
    records: RwLock<Arc<MemoryProvider>>,
}

impl FileProvider {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = MemoryProvider::load(&path).await?;
        Ok(Self {
            path,
            records: RwLock::new(Arc::new(records)),
        })
    }

    async fn current(&self) -> Arc<MemoryProvider> {
        Arc::clone(&*self.records.read().await)
    }
}

#[async_trait]
impl RecordProvider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn grants(&self, filter: &GrantFilter) -> Result<Vec<Grant>> {
        self.current().await.grants(filter).await
    }

    async fn foundations(&self, filter: &FoundationFilter) -> Result<Vec<Foundation>> {
        self.current().await.foundations(filter).await
    }

    async fn officers(&self, ein: Ein) -> Result<Vec<Officer>> {
        self.current().await.officers(ein).await
    }

    async fn reload(&self) -> Result<()> {
        let fresh = MemoryProvider::load(&self.path).await?;
        *self.records.write().await = Arc::new(fresh);
        Ok(())
    }
}
