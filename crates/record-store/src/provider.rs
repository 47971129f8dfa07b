use crate::error::Result;
use crate::filter::{FoundationFilter, GrantFilter};
use crate::model::{Ein, Foundation, Grant, Officer};
use async_trait::async_trait;
use std::sync::Arc;

/// Read access to canonical grant, foundation and officer records.
///
/// Filters are hints: a provider may apply all, some or none of them. Row
/// order must be stable across calls for an unchanged dataset.
#[async_trait]
pub trait RecordProvider: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn grants(&self, filter: &GrantFilter) -> Result<Vec<Grant>>;

    async fn foundations(&self, filter: &FoundationFilter) -> Result<Vec<Foundation>>;

    async fn officers(&self, ein: Ein) -> Result<Vec<Officer>>;

    /// Re-reads the backing store ahead of a snapshot rebuild. Providers that
    /// always read live data keep the default no-op.
    async fn reload(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<P: RecordProvider + ?Sized> RecordProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn grants(&self, filter: &GrantFilter) -> Result<Vec<Grant>> {
        (**self).grants(filter).await
    }

    async fn foundations(&self, filter: &FoundationFilter) -> Result<Vec<Foundation>> {
        (**self).foundations(filter).await
    }

    async fn officers(&self, ein: Ein) -> Result<Vec<Officer>> {
        (**self).officers(ein).await
    }

    async fn reload(&self) -> Result<()> {
        (**self).reload().await
    }
}
