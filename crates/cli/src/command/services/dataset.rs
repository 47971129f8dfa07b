use super::degrade;
use crate::command::domain::{CommandAction, CommandOutcome};
use anyhow::Result;
use grantscope_query::{GlobalStats, QueryEngine};
use std::sync::Arc;

/// Dataset-wide answers and snapshot lifecycle.
pub(crate) struct DatasetService {
    engine: Arc<QueryEngine>,
}

impl DatasetService {
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        Self { engine }
    }

    pub async fn stats(&self) -> Result<CommandOutcome> {
        let result = self.engine.get_stats().await;
        degrade(CommandAction::GetStats, result, GlobalStats::default)
    }

    pub async fn snapshot_info(&self) -> Result<CommandOutcome> {
        CommandOutcome::from_value(self.engine.snapshot_info().await?)
    }

    pub async fn refresh(&self) -> Result<CommandOutcome> {
        let info = self.engine.refresh().await?;
        log::info!("Snapshot refreshed to v{}", info.version);
        CommandOutcome::from_value(info)
    }
}
