mod capabilities;
mod dataset;
mod foundations;
mod grants;

use crate::command::domain::{CommandAction, CommandOutcome, Hint, HintKind};
use crate::config::Paging;
use anyhow::Result;
use grantscope_query::QueryEngine;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub struct Services {
    capabilities: capabilities::CapabilitiesService,
    dataset: dataset::DatasetService,
    foundations: foundations::FoundationService,
    grants: grants::GrantService,
}

impl Services {
    pub fn new(engine: Arc<QueryEngine>, paging: Paging) -> Self {
        Self {
            capabilities: capabilities::CapabilitiesService,
            dataset: dataset::DatasetService::new(engine.clone()),
            foundations: foundations::FoundationService::new(engine.clone(), paging),
            grants: grants::GrantService::new(engine, paging),
        }
    }

    pub async fn route(&self, action: CommandAction, payload: Value) -> Result<CommandOutcome> {
        match action {
            CommandAction::SearchGrants => self.grants.search(payload).await,
            CommandAction::GetStats => self.dataset.stats().await,
            CommandAction::SearchFoundations => self.foundations.search(payload).await,
            CommandAction::GetFoundationDetail => self.foundations.detail(payload).await,
            CommandAction::GetFoundationStats => self.foundations.stats(payload).await,
            CommandAction::GetFoundationOfficers => self.foundations.officers(payload).await,
            CommandAction::GetFoundationStateBreakdown => {
                self.foundations.state_breakdown(payload).await
            }
            CommandAction::FoundationNames => self.foundations.names(payload).await,
            CommandAction::GetFoundationBasic => self.foundations.basic(payload).await,
            CommandAction::SnapshotInfo => self.dataset.snapshot_info().await,
            CommandAction::Refresh => self.dataset.refresh().await,
            CommandAction::Capabilities => self.capabilities.run(),
        }
    }
}

/// Provider failures keep the "empty result, success status" contract: the
/// failure is logged, `fallback` is returned and the response is flagged
/// degraded. Every other error propagates.
pub(crate) fn degrade<T: Serialize>(
    action: CommandAction,
    result: grantscope_query::Result<T>,
    fallback: impl FnOnce() -> T,
) -> Result<CommandOutcome> {
    match result {
        Ok(value) => CommandOutcome::from_value(value),
        Err(err) if err.is_provider_failure() => {
            log::warn!("{} answered empty after provider failure: {err}", action.as_str());
            let mut outcome = CommandOutcome::from_value(fallback())?;
            outcome.meta.degraded = Some(true);
            outcome.hints.push(Hint {
                kind: HintKind::Warn,
                text: "Record provider unavailable; result is empty.".to_string(),
            });
            Ok(outcome)
        }
        Err(err) => Err(err.into()),
    }
}
