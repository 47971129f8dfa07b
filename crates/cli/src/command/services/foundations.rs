use super::degrade;
use crate::command::domain::{
    parse_payload, CommandAction, CommandOutcome, EinPayload, FoundationNamesPayload,
    SearchFoundationsPayload,
};
use crate::config::Paging;
use anyhow::Result;
use grantscope_protocol::PageEnvelope;
use grantscope_query::QueryEngine;
use serde_json::Value;
use std::sync::Arc;

pub(crate) struct FoundationService {
    engine: Arc<QueryEngine>,
    paging: Paging,
}

impl FoundationService {
    pub fn new(engine: Arc<QueryEngine>, paging: Paging) -> Self {
        Self { engine, paging }
    }

    pub async fn search(&self, payload: Value) -> Result<CommandOutcome> {
        let payload: SearchFoundationsPayload = parse_payload(payload)?;
        let page = self.paging.request(payload.page, payload.per_page);
        let result = self.engine.search_foundations(&payload.query, page).await;
        degrade(CommandAction::SearchFoundations, result, || PageEnvelope::empty(page))
    }

    pub async fn detail(&self, payload: Value) -> Result<CommandOutcome> {
        let EinPayload { ein } = parse_payload(payload)?;
        let result = self.engine.get_foundation_detail(ein).await.map(Some);
        degrade(CommandAction::GetFoundationDetail, result, || None)
    }

    pub async fn stats(&self, payload: Value) -> Result<CommandOutcome> {
        let EinPayload { ein } = parse_payload(payload)?;
        let result = self.engine.get_foundation_stats(ein).await.map(Some);
        degrade(CommandAction::GetFoundationStats, result, || None)
    }

    pub async fn officers(&self, payload: Value) -> Result<CommandOutcome> {
        let EinPayload { ein } = parse_payload(payload)?;
        let result = self.engine.get_foundation_officers(ein).await;
        degrade(CommandAction::GetFoundationOfficers, result, Vec::new)
    }

    pub async fn state_breakdown(&self, payload: Value) -> Result<CommandOutcome> {
        let EinPayload { ein } = parse_payload(payload)?;
        let result = self.engine.get_foundation_state_breakdown(ein).await;
        degrade(CommandAction::GetFoundationStateBreakdown, result, Vec::new)
    }

    pub async fn names(&self, payload: Value) -> Result<CommandOutcome> {
        let payload: FoundationNamesPayload = parse_payload(payload)?;
        let result = self.engine.foundation_names(payload.query.as_deref()).await;
        degrade(CommandAction::FoundationNames, result, Vec::new)
    }

    pub async fn basic(&self, payload: Value) -> Result<CommandOutcome> {
        let EinPayload { ein } = parse_payload(payload)?;
        let result = self.engine.get_foundation_basic(ein).await.map(Some);
        degrade(CommandAction::GetFoundationBasic, result, || None)
    }
}
