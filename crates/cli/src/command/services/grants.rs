use super::degrade;
use crate::command::domain::{parse_payload, CommandAction, CommandOutcome, SearchGrantsPayload};
use crate::config::Paging;
use anyhow::Result;
use grantscope_protocol::PageEnvelope;
use grantscope_query::QueryEngine;
use serde_json::Value;
use std::sync::Arc;

pub(crate) struct GrantService {
    engine: Arc<QueryEngine>,
    paging: Paging,
}

impl GrantService {
    pub fn new(engine: Arc<QueryEngine>, paging: Paging) -> Self {
        Self { engine, paging }
    }

    pub async fn search(&self, payload: Value) -> Result<CommandOutcome> {
        let payload: SearchGrantsPayload = parse_payload(payload)?;
        let page = self.paging.request(payload.page, payload.per_page);
        let result = self.engine.search_grants(&payload.query, page).await;
        degrade(CommandAction::SearchGrants, result, || PageEnvelope::empty(page))
    }
}
