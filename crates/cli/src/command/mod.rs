pub mod domain;
mod services;

pub use domain::{classify_error, CommandAction, CommandRequest, CommandResponse, CommandStatus, ResponseMeta};

use crate::config::Paging;
use grantscope_query::QueryEngine;
use services::Services;
use std::sync::Arc;
use std::time::Instant;

pub struct CommandHandler {
    engine: Arc<QueryEngine>,
    services: Services,
}

impl CommandHandler {
    pub fn new(engine: Arc<QueryEngine>, paging: Paging) -> Self {
        Self {
            services: Services::new(engine.clone(), paging),
            engine,
        }
    }

    pub fn engine(&self) -> &Arc<QueryEngine> {
        &self.engine
    }

    pub async fn execute(&self, request: CommandRequest) -> CommandResponse {
        let started = Instant::now();
        let CommandRequest { action, payload } = request;
        log::debug!("command action={}", action.as_str());

        let outcome = self.services.route(action, payload).await;
        let duration_ms = Some(started.elapsed().as_millis() as u64);
        let provider = Some(self.engine.provider_name().to_string());

        match outcome {
            Ok(mut outcome) => {
                outcome.meta.duration_ms = duration_ms;
                outcome.meta.provider = provider;
                outcome.meta.snapshot_version = self.engine.loaded_version();
                CommandResponse {
                    status: CommandStatus::Ok,
                    message: None,
                    error: None,
                    hints: outcome.hints,
                    data: outcome.data,
                    meta: outcome.meta,
                }
            }
            Err(err) => {
                let envelope = classify_error(&err, Some(action));
                log::debug!("command action={} failed: {}", action.as_str(), envelope.message);
                CommandResponse::error(
                    envelope,
                    ResponseMeta {
                        duration_ms,
                        provider,
                        snapshot_version: self.engine.loaded_version(),
                        ..Default::default()
                    },
                )
            }
        }
    }
}
