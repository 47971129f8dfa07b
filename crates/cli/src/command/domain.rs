use anyhow::Result;
use grantscope_protocol::{ErrorCode, ErrorEnvelope};
use grantscope_query::{FoundationQuery, GrantQuery, QueryError};
use grantscope_record_store::Ein;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub action: CommandAction,
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    #[serde(alias = "search")]
    SearchGrants,
    #[serde(alias = "stats")]
    GetStats,
    SearchFoundations,
    GetFoundationDetail,
    GetFoundationStats,
    GetFoundationOfficers,
    GetFoundationStateBreakdown,
    FoundationNames,
    GetFoundationBasic,
    SnapshotInfo,
    Refresh,
    Capabilities,
}

impl CommandAction {
    pub const ALL: [CommandAction; 12] = [
        CommandAction::SearchGrants,
        CommandAction::GetStats,
        CommandAction::SearchFoundations,
        CommandAction::GetFoundationDetail,
        CommandAction::GetFoundationStats,
        CommandAction::GetFoundationOfficers,
        CommandAction::GetFoundationStateBreakdown,
        CommandAction::FoundationNames,
        CommandAction::GetFoundationBasic,
        CommandAction::SnapshotInfo,
        CommandAction::Refresh,
        CommandAction::Capabilities,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CommandAction::SearchGrants => "search_grants",
            CommandAction::GetStats => "get_stats",
            CommandAction::SearchFoundations => "search_foundations",
            CommandAction::GetFoundationDetail => "get_foundation_detail",
            CommandAction::GetFoundationStats => "get_foundation_stats",
            CommandAction::GetFoundationOfficers => "get_foundation_officers",
            CommandAction::GetFoundationStateBreakdown => "get_foundation_state_breakdown",
            CommandAction::FoundationNames => "foundation_names",
            CommandAction::GetFoundationBasic => "get_foundation_basic",
            CommandAction::SnapshotInfo => "snapshot_info",
            CommandAction::Refresh => "refresh",
            CommandAction::Capabilities => "capabilities",
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchGrantsPayload {
    #[serde(flatten)]
    pub query: GrantQuery,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchFoundationsPayload {
    #[serde(flatten)]
    pub query: FoundationQuery,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct EinPayload {
    pub ein: Ein,
}

#[derive(Debug, Deserialize, Default)]
pub struct FoundationNamesPayload {
    #[serde(default, alias = "q")]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub meta: ResponseMeta,
}

impl CommandResponse {
    pub fn is_error(&self) -> bool {
        matches!(self.status, CommandStatus::Error)
    }

    pub fn error(envelope: ErrorEnvelope, meta: ResponseMeta) -> Self {
        Self {
            status: CommandStatus::Error,
            message: Some(envelope.message.clone()),
            error: Some(envelope),
            hints: Vec::new(),
            data: Value::Null,
            meta,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Clone)]
pub struct Hint {
    #[serde(rename = "type")]
    pub kind: HintKind,
    pub text: String,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    Info,
    Warn,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Set when a provider failure was answered with an empty result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<bool>,
}

pub struct CommandOutcome {
    pub data: Value,
    pub hints: Vec<Hint>,
    pub meta: ResponseMeta,
}

impl CommandOutcome {
    pub fn from_value<T: Serialize>(value: T) -> Result<Self> {
        Ok(Self {
            data: serde_json::to_value(value)?,
            hints: Vec::new(),
            meta: ResponseMeta::default(),
        })
    }
}

pub fn parse_payload<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(Into::into)
}

/// Maps a failed action onto a wire error code and a hint for the caller.
pub fn classify_error(err: &anyhow::Error, action: Option<CommandAction>) -> ErrorEnvelope {
    let message = format!("{err:#}");
    if let Some(query_err) = err.downcast_ref::<QueryError>() {
        let envelope = ErrorEnvelope::new(query_err.code(), message);
        return match query_err {
            QueryError::NotFound(_) => envelope.with_hint(
                "Check the EIN. Use action=foundation_names or search_foundations to find foundations.",
            ),
            QueryError::InvalidRequest(_) => {
                envelope.with_hint("Each min_* bound must not exceed its max_* bound.")
            }
            QueryError::Provider(_) => envelope,
        };
    }
    if err.downcast_ref::<serde_json::Error>().is_some() {
        let hint = match action {
            Some(action) => format!(
                "Payload does not match action={}. Run action=capabilities to list actions.",
                action.as_str()
            ),
            None => "Verify the request is valid JSON and matches the Command API schema.".to_string(),
        };
        return ErrorEnvelope::new(ErrorCode::InvalidRequest, message).with_hint(hint);
    }
    ErrorEnvelope::new(ErrorCode::Internal, message)
}
