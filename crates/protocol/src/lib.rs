use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod pagination;

pub use pagination::{total_pages, PageRequest, DEFAULT_PER_PAGE, MAX_PER_PAGE};

pub const COMMAND_API_VERSION: u32 = 1;

/// Placeholder rendered for grants that carry no purpose text.
pub const NO_PURPOSE: &str = "No purpose specified";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    InvalidRequest,
    Unauthorized,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "not_found",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::Internal => "internal",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorEnvelope {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Envelope for every paginated query: `{results, total, page, per_page, total_pages}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PageEnvelope<T> {
    pub results: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl<T> PageEnvelope<T> {
    pub fn new(results: Vec<T>, total: usize, request: PageRequest) -> Self {
        Self {
            results,
            total,
            page: request.page,
            per_page: request.per_page,
            total_pages: total_pages(total, request.per_page),
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn envelope_reports_total_pages() {
        let request = PageRequest::new(Some(2), Some(20));
        let page = PageEnvelope::new(vec![1, 2, 3], 45, request);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 20);
    }

    #[test]
    fn empty_envelope_has_zero_pages() {
        let page: PageEnvelope<u8> = PageEnvelope::empty(PageRequest::default());
        assert_eq!(page.total_pages, 0);
        assert!(page.is_empty());
    }

    #[test]
    fn error_code_serializes_snake_case() {
        let envelope = ErrorEnvelope::new(ErrorCode::NotFound, "Foundation not found");
        let raw = serialize_json(&envelope).unwrap();
        assert_eq!(raw, r#"{"code":"not_found","message":"Foundation not found"}"#);
        assert_eq!(ErrorCode::InvalidRequest.as_str(), "invalid_request");
    }
}
