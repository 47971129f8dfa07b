use grantscope_protocol::ErrorCode;
use grantscope_record_store::{Ein, RecordStoreError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Foundation not found: {0}")]
    NotFound(Ein),

    #[error("Record provider failure: {0}")]
    Provider(#[from] RecordStoreError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Rejects a range whose lower bound sits above its upper bound.
pub(crate) fn check_range<T: PartialOrd + std::fmt::Display>(
    field: &str,
    min: Option<T>,
    max: Option<T>,
) -> Result<()> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(QueryError::InvalidRequest(format!(
            "min_{field} ({min}) is greater than max_{field} ({max})"
        ))),
        _ => Ok(()),
    }
}

impl QueryError {
    /// Failures of the backing store, as opposed to answers about the data.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, QueryError::Provider(_))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            QueryError::NotFound(_) => ErrorCode::NotFound,
            QueryError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            QueryError::Provider(_) => ErrorCode::Internal,
        }
    }
}
