use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecordStoreError>;

#[derive(Error, Debug)]
pub enum RecordStoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Record provider unavailable: {0}")]
    Unavailable(String),

    #[error("Unsupported snapshot schema_version {found} (expected {expected})")]
    SchemaVersion { expected: u32, found: u32 },

    #[error("Invalid EIN: {0}")]
    InvalidEin(String),
}
