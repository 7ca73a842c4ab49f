use thiserror::Error;

pub type Result<T> = std::result::Result<T, CorpusError>;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unsupported schema_version {actual} (expected {expected})")]
    UnsupportedSchema { expected: u32, actual: u32 },

    #[error("Not found: {0}")]
    NotFound(String),
}
