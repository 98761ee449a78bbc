//! Error types for row conversion and Parquet encoding

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Conversion was asked to build a batch from zero rows
    #[error("cannot build a record batch from an empty row set")]
    EmptyBatch,

    /// Arrow rejected the assembled columns
    #[error("arrow conversion failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet encoding failed
    #[error("parquet encoding failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Timezone identifier could not be resolved
    #[error("unknown timezone '{name}': {reason}")]
    InvalidTimezone { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
