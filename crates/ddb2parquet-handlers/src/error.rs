use ddb2parquet_core::CoreError;
use thiserror::Error;

/// Failures raised by the collaborators a job talks to
#[derive(Debug, Error)]
pub enum JobError {
    /// Reading from the source table failed
    #[error("source scan failed: {message}")]
    Source { message: String },

    /// Serializing rows to the columnar file failed
    #[error(transparent)]
    Conversion(#[from] CoreError),

    /// Writing to object storage failed
    #[error("storage write failed: {message}")]
    Storage { message: String },

    /// The query engine rejected or lost a request
    #[error("query engine error: {message}")]
    Engine { message: String },
}

impl JobError {
    pub fn scan(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// The underlying description without the category prefix
    pub fn message(&self) -> String {
        match self {
            Self::Source { message } | Self::Storage { message } | Self::Engine { message } => {
                message.clone()
            }
            Self::Conversion(err) => err.to_string(),
        }
    }
}
