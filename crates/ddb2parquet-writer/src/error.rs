//! Error types for the object storage writer

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Storage configuration missing or invalid
    E001InvalidConfig,
    /// E002: Storage operator could not be built
    E002OperatorInit,
    /// E003: Object write failed
    E003WriteFailure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001InvalidConfig => "E001",
            Self::E002OperatorInit => "E002",
            Self::E003WriteFailure => "E003",
        }
    }
}

/// Errors that can occur while preparing storage or writing an object
#[derive(Debug, Error)]
pub enum WriterError {
    /// Invalid configuration provided
    #[error("[{code}] Invalid storage configuration: {message}")]
    InvalidConfig { code: &'static str, message: String },

    /// Storage operator construction failed
    #[error("[{code}] Failed to initialize '{backend}' storage: {reason}")]
    OperatorInit {
        code: &'static str,
        backend: String,
        reason: String,
    },

    /// Write operation failed
    #[error("[{code}] Write to '{key}' failed: {reason}")]
    WriteFailure {
        code: &'static str,
        key: String,
        reason: String,
    },
}

impl WriterError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            code: ErrorCode::E001InvalidConfig.as_str(),
            message: message.into(),
        }
    }

    pub fn operator_init(backend: impl Into<String>, reason: impl ToString) -> Self {
        Self::OperatorInit {
            code: ErrorCode::E002OperatorInit.as_str(),
            backend: backend.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write_failure(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::WriteFailure {
            code: ErrorCode::E003WriteFailure.as_str(),
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidConfig { .. } => ErrorCode::E001InvalidConfig,
            Self::OperatorInit { .. } => ErrorCode::E002OperatorInit,
            Self::WriteFailure { .. } => ErrorCode::E003WriteFailure,
        }
    }
}

/// Result type alias for WriterError
pub type Result<T> = std::result::Result<T, WriterError>;
