//! Storage operator construction
//!
//! Builds an OpenDAL operator from `StorageConfig`. The operator is returned to
//! the caller and owned by whoever runs the job; nothing is cached globally.

use crate::error::{Result, WriterError};
use ddb2parquet_config::{StorageBackend, StorageConfig};
use opendal::Operator;

/// Build the storage operator described by `config`
pub fn build_operator(config: &StorageConfig) -> Result<Operator> {
    let operator = match config.backend {
        StorageBackend::Fs => {
            let fs = config.fs.as_ref().ok_or_else(|| {
                WriterError::invalid_config("fs config required for filesystem backend")
            })?;

            let fs_builder = opendal::services::Fs::default().root(&fs.path);
            Operator::new(fs_builder)
                .map_err(|e| WriterError::operator_init("fs", e))?
                .finish()
        }
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or_else(|| WriterError::invalid_config("s3 config required for S3 backend"))?;

            // Credentials come from the default AWS chain (execution role on Lambda)
            let mut s3_builder = opendal::services::S3::default()
                .bucket(&s3.bucket)
                .region(&s3.region);

            if let Some(endpoint) = &s3.endpoint {
                s3_builder = s3_builder.endpoint(endpoint);
            }

            Operator::new(s3_builder)
                .map_err(|e| WriterError::operator_init("s3", e))?
                .finish()
        }
    };

    tracing::debug!(backend = %config.backend, "Storage operator initialized");
    Ok(operator)
}
