//! Object upload

use crate::error::{Result, WriterError};
use crate::storage::build_operator;
use ddb2parquet_config::StorageConfig;
use opendal::{Capability, Operator};

/// Content type for exported Parquet objects
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Writes whole objects to the configured bucket or directory
#[derive(Debug, Clone)]
pub struct ObjectWriter {
    operator: Operator,
}

impl ObjectWriter {
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Ok(Self::new(build_operator(config)?))
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// Upload `body` as a single object at `key`, replacing any existing object.
    ///
    /// The content type is only sent to backends that accept one.
    pub async fn write_object(&self, key: &str, body: Vec<u8>) -> Result<()> {
        let size = body.len();

        let written = match content_type_for(&self.operator.info().full_capability()) {
            Some(content_type) => {
                self.operator
                    .write_with(key, body)
                    .content_type(content_type)
                    .await
            }
            None => self.operator.write(key, body).await,
        };

        match written {
            Ok(_) => {
                tracing::info!(key, bytes = size, "Wrote object");
                Ok(())
            }
            Err(err) => {
                tracing::error!(key, error = %err, "Object write failed");
                Err(WriterError::write_failure(key, err))
            }
        }
    }
}

/// Content type to send for a backend, `None` when it rejects one
fn content_type_for(capability: &Capability) -> Option<&'static str> {
    capability.write_with_content_type.then_some(OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opendal::services;

    fn memory_writer() -> ObjectWriter {
        let op = Operator::new(services::Memory::default())
            .expect("Failed to create memory operator")
            .finish();
        ObjectWriter::new(op)
    }

    #[tokio::test]
    async fn writes_and_overwrites_object() {
        let writer = memory_writer();
        let key = "year=2025/month=03/day=09/dynamodb_export.parquet";

        writer.write_object(key, b"first".to_vec()).await.unwrap();
        writer.write_object(key, b"second".to_vec()).await.unwrap();

        let stored = writer.operator().read(key).await.unwrap().to_vec();
        assert_eq!(stored, b"second");
    }

    #[tokio::test]
    async fn days_are_isolated() {
        let writer = memory_writer();
        writer
            .write_object("year=2025/month=03/day=08/f.parquet", b"a".to_vec())
            .await
            .unwrap();
        writer
            .write_object("year=2025/month=03/day=09/f.parquet", b"b".to_vec())
            .await
            .unwrap();

        let earlier = writer
            .operator()
            .read("year=2025/month=03/day=08/f.parquet")
            .await
            .unwrap()
            .to_vec();
        assert_eq!(earlier, b"a");
    }

    #[test]
    fn content_type_only_when_supported() {
        let mut capability = Capability::default();
        capability.write = true;
        assert_eq!(content_type_for(&capability), None);

        capability.write_with_content_type = true;
        assert_eq!(content_type_for(&capability), Some(OCTET_STREAM));
    }

    #[tokio::test]
    async fn stored_content_type_follows_backend_capability() {
        let writer = memory_writer();
        let key = "year=2025/month=03/day=09/dynamodb_export.parquet";
        writer.write_object(key, b"PAR1".to_vec()).await.unwrap();

        let expected = content_type_for(&writer.operator().info().full_capability());
        let meta = writer.operator().stat(key).await.unwrap();
        if let Some(content_type) = expected {
            assert_eq!(meta.content_type(), Some(content_type));
        }
        assert_eq!(meta.content_length(), 4);
    }
}
