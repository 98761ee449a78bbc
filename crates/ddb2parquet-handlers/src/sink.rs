use crate::error::JobError;
use async_trait::async_trait;
use ddb2parquet_writer::ObjectWriter;

/// Destination for the exported file
#[async_trait]
pub trait ObjectSink: Send + Sync {
    /// Store `body` at `key`, replacing whatever is there
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), JobError>;
}

#[async_trait]
impl ObjectSink for ObjectWriter {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), JobError> {
        self.write_object(key, body)
            .await
            .map_err(|e| JobError::storage(e.to_string()))
    }
}
