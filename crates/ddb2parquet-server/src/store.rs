// Click persistence
//
// The handler only sees the ClickStore trait; DynamoDbClickStore is the
// production implementation backed by PutItem.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use ddb2parquet_core::{Row, Value};
use std::collections::HashMap;

/// Destination for logged clicks
#[async_trait]
pub trait ClickStore: Send + Sync {
    /// Store one click, replacing any item with the same key
    async fn put_click(&self, row: Row) -> Result<()>;
}

/// Writes clicks into a DynamoDB table with `PutItem`
#[derive(Debug, Clone)]
pub struct DynamoDbClickStore {
    client: Client,
    table: String,
}

impl DynamoDbClickStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl ClickStore for DynamoDbClickStore {
    async fn put_click(&self, row: Row) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(row_to_item(&row)))
            .send()
            .await
            .map_err(|e| anyhow!("PutItem on {} failed: {}", self.table, DisplayErrorContext(&e)))?;
        Ok(())
    }
}

/// Convert a row into a DynamoDB item
pub fn row_to_item(row: &Row) -> HashMap<String, AttributeValue> {
    row.fields()
        .map(|(name, value)| (name.to_string(), value_to_attribute(value)))
        .collect()
}

fn value_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.clone()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Binary(b) => AttributeValue::B(Blob::new(b.clone())),
        Value::List(items) => AttributeValue::L(items.iter().map(value_to_attribute).collect()),
        Value::Map(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_attribute(v)))
                .collect(),
        ),
    }
}
