// DynamoDB full-table scan as a RowSource
//
// Items come back as attribute maps; each is turned into a Row with numbers
// kept as their decimal text and sets flattened into lists.

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use ddb2parquet_core::{Row, Value};
use ddb2parquet_handlers::{JobError, RowSource, ScanPage};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Continuation marker returned by Scan
pub type ScanKey = HashMap<String, AttributeValue>;

/// Paginated `Scan` over a single table
#[derive(Debug, Clone)]
pub struct DynamoDbSource {
    client: Client,
    table: String,
}

impl DynamoDbSource {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl RowSource for DynamoDbSource {
    type Token = ScanKey;

    async fn scan_page(&self, start: Option<ScanKey>) -> Result<ScanPage<ScanKey>, JobError> {
        let output = self
            .client
            .scan()
            .table_name(&self.table)
            .set_exclusive_start_key(start)
            .send()
            .await
            .map_err(|e| JobError::scan(DisplayErrorContext(&e).to_string()))?;

        let rows: Vec<Row> = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(item_to_row)
            .collect();

        // An empty key map also marks the last page
        let next = output.last_evaluated_key.filter(|key| !key.is_empty());
        debug!(
            table = %self.table,
            items = rows.len(),
            more = next.is_some(),
            "Scanned page"
        );

        Ok(ScanPage { rows, next })
    }
}

/// Convert one DynamoDB item into a row
pub fn item_to_row(item: HashMap<String, AttributeValue>) -> Row {
    item.into_iter()
        .map(|(name, value)| (name, attribute_to_value(value)))
        .collect()
}

fn attribute_to_value(value: AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::N(n) => Value::Number(n),
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::B(blob) => Value::Binary(blob.into_inner()),
        AttributeValue::Ss(items) => Value::List(items.into_iter().map(Value::String).collect()),
        AttributeValue::Ns(items) => Value::List(items.into_iter().map(Value::Number).collect()),
        AttributeValue::Bs(items) => Value::List(
            items
                .into_iter()
                .map(|blob| Value::Binary(blob.into_inner()))
                .collect(),
        ),
        AttributeValue::L(items) => {
            Value::List(items.into_iter().map(attribute_to_value).collect())
        }
        AttributeValue::M(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, attribute_to_value(v)))
                .collect::<BTreeMap<_, _>>(),
        ),
        other => {
            warn!(attribute = ?other, "Unrecognised attribute type, storing as null");
            Value::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::primitives::Blob;

    fn item(pairs: Vec<(&str, AttributeValue)>) -> HashMap<String, AttributeValue> {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn click_event_item() {
        let row = item_to_row(item(vec![
            ("id", AttributeValue::S("c-17".into())),
            ("timestamp", AttributeValue::S("2025-03-09T10:15:00".into())),
            ("count", AttributeValue::N("3".into())),
            ("mobile", AttributeValue::Bool(true)),
            ("referrer", AttributeValue::Null(true)),
        ]));

        assert_eq!(row.len(), 5);
        assert_eq!(row.timestamp(), Some("2025-03-09T10:15:00"));
        assert_eq!(row.get("count"), Some(&Value::Number("3".into())));
        assert_eq!(row.get("mobile"), Some(&Value::Bool(true)));
        assert_eq!(row.get("referrer"), Some(&Value::Null));
    }

    #[test]
    fn sets_become_lists() {
        let row = item_to_row(item(vec![
            ("tags", AttributeValue::Ss(vec!["a".into(), "b".into()])),
            ("scores", AttributeValue::Ns(vec!["1.5".into()])),
            ("blobs", AttributeValue::Bs(vec![Blob::new(vec![1u8, 2])])),
        ]));

        assert_eq!(
            row.get("tags"),
            Some(&Value::List(vec![
                Value::String("a".into()),
                Value::String("b".into())
            ]))
        );
        assert_eq!(
            row.get("scores"),
            Some(&Value::List(vec![Value::Number("1.5".into())]))
        );
        assert_eq!(
            row.get("blobs"),
            Some(&Value::List(vec![Value::Binary(vec![1, 2])]))
        );
    }

    #[test]
    fn nested_maps_and_lists() {
        let inner = item(vec![("city", AttributeValue::S("Pune".into()))]);
        let row = item_to_row(item(vec![
            ("geo", AttributeValue::M(inner)),
            (
                "path",
                AttributeValue::L(vec![
                    AttributeValue::S("/".into()),
                    AttributeValue::N("2".into()),
                ]),
            ),
            ("raw", AttributeValue::B(Blob::new(b"hi".to_vec()))),
        ]));

        let mut geo = BTreeMap::new();
        geo.insert("city".to_string(), Value::String("Pune".into()));
        assert_eq!(row.get("geo"), Some(&Value::Map(geo)));
        assert_eq!(
            row.get("path"),
            Some(&Value::List(vec![
                Value::String("/".into()),
                Value::Number("2".into())
            ]))
        );
        assert_eq!(row.get("raw"), Some(&Value::Binary(b"hi".to_vec())));
    }
}
