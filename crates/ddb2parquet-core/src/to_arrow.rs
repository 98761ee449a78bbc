// Row → Arrow conversion
//
// The source table is schemaless, so the schema is inferred from the batch:
// columns appear in first-seen order and each column gets the narrowest type
// that holds every non-null value in it.

use crate::error::{CoreError, Result};
use crate::types::{Row, Value};
use arrow::array::{
    ArrayRef, BinaryBuilder, BooleanBuilder, Float64Builder, Int64Builder, RecordBatch,
    StringBuilder,
};
use arrow::datatypes::{DataType, Field, Schema};
use base64::Engine;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Null,
    Boolean,
    Int64,
    Float64,
    Binary,
    Utf8,
}

impl ColumnKind {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => ColumnKind::Null,
            Value::Bool(_) => ColumnKind::Boolean,
            Value::Number(text) => {
                if text.parse::<i64>().is_ok() {
                    ColumnKind::Int64
                } else if text.parse::<f64>().is_ok() {
                    ColumnKind::Float64
                } else {
                    ColumnKind::Utf8
                }
            }
            Value::Binary(_) => ColumnKind::Binary,
            Value::String(_) | Value::List(_) | Value::Map(_) => ColumnKind::Utf8,
        }
    }

    fn widen(self, other: ColumnKind) -> Self {
        use ColumnKind::*;
        match (self, other) {
            (Null, k) | (k, Null) => k,
            (a, b) if a == b => a,
            (Int64, Float64) | (Float64, Int64) => Float64,
            _ => Utf8,
        }
    }

    fn data_type(self) -> DataType {
        match self {
            ColumnKind::Boolean => DataType::Boolean,
            ColumnKind::Int64 => DataType::Int64,
            ColumnKind::Float64 => DataType::Float64,
            ColumnKind::Binary => DataType::Binary,
            ColumnKind::Null | ColumnKind::Utf8 => DataType::Utf8,
        }
    }
}

/// Infer (name, kind) for every column in first-seen order
fn infer_columns(rows: &[Row]) -> Vec<(String, ColumnKind)> {
    let mut order: Vec<(String, ColumnKind)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        for (name, value) in row.fields() {
            let kind = ColumnKind::of(value);
            match index.get(name) {
                Some(&pos) => order[pos].1 = order[pos].1.widen(kind),
                None => {
                    index.insert(name.to_string(), order.len());
                    order.push((name.to_string(), kind));
                }
            }
        }
    }

    order
}

/// Convert rows into a single `RecordBatch`.
///
/// Every column is nullable; a row that lacks a field contributes a null.
pub fn rows_to_record_batch(rows: &[Row]) -> Result<RecordBatch> {
    if rows.is_empty() {
        return Err(CoreError::EmptyBatch);
    }

    let columns = infer_columns(rows);
    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());

    for (name, kind) in &columns {
        let values = rows.iter().map(|row| row.get(name));
        arrays.push(build_column(*kind, values, rows.len()));
        fields.push(Field::new(name.as_str(), kind.data_type(), true));
    }

    tracing::debug!(
        rows = rows.len(),
        columns = fields.len(),
        "Inferred Arrow schema for export batch"
    );

    let schema = Arc::new(Schema::new(fields));
    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn build_column<'a>(
    kind: ColumnKind,
    values: impl Iterator<Item = Option<&'a Value>>,
    len: usize,
) -> ArrayRef {
    match kind {
        ColumnKind::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(len);
            for value in values {
                match value {
                    Some(Value::Bool(b)) => builder.append_value(*b),
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Int64 => {
            let mut builder = Int64Builder::with_capacity(len);
            for value in values {
                match value {
                    Some(Value::Number(n)) => builder.append_option(n.parse::<i64>().ok()),
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Float64 => {
            let mut builder = Float64Builder::with_capacity(len);
            for value in values {
                match value {
                    Some(Value::Number(n)) => builder.append_option(n.parse::<f64>().ok()),
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Binary => {
            let mut builder = BinaryBuilder::with_capacity(len, len * 16);
            for value in values {
                match value {
                    Some(Value::Binary(b)) => builder.append_value(b),
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnKind::Null | ColumnKind::Utf8 => {
            let mut builder = StringBuilder::with_capacity(len, len * 32);
            for value in values {
                builder.append_option(value.and_then(render_text));
            }
            Arc::new(builder.finish())
        }
    }
}

/// Text form of a value placed in a `Utf8` column
fn render_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Binary(b) => Some(base64::engine::general_purpose::STANDARD.encode(b)),
        Value::List(_) | Value::Map(_) => Some(value.to_json().to_string()),
    }
}
