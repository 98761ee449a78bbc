//! Core row model and columnar conversion for ddb2parquet
//!
//! Pure, synchronous building blocks shared by the exporter:
//! - [`Row`] / [`Value`]: a snapshot of one source-table item
//! - [`partition`]: "today" in a fixed timezone and the Hive-style object key
//! - [`to_arrow`]: rows → Arrow `RecordBatch` with an inferred schema
//! - [`parquet`]: `RecordBatch` → Parquet bytes

mod error;
pub mod parquet;
pub mod partition;
pub mod to_arrow;
mod types;

pub use error::{CoreError, Result};
pub use partition::{local_date, partition_key, PartitionDate};
pub use to_arrow::rows_to_record_batch;
pub use types::{Row, Value, TIMESTAMP_FIELD};
