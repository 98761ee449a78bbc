use crate::error::JobError;
use async_trait::async_trait;
use ddb2parquet_core::Row;

/// One page of a paginated full-table scan
#[derive(Debug, Clone)]
pub struct ScanPage<T> {
    pub rows: Vec<Row>,
    /// Present when more pages remain
    pub next: Option<T>,
}

impl<T> ScanPage<T> {
    pub fn last(rows: Vec<Row>) -> Self {
        Self { rows, next: None }
    }

    pub fn with_next(rows: Vec<Row>, next: T) -> Self {
        Self {
            rows,
            next: Some(next),
        }
    }
}

/// A table that can be read page by page
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Opaque continuation marker handed back on the next call
    type Token: Send + 'static;

    /// Fetch the page that starts at `start`, or the first page when `None`
    async fn scan_page(&self, start: Option<Self::Token>) -> Result<ScanPage<Self::Token>, JobError>;
}
