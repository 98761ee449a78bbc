//! Daily export: scan the source table, keep today's rows, upload one Parquet file

use crate::error::JobError;
use crate::sink::ObjectSink;
use crate::source::RowSource;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use ddb2parquet_config::ExportConfig;
use ddb2parquet_core::parquet::{write_parquet, ExportMetadata};
use ddb2parquet_core::partition::parse_timezone;
use ddb2parquet_core::{local_date, rows_to_record_batch, CoreError, PartitionDate, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Resolved exporter settings
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub source_table: String,
    pub timezone: Tz,
    pub filename: String,
}

impl ExportSettings {
    pub fn from_config(config: &ExportConfig) -> Result<Self, CoreError> {
        Ok(Self {
            source_table: config.source_table.clone(),
            timezone: parse_timezone(&config.timezone)?,
            filename: config.filename.clone(),
        })
    }
}

/// What an export invocation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// No rows for the day; nothing was written
    Skipped { date: PartitionDate },
    /// The file was uploaded
    Success { records: usize, key: String },
    /// The upload failed
    Error { message: String },
}

impl ExportOutcome {
    pub fn response(&self) -> ExportResponse {
        match self {
            ExportOutcome::Skipped { date } => ExportResponse {
                status: ExportStatus::Skipped,
                message: format!("No records for today[{}]", date),
            },
            ExportOutcome::Success { records, .. } => ExportResponse {
                status: ExportStatus::Success,
                message: format!("Exported {} records to S3.", records),
            },
            ExportOutcome::Error { message } => ExportResponse {
                status: ExportStatus::Error,
                message: message.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Skipped,
    Success,
    Error,
}

/// Invocation result handed back to the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResponse {
    pub status: ExportStatus,
    pub message: String,
}

#[derive(Debug, Default, Clone, Copy)]
struct ScanStats {
    pages: usize,
    scanned: usize,
}

/// Exports the current day's rows from a [`RowSource`] into an [`ObjectSink`]
pub struct Exporter<S, K> {
    source: S,
    sink: K,
    settings: ExportSettings,
}

impl<S, K> Exporter<S, K>
where
    S: RowSource,
    K: ObjectSink,
{
    pub fn new(source: S, sink: K, settings: ExportSettings) -> Self {
        Self {
            source,
            sink,
            settings,
        }
    }

    /// Export the rows for "today" in the configured timezone
    pub async fn run(&self) -> Result<ExportOutcome, JobError> {
        self.run_at(Utc::now()).await
    }

    /// Export the rows for the day `now` falls on in the configured timezone.
    ///
    /// Scan and serialization failures are returned as `Err`; an upload
    /// failure is reported as [`ExportOutcome::Error`].
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<ExportOutcome, JobError> {
        let date = local_date(now, self.settings.timezone);
        info!(
            table = %self.settings.source_table,
            date = %date,
            "Exporting today's data to Parquet"
        );

        let (rows, stats) = self.collect_rows(&date.day_prefix()).await?;
        debug!(
            pages = stats.pages,
            scanned = stats.scanned,
            matched = rows.len(),
            "Source scan complete"
        );

        if rows.is_empty() {
            info!(date = %date, "No records for today, skipping export");
            return Ok(ExportOutcome::Skipped { date });
        }

        let batch = rows_to_record_batch(&rows)?;
        let metadata = ExportMetadata {
            source_table: self.settings.source_table.clone(),
            export_date: date.to_string(),
        };
        let body = write_parquet(&batch, &metadata)?;
        let key = date.object_key(&self.settings.filename);

        match self.sink.put_object(&key, body).await {
            Ok(()) => {
                info!(records = rows.len(), key = %key, "Exported records to Parquet");
                Ok(ExportOutcome::Success {
                    records: rows.len(),
                    key,
                })
            }
            Err(err) => {
                let message = err.message();
                error!(key = %key, error = %message, "Error uploading export");
                Ok(ExportOutcome::Error { message })
            }
        }
    }

    /// Walk every page of the table, keeping rows whose timestamp starts with `day`
    async fn collect_rows(&self, day: &str) -> Result<(Vec<Row>, ScanStats), JobError> {
        let mut matched = Vec::new();
        let mut stats = ScanStats::default();
        let mut start = None;

        loop {
            let page = self.source.scan_page(start.take()).await?;
            stats.pages += 1;
            stats.scanned += page.rows.len();

            matched.extend(page.rows.into_iter().filter(|row| row.falls_on(day)));

            match page.next {
                Some(token) => start = Some(token),
                None => break,
            }
        }

        Ok((matched, stats))
    }
}
