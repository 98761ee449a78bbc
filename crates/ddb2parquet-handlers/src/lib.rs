//! Exporter and partition repairer jobs
//!
//! Both jobs receive their external services as trait implementations from
//! the caller (Lambda entry points, the CLI, or test doubles):
//! - [`Exporter`]: [`RowSource`] → Parquet → [`ObjectSink`]
//! - [`Repairer`]: [`QueryEngine`] submit + bounded poll with a [`Sleeper`]

pub mod engine;
pub mod error;
pub mod export;
pub mod repair;
pub mod sink;
pub mod source;

pub use engine::{QueryEngine, QueryRequest, QueryState, Sleeper, TokioSleeper};
pub use error::JobError;
pub use export::{ExportOutcome, ExportResponse, ExportSettings, ExportStatus, Exporter};
pub use repair::{RepairReport, RepairResponse, RepairSettings, Repairer};
pub use sink::ObjectSink;
pub use source::{RowSource, ScanPage};
