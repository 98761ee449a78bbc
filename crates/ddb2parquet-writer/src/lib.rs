//! Object storage writer for ddb2parquet
//!
//! Wraps an OpenDAL operator (S3 in production, local filesystem for CLI
//! runs) and uploads whole export files.

mod error;
mod storage;
mod write;

pub use error::{ErrorCode, Result, WriterError};
pub use storage::build_operator;
pub use write::{ObjectWriter, OCTET_STREAM};
