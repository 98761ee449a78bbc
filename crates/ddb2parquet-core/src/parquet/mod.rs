// Parquet encoding of export batches
//
// Uses Snappy compression and dictionary encoding to keep files small while
// staying readable by every query engine that scans the bucket.

mod writer;

pub use writer::{write_parquet, write_parquet_into, writer_properties, ExportMetadata};
