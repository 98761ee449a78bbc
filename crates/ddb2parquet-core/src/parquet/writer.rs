// Minimal Parquet writer with size-optimized configuration

use crate::error::Result;
use arrow::array::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use std::io::Write;

/// Provenance embedded in the file's key/value metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportMetadata {
    pub source_table: String,
    pub export_date: String,
}

/// Build writer properties for one export
///
/// - Snappy compression
/// - Dictionary encoding enabled
/// - 32k rows per group
/// - ddb2parquet version and source table embedded in file metadata
pub fn writer_properties(metadata: &ExportMetadata) -> WriterProperties {
    let key_values = vec![
        KeyValue {
            key: "ddb2parquet.version".to_string(),
            value: Some(env!("CARGO_PKG_VERSION").to_string()),
        },
        KeyValue {
            key: "source.table".to_string(),
            value: Some(metadata.source_table.clone()),
        },
        KeyValue {
            key: "export.date".to_string(),
            value: Some(metadata.export_date.clone()),
        },
    ];

    WriterProperties::builder()
        .set_dictionary_enabled(true)
        .set_statistics_enabled(EnabledStatistics::Page)
        .set_compression(Compression::SNAPPY)
        .set_data_page_size_limit(256 * 1024) // 256 KiB data pages balance CPU vs. IO
        .set_write_batch_size(32 * 1024)
        .set_max_row_group_size(32 * 1024)
        .set_dictionary_page_size_limit(128 * 1024)
        .set_key_value_metadata(Some(key_values))
        .build()
}

/// Write an Arrow `RecordBatch` into an arbitrary `Write` sink.
pub fn write_parquet_into<W>(
    batch: &RecordBatch,
    metadata: &ExportMetadata,
    writer: &mut W,
) -> Result<()>
where
    W: Write + Send,
{
    let props = writer_properties(metadata);
    let mut arrow_writer = ArrowWriter::try_new(writer, batch.schema(), Some(props))?;

    arrow_writer.write(batch)?;
    arrow_writer.close()?;

    Ok(())
}

/// Write an Arrow `RecordBatch` to an in-memory Parquet buffer
pub fn write_parquet(batch: &RecordBatch, metadata: &ExportMetadata) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_parquet_into(batch, metadata, &mut buffer)?;
    Ok(buffer)
}
