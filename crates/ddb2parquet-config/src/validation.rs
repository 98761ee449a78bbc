// Configuration validation
//
// Validates that the sections a component reads are present and sensible

use crate::*;
use anyhow::{anyhow, bail, Result};
use std::net::SocketAddr;
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig, component: Component) -> Result<()> {
    match component {
        Component::Exporter => {
            validate_export_config(&config.export)?;
            validate_storage_config(&config.storage)?;
        }
        Component::Repairer => validate_repair_config(&config.repair)?,
        Component::Ingest => {
            if config.export.source_table.is_empty() {
                bail!("export.source_table must not be empty");
            }
            validate_server_config(&config.server)?;
        }
    }
    Ok(())
}

fn validate_export_config(config: &ExportConfig) -> Result<()> {
    if config.source_table.is_empty() {
        bail!("export.source_table must not be empty");
    }

    config
        .timezone
        .parse::<chrono_tz::Tz>()
        .map_err(|e| anyhow!("export.timezone '{}' is not valid: {}", config.timezone, e))?;

    if config.filename.contains('/') {
        bail!("export.filename must be a bare file name, got '{}'", config.filename);
    }

    if !config.filename.ends_with(".parquet") {
        bail!("export.filename must end with .parquet, got '{}'", config.filename);
    }

    Ok(())
}

fn validate_repair_config(config: &RepairConfig) -> Result<()> {
    if config.database.is_empty() {
        bail!("repair.database must not be empty");
    }

    if config.table.is_empty() {
        bail!("repair.table must not be empty");
    }

    if config.workgroup.is_empty() {
        bail!("repair.workgroup must not be empty");
    }

    if config.max_poll_attempts == 0 {
        bail!("repair.max_poll_attempts must be greater than 0");
    }

    if config.poll_interval_secs == 0 {
        warn!("repair.poll_interval_secs is 0; status polls will run back to back");
    }

    if config.max_poll_attempts > 100 {
        warn!(
            max_poll_attempts = config.max_poll_attempts,
            "repair.max_poll_attempts is very large; invocation may hit the function timeout"
        );
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<()> {
    match config.backend {
        StorageBackend::Fs => {
            let fs = config
                .fs
                .as_ref()
                .ok_or_else(|| anyhow!("fs storage backend requires 'fs' configuration"))?;

            if fs.path.is_empty() {
                bail!("storage.fs.path must not be empty");
            }
        }
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or_else(|| anyhow!("s3 storage backend requires 's3' configuration"))?;

            if s3.bucket.is_empty() {
                bail!("storage.s3.bucket is required for S3 backend (set BUCKET)");
            }

            if s3.region.is_empty() {
                bail!("storage.s3.region is required for S3 backend");
            }
        }
    }

    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<()> {
    config.listen_addr.parse::<SocketAddr>().map_err(|e| {
        anyhow!(
            "server.listen_addr '{}' is not a socket address: {}",
            config.listen_addr,
            e
        )
    })?;
    Ok(())
}
