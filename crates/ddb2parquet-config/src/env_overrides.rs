use crate::{FsConfig, LogFormat, RuntimeConfig, S3Config, StorageBackend};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "DDB2PARQUET_";

/// Abstraction over environment-variable lookups so tests and embedders can
/// supply their own source of overrides.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;

    /// Get an environment variable WITHOUT the DDB2PARQUET_ prefix
    /// Used for the legacy TABLE/BUCKET variables and AWS_REGION
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Exporter
    if let Some(table) = get_raw_env_string(env, "TABLE") {
        config.export.source_table = table;
    }
    if let Some(table) = get_env_string(env, "SOURCE_TABLE") {
        config.export.source_table = table;
    }
    if let Some(tz) = get_env_string(env, "TIMEZONE") {
        config.export.timezone = tz;
    }
    if let Some(filename) = get_env_string(env, "EXPORT_FILENAME") {
        config.export.filename = filename;
    }

    // Repairer
    if let Some(database) = get_env_string(env, "ATHENA_DATABASE") {
        config.repair.database = database;
    }
    if let Some(table) = get_env_string(env, "ATHENA_TABLE") {
        config.repair.table = table;
    }
    if let Some(workgroup) = get_env_string(env, "ATHENA_WORKGROUP") {
        config.repair.workgroup = workgroup;
    }
    if let Some(val) = get_env_u64(env, "POLL_INTERVAL_SECS")? {
        config.repair.poll_interval_secs = val;
    }
    if let Some(val) = get_env_u32(env, "MAX_POLL_ATTEMPTS")? {
        config.repair.max_poll_attempts = val;
    }

    // Storage backend
    if let Some(backend) = get_env_string(env, "STORAGE_BACKEND") {
        config.storage.backend = backend
            .parse::<StorageBackend>()
            .context("Invalid DDB2PARQUET_STORAGE_BACKEND value")?;
    }
    if let Some(path) = get_env_string(env, "STORAGE_PATH") {
        config.storage.fs.get_or_insert_with(FsConfig::default).path = path;
    }

    // S3 storage; the unprefixed names are what the deployed functions already set
    if let Some(bucket) = get_raw_env_string(env, "BUCKET") {
        ensure_s3(config).bucket = bucket;
    }
    if let Some(bucket) = get_env_string(env, "S3_BUCKET") {
        ensure_s3(config).bucket = bucket;
    }
    if let Some(region) = get_raw_env_string(env, "AWS_REGION") {
        ensure_s3(config).region = region;
    }
    if let Some(region) = get_env_string(env, "S3_REGION") {
        ensure_s3(config).region = region;
    }
    if let Some(endpoint) = get_env_string(env, "S3_ENDPOINT") {
        ensure_s3(config).endpoint = Some(endpoint);
    }

    // Click ingest server
    if let Some(addr) = get_env_string(env, "LISTEN_ADDR") {
        config.server.listen_addr = addr;
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.log.format = match format.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };
    }

    Ok(())
}

fn ensure_s3(config: &mut RuntimeConfig) -> &mut S3Config {
    config.storage.s3.get_or_insert_with(|| S3Config {
        bucket: String::new(),
        region: String::new(),
        endpoint: None,
    })
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key).filter(|val| !val.is_empty())
}

fn get_raw_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get_raw(key).filter(|val| !val.is_empty())
}

fn get_env_u64<E: EnvSource>(env: &E, key: &str) -> Result<Option<u64>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .parse::<u64>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_u32<E: EnvSource>(env: &E, key: &str) -> Result<Option<u32>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .parse::<u32>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
