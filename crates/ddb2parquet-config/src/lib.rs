// ddb2parquet-config - Unified configuration for the exporter, repairer and click ingest server
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from DDB2PARQUET_CONFIG env var
// 3. Config file contents from DDB2PARQUET_CONFIG_CONTENT env var
// 4. Default config file location (./ddb2parquet.toml)
// 5. Platform-specific defaults (lowest priority)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod env_overrides;
mod platform;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, ENV_PREFIX};
pub use platform::Platform;

pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";
pub const DEFAULT_EXPORT_FILENAME: &str = "dynamodb_export.parquet";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";

/// The deployable piece a configuration is loaded for.
///
/// Each one only validates the sections it reads, so the repairer starts
/// without any storage settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// Daily table export: `export` + `storage`
    Exporter,
    /// Partition repair: `repair`
    Repairer,
    /// Click ingest HTTP server: `server` + `export.source_table`
    Ingest,
}

/// Main runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub repair: RepairConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Exporter configuration: which table to scan and how "today" is computed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub source_table: String,
    /// IANA timezone identifier used to decide which day is "today"
    pub timezone: String,
    /// File name placed under the `year=/month=/day=` prefix
    pub filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            source_table: "ClickEvents".to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            filename: DEFAULT_EXPORT_FILENAME.to_string(),
        }
    }
}

/// Partition repairer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    pub database: String,
    pub table: String,
    pub workgroup: String,
    pub poll_interval_secs: u64,
    pub max_poll_attempts: u32,
}

impl RepairConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Statement that asks the query engine to rediscover the table's partitions
    pub fn repair_statement(&self) -> String {
        format!("MSCK REPAIR TABLE {}", self.table)
    }
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            database: "clickevents-db".to_string(),
            table: "clickevents".to_string(),
            workgroup: "clickevents-wg".to_string(),
            poll_interval_secs: 3,
            max_poll_attempts: 10,
        }
    }
}

/// Storage backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs: Option<FsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Fs,
            fs: Some(FsConfig::default()),
            s3: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Fs,
    S3,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Fs => write!(f, "fs"),
            StorageBackend::S3 => write!(f, "s3"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fs" | "filesystem" => Ok(StorageBackend::Fs),
            "s3" | "aws" => Ok(StorageBackend::S3),
            _ => anyhow::bail!("Unsupported storage backend: {}. Supported: fs, s3", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsConfig {
    pub path: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            path: "./data".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Click ingest server configuration; clicks go to `export.source_table`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Sections present in a TOML file. Missing sections keep the layer below.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    export: Option<ExportConfig>,
    repair: Option<RepairConfig>,
    storage: Option<StorageConfig>,
    server: Option<ServerConfig>,
    log: Option<LogConfig>,
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load(component: Component) -> Result<Self> {
        sources::load_config(Platform::detect(), component)
    }

    /// Load configuration from a specific file path (for CLI usage).
    pub fn load_from_path(
        path: impl AsRef<std::path::Path>,
        component: Component,
    ) -> Result<Self> {
        sources::load_from_file_path(path, component)
    }

    /// Construct a config that contains only platform defaults (no env or files).
    pub fn from_platform_defaults(platform: Platform) -> Self {
        platform.default_config()
    }

    /// Layer TOML content over this config. Only sections present in the
    /// document replace what is already set.
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let file: FileConfig = toml::from_str(content)?;
        if let Some(export) = file.export {
            self.export = export;
        }
        if let Some(repair) = file.repair {
            self.repair = repair;
        }
        if let Some(storage) = file.storage {
            self.storage = storage;
        }
        if let Some(server) = file.server {
            self.server = server;
        }
        if let Some(log) = file.log {
            self.log = log;
        }
        Ok(())
    }

    /// Apply environment overrides from a custom source.
    pub fn apply_env_overrides_from<E: EnvSource>(&mut self, env: &E) -> Result<()> {
        env_overrides::apply_env_overrides(self, env)
    }

    /// Build a configuration for the given platform using config file content
    /// plus overrides supplied by an `EnvSource`, validated for `component`.
    pub fn load_for_platform_with_env<E: EnvSource>(
        platform: Platform,
        component: Component,
        config_content: Option<&str>,
        env: &E,
    ) -> Result<Self> {
        let mut config = RuntimeConfig::from_platform_defaults(platform);

        if let Some(content) = config_content {
            config
                .merge_toml(content)
                .context("Failed to parse configuration file")?;
        }

        config.apply_env_overrides_from(env)?;
        config.validate(component)?;
        Ok(config)
    }

    /// Validate the sections `component` reads
    pub fn validate(&self, component: Component) -> Result<()> {
        validation::validate_config(self, component)
    }
}
