// Configuration source loading.
//
// Priority order:
// 1. Environment variables (DDB2PARQUET_* prefix, plus legacy TABLE/BUCKET)
// 2. Config file path from DDB2PARQUET_CONFIG
// 3. Inline config content from DDB2PARQUET_CONFIG_CONTENT
// 4. Default config file (./ddb2parquet.toml)
// 5. Platform defaults (based on auto-detected Platform)

use crate::env_overrides::{EnvSource, ENV_PREFIX};
use crate::platform::Platform;
use crate::{Component, RuntimeConfig};
use anyhow::{Context, Result};
use std::env;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "./ddb2parquet.toml";

/// Load configuration for the given platform using host environment/file access.
pub fn load_config(platform: Platform, component: Component) -> Result<RuntimeConfig> {
    let content = load_file_content()?;
    RuntimeConfig::load_for_platform_with_env(
        platform,
        component,
        content.as_deref(),
        &StdEnvSource,
    )
}

fn load_file_content() -> Result<Option<String>> {
    if let Ok(path) = env::var(format!("{}CONFIG", ENV_PREFIX)) {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        return Ok(Some(content));
    }

    if let Ok(content) = env::var(format!("{}CONFIG_CONTENT", ENV_PREFIX)) {
        return Ok(Some(content));
    }

    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        let content = std::fs::read_to_string(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to read config file: {}", DEFAULT_CONFIG_PATH))?;
        return Ok(Some(content));
    }

    Ok(None)
}

/// Load configuration from a specific file path (for CLI --config flag).
/// Returns error if file doesn't exist or can't be parsed.
pub fn load_from_file_path(path: impl AsRef<Path>, component: Component) -> Result<RuntimeConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    RuntimeConfig::load_for_platform_with_env(
        Platform::detect(),
        component,
        Some(&content),
        &StdEnvSource,
    )
    .with_context(|| format!("Invalid config file: {}", path.display()))
}

struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}
