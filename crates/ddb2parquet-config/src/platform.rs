// Platform detection based on environment variables
//
// Auto-detects runtime environment:
// - AWS Lambda: AWS_LAMBDA_FUNCTION_NAME env var present
// - Local: otherwise (CLI runs, development)

use crate::{
    FsConfig, LogConfig, LogFormat, RuntimeConfig, S3Config, StorageBackend, StorageConfig,
};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Lambda,
    Local,
}

impl Platform {
    /// Auto-detect the current platform based on environment variables
    pub fn detect() -> Self {
        if env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
            Platform::Lambda
        } else {
            Platform::Local
        }
    }

    /// Get platform-specific defaults
    pub fn defaults(&self) -> PlatformDefaults {
        match self {
            Platform::Lambda => PlatformDefaults {
                storage_backend: StorageBackend::S3,
                log_format: LogFormat::Json,
            },
            Platform::Local => PlatformDefaults {
                storage_backend: StorageBackend::Fs,
                log_format: LogFormat::Text,
            },
        }
    }

    pub(crate) fn default_config(&self) -> RuntimeConfig {
        let defaults = self.defaults();

        let storage = match defaults.storage_backend {
            StorageBackend::Fs => StorageConfig {
                backend: StorageBackend::Fs,
                fs: Some(FsConfig::default()),
                s3: None,
            },
            StorageBackend::S3 => StorageConfig {
                backend: StorageBackend::S3,
                fs: None,
                s3: Some(S3Config {
                    bucket: String::new(),
                    region: "ap-south-1".to_string(),
                    endpoint: None,
                }),
            },
        };

        RuntimeConfig {
            export: Default::default(),
            repair: Default::default(),
            storage,
            server: Default::default(),
            log: LogConfig {
                level: "info".to_string(),
                format: defaults.log_format,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlatformDefaults {
    pub storage_backend: StorageBackend,
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_defaults() {
        let lambda = Platform::Lambda.defaults();
        assert_eq!(lambda.storage_backend, StorageBackend::S3);
        assert_eq!(lambda.log_format, LogFormat::Json);

        let local = Platform::Local.defaults();
        assert_eq!(local.storage_backend, StorageBackend::Fs);
        assert_eq!(local.log_format, LogFormat::Text);
    }

    #[test]
    fn test_default_config_matches_backend() {
        let lambda = Platform::Lambda.default_config();
        assert!(lambda.storage.s3.is_some());
        assert!(lambda.storage.fs.is_none());

        let local = Platform::Local.default_config();
        assert_eq!(local.storage.fs.as_ref().unwrap().path, "./data");
    }
}
