// AWS Lambda runtime adapter
//
// Wires the DynamoDB source, OpenDAL object storage and Athena into the
// export and repair jobs, then hands them to lambda_runtime. Both functions
// are triggered on a schedule; the event payload is ignored.

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, SdkConfig};
use ddb2parquet_config::{Component, RuntimeConfig};
use ddb2parquet_handlers::{
    ExportResponse, ExportSettings, Exporter, RepairResponse, RepairSettings, Repairer,
    TokioSleeper,
};
use ddb2parquet_writer::ObjectWriter;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

mod athena;
mod dynamodb;
mod init;

pub use athena::AthenaEngine;
pub use dynamodb::{item_to_row, DynamoDbSource, ScanKey};
pub use init::init_tracing;

/// Exporter reading from DynamoDB and writing through OpenDAL
pub type TableExporter = Exporter<DynamoDbSource, ObjectWriter>;

/// Repairer talking to Athena
pub type AthenaRepairer = Repairer<AthenaEngine, TokioSleeper>;

/// Shared AWS SDK configuration (region and credentials from the environment)
pub async fn load_sdk_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest()).load().await
}

/// Build the exporter from runtime configuration
pub fn build_exporter(config: &RuntimeConfig, sdk: &SdkConfig) -> Result<TableExporter> {
    let settings = ExportSettings::from_config(&config.export)
        .context("Invalid export configuration")?;
    let writer = ObjectWriter::from_config(&config.storage)
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?;
    let source = DynamoDbSource::new(
        aws_sdk_dynamodb::Client::new(sdk),
        config.export.source_table.clone(),
    );

    Ok(Exporter::new(source, writer, settings))
}

/// Build the partition repairer from runtime configuration
pub fn build_repairer(config: &RuntimeConfig, sdk: &SdkConfig) -> AthenaRepairer {
    let engine = AthenaEngine::new(aws_sdk_athena::Client::new(sdk));
    Repairer::new(engine, TokioSleeper, RepairSettings::from_config(&config.repair))
}

fn load_config(component: Component) -> Result<RuntimeConfig, Error> {
    let config = RuntimeConfig::load(component)
        .map_err(|e| Error::from(format!("Failed to load configuration: {:#}", e)))?;
    init_tracing(&config.log);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
        component = ?component,
        "ddb2parquet Lambda starting"
    );
    Ok(config)
}

async fn handle_export(
    event: LambdaEvent<Value>,
    exporter: Arc<TableExporter>,
) -> Result<ExportResponse, Error> {
    let (_payload, context) = event.into_parts();
    info!(request_id = %context.request_id, "Export invoked");

    match exporter.run().await {
        Ok(outcome) => Ok(outcome.response()),
        Err(err) => {
            error!(error = %err, "Export failed");
            Err(err.into())
        }
    }
}

async fn handle_repair(
    event: LambdaEvent<Value>,
    repairer: Arc<AthenaRepairer>,
) -> Result<RepairResponse, Error> {
    let (_payload, context) = event.into_parts();
    info!(request_id = %context.request_id, "Partition repair invoked");
    Ok(repairer.run().await)
}

/// Lambda runtime entry point for the daily exporter
pub async fn run_exporter() -> Result<(), Error> {
    let config = load_config(Component::Exporter)?;
    let sdk = load_sdk_config().await;
    let exporter = Arc::new(
        build_exporter(&config, &sdk).map_err(|e| Error::from(format!("{:#}", e)))?,
    );
    info!(
        table = %config.export.source_table,
        backend = %config.storage.backend,
        timezone = %config.export.timezone,
        "Exporter ready"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let exporter = exporter.clone();
        async move { handle_export(event, exporter).await }
    }))
    .await
}

/// Lambda runtime entry point for the partition repairer
pub async fn run_repairer() -> Result<(), Error> {
    let config = load_config(Component::Repairer)?;
    let sdk = load_sdk_config().await;
    let repairer = Arc::new(build_repairer(&config, &sdk));
    info!(
        database = %config.repair.database,
        table = %config.repair.table,
        workgroup = %config.repair.workgroup,
        "Repairer ready"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let repairer = repairer.clone();
        async move { handle_repair(event, repairer).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_config::Region;
    use ddb2parquet_config::{Platform, S3Config, StorageBackend};

    fn offline_sdk() -> SdkConfig {
        SdkConfig::builder()
            .region(Region::new("ap-south-1"))
            .behavior_version(BehaviorVersion::latest())
            .build()
    }

    #[test]
    fn bad_timezone_fails_exporter_build() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Local);
        config.export.timezone = "Mars/Olympus".to_string();

        let err = build_exporter(&config, &offline_sdk()).err().unwrap();
        assert!(format!("{:#}", err).contains("Invalid export configuration"));
    }

    #[test]
    fn missing_bucket_fails_exporter_build() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Local);
        config.storage.backend = StorageBackend::S3;
        config.storage.s3 = Some(S3Config {
            bucket: String::new(),
            region: "ap-south-1".to_string(),
            endpoint: None,
        });

        let err = build_exporter(&config, &offline_sdk()).err().unwrap();
        assert!(err.to_string().contains("Failed to initialize storage"));
    }
}
