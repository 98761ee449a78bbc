use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ddb2parquet_config::{Component, RuntimeConfig, StorageBackend};
use std::path::PathBuf;
use tracing::info;

/// Log clicks to DynamoDB, export today's rows to date-partitioned Parquet and repair Athena partitions
#[derive(Parser)]
#[command(name = "ddb2parquet")]
#[command(version)]
#[command(about = "Export today's DynamoDB rows to date-partitioned Parquet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Output directory for Parquet files (filesystem backend only)
    #[arg(short, long, value_name = "DIR", global = true)]
    output: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daily export once
    Export,
    /// Submit the partition repair and wait for it
    Repair,
    /// Serve the click ingest endpoint
    Serve {
        /// Address to listen on (overrides server.listen_addr)
        #[arg(short, long, value_name = "ADDR")]
        listen: Option<String>,
    },
}

impl Commands {
    fn component(&self) -> Component {
        match self {
            Commands::Export => Component::Exporter,
            Commands::Repair => Component::Repairer,
            Commands::Serve { .. } => Component::Ingest,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let component = cli.command.component();
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load_from_path(path, component)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RuntimeConfig::load(component).context("Failed to load configuration")?,
    };

    apply_cli_overrides(&mut config, &cli)?;
    config.validate(component)?;
    ddb2parquet_lambda::init_tracing(&config.log);

    let sdk = ddb2parquet_lambda::load_sdk_config().await;

    let body = match cli.command {
        Commands::Export => {
            let exporter = ddb2parquet_lambda::build_exporter(&config, &sdk)?;
            info!(
                table = %config.export.source_table,
                backend = %config.storage.backend,
                "Running export"
            );
            let outcome = exporter.run().await.context("Export failed")?;
            serde_json::to_string_pretty(&outcome.response())?
        }
        Commands::Repair => {
            let repairer = ddb2parquet_lambda::build_repairer(&config, &sdk);
            let response = repairer.run().await;
            serde_json::to_string_pretty(&response)?
        }
        Commands::Serve { .. } => {
            let store = ddb2parquet_server::build_store(&config, &sdk);
            return ddb2parquet_server::run(&config, store).await;
        }
    };

    println!("{}", body);
    Ok(())
}

fn apply_cli_overrides(config: &mut RuntimeConfig, cli: &Cli) -> Result<()> {
    // Override output directory (only valid for fs backend)
    if let Some(output) = &cli.output {
        if config.storage.backend != StorageBackend::Fs {
            anyhow::bail!(
                "--output flag only works with filesystem backend, but backend is '{}'.\n\
                Either remove --output flag or set backend to 'fs' in config file.",
                config.storage.backend
            );
        }

        let fs_config = config.storage.fs.get_or_insert_with(Default::default);
        fs_config.path = output.to_string_lossy().to_string();
    }

    if let Commands::Serve {
        listen: Some(addr),
    } = &cli.command
    {
        config.server.listen_addr = addr.clone();
    }

    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddb2parquet_config::Platform;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("ddb2parquet").chain(args.iter().copied()))
    }

    #[test]
    fn output_sets_fs_path() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Local);
        apply_cli_overrides(&mut config, &cli(&["export", "--output", "/tmp/exports"])).unwrap();

        assert_eq!(config.storage.fs.unwrap().path, "/tmp/exports");
    }

    #[test]
    fn output_rejected_for_s3() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Lambda);
        let err = apply_cli_overrides(&mut config, &cli(&["export", "-o", "out"])).unwrap_err();

        assert!(err.to_string().contains("--output flag only works"));
    }

    #[test]
    fn log_level_override() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Local);
        apply_cli_overrides(&mut config, &cli(&["repair", "-v", "debug"])).unwrap();

        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn serve_listen_override() {
        let parsed = cli(&["serve", "--listen", "127.0.0.1:5001"]);
        assert_eq!(parsed.command.component(), Component::Ingest);

        let mut config = RuntimeConfig::from_platform_defaults(Platform::Local);
        apply_cli_overrides(&mut config, &parsed).unwrap();

        assert_eq!(config.server.listen_addr, "127.0.0.1:5001");
        assert!(config.validate(Component::Ingest).is_ok());
    }

    #[test]
    fn component_per_subcommand() {
        assert_eq!(cli(&["export"]).command.component(), Component::Exporter);
        assert_eq!(cli(&["repair"]).command.component(), Component::Repairer);
    }
}
