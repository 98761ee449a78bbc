// Daily export Lambda. Build with: cargo lambda build -p ddb2parquet-lambda --bin exporter

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    ddb2parquet_lambda::run_exporter().await
}
