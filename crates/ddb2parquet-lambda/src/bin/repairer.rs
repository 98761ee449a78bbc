// Partition repair Lambda. Build with: cargo lambda build -p ddb2parquet-lambda --bin repairer

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    ddb2parquet_lambda::run_repairer().await
}
