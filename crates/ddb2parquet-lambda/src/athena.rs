// Athena as the QueryEngine used by the partition repairer

use async_trait::async_trait;
use aws_sdk_athena::error::DisplayErrorContext;
use aws_sdk_athena::types::{QueryExecutionContext, QueryExecutionState};
use aws_sdk_athena::Client;
use ddb2parquet_handlers::{JobError, QueryEngine, QueryRequest, QueryState};

#[derive(Debug, Clone)]
pub struct AthenaEngine {
    client: Client,
}

impl AthenaEngine {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryEngine for AthenaEngine {
    async fn start_query(&self, request: &QueryRequest) -> Result<String, JobError> {
        let context = QueryExecutionContext::builder()
            .database(&request.database)
            .build();

        let output = self
            .client
            .start_query_execution()
            .query_string(&request.statement)
            .query_execution_context(context)
            .work_group(&request.workgroup)
            .send()
            .await
            .map_err(|e| JobError::engine(DisplayErrorContext(&e).to_string()))?;

        output
            .query_execution_id()
            .map(str::to_string)
            .ok_or_else(|| JobError::engine("StartQueryExecution returned no execution id"))
    }

    async fn query_state(&self, execution_id: &str) -> Result<QueryState, JobError> {
        let output = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .map_err(|e| JobError::engine(DisplayErrorContext(&e).to_string()))?;

        state_from(
            output
                .query_execution()
                .and_then(|execution| execution.status())
                .and_then(|status| status.state()),
        )
    }
}

fn state_from(state: Option<&QueryExecutionState>) -> Result<QueryState, JobError> {
    state
        .map(|s| QueryState::from(s.as_str()))
        .ok_or_else(|| JobError::engine("GetQueryExecution returned no state"))
}
