use crate::error::JobError;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Lifecycle state of a query execution as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// Any state string the engine reports that is not listed above
    Other(String),
}

impl QueryState {
    /// States in which the execution may still change
    pub fn is_in_progress(&self) -> bool {
        matches!(self, QueryState::Queued | QueryState::Running)
    }

    pub fn as_str(&self) -> &str {
        match self {
            QueryState::Queued => "QUEUED",
            QueryState::Running => "RUNNING",
            QueryState::Succeeded => "SUCCEEDED",
            QueryState::Failed => "FAILED",
            QueryState::Cancelled => "CANCELLED",
            QueryState::Other(s) => s,
        }
    }
}

impl From<&str> for QueryState {
    fn from(value: &str) -> Self {
        match value {
            "QUEUED" => QueryState::Queued,
            "RUNNING" => QueryState::Running,
            "SUCCEEDED" => QueryState::Succeeded,
            "FAILED" => QueryState::Failed,
            "CANCELLED" => QueryState::Cancelled,
            other => QueryState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A statement to run, scoped to a database and workgroup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub statement: String,
    pub database: String,
    pub workgroup: String,
}

/// Asynchronous SQL query service
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Submit a query and return its execution id
    async fn start_query(&self, request: &QueryRequest) -> Result<String, JobError>;

    /// Current state of an execution
    async fn query_state(&self, execution_id: &str) -> Result<QueryState, JobError>;
}

/// Pause between status polls
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
