//! Partition repair: ask the query engine to rediscover the table's partitions
//! and wait a bounded time for it to finish

use crate::engine::{QueryEngine, QueryRequest, QueryState, Sleeper};
use crate::error::JobError;
use ddb2parquet_config::RepairConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

/// Resolved repairer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairSettings {
    pub request: QueryRequest,
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl RepairSettings {
    pub fn from_config(config: &RepairConfig) -> Self {
        Self {
            request: QueryRequest {
                statement: config.repair_statement(),
                database: config.database.clone(),
                workgroup: config.workgroup.clone(),
            },
            poll_interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts,
        }
    }
}

/// What the poll loop observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairReport {
    pub execution_id: String,
    /// Last state seen; may still be in progress if the attempts ran out
    pub state: QueryState,
    pub polls: u32,
}

/// Invocation result handed back to the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairResponse {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_execution_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepairResponse {
    pub fn completed(report: &RepairReport) -> Self {
        Self {
            status_code: 200,
            query_execution_id: Some(report.execution_id.clone()),
            status: Some(report.state.to_string()),
            error: None,
        }
    }

    pub fn failed(err: &JobError) -> Self {
        Self {
            status_code: 500,
            query_execution_id: None,
            status: None,
            error: Some(err.message()),
        }
    }
}

/// Submits the repair statement and polls it to completion or budget exhaustion
pub struct Repairer<E, S> {
    engine: E,
    sleeper: S,
    settings: RepairSettings,
}

impl<E, S> Repairer<E, S>
where
    E: QueryEngine,
    S: Sleeper,
{
    pub fn new(engine: E, sleeper: S, settings: RepairSettings) -> Self {
        Self {
            engine,
            sleeper,
            settings,
        }
    }

    /// Run the repair and fold every failure into a 500 response
    pub async fn run(&self) -> RepairResponse {
        match self.execute().await {
            Ok(report) => RepairResponse::completed(&report),
            Err(err) => {
                error!(error = %err, "Error executing partition repair");
                RepairResponse::failed(&err)
            }
        }
    }

    /// Submit the statement, then poll while the execution is queued or
    /// running and attempts remain. Running out of attempts is not an error.
    pub async fn execute(&self) -> Result<RepairReport, JobError> {
        let request = &self.settings.request;
        info!(
            statement = %request.statement,
            database = %request.database,
            workgroup = %request.workgroup,
            "Running query"
        );

        let execution_id = self.engine.start_query(request).await?;
        info!(execution_id = %execution_id, "Query execution started");

        let mut state = QueryState::Running;
        let mut remaining = self.settings.max_attempts;
        let mut polls = 0;

        while remaining > 0 && state.is_in_progress() {
            remaining -= 1;
            polls += 1;
            state = self.engine.query_state(&execution_id).await?;
            info!(status = %state, remaining, "Query status");

            if state.is_in_progress() {
                self.sleeper.sleep(self.settings.poll_interval).await;
            }
        }

        match &state {
            QueryState::Succeeded => info!("Table repaired with fresh data successfully"),
            s if s.is_in_progress() => warn!(
                status = %s,
                polls,
                "Poll budget exhausted; repair continues in the background"
            ),
            s => warn!(status = %s, "Query completed without success"),
        }

        Ok(RepairReport {
            execution_id,
            state,
            polls,
        })
    }
}
