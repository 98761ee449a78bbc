// End-to-end behaviour of the exporter and repairer through the public API
//
// The exporter writes into an in-memory OpenDAL operator so the uploaded
// Parquet file can be read back; the repairer runs against a scripted engine.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ddb2parquet_config::{ExportConfig, RepairConfig};
use ddb2parquet_core::Row;
use ddb2parquet_handlers::{
    ExportOutcome, ExportSettings, ExportStatus, Exporter, JobError, QueryEngine, QueryRequest,
    QueryState, RepairSettings, Repairer, RowSource, ScanPage, Sleeper,
};
use ddb2parquet_writer::ObjectWriter;
use opendal::{services, Operator};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const TODAY_KEY: &str = "year=2025/month=03/day=09/dynamodb_export.parquet";

/// 2025-03-09 12:00 in Asia/Kolkata
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 9, 6, 30, 0).unwrap()
}

fn click(id: &str, ts: &str) -> Row {
    Row::new()
        .with("id", id)
        .with("timestamp", ts)
        .with("button", "GitHub")
        .with("country", "India")
}

/// Serves pre-built pages; page `n` carries token `n + 1` unless it is the last
struct PagedTable {
    pages: Vec<Vec<Row>>,
    calls: Mutex<Vec<Option<usize>>>,
}

impl PagedTable {
    fn new(pages: Vec<Vec<Row>>) -> Self {
        Self {
            pages,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Option<usize>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl<'a> RowSource for &'a PagedTable {
    type Token = usize;

    async fn scan_page(&self, start: Option<usize>) -> Result<ScanPage<usize>, JobError> {
        self.calls.lock().unwrap().push(start);
        let index = start.unwrap_or(0);
        let rows = self.pages[index].clone();
        if index + 1 < self.pages.len() {
            Ok(ScanPage::with_next(rows, index + 1))
        } else {
            Ok(ScanPage::last(rows))
        }
    }
}

fn memory_writer() -> ObjectWriter {
    let op = Operator::new(services::Memory::default())
        .expect("Failed to create memory operator")
        .finish();
    ObjectWriter::new(op)
}

fn export_settings() -> ExportSettings {
    ExportSettings::from_config(&ExportConfig::default()).unwrap()
}

async fn read_ids(writer: &ObjectWriter, key: &str) -> Vec<String> {
    use arrow::array::{Array, StringArray};

    let bytes = writer.operator().read(key).await.unwrap().to_bytes();
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)
        .unwrap()
        .build()
        .unwrap();

    let mut ids = Vec::new();
    for batch in reader {
        let batch = batch.unwrap();
        let idx = batch.schema().index_of("id").unwrap();
        let column = batch
            .column(idx)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        for i in 0..column.len() {
            ids.push(column.value(i).to_string());
        }
    }
    ids
}

#[tokio::test]
async fn exports_only_todays_rows() {
    let table = PagedTable::new(vec![vec![
        click("yesterday-1", "2025-03-08T23:59:59"),
        click("today-1", "2025-03-09T00:00:01"),
        click("tomorrow-1", "2025-03-10T00:00:00"),
        click("today-2", "2025-03-09T18:45:10"),
        Row::new().with("id", "no-timestamp"),
    ]]);
    let writer = memory_writer();
    let exporter = Exporter::new(&table, writer.clone(), export_settings());

    let outcome = exporter.run_at(now()).await.unwrap();

    assert_eq!(
        outcome,
        ExportOutcome::Success {
            records: 2,
            key: TODAY_KEY.to_string()
        }
    );
    assert_eq!(read_ids(&writer, TODAY_KEY).await, vec!["today-1", "today-2"]);
}

#[tokio::test]
async fn no_matches_skips_without_writing() {
    let table = PagedTable::new(vec![vec![click("old", "2025-03-01T10:00:00")]]);
    let writer = memory_writer();
    let exporter = Exporter::new(&table, writer.clone(), export_settings());

    let outcome = exporter.run_at(now()).await.unwrap();
    let response = outcome.response();

    assert_eq!(response.status, ExportStatus::Skipped);
    assert_eq!(response.message, "No records for today[2025-03-09]");
    assert!(!writer.operator().exists(TODAY_KEY).await.unwrap());
}

#[tokio::test]
async fn object_key_follows_timezone_date() {
    // 19:00 UTC on the 9th is already the 10th in Asia/Kolkata
    let late = Utc.with_ymd_and_hms(2025, 3, 9, 19, 0, 0).unwrap();
    let table = PagedTable::new(vec![vec![click("x", "2025-03-10T00:30:00")]]);
    let writer = memory_writer();
    let exporter = Exporter::new(&table, writer.clone(), export_settings());

    let outcome = exporter.run_at(late).await.unwrap();

    match outcome {
        ExportOutcome::Success { key, .. } => {
            assert_eq!(key, "year=2025/month=03/day=10/dynamodb_export.parquet")
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn three_pages_three_fetches() {
    let table = PagedTable::new(vec![
        vec![
            click("p1-today", "2025-03-09T01:00:00"),
            click("p1-old", "2025-03-07T01:00:00"),
        ],
        vec![click("p2-old", "2025-03-08T01:00:00")],
        vec![
            click("p3-today-a", "2025-03-09T02:00:00"),
            click("p3-today-b", "2025-03-09T03:00:00"),
        ],
    ]);
    let writer = memory_writer();
    let exporter = Exporter::new(&table, writer.clone(), export_settings());

    let outcome = exporter.run_at(now()).await.unwrap();

    assert_eq!(table.calls(), vec![None, Some(1), Some(2)]);
    assert_eq!(outcome.response().message, "Exported 3 records to S3.");
    assert_eq!(
        read_ids(&writer, TODAY_KEY).await,
        vec!["p1-today", "p3-today-a", "p3-today-b"]
    );
}

#[tokio::test]
async fn rerun_same_day_overwrites() {
    let writer = memory_writer();

    let first = PagedTable::new(vec![vec![click("first", "2025-03-09T01:00:00")]]);
    Exporter::new(&first, writer.clone(), export_settings())
        .run_at(now())
        .await
        .unwrap();

    let second = PagedTable::new(vec![vec![
        click("first", "2025-03-09T01:00:00"),
        click("second", "2025-03-09T02:00:00"),
    ]]);
    Exporter::new(&second, writer.clone(), export_settings())
        .run_at(now())
        .await
        .unwrap();

    assert_eq!(read_ids(&writer, TODAY_KEY).await, vec!["first", "second"]);
}

/// Replays scripted states; counts submissions and polls
struct ScriptedEngine {
    submit_error: Option<String>,
    states: Mutex<VecDeque<QueryState>>,
    submissions: AtomicUsize,
    polls: AtomicUsize,
}

impl ScriptedEngine {
    fn with_states(states: Vec<QueryState>) -> Self {
        Self {
            submit_error: None,
            states: Mutex::new(states.into()),
            submissions: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
        }
    }

    fn failing_submit(message: &str) -> Self {
        Self {
            submit_error: Some(message.to_string()),
            ..Self::with_states(Vec::new())
        }
    }
}

#[async_trait]
impl<'a> QueryEngine for &'a ScriptedEngine {
    async fn start_query(&self, request: &QueryRequest) -> Result<String, JobError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        assert_eq!(request.statement, "MSCK REPAIR TABLE clickevents");
        match &self.submit_error {
            Some(message) => Err(JobError::engine(message.clone())),
            None => Ok("3f2c9a1e-exec".to_string()),
        }
    }

    async fn query_state(&self, execution_id: &str) -> Result<QueryState, JobError> {
        assert_eq!(execution_id, "3f2c9a1e-exec");
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self.states.lock().unwrap().pop_front();
        Ok(next.unwrap_or(QueryState::Running))
    }
}

#[derive(Default)]
struct CountingSleeper(AtomicUsize);

#[async_trait]
impl<'a> Sleeper for &'a CountingSleeper {
    async fn sleep(&self, duration: Duration) {
        assert_eq!(duration, Duration::from_secs(3));
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn repair_settings() -> RepairSettings {
    RepairSettings::from_config(&RepairConfig::default())
}

#[tokio::test]
async fn repair_polls_until_succeeded() {
    let engine = ScriptedEngine::with_states(vec![
        QueryState::Running,
        QueryState::Running,
        QueryState::Succeeded,
    ]);
    let sleeper = CountingSleeper::default();
    let repairer = Repairer::new(&engine, &sleeper, repair_settings());

    let response = repairer.run().await;

    assert_eq!(sleeper.0.load(Ordering::SeqCst), 2);
    assert_eq!(engine.polls.load(Ordering::SeqCst), 3);
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({
            "statusCode": 200,
            "queryExecutionId": "3f2c9a1e-exec",
            "status": "SUCCEEDED"
        })
    );
}

#[tokio::test]
async fn repair_gives_up_after_ten_polls_without_error() {
    let engine = ScriptedEngine::with_states(vec![QueryState::Running; 10]);
    let sleeper = CountingSleeper::default();
    let repairer = Repairer::new(&engine, &sleeper, repair_settings());

    let response = repairer.run().await;

    assert_eq!(engine.polls.load(Ordering::SeqCst), 10);
    assert_eq!(response.status_code, 200);
    assert_eq!(response.status.as_deref(), Some("RUNNING"));
    assert!(response.error.is_none());
}

#[tokio::test]
async fn repair_submission_failure_is_500_without_polls() {
    let engine = ScriptedEngine::failing_submit("InvalidRequestException: workgroup not found");
    let sleeper = CountingSleeper::default();
    let repairer = Repairer::new(&engine, &sleeper, repair_settings());

    let response = repairer.run().await;

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({
            "statusCode": 500,
            "error": "InvalidRequestException: workgroup not found"
        })
    );
    assert_eq!(engine.submissions.load(Ordering::SeqCst), 1);
    assert_eq!(engine.polls.load(Ordering::SeqCst), 0);
    assert_eq!(sleeper.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn queued_then_cancelled_reports_cancelled() {
    let engine = ScriptedEngine::with_states(vec![QueryState::Queued, QueryState::Cancelled]);
    let sleeper = CountingSleeper::default();
    let repairer = Repairer::new(&engine, &sleeper, repair_settings());

    let report = repairer.execute().await.unwrap();

    assert_eq!(report.state, QueryState::Cancelled);
    assert_eq!(report.polls, 2);
    assert_eq!(sleeper.0.load(Ordering::SeqCst), 1);
}
