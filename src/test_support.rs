//! Recording fakes for the collaborator services, shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use crate::model::Task;
use crate::services::{
    ChartOptions, ChartSurface, DialogOutcome, DialogRequest, DialogService, QueryArgs, Record,
    RecordService, ServiceError,
};

pub(crate) struct RecordedQuery {
    pub model: String,
    pub domain: Value,
    pub args: QueryArgs,
}

pub(crate) struct RecordedWrite {
    pub model: String,
    pub ids: Vec<i64>,
    pub values: Map<String, Value>,
}

struct QueryResponse {
    result: Result<Vec<Record>, ServiceError>,
    delay: Option<Duration>,
}

/// Record service fake: queued query responses, every call recorded.
#[derive(Default)]
pub(crate) struct FakeRecordService {
    responses: Mutex<VecDeque<QueryResponse>>,
    pub queries: Mutex<Vec<RecordedQuery>>,
    pub writes: Mutex<Vec<RecordedWrite>>,
    pub creates: Mutex<Vec<(String, Vec<Map<String, Value>>)>>,
}

impl FakeRecordService {
    pub fn push_records(&self, records: Vec<Record>) {
        self.responses.lock().push_back(QueryResponse {
            result: Ok(records),
            delay: None,
        });
    }

    pub fn push_error(&self, error: ServiceError) {
        self.responses.lock().push_back(QueryResponse {
            result: Err(error),
            delay: None,
        });
    }

    pub fn push_delayed(&self, records: Vec<Record>, delay: Duration) {
        self.responses.lock().push_back(QueryResponse {
            result: Ok(records),
            delay: Some(delay),
        });
    }

    pub fn push_delayed_error(&self, error: ServiceError, delay: Duration) {
        self.responses.lock().push_back(QueryResponse {
            result: Err(error),
            delay: Some(delay),
        });
    }
}

#[async_trait::async_trait]
impl RecordService for FakeRecordService {
    async fn query(
        &self,
        model: &str,
        domain: &Value,
        args: QueryArgs,
    ) -> Result<Vec<Record>, ServiceError> {
        self.queries.lock().push(RecordedQuery {
            model: model.to_string(),
            domain: domain.clone(),
            args,
        });
        let response = self.responses.lock().pop_front();
        match response {
            Some(QueryResponse { result, delay }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Ok(Vec::new()),
        }
    }

    async fn write(
        &self,
        model: &str,
        ids: &[i64],
        values: Map<String, Value>,
    ) -> Result<(), ServiceError> {
        self.writes.lock().push(RecordedWrite {
            model: model.to_string(),
            ids: ids.to_vec(),
            values,
        });
        Ok(())
    }

    async fn create(
        &self,
        model: &str,
        values: Vec<Map<String, Value>>,
    ) -> Result<Vec<i64>, ServiceError> {
        let ids = (1..=values.len() as i64).collect();
        self.creates.lock().push((model.to_string(), values));
        Ok(ids)
    }
}

/// Dialog fake resolving every request with a fixed outcome.
pub(crate) struct FakeDialogService {
    pub requests: Mutex<Vec<DialogRequest>>,
    outcome: DialogOutcome,
}

impl FakeDialogService {
    pub fn saving() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            outcome: DialogOutcome::Saved,
        }
    }

    pub fn discarding() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            outcome: DialogOutcome::Discarded,
        }
    }
}

#[async_trait::async_trait]
impl DialogService for FakeDialogService {
    async fn open(&self, request: DialogRequest) -> Result<DialogOutcome, ServiceError> {
        self.requests.lock().push(request);
        Ok(self.outcome)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SurfaceCall {
    Clear,
    EmptyState(String),
    BuildChart {
        tasks: Vec<Task>,
        options: ChartOptions,
    },
}

/// Chart surface fake; the call log handle stays with the test while the
/// surface itself moves into the renderer.
pub(crate) struct FakeSurface {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl FakeSurface {
    pub fn new() -> (Self, Arc<Mutex<Vec<SurfaceCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl ChartSurface for FakeSurface {
    fn clear(&mut self) {
        self.calls.lock().push(SurfaceCall::Clear);
    }

    fn show_empty_state(&mut self, markup: &str) {
        self.calls
            .lock()
            .push(SurfaceCall::EmptyState(markup.to_string()));
    }

    fn build_chart(&mut self, tasks: &[Task], options: &ChartOptions) {
        self.calls.lock().push(SurfaceCall::BuildChart {
            tasks: tasks.to_vec(),
            options: options.clone(),
        });
    }
}

pub(crate) fn record(id: i64, name: &str) -> Record {
    let mut record = Map::new();
    record.insert("id".to_string(), json!(id));
    record.insert("name".to_string(), json!(name));
    record
}

pub(crate) fn with_field(mut record: Record, field: &str, value: Value) -> Record {
    record.insert(field.to_string(), value);
    record
}

pub(crate) fn m2o(id: i64, display_name: &str) -> Value {
    json!({ "id": id, "display_name": display_name })
}
