//! The Gantt data model: query shaping, hierarchical reordering and the
//! superseding-fetch guard.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ViewError;
use crate::model::config::{LoadParams, TimeScale, ViewConfig};
use crate::model::dates;
use crate::model::task::{color_style_class, Task};
use crate::services::{FieldSpec, QueryArgs, Record, RecordService};

/// One resolved fetch.
///
/// `count` is the number of resolved query batches — always 1 after a
/// successful fetch, never the record count. Preserved legacy field; do not
/// read it as a record total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResult {
    pub count: usize,
    pub records: Vec<Task>,
}

struct ModelState {
    meta: ViewConfig,
    data: FetchResult,
    time_scale: TimeScale,
}

/// Owns fetch parameters and the chart-ready task list.
///
/// Stored state is replaced only by [`load`](Self::load) and only atomically:
/// configuration and result set move together, and a failed or superseded
/// fetch leaves both untouched. [`fetch_data`](Self::fetch_data) never writes
/// shared state, so the renderer can poll freely.
pub struct GanttDataModel {
    service: Arc<dyn RecordService>,
    state: Mutex<ModelState>,
    /// Generation counter implementing "latest fetch wins": a result is only
    /// applied if no newer fetch was issued while it was in flight.
    latest_fetch: AtomicU64,
}

impl GanttDataModel {
    pub fn new(service: Arc<dyn RecordService>, config: ViewConfig) -> Self {
        Self {
            service,
            state: Mutex::new(ModelState {
                meta: config,
                data: FetchResult::default(),
                // The model's own scale default, distinct from the arch-level
                // Week in `ViewConfig::time_frame`; see DESIGN.md.
                time_scale: TimeScale::Month,
            }),
            latest_fetch: AtomicU64::new(0),
        }
    }

    /// Snapshot of the stored configuration.
    pub fn meta(&self) -> ViewConfig {
        self.state.lock().meta.clone()
    }

    /// Snapshot of the most recently applied fetch result.
    pub fn data(&self) -> FetchResult {
        self.state.lock().data.clone()
    }

    pub fn time_scale(&self) -> TimeScale {
        self.state.lock().time_scale
    }

    pub fn set_time_scale(&self, scale: TimeScale) {
        self.state.lock().time_scale = scale;
    }

    /// Merge `params` over the stored configuration, fetch, and replace the
    /// stored configuration and result set together.
    ///
    /// If a newer `load` was issued while this one was in flight, the result
    /// (success or failure) is discarded and `Ok(())` is returned — the stale
    /// outcome must never be observable.
    pub async fn load(&self, params: LoadParams) -> Result<(), ViewError> {
        let meta = self.state.lock().meta.merged(&params);
        let ticket = self.latest_fetch.fetch_add(1, Ordering::SeqCst) + 1;

        let fetched = self.fetch(&meta).await;

        let mut state = self.state.lock();
        if self.latest_fetch.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "discarding superseded fetch result");
            return Ok(());
        }
        let data = fetched?;
        state.data = data;
        state.meta = meta;
        Ok(())
    }

    /// Read-only fetch: merges `params` for this query only and leaves the
    /// stored configuration and result set untouched.
    pub async fn fetch_data(&self, params: Option<LoadParams>) -> Result<FetchResult, ViewError> {
        let meta = {
            let state = self.state.lock();
            match &params {
                Some(p) => state.meta.merged(p),
                None => state.meta.clone(),
            }
        };
        self.fetch(&meta).await
    }

    async fn fetch(&self, meta: &ViewConfig) -> Result<FetchResult, ViewError> {
        let args = QueryArgs {
            field_spec: field_spec(meta),
            limit: meta.limit,
            offset: meta.offset,
            order: order_clause(meta),
            context: meta.context.clone(),
        };
        debug!(
            model = %meta.res_model,
            fields = args.field_spec.len(),
            "fetching gantt records"
        );

        let batch = self.service.query(&meta.res_model, &meta.domain, args).await?;
        let ordered = reorder_by_parent(batch, meta.parent_field.as_deref());
        let records = project_records(&ordered, meta);

        // One query batch per fetch; `count` tracks batches, not records.
        Ok(FetchResult { count: 1, records })
    }
}

/// The minimal field list for a query: name, the configured date fields, and
/// whichever of the hierarchy/assignee/color/progress fields are set. First
/// insertion order, deduplicated.
fn field_list(meta: &ViewConfig) -> Vec<String> {
    let mut fields: Vec<String> = vec!["name".to_string()];
    let configured = [
        meta.date_start_field.as_ref(),
        meta.date_stop_field.as_ref(),
        meta.parent_field.as_ref(),
        meta.user_ids_field.as_ref(),
        meta.color_field.as_ref(),
        meta.progress_field.as_ref(),
    ];
    for field in configured.into_iter().flatten() {
        if !fields.contains(field) {
            fields.push(field.clone());
        }
    }
    fields
}

fn field_spec(meta: &ViewConfig) -> BTreeMap<String, FieldSpec> {
    field_list(meta)
        .into_iter()
        .map(|name| {
            let relational = meta
                .fields
                .get(&name)
                .is_some_and(|def| def.ftype.is_relational());
            let spec = if relational {
                FieldSpec::Relational
            } else {
                FieldSpec::Simple
            };
            (name, spec)
        })
        .collect()
}

fn order_clause(meta: &ViewConfig) -> String {
    if meta.default_order.is_empty() {
        String::new()
    } else {
        format!("{} asc", meta.default_order)
    }
}

fn record_id(record: &Record) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}

fn parent_ref(record: &Record, parent_field: &str) -> Option<i64> {
    record
        .get(parent_field)
        .and_then(|v| v.get("id"))
        .and_then(Value::as_i64)
}

/// Reorder a server batch so children cluster after their parent.
///
/// One pass in server order: a record without a parent reference is appended;
/// a record with one is inserted immediately after its parent's *current*
/// position, or appended if the parent is not (yet) in the list. A parent
/// appearing later in server order therefore does not pull earlier children
/// to it — this is insert-after-parent, not tree ordering.
fn reorder_by_parent(batch: Vec<Record>, parent_field: Option<&str>) -> Vec<Record> {
    let Some(parent_field) = parent_field else {
        return batch;
    };
    let mut ordered: Vec<Record> = Vec::with_capacity(batch.len());
    for record in batch {
        match parent_ref(&record, parent_field) {
            Some(parent_id) => {
                let index = ordered
                    .iter()
                    .position(|r| record_id(r) == Some(parent_id))
                    .map(|i| i + 1)
                    .unwrap_or(ordered.len());
                ordered.insert(index, record);
            }
            None => ordered.push(record),
        }
    }
    ordered
}

fn project_records(batch: &[Record], meta: &ViewConfig) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(batch.len());
    for record in batch {
        match project_record(record, meta) {
            Some(task) => tasks.push(task),
            None => warn!("skipping record without a usable id"),
        }
    }
    tasks
}

fn project_record(record: &Record, meta: &ViewConfig) -> Option<Task> {
    let id = record_id(record)?;

    let name = record
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let assignees = meta
        .user_ids_field
        .as_deref()
        .and_then(|f| record.get(f))
        .and_then(Value::as_array)
        .map(|users| {
            users
                .iter()
                .filter_map(|u| u.get("display_name").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(",")
        })
        .filter(|names| !names.is_empty());

    let progress = meta
        .progress_field
        .as_deref()
        .and_then(|f| record.get(f))
        .and_then(Value::as_f64)
        .filter(|p| *p != 0.0);

    let style_class = color_style_class(meta.color_field.as_deref().and_then(|f| record.get(f)));

    let parent_task_id = meta
        .parent_field
        .as_deref()
        .and_then(|f| parent_ref(record, f))
        .map(|pid| pid.to_string());

    Some(Task {
        id: id.to_string(),
        name,
        start: date_field_value(record, meta.date_start_field.as_deref()),
        end: date_field_value(record, meta.date_stop_field.as_deref()),
        assignees,
        progress,
        style_class,
        parent_task_id,
    })
}

/// Re-serialize a record timestamp, or the unset sentinel when the field is
/// unconfigured, missing, `false`, or unparseable.
fn date_field_value(record: &Record, field: Option<&str>) -> Option<String> {
    let raw = field.and_then(|f| record.get(f))?.as_str()?;
    dates::deserialize_datetime(raw).map(dates::serialize_datetime)
}
