//! Collaborator interfaces the view is composed against.
//!
//! The host application owns the actual record RPC transport, the modal/dialog
//! subsystem and the interactive chart widget; the view only talks to them
//! through these traits. Everything is injected as `Arc<dyn Trait>` at mount
//! time.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::model::{Task, TimeScale};

/// A raw record as returned by the query service: field name -> JSON value.
pub type Record = Map<String, Value>;

/// Failure reported by a collaborator service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

/// Per-field request shape for a query.
///
/// Relational fields are expanded one level into the referenced record's
/// display name only, never its full payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSpec {
    Simple,
    /// Request `{fields: {display_name: {}}}` for the referenced record.
    Relational,
}

/// Keyword arguments for [`RecordService::query`].
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pub field_spec: BTreeMap<String, FieldSpec>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order: String,
    pub context: Map<String, Value>,
}

/// The record storage/query endpoint.
#[async_trait::async_trait]
pub trait RecordService: Send + Sync {
    /// Read records of `model` matching `domain`, restricted to the requested
    /// field spec.
    async fn query(
        &self,
        model: &str,
        domain: &Value,
        args: QueryArgs,
    ) -> Result<Vec<Record>, ServiceError>;

    /// Write `values` onto every record in `ids`.
    async fn write(
        &self,
        model: &str,
        ids: &[i64],
        values: Map<String, Value>,
    ) -> Result<(), ServiceError>;

    /// Create one record per value map, returning the new ids.
    async fn create(
        &self,
        model: &str,
        values: Vec<Map<String, Value>>,
    ) -> Result<Vec<i64>, ServiceError>;
}

/// Request to open a record form dialog.
///
/// `res_id = None` opens a creation form; the context carries
/// `default_<field>` keys pre-filling it.
#[derive(Debug, Clone)]
pub struct DialogRequest {
    pub res_model: String,
    pub res_id: Option<i64>,
    pub context: Map<String, Value>,
}

/// How a record form dialog was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Saved,
    Discarded,
}

/// The host's modal form-dialog subsystem.
#[async_trait::async_trait]
pub trait DialogService: Send + Sync {
    /// Open a form dialog and resolve once the user closes it.
    async fn open(&self, request: DialogRequest) -> Result<DialogOutcome, ServiceError>;
}

/// Options handed to the chart widget on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOptions {
    pub view_mode: TimeScale,
    pub view_modes: Vec<TimeScale>,
    pub header_height: u32,
    pub column_width: u32,
    pub step: u32,
    pub bar_height: u32,
    pub bar_corner_radius: u32,
    pub arrow_curve: u32,
    pub padding: u32,
    pub date_format: &'static str,
}

/// The display surface the chart widget lives on.
///
/// The widget itself is a third-party component; the renderer only clears the
/// surface, rebuilds a chart from a task list, or shows the empty-state help.
pub trait ChartSurface: Send {
    fn clear(&mut self);

    /// Show the no-records help markup instead of a chart.
    fn show_empty_state(&mut self, markup: &str);

    /// Construct (or reconstruct) the chart widget from `tasks`.
    fn build_chart(&mut self, tasks: &[Task], options: &ChartOptions);
}
