//! Binds model output to the chart widget and wires the widget's edit
//! callbacks back into the record service.

use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::controller::ViewEvent;
use crate::error::ViewError;
use crate::model::{dates, GanttDataModel, Task, TimeScale};
use crate::services::{
    ChartOptions, ChartSurface, DialogOutcome, DialogRequest, DialogService, RecordService,
};

/// Help markup shown instead of the chart when the query matched nothing.
pub const EMPTY_STATE_MARKUP: &str = r#"<div class="gantt-view-nocontent">
    <p class="gantt-view-nocontent-title">No record found. Let's create a new Task!</p>
    <p>Click to add a new record.</p>
</div>"#;

/// Drives the chart widget from model data.
///
/// Reads go through [`GanttDataModel::fetch_data`], never `load`, so a render
/// can never mutate the model's stored configuration.
pub struct GanttRenderer {
    model: Arc<GanttDataModel>,
    service: Arc<dyn RecordService>,
    dialogs: Arc<dyn DialogService>,
    surface: Mutex<Box<dyn ChartSurface>>,
}

impl GanttRenderer {
    pub fn new(
        model: Arc<GanttDataModel>,
        service: Arc<dyn RecordService>,
        dialogs: Arc<dyn DialogService>,
        surface: Box<dyn ChartSurface>,
    ) -> Self {
        Self {
            model,
            service,
            dialogs,
            surface: Mutex::new(surface),
        }
    }

    /// Render once on mount, then again on every controller notification.
    ///
    /// A failed render leaves the surface blank until the next event; the
    /// error goes to the host's reporting path (the log) and the loop keeps
    /// serving.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<ViewEvent>) {
        if let Err(err) = self.render().await {
            error!(%err, "initial gantt render failed");
        }
        while let Some(event) = events.recv().await {
            // Refresh and scale change both end in a full rebuild.
            if let Err(err) = self.render().await {
                error!(%err, ?event, "gantt render failed");
            }
        }
    }

    /// Clear the surface, fetch fresh data, and rebuild the chart — or show
    /// the empty state when nothing matched.
    pub async fn render(&self) -> Result<(), ViewError> {
        self.surface.lock().clear();

        let data = self.model.fetch_data(None).await?;

        let mut surface = self.surface.lock();
        if data.records.is_empty() {
            surface.show_empty_state(EMPTY_STATE_MARKUP);
        } else {
            surface.build_chart(&data.records, &self.chart_options(self.model.time_scale()));
        }
        Ok(())
    }

    fn chart_options(&self, view_mode: TimeScale) -> ChartOptions {
        ChartOptions {
            view_mode,
            view_modes: TimeScale::all(),
            header_height: 50,
            column_width: 30,
            step: 24,
            bar_height: 20,
            bar_corner_radius: 3,
            arrow_curve: 5,
            padding: 18,
            date_format: "YYYY-MM-DD",
        }
    }

    /// Widget hook: detail popup markup for a hovered bar. Pure read.
    pub fn detail_popup(&self, task: &Task) -> String {
        let start = task.start.as_deref().unwrap_or_default();
        let end = task.end.as_deref().unwrap_or_default();
        let assignees = task.assignees.as_deref().unwrap_or_default();
        let progress = task
            .progress
            .map(|p| p.to_string())
            .unwrap_or_default();
        format!(
            r#"<div class="details-container">
    <div class="title">{}</div>
    <div class="subtitle">
        Start: {} <br/>
        Stop: {} <br/>
        Assigned to: {} <br/>
        Task Progress: {} <br/>
    </div>
</div>"#,
            task.name, start, end, assignees, progress
        )
    }

    /// Widget hook: a bar was dragged to new dates. Writes both configured
    /// date fields, fire-and-forget.
    pub fn on_date_change(&self, task: &Task, start: NaiveDateTime, end: NaiveDateTime) {
        let meta = self.model.meta();
        let Ok(id) = task.id.parse::<i64>() else {
            warn!(task = %task.id, "task id is not a record id, dropping date change");
            return;
        };
        let mut values = Map::new();
        if let Some(field) = &meta.date_start_field {
            values.insert(field.clone(), json!(dates::serialize_datetime(start)));
        }
        if let Some(field) = &meta.date_stop_field {
            values.insert(field.clone(), json!(dates::serialize_datetime(end)));
        }
        if values.is_empty() {
            return;
        }
        self.spawn_write(meta.res_model, id, values);
    }

    /// Widget hook: the progress handle was dragged. No-op unless a progress
    /// field is configured.
    pub fn on_progress_change(&self, task: &Task, progress: f64) {
        let meta = self.model.meta();
        let Some(field) = meta.progress_field else {
            return;
        };
        let Ok(id) = task.id.parse::<i64>() else {
            warn!(task = %task.id, "task id is not a record id, dropping progress change");
            return;
        };
        let mut values = Map::new();
        values.insert(field, json!(progress));
        self.spawn_write(meta.res_model, id, values);
    }

    /// Widget hook: a bar was clicked; open the edit dialog and re-render
    /// after a save.
    pub async fn on_bar_click(&self, task: &Task) -> Result<(), ViewError> {
        let meta = self.model.meta();
        let id = task
            .id
            .parse::<i64>()
            .map_err(|_| ViewError::InvalidRecordId(task.id.clone()))?;
        let outcome = self
            .dialogs
            .open(DialogRequest {
                res_model: meta.res_model,
                res_id: Some(id),
                context: meta.context,
            })
            .await?;
        if outcome == DialogOutcome::Saved {
            self.render().await?;
        }
        Ok(())
    }

    /// Fire-and-forget write-back: control returns to the widget immediately,
    /// the next full render shows convergence. The widget's visual state is
    /// not rolled back on failure.
    fn spawn_write(&self, model: String, id: i64, values: Map<String, Value>) {
        let service = self.service.clone();
        tokio::spawn(async move {
            if let Err(err) = service.write(&model, &[id], values).await {
                error!(%err, record = id, "write-back failed, chart is stale until the next render");
            }
        });
    }
}
