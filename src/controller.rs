//! Top-level orchestration: time-scale state, new-task creation, and the
//! notifications that drive the renderer.

use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;
use serde_json::{json, Map};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::ViewError;
use crate::model::{dates, GanttDataModel, TimeScale, ViewConfig};
use crate::services::{DialogOutcome, DialogRequest, DialogService};

/// Notification from the controller to the renderer. Replaces a global event
/// bus with one typed channel per view instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// Re-fetch and rebuild the chart.
    RenderRefresh,
    /// The user changed the zoom granularity.
    TimeScaleChanged(TimeScale),
}

/// Owns the current time-scale and delegates all rendering via [`ViewEvent`]s;
/// never touches the chart directly.
pub struct GanttController {
    model: Arc<GanttDataModel>,
    dialogs: Arc<dyn DialogService>,
    events: mpsc::UnboundedSender<ViewEvent>,
    time_scale: Mutex<TimeScale>,
}

impl GanttController {
    pub fn new(
        model: Arc<GanttDataModel>,
        dialogs: Arc<dyn DialogService>,
        events: mpsc::UnboundedSender<ViewEvent>,
    ) -> Self {
        Self {
            model,
            dialogs,
            events,
            time_scale: Mutex::new(TimeScale::Month),
        }
    }

    pub fn time_scale(&self) -> TimeScale {
        *self.time_scale.lock()
    }

    /// Update both the controller's and the model's scale, then notify the
    /// renderer.
    pub fn set_time_scale(&self, scale: TimeScale) {
        *self.time_scale.lock() = scale;
        self.model.set_time_scale(scale);
        self.emit(ViewEvent::TimeScaleChanged(scale));
    }

    /// Open a creation dialog pre-filled with a start of now and an end one
    /// scale step ahead; a saved record triggers a render refresh.
    pub async fn on_new_task(&self) -> Result<(), ViewError> {
        let start = Local::now().naive_local();
        let end = self.time_scale().default_span_end(start);
        let meta = self.model.meta();

        let mut context = Map::new();
        if let Some(field) = &meta.date_start_field {
            context.insert(
                format!("default_{field}"),
                json!(dates::serialize_datetime(start)),
            );
        }
        if let Some(field) = &meta.date_stop_field {
            context.insert(
                format!("default_{field}"),
                json!(dates::serialize_datetime(end)),
            );
        }

        let outcome = self
            .dialogs
            .open(DialogRequest {
                res_model: meta.res_model.clone(),
                res_id: None,
                context,
            })
            .await?;
        if outcome == DialogOutcome::Saved {
            self.on_record_saved();
        }
        Ok(())
    }

    pub fn on_record_saved(&self) {
        self.emit(ViewEvent::RenderRefresh);
    }

    /// Opaque snapshot for saved-view / back-forward restoration.
    pub fn local_state(&self) -> ViewConfig {
        self.model.meta()
    }

    fn emit(&self, event: ViewEvent) {
        if self.events.send(event).is_err() {
            debug!(?event, "renderer gone, dropping view event");
        }
    }
}
