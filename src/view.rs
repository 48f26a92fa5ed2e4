//! Composition root: turns an arch document into a configured, wired view.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::arch::{ArchNode, GanttArchParser};
use crate::controller::{GanttController, ViewEvent};
use crate::model::{FieldDefinition, GanttDataModel, TimeScale, ViewConfig};
use crate::renderer::GanttRenderer;
use crate::services::{ChartSurface, DialogService, RecordService};

/// Map a parsed arch document plus the host-provided view properties onto a
/// [`ViewConfig`].
pub fn config_from_arch(
    arch: &ArchNode,
    res_model: &str,
    fields: HashMap<String, FieldDefinition>,
    context: Map<String, Value>,
    domain: Value,
) -> ViewConfig {
    let info = GanttArchParser.parse(arch);
    ViewConfig {
        res_model: res_model.to_string(),
        domain,
        context,
        fields,
        date_start_field: info.start_date,
        date_stop_field: info.stop_date,
        parent_field: info.parent_id,
        user_ids_field: info.user_ids,
        color_field: info.color,
        progress_field: info.task_progress,
        time_frame: info.time_frame.unwrap_or(TimeScale::Week),
        default_order: "id".to_string(),
        limit: None,
        offset: None,
    }
}

/// A mounted Gantt view: model, controller and renderer wired over one typed
/// event channel.
pub struct GanttView {
    pub model: Arc<GanttDataModel>,
    pub controller: Arc<GanttController>,
    pub renderer: Arc<GanttRenderer>,
    events: mpsc::UnboundedReceiver<ViewEvent>,
}

impl GanttView {
    /// Wire up a view instance against the host's services. A restored
    /// local-state snapshot can be passed as `config` directly, bypassing the
    /// arch mapping.
    pub fn mount(
        config: ViewConfig,
        records: Arc<dyn RecordService>,
        dialogs: Arc<dyn DialogService>,
        surface: Box<dyn ChartSurface>,
    ) -> Self {
        let model = Arc::new(GanttDataModel::new(records.clone(), config));
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let controller = Arc::new(GanttController::new(
            model.clone(),
            dialogs.clone(),
            events_tx,
        ));
        let renderer = Arc::new(GanttRenderer::new(model.clone(), records, dialogs, surface));
        Self {
            model,
            controller,
            renderer,
            events: events_rx,
        }
    }

    /// Drive the renderer: one render on mount, then one per controller
    /// notification. Clone [`controller`](Self::controller) (and
    /// [`renderer`](Self::renderer) for the widget hooks) before calling —
    /// this consumes the view, and the loop ends once every controller handle
    /// is dropped.
    pub async fn run(self) {
        let GanttView {
            model,
            controller,
            renderer,
            events,
        } = self;
        // Release the view's own controller handle (and its event sender)
        // before entering the loop: async fn arguments live until the future
        // completes, so a `..` partial move would keep the sender alive and
        // the loop could never observe the channel closing.
        drop(controller);
        drop(model);
        renderer.run(events).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;

    #[test]
    fn arch_mapping_fills_the_configuration() {
        let arch = ArchNode::new("gantt")
            .with_attr("start_date", "date_start")
            .with_attr("stop_date", "date_stop")
            .with_attr("task_progress", "progress")
            .with_child(ArchNode::new("field").with_attr("name", "name"));
        let mut fields = HashMap::new();
        fields.insert(
            "progress".to_string(),
            FieldDefinition::new(FieldType::Float),
        );

        let config = config_from_arch(
            &arch,
            "project.task",
            fields,
            Map::new(),
            Value::Array(Vec::new()),
        );
        assert_eq!(config.res_model, "project.task");
        assert_eq!(config.date_start_field.as_deref(), Some("date_start"));
        assert_eq!(config.date_stop_field.as_deref(), Some("date_stop"));
        assert_eq!(config.progress_field.as_deref(), Some("progress"));
        assert_eq!(config.parent_field, None);
        assert_eq!(config.time_frame, TimeScale::Week);
        assert_eq!(config.default_order, "id");
    }
}
