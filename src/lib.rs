//! Gantt-style record view subsystem.
//!
//! Four components form a linear pipeline with one feedback edge:
//!
//! 1. [`arch::GanttArchParser`] turns a declarative view-definition document
//!    into a [`model::ViewConfig`].
//! 2. [`model::GanttDataModel`] queries the record service and reshapes the
//!    batch into a hierarchically ordered, chart-ready task list, with
//!    latest-fetch-wins semantics.
//! 3. [`controller::GanttController`] owns the time-scale state and the
//!    new-task flow, broadcasting changes over a typed channel.
//! 4. [`renderer::GanttRenderer`] feeds the task list to the chart widget and
//!    wires the widget's edit callbacks back through the record service,
//!    looping into a re-fetch.
//!
//! The record service, dialog subsystem and chart widget are host-owned
//! collaborators injected through the traits in [`services`].

pub mod arch;
pub mod controller;
pub mod error;
pub mod model;
pub mod renderer;
pub mod services;
pub mod view;

#[cfg(test)]
mod test_support;

pub use arch::{ArchInfo, ArchNode, GanttArchParser};
pub use controller::{GanttController, ViewEvent};
pub use error::ViewError;
pub use model::{
    FetchResult, FieldDefinition, FieldType, GanttDataModel, LoadParams, Task, TimeScale,
    ViewConfig,
};
pub use renderer::{GanttRenderer, EMPTY_STATE_MARKUP};
pub use services::{
    ChartOptions, ChartSurface, DialogOutcome, DialogRequest, DialogService, FieldSpec, QueryArgs,
    Record, RecordService, ServiceError,
};
pub use view::{config_from_arch, GanttView};
