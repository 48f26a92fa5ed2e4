pub mod config;
pub mod data_model;
pub mod dates;
pub mod task;

pub use config::{FieldDefinition, FieldType, LoadParams, TimeScale, ViewConfig};
pub use data_model::{FetchResult, GanttDataModel};
pub use task::Task;
