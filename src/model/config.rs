use std::collections::HashMap;
use std::fmt;

use chrono::{Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Controls what zoom granularity the chart displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeScale {
    #[serde(rename = "Quarter Day")]
    QuarterDay,
    #[serde(rename = "Half Day")]
    HalfDay,
    Day,
    Week,
    Month,
}

impl TimeScale {
    /// Every scale the chart widget supports, in zoom order.
    pub fn all() -> Vec<TimeScale> {
        vec![
            TimeScale::QuarterDay,
            TimeScale::HalfDay,
            TimeScale::Day,
            TimeScale::Week,
            TimeScale::Month,
        ]
    }

    /// Default end of a freshly created task starting at `start`: one scale
    /// step ahead. Month steps by calendar month, not a fixed day count.
    pub fn default_span_end(self, start: NaiveDateTime) -> NaiveDateTime {
        match self {
            TimeScale::QuarterDay => start + Duration::hours(4),
            TimeScale::HalfDay => start + Duration::hours(12),
            TimeScale::Day => start + Duration::days(1),
            TimeScale::Week => start + Duration::weeks(1),
            TimeScale::Month => start + Months::new(1),
        }
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeScale::QuarterDay => "Quarter Day",
            TimeScale::HalfDay => "Half Day",
            TimeScale::Day => "Day",
            TimeScale::Week => "Week",
            TimeScale::Month => "Month",
        };
        f.write_str(label)
    }
}

/// Storage type of a record field, as declared by the record service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Char,
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    Datetime,
    Selection,
    Many2one,
    One2many,
    Many2many,
}

impl FieldType {
    /// Relational fields are queried one level deep for their display name.
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            FieldType::Many2one | FieldType::One2many | FieldType::Many2many
        )
    }
}

/// Field metadata passed through to query shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub ftype: FieldType,
}

impl FieldDefinition {
    pub fn new(ftype: FieldType) -> Self {
        Self { ftype }
    }
}

/// Full configuration of one Gantt view instance.
///
/// Built once at view mount from the arch document, then only replaced
/// wholesale by [`load`](crate::model::GanttDataModel::load). This struct is
/// also the opaque local-state snapshot the host persists for saved-view
/// restoration, hence the serde derives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub res_model: String,
    /// Record-service filter domain (JSON array, passed through untouched).
    pub domain: Value,
    pub context: Map<String, Value>,
    pub fields: HashMap<String, FieldDefinition>,
    pub date_start_field: Option<String>,
    pub date_stop_field: Option<String>,
    pub parent_field: Option<String>,
    pub user_ids_field: Option<String>,
    pub color_field: Option<String>,
    pub progress_field: Option<String>,
    /// Arch-level default scale. The data model keeps its own scale with a
    /// different default; see DESIGN.md for the precedence rules.
    pub time_frame: TimeScale,
    pub default_order: String,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            res_model: String::new(),
            domain: Value::Array(Vec::new()),
            context: Map::new(),
            fields: HashMap::new(),
            date_start_field: None,
            date_stop_field: None,
            parent_field: None,
            user_ids_field: None,
            color_field: None,
            progress_field: None,
            time_frame: TimeScale::Week,
            default_order: "id".to_string(),
            limit: None,
            offset: None,
        }
    }
}

/// Partial override merged over the stored configuration by a load or a
/// read-only fetch.
#[derive(Debug, Clone, Default)]
pub struct LoadParams {
    pub domain: Option<Value>,
    pub context: Option<Map<String, Value>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub time_frame: Option<TimeScale>,
}

impl ViewConfig {
    /// A copy of this configuration with `params` layered on top.
    pub fn merged(&self, params: &LoadParams) -> ViewConfig {
        let mut meta = self.clone();
        if let Some(domain) = &params.domain {
            meta.domain = domain.clone();
        }
        if let Some(context) = &params.context {
            meta.context = context.clone();
        }
        if let Some(limit) = params.limit {
            meta.limit = Some(limit);
        }
        if let Some(offset) = params.offset {
            meta.offset = Some(offset);
        }
        if let Some(time_frame) = params.time_frame {
            meta.time_frame = time_frame;
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 30, 0)
            .unwrap()
    }

    #[test]
    fn span_end_offsets_per_scale() {
        let start = at(2024, 3, 10, 9);
        assert_eq!(
            TimeScale::QuarterDay.default_span_end(start),
            at(2024, 3, 10, 13)
        );
        assert_eq!(
            TimeScale::HalfDay.default_span_end(start),
            at(2024, 3, 10, 21)
        );
        assert_eq!(TimeScale::Day.default_span_end(start), at(2024, 3, 11, 9));
        assert_eq!(TimeScale::Week.default_span_end(start), at(2024, 3, 17, 9));
        assert_eq!(TimeScale::Month.default_span_end(start), at(2024, 4, 10, 9));
    }

    #[test]
    fn month_span_is_calendar_month_not_thirty_days() {
        let start = at(2024, 1, 31, 9);
        // Clamped to the last day of February.
        assert_eq!(TimeScale::Month.default_span_end(start), at(2024, 2, 29, 9));
    }

    #[test]
    fn merged_overrides_only_provided_params() {
        let config = ViewConfig {
            res_model: "project.task".to_string(),
            limit: Some(80),
            ..Default::default()
        };
        let merged = config.merged(&LoadParams {
            time_frame: Some(TimeScale::Day),
            ..Default::default()
        });
        assert_eq!(merged.res_model, "project.task");
        assert_eq!(merged.limit, Some(80));
        assert_eq!(merged.time_frame, TimeScale::Day);
    }

    #[test]
    fn scale_labels_match_widget_view_modes() {
        let labels: Vec<String> = TimeScale::all().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            labels,
            vec!["Quarter Day", "Half Day", "Day", "Week", "Month"]
        );
    }
}
