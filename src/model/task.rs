use serde::Serialize;
use serde_json::Value;

/// Number of distinct bar color classes the chart stylesheet defines.
pub const COLOR_CLASS_COUNT: u8 = 12;

/// A chart-ready projection of one backing record.
///
/// Tasks are ephemeral: the whole list is rebuilt on every fetch and no task
/// is ever mutated in place. Unset values serialize as JSON `false`, which the
/// chart widget reads as "open-ended" / "not set" (an empty string or `null`
/// would render differently).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    /// String form of the record's unique identifier.
    pub id: String,
    pub name: String,
    #[serde(serialize_with = "false_sentinel::serialize")]
    pub start: Option<String>,
    #[serde(serialize_with = "false_sentinel::serialize")]
    pub end: Option<String>,
    /// Comma-joined display names of the assigned users.
    #[serde(serialize_with = "false_sentinel::serialize")]
    pub assignees: Option<String>,
    /// Completion in percent, 0–100. Zero is treated as unset.
    #[serde(serialize_with = "false_sentinel::serialize")]
    pub progress: Option<f64>,
    /// One of the fixed `color-class-N` stylesheet tags.
    pub style_class: String,
    /// Id of the hierarchy-parent record, only when one is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<String>,
}

/// Map a record's raw color value onto one of the fixed stylesheet classes.
///
/// Values `0`–`11` (number or string) select their class; anything else falls
/// back to `color-class-0`.
pub fn color_style_class(raw: Option<&Value>) -> String {
    let key = match raw {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };
    match key.parse::<u8>() {
        Ok(n) if n < COLOR_CLASS_COUNT => format!("color-class-{n}"),
        _ => "color-class-0".to_string(),
    }
}

/// Serde helper emitting JSON `false` in place of an unset value.
mod false_sentinel {
    use serde::{Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_bool(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bare_task() -> Task {
        Task {
            id: "7".to_string(),
            name: "Pour foundation".to_string(),
            start: None,
            end: None,
            assignees: None,
            progress: None,
            style_class: color_style_class(None),
            parent_task_id: None,
        }
    }

    #[test]
    fn unset_values_serialize_as_false_not_null() {
        let value = serde_json::to_value(bare_task()).unwrap();
        assert_eq!(value["start"], json!(false));
        assert_eq!(value["end"], json!(false));
        assert_eq!(value["assignees"], json!(false));
        assert_eq!(value["progress"], json!(false));
    }

    #[test]
    fn parent_link_is_omitted_when_absent() {
        let value = serde_json::to_value(bare_task()).unwrap();
        assert!(value.get("parent_task_id").is_none());

        let mut child = bare_task();
        child.parent_task_id = Some("3".to_string());
        let value = serde_json::to_value(child).unwrap();
        assert_eq!(value["parent_task_id"], json!("3"));
    }

    #[test]
    fn set_values_serialize_verbatim() {
        let mut task = bare_task();
        task.start = Some("2024-03-10 00:00:00".to_string());
        task.progress = Some(40.0);
        let value = serde_json::to_value(task).unwrap();
        assert_eq!(value["start"], json!("2024-03-10 00:00:00"));
        assert_eq!(value["progress"], json!(40.0));
    }

    #[test]
    fn color_classes_cover_the_twelve_slots() {
        assert_eq!(color_style_class(Some(&json!(0))), "color-class-0");
        assert_eq!(color_style_class(Some(&json!(5))), "color-class-5");
        assert_eq!(color_style_class(Some(&json!("11"))), "color-class-11");
    }

    #[test]
    fn unknown_or_missing_color_falls_back_to_class_zero() {
        assert_eq!(color_style_class(None), "color-class-0");
        assert_eq!(color_style_class(Some(&json!(12))), "color-class-0");
        assert_eq!(color_style_class(Some(&json!(-3))), "color-class-0");
        assert_eq!(color_style_class(Some(&json!("teal"))), "color-class-0");
        assert_eq!(color_style_class(Some(&json!(false))), "color-class-0");
    }
}
