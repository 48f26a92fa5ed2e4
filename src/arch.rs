//! Parsing of the declarative view-definition (arch) document.

use std::collections::BTreeMap;

use crate::model::TimeScale;

/// One element of the parsed view-definition tree.
#[derive(Debug, Clone, Default)]
pub struct ArchNode {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<ArchNode>,
}

impl ArchNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ArchNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Depth-first visit of this element and every descendant.
    pub fn visit(&self, f: &mut impl FnMut(&ArchNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

/// Configuration extracted from an arch document.
///
/// All field-name attributes are optional; an absent attribute leaves the
/// corresponding slot unset. Whether the named fields actually exist is the
/// record service's problem, not the parser's.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchInfo {
    /// `name` attributes of every `field` element, first occurrence wins.
    pub field_names: Vec<String>,
    pub start_date: Option<String>,
    pub stop_date: Option<String>,
    pub color: Option<String>,
    pub parent_id: Option<String>,
    pub user_ids: Option<String>,
    pub task_progress: Option<String>,
    pub time_frame: Option<TimeScale>,
}

/// Walks an arch document into an [`ArchInfo`]. No error paths: a malformed
/// document is the concern of whatever produced the [`ArchNode`] tree.
#[derive(Debug, Default)]
pub struct GanttArchParser;

impl GanttArchParser {
    pub fn parse(&self, arch: &ArchNode) -> ArchInfo {
        let mut info = ArchInfo::default();

        arch.visit(&mut |node| match node.tag.as_str() {
            "gantt" => self.visit_gantt(node, &mut info),
            "field" => self.visit_field(node, &mut info),
            _ => {}
        });

        dedup_first_occurrence(&mut info.field_names);
        info
    }

    fn visit_gantt(&self, node: &ArchNode, info: &mut ArchInfo) {
        // The scale attribute is not honored: the parser always reports Week.
        info.time_frame = Some(TimeScale::Week);

        let slots: [(&str, &mut Option<String>); 6] = [
            ("start_date", &mut info.start_date),
            ("stop_date", &mut info.stop_date),
            ("color", &mut info.color),
            ("parent_id", &mut info.parent_id),
            ("user_ids", &mut info.user_ids),
            ("task_progress", &mut info.task_progress),
        ];
        for (name, slot) in slots {
            if let Some(value) = node.attr(name) {
                *slot = Some(value.to_string());
            }
        }
    }

    fn visit_field(&self, node: &ArchNode, info: &mut ArchInfo) {
        if let Some(name) = node.attr("name") {
            info.field_names.push(name.to_string());
        }
    }
}

fn dedup_first_occurrence(names: &mut Vec<String>) {
    let mut seen = std::collections::BTreeSet::new();
    names.retain(|n| seen.insert(n.clone()));
}
