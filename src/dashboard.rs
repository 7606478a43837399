use serde::Serialize;
use serde_json::Value;

pub const SECTION_COUNT: usize = 12;
pub const LOADING_TEXT: &str = "Loading...";
pub const FAILURE_TEXT: &str = "Failed to load data!";
pub const MISSING_TEXT: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum SectionState {
    Empty,
    Loading,
    Ready(Value),
    Failed(String),
}

/// Display state of the `part1`..`part12` dashboard sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    sections: Vec<SectionState>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            sections: vec![SectionState::Empty; SECTION_COUNT],
        }
    }
}

impl DashboardView {
    pub fn section_key(index: usize) -> String {
        format!("part{}", index + 1)
    }

    pub fn sections(&self) -> impl Iterator<Item = (String, &SectionState)> {
        self.sections
            .iter()
            .enumerate()
            .map(|(i, state)| (Self::section_key(i), state))
    }

    pub fn section(&self, key: &str) -> Option<&SectionState> {
        let index: usize = key.strip_prefix("part")?.parse().ok()?;
        self.sections.get(index.checked_sub(1)?)
    }

    pub fn mark_loading(&mut self) {
        self.sections.fill(SectionState::Loading);
    }

    pub fn mark_failed(&mut self) {
        self.sections.fill(SectionState::Failed(FAILURE_TEXT.to_string()));
    }

    /// A section absent from the payload stays displayable; its fields read
    /// as the missing marker.
    pub fn apply(&mut self, payload: &Value) {
        for (i, section) in self.sections.iter_mut().enumerate() {
            *section = match payload.get(Self::section_key(i)) {
                Some(value) if !value.is_null() => SectionState::Ready(value.clone()),
                _ => SectionState::Ready(Value::Null),
            };
        }
    }

    pub fn text(&self, key: &str, field: &str) -> String {
        match self.section(key) {
            Some(SectionState::Loading) => LOADING_TEXT.to_string(),
            Some(SectionState::Failed(label)) => label.clone(),
            Some(SectionState::Ready(value)) => value
                .get(field)
                .map(display_value)
                .unwrap_or_else(|| MISSING_TEXT.to_string()),
            Some(SectionState::Empty) | None => MISSING_TEXT.to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.sections.iter().all(|s| matches!(s, SectionState::Ready(_)))
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => MISSING_TEXT.to_string(),
        Value::String(s) if s.is_empty() => MISSING_TEXT.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
