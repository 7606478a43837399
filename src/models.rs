use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

/// What the user has picked. Times are `HH:MM[:SS]` strings, or `""` when
/// nothing valid is selectable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub date_range: DateRange,
    pub comparison_window: DateRange,
    pub selected_start_time: String,
    pub selected_end_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub disabled: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
            disabled: false,
        }
    }

    pub fn placeholder(label: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            label: label.into(),
            disabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    LoadingSlots,
    SlotsReady,
    LoadingDashboard,
    DashboardReady,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub time_start: String,
    pub time_end: String,
    pub date_start: String,
    pub date_end: String,
    pub ref_date_start: String,
    pub ref_date_end: String,
}

/// Partial date update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateChange {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_start: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_end: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub ref_date_start: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub ref_date_end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TimeChange {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartRequest {
    pub variant: String,
}

// HTML forms submit untouched inputs as empty strings.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}
