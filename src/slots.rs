use crate::errors::AppError;
use crate::models::{SelectOption, SelectionState, TimeSlot};
use serde::Serialize;
use std::str::FromStr;

pub const SLOT_FAILURE_LABEL: &str = "Error: Failed to load time periods!";

/// Which end time to pick after a slot refresh when the previous one is gone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EndTimeDefault {
    /// Last slot's end, so the window covers the whole day.
    #[default]
    Latest,
    /// Earliest end strictly after the start.
    Earliest,
}

impl FromStr for EndTimeDefault {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "latest" | "last" => Ok(Self::Latest),
            "earliest" | "first" => Ok(Self::Earliest),
            other => Err(AppError::validation(format!(
                "end time default must be 'latest' or 'earliest', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectorView {
    pub start_options: Vec<SelectOption>,
    pub end_options: Vec<SelectOption>,
    #[serde(skip)]
    all_end_options: Vec<SelectOption>,
}

impl SelectorView {
    pub fn from_slots(slots: &[TimeSlot]) -> Self {
        let start_options: Vec<_> = slots.iter().map(|slot| SelectOption::new(&slot.start)).collect();
        let end_options: Vec<_> = slots.iter().map(|slot| SelectOption::new(&slot.end)).collect();
        Self {
            start_options,
            all_end_options: end_options.clone(),
            end_options,
        }
    }

    /// One disabled entry in each selector, used when slots cannot be loaded.
    pub fn failed() -> Self {
        let placeholder = vec![SelectOption::placeholder(SLOT_FAILURE_LABEL)];
        Self {
            start_options: placeholder.clone(),
            end_options: placeholder.clone(),
            all_end_options: placeholder,
        }
    }

    pub fn start_values(&self) -> Vec<&str> {
        self.start_options.iter().map(|o| o.value.as_str()).collect()
    }

    pub fn end_values(&self) -> Vec<&str> {
        self.end_options.iter().map(|o| o.value.as_str()).collect()
    }

    pub fn offers_start(&self, value: &str) -> bool {
        self.start_options
            .iter()
            .any(|o| !o.disabled && o.value == value)
    }

    pub fn offers_end(&self, value: &str) -> bool {
        self.end_options.iter().any(|o| !o.disabled && o.value == value)
    }

    /// Narrows the end selector to what is valid after `start` and moves the
    /// end selection onto the first remaining option.
    pub fn apply_end_filter(&mut self, selection: &mut SelectionState) {
        self.end_options = filter_valid_end_options(&self.all_end_options, &selection.selected_start_time);
        selection.selected_end_time = self
            .end_options
            .first()
            .map(|o| o.value.clone())
            .unwrap_or_default();
    }
}

pub fn filter_valid_end_options(all_end_options: &[SelectOption], selected_start: &str) -> Vec<SelectOption> {
    all_end_options
        .iter()
        .filter(|o| o.value.as_str() > selected_start || o.value.is_empty())
        .cloned()
        .collect()
}

/// Rebuilds both selectors from a fresh slot list, keeping the previous
/// picks where they are still offered.
pub fn populate_selectors(
    slots: &[TimeSlot],
    selection: &mut SelectionState,
    end_default: EndTimeDefault,
) -> SelectorView {
    let previous_start = std::mem::take(&mut selection.selected_start_time);
    let previous_end = std::mem::take(&mut selection.selected_end_time);
    let mut view = SelectorView::from_slots(slots);

    let (Some(first), Some(last)) = (slots.first(), slots.last()) else {
        return view;
    };

    selection.selected_start_time = if !previous_start.is_empty() && view.offers_start(&previous_start) {
        previous_start
    } else {
        first.start.clone()
    };

    view.apply_end_filter(selection);

    if !previous_end.is_empty() && view.offers_end(&previous_end) {
        selection.selected_end_time = previous_end;
    } else if end_default == EndTimeDefault::Latest && view.offers_end(&last.end) {
        selection.selected_end_time = last.end.clone();
    }

    view
}
