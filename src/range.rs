use crate::errors::AppError;
use crate::models::{DateChange, DateRange, SelectionState};
use chrono::{Days, Local, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Upper bound for `COMPARISON_OFFSET_DAYS`.
pub const MAX_COMPARISON_OFFSET_DAYS: u32 = 3650;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeDefaults {
    pub comparison_offset_days: u32,
}

impl Default for RangeDefaults {
    fn default() -> Self {
        Self {
            comparison_offset_days: 8,
        }
    }
}

pub fn default_selection(defaults: &RangeDefaults) -> Result<SelectionState, AppError> {
    default_selection_at(Local::now().date_naive(), defaults)
}

/// Yesterday as the primary window, `comparison_offset_days` back as the
/// comparison window. Times stay empty until slots are fetched.
pub fn default_selection_at(today: NaiveDate, defaults: &RangeDefaults) -> Result<SelectionState, AppError> {
    let yesterday = days_before(today, 1)?;
    let reference = days_before(today, defaults.comparison_offset_days)?;

    Ok(SelectionState {
        date_range: DateRange::single(yesterday),
        comparison_window: DateRange::single(reference),
        selected_start_time: String::new(),
        selected_end_time: String::new(),
    })
}

fn days_before(today: NaiveDate, days: u32) -> Result<NaiveDate, AppError> {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .ok_or_else(|| AppError::validation(format!("{days} days before {today} is out of range")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|err| AppError::validation(format!("invalid date '{value}': {err}")))
}

/// Start wins: an end before its start is moved onto the start.
pub fn clamp_range(range: &mut DateRange) {
    if range.end < range.start {
        range.end = range.start;
    }
}

pub fn enforce_date_order(selection: &mut SelectionState) {
    clamp_range(&mut selection.date_range);
    clamp_range(&mut selection.comparison_window);
}

/// Parses every supplied field first so a bad value leaves the selection
/// untouched, then applies them and clamps both ranges.
pub fn apply_date_change(selection: &mut SelectionState, change: &DateChange) -> Result<(), AppError> {
    let date_start = change.date_start.as_deref().map(parse_date).transpose()?;
    let date_end = change.date_end.as_deref().map(parse_date).transpose()?;
    let ref_date_start = change.ref_date_start.as_deref().map(parse_date).transpose()?;
    let ref_date_end = change.ref_date_end.as_deref().map(parse_date).transpose()?;

    if let Some(date) = date_start {
        selection.date_range.start = date;
    }
    if let Some(date) = date_end {
        selection.date_range.end = date;
    }
    if let Some(date) = ref_date_start {
        selection.comparison_window.start = date;
    }
    if let Some(date) = ref_date_end {
        selection.comparison_window.end = date;
    }

    enforce_date_order(selection);
    Ok(())
}
