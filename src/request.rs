use crate::errors::AppError;
use crate::models::{DashboardRequest, SelectionState};
use crate::range::format_date;

pub fn build_dashboard_request(selection: &SelectionState) -> Result<DashboardRequest, AppError> {
    let time_start = selection.selected_start_time.trim();
    let time_end = selection.selected_end_time.trim();

    if time_start.is_empty() {
        return Err(AppError::validation("time_start is empty"));
    }
    if time_end.is_empty() {
        return Err(AppError::validation("time_end is empty"));
    }

    let range = &selection.date_range;
    let reference = &selection.comparison_window;

    Ok(DashboardRequest {
        time_start: time_start.to_string(),
        time_end: time_end.to_string(),
        date_start: format!("{} {time_start}", format_date(range.start)),
        date_end: format!("{} {time_end}", format_date(range.end)),
        ref_date_start: format!("{} {time_start}", format_date(reference.start)),
        ref_date_end: format!("{} {time_end}", format_date(reference.end)),
    })
}
