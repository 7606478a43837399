//! Selection state machine.
//!
//! Every backend round trip is split into a `begin_*` call that hands out a
//! ticket and a `finish_*` call that applies the result. Tickets carry a
//! sequence token; a result whose token has been superseded is dropped so a
//! slow response never overwrites a newer one.

use crate::dashboard::DashboardView;
use crate::errors::AppError;
use crate::footfall::{ChartData, ChartRegistry, FootfallDistribution};
use crate::models::{DashboardRequest, DateChange, DateRange, Phase, SelectionState, TimeSlot};
use crate::range::{self, RangeDefaults};
use crate::request::build_dashboard_request;
use crate::slots::{EndTimeDefault, SelectorView, populate_selectors};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.latest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTicket {
    pub token: u64,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardTicket {
    pub token: u64,
    pub request: DashboardRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    /// Selectors settled. Carries the dashboard ticket issued from the same
    /// selection, or `None` when no request can be formed.
    Ready(Option<DashboardTicket>),
    Failed,
    Stale,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionSnapshot {
    pub phase: Phase,
    pub selection: SelectionState,
    pub selectors: SelectorView,
    pub dashboard: DashboardView,
}

#[derive(Debug)]
pub struct SelectionController {
    selection: SelectionState,
    selectors: SelectorView,
    dashboard: DashboardView,
    phase: Phase,
    end_default: EndTimeDefault,
    slot_requests: RequestSequence,
    dashboard_requests: RequestSequence,
    distribution: Option<FootfallDistribution>,
    charts: ChartRegistry,
}

impl SelectionController {
    pub fn new(defaults: &RangeDefaults, end_default: EndTimeDefault) -> Result<Self, AppError> {
        Ok(Self::with_selection(range::default_selection(defaults)?, end_default))
    }

    pub fn new_at(today: NaiveDate, defaults: &RangeDefaults, end_default: EndTimeDefault) -> Result<Self, AppError> {
        Ok(Self::with_selection(range::default_selection_at(today, defaults)?, end_default))
    }

    fn with_selection(selection: SelectionState, end_default: EndTimeDefault) -> Self {
        Self {
            selection,
            selectors: SelectorView::default(),
            dashboard: DashboardView::default(),
            phase: Phase::Idle,
            end_default,
            slot_requests: RequestSequence::default(),
            dashboard_requests: RequestSequence::default(),
            distribution: None,
            charts: ChartRegistry::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selectors(&self) -> &SelectorView {
        &self.selectors
    }

    pub fn dashboard(&self) -> &DashboardView {
        &self.dashboard
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            phase: self.phase,
            selection: self.selection.clone(),
            selectors: self.selectors.clone(),
            dashboard: self.dashboard.clone(),
        }
    }

    fn user_change(&mut self) {
        if self.phase == Phase::Error {
            self.phase = Phase::Idle;
        }
    }

    pub fn change_dates(&mut self, change: &DateChange) -> Result<(), AppError> {
        range::apply_date_change(&mut self.selection, change)?;
        self.user_change();
        Ok(())
    }

    pub fn select_start_time(&mut self, value: &str) -> Result<(), AppError> {
        if !self.selectors.offers_start(value) {
            return Err(AppError::validation(format!("'{value}' is not an available start time")));
        }
        self.user_change();
        self.selection.selected_start_time = value.to_string();
        self.selectors.apply_end_filter(&mut self.selection);
        Ok(())
    }

    pub fn select_end_time(&mut self, value: &str) -> Result<(), AppError> {
        if !self.selectors.offers_end(value) {
            return Err(AppError::validation(format!("'{value}' is not an available end time")));
        }
        self.user_change();
        self.selection.selected_end_time = value.to_string();
        Ok(())
    }

    /// Also invalidates any dashboard load still in flight, since its
    /// selection is about to change.
    pub fn begin_slot_refresh(&mut self) -> SlotTicket {
        self.dashboard_requests.issue();
        self.phase = Phase::LoadingSlots;
        SlotTicket {
            token: self.slot_requests.issue(),
            range: self.selection.date_range,
        }
    }

    pub fn finish_slot_refresh(&mut self, ticket: &SlotTicket, result: Result<Vec<TimeSlot>, AppError>) -> SlotOutcome {
        if !self.slot_requests.is_current(ticket.token) {
            debug!(token = ticket.token, "dropping stale time slot response");
            return SlotOutcome::Stale;
        }

        match result {
            Ok(slots) => {
                self.selectors = populate_selectors(&slots, &mut self.selection, self.end_default);
                self.phase = Phase::SlotsReady;
                SlotOutcome::Ready(self.begin_dashboard_load())
            }
            Err(err) => {
                error!("failed to load time periods: {err}");
                self.selectors = SelectorView::failed();
                self.selection.selected_start_time.clear();
                self.selection.selected_end_time.clear();
                self.phase = Phase::Error;
                SlotOutcome::Failed
            }
        }
    }

    /// Returns `None` when the selection cannot form a request yet, or while
    /// slots are loading: the slot refresh issues its own ticket when it lands.
    pub fn begin_dashboard_load(&mut self) -> Option<DashboardTicket> {
        if self.phase == Phase::LoadingSlots {
            debug!("time slots loading, dashboard load deferred");
            return None;
        }

        let request = match build_dashboard_request(&self.selection) {
            Ok(request) => request,
            Err(err) => {
                warn!("not requesting dashboard data: {err}");
                if self.phase != Phase::Error {
                    self.phase = Phase::SlotsReady;
                }
                return None;
            }
        };

        self.dashboard.mark_loading();
        self.phase = Phase::LoadingDashboard;
        Some(DashboardTicket {
            token: self.dashboard_requests.issue(),
            request,
        })
    }

    /// Returns false when the result was stale and ignored.
    pub fn finish_dashboard_load(&mut self, ticket: &DashboardTicket, result: Result<Value, AppError>) -> bool {
        if !self.dashboard_requests.is_current(ticket.token) {
            debug!(token = ticket.token, "dropping stale dashboard response");
            return false;
        }

        match result {
            Ok(payload) => {
                self.dashboard.apply(&payload);
                self.phase = Phase::DashboardReady;
            }
            Err(err) => {
                error!("failed to load dashboard data: {err}");
                self.dashboard.mark_failed();
                self.phase = Phase::Error;
            }
        }
        true
    }

    pub fn distribution(&self) -> Option<&FootfallDistribution> {
        self.distribution.as_ref()
    }

    pub fn store_distribution(&mut self, distribution: FootfallDistribution) {
        self.distribution = Some(distribution);
    }

    pub fn chart(&self, canvas_id: &str) -> Option<&ChartData> {
        self.charts.get(canvas_id)
    }

    pub fn replace_chart(&mut self, canvas_id: &str, chart: ChartData) {
        if self.charts.replace(canvas_id, chart).is_some() {
            debug!(canvas_id, "replaced chart");
        }
    }
}
