use crate::backend::Backend;
use crate::controller::{DashboardTicket, SelectionController, SelectionSnapshot, SlotOutcome};
use crate::errors::AppError;
use crate::footfall::{ChartData, FootfallVariant, build_chart};
use crate::models::DateChange;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Drives the controller against a backend. The controller lock is only held
/// while issuing tickets and applying results, never across a request.
pub struct Session<B> {
    controller: Arc<Mutex<SelectionController>>,
    backend: Arc<B>,
}

impl<B> Clone for Session<B> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: Backend> Session<B> {
    pub fn new(controller: SelectionController, backend: B) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            backend: Arc::new(backend),
        }
    }

    pub async fn snapshot(&self) -> SelectionSnapshot {
        self.controller.lock().await.snapshot()
    }

    /// Re-fetches the slot list for the current dates, then the dashboard if
    /// the selectors settled.
    pub async fn refresh_time_slots(&self) -> SelectionSnapshot {
        let ticket = self.controller.lock().await.begin_slot_refresh();
        let result = self.backend.time_slots(ticket.range).await;

        let outcome = self.controller.lock().await.finish_slot_refresh(&ticket, result);
        match outcome {
            SlotOutcome::Ready(dashboard) => {
                info!(
                    date_start = %ticket.range.start,
                    date_end = %ticket.range.end,
                    "time selectors updated"
                );
                match dashboard {
                    Some(dashboard) => self.run_dashboard(dashboard).await,
                    None => self.snapshot().await,
                }
            }
            SlotOutcome::Failed | SlotOutcome::Stale => self.snapshot().await,
        }
    }

    pub async fn load_dashboard(&self) -> SelectionSnapshot {
        let ticket = self.controller.lock().await.begin_dashboard_load();
        match ticket {
            Some(ticket) => self.run_dashboard(ticket).await,
            None => self.snapshot().await,
        }
    }

    async fn run_dashboard(&self, ticket: DashboardTicket) -> SelectionSnapshot {
        let result = self.backend.dashboard(&ticket.request).await;

        let mut controller = self.controller.lock().await;
        controller.finish_dashboard_load(&ticket, result);
        controller.snapshot()
    }

    pub async fn change_dates(&self, change: &DateChange) -> Result<SelectionSnapshot, AppError> {
        self.controller.lock().await.change_dates(change)?;
        Ok(self.refresh_time_slots().await)
    }

    pub async fn change_start_time(&self, value: &str) -> Result<SelectionSnapshot, AppError> {
        self.controller.lock().await.select_start_time(value)?;
        Ok(self.load_dashboard().await)
    }

    pub async fn change_end_time(&self, value: &str) -> Result<SelectionSnapshot, AppError> {
        self.controller.lock().await.select_end_time(value)?;
        Ok(self.load_dashboard().await)
    }

    pub async fn cameras(&self) -> Result<Vec<String>, AppError> {
        self.backend.cameras().await
    }

    pub async fn chart(&self, canvas_id: &str) -> Option<ChartData> {
        self.controller.lock().await.chart(canvas_id).cloned()
    }

    /// The distribution is fetched on first use and cached for the life of
    /// the session.
    pub async fn show_chart(&self, canvas_id: &str, variant: FootfallVariant) -> Result<ChartData, AppError> {
        let cached = self.controller.lock().await.distribution().cloned();
        let distribution = match cached {
            Some(distribution) => distribution,
            None => {
                let distribution = self.backend.footfall_distribution().await?;
                self.controller.lock().await.store_distribution(distribution.clone());
                distribution
            }
        };

        let chart = build_chart(&distribution, variant)?;
        self.controller.lock().await.replace_chart(canvas_id, chart.clone());
        Ok(chart)
    }
}
