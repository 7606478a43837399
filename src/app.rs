use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/selection/dates", post(handlers::form_dates))
        .route("/selection/start-time", post(handlers::form_start_time))
        .route("/selection/end-time", post(handlers::form_end_time))
        .route("/api/selection", get(handlers::get_selection))
        .route("/api/selection/dates", post(handlers::change_dates))
        .route("/api/selection/start-time", post(handlers::change_start_time))
        .route("/api/selection/end-time", post(handlers::change_end_time))
        .route("/api/refresh", post(handlers::refresh))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/cameras", get(handlers::get_cameras))
        .route("/api/charts/:canvas", get(handlers::get_chart).post(handlers::show_chart))
        .with_state(state)
}
