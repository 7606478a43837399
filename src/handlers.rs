use crate::controller::SelectionSnapshot;
use crate::dashboard::DashboardView;
use crate::errors::AppError;
use crate::footfall::{ChartData, FootfallVariant};
use crate::models::{ChartRequest, DateChange, TimeChange};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Redirect},
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.session.snapshot().await;
    Html(render_index(&snapshot))
}

pub async fn get_selection(State(state): State<AppState>) -> Json<SelectionSnapshot> {
    Json(state.session.snapshot().await)
}

pub async fn change_dates(
    State(state): State<AppState>,
    Json(payload): Json<DateChange>,
) -> Result<Json<SelectionSnapshot>, AppError> {
    Ok(Json(state.session.change_dates(&payload).await?))
}

pub async fn change_start_time(
    State(state): State<AppState>,
    Json(payload): Json<TimeChange>,
) -> Result<Json<SelectionSnapshot>, AppError> {
    Ok(Json(state.session.change_start_time(payload.value.trim()).await?))
}

pub async fn change_end_time(
    State(state): State<AppState>,
    Json(payload): Json<TimeChange>,
) -> Result<Json<SelectionSnapshot>, AppError> {
    Ok(Json(state.session.change_end_time(payload.value.trim()).await?))
}

pub async fn refresh(State(state): State<AppState>) -> Json<SelectionSnapshot> {
    Json(state.session.refresh_time_slots().await)
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(state.session.snapshot().await.dashboard)
}

pub async fn get_cameras(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.session.cameras().await?))
}

pub async fn get_chart(
    State(state): State<AppState>,
    Path(canvas): Path<String>,
) -> Result<Json<ChartData>, StatusCode> {
    state
        .session
        .chart(&canvas)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn show_chart(
    State(state): State<AppState>,
    Path(canvas): Path<String>,
    Json(payload): Json<ChartRequest>,
) -> Result<Json<ChartData>, AppError> {
    let variant: FootfallVariant = payload.variant.parse()?;
    Ok(Json(state.session.show_chart(&canvas, variant).await?))
}

pub async fn form_dates(State(state): State<AppState>, Form(payload): Form<DateChange>) -> Result<Redirect, AppError> {
    state.session.change_dates(&payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_start_time(
    State(state): State<AppState>,
    Form(payload): Form<TimeChange>,
) -> Result<Redirect, AppError> {
    state.session.change_start_time(payload.value.trim()).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_end_time(
    State(state): State<AppState>,
    Form(payload): Form<TimeChange>,
) -> Result<Redirect, AppError> {
    state.session.change_end_time(payload.value.trim()).await?;
    Ok(Redirect::to("/"))
}
