use footfall_dashboard::{
    AppState, Config, backend::HttpBackend, controller::SelectionController, router, session::Session,
};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let backend = HttpBackend::new(&config)?;
    let controller = SelectionController::new(&config.range_defaults, config.end_time_default)?;
    let session = Session::new(controller, backend);

    info!(backend = %config.backend_url, "loading initial selection");
    let snapshot = session.refresh_time_slots().await;
    if snapshot.dashboard.is_ready() {
        info!("initial dashboard loaded");
    } else {
        warn!(phase = ?snapshot.phase, "initial dashboard not loaded");
    }

    let app = router(AppState::new(session));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
    }
    info!("shutting down");
}
