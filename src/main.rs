use habit_grid::{AppConfig, AppState, Snapshot, SystemClock, Tracker, load_data, router};
use tokio::fs;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let data = load_data(&config.data_path).await;
    info!(records = data.len(), "loaded habit data");
    let mut tracker = Tracker::open(data, Box::new(SystemClock));
    tracker.subscribe(Box::new(|snapshot: &Snapshot| {
        debug!(
            key = %snapshot.scope.storage_key(),
            habits = snapshot.habits.len(),
            completion = snapshot.stats.monthly_completion,
            momentum = snapshot.stats.momentum,
            streak = snapshot.stats.current_streak,
            "habit stats refreshed"
        );
    }));

    let state = AppState::new(config.data_path.clone(), tracker, config.save_delay);
    let app = router(state.clone());

    let addr = config.addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.saver.cancel().await;
    if let Err(err) = state.flush().await {
        error!("failed to save habits on shutdown: {}", err.message);
    }
    info!("shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
