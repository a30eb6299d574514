use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

use skillscout::refresh;
use skillscout::server;
use skillscout::state::AppState;
use skillscout::{core, refresh::scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize()?;
    core::logging::init(&state.paths);

    // Warm the index in the background so the listener comes up
    // immediately; a valid cache serves right away, an interrupted
    // build resumes where it left off.
    let warm_state = state.clone();
    tokio::spawn(async move {
        refresh::load_initial(&warm_state).await;
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(scheduler::run(state.clone(), shutdown_rx));

    let bind_addr = format!("127.0.0.1:{}", state.settings.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    let app: Router = server::router::router(state.clone());
    axum::serve(listener, app).await.context("Server error")?;

    let _ = shutdown_tx.send(true);
    Ok(())
}
