use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use copurchase_api::{
    api::{create_router, AppState},
    config::Config,
    data::{load_engine, CsvDataSource, OrderDataSource},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // The server never starts against a missing or partial snapshot.
    let source: Arc<dyn OrderDataSource> =
        Arc::new(CsvDataSource::new(&config.products_csv, &config.orders_csv));
    let engine = load_engine(source.as_ref(), config.self_pair_policy())
        .await
        .context("Failed to build recommendation engine")?;

    let state = AppState::new(engine, source, config.self_pair_policy());
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
