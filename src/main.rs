// src/main.rs

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod models;
mod normalize;
mod query;
mod routes;

use config::Config;
use db::{postgres::PgSource, StatsSource};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn StatsSource>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Connections are checked out per request by the source
    let pool = db::connect(&config).await?;
    let state = AppState { source: Arc::new(PgSource::new(pool)) };

    let api = routes::router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API listening on http://127.0.0.1:{}", config.port);

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
