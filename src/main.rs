//! StockPulse - market-data proxy API
//!
//! Forwards browser requests to the upstream market-data API with the server's
//! key attached, and serves synthetic candles, formatted indicators and a
//! headline-sentiment price projection on top.

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockpulse_backend::{
    api::{create_router, AppState},
    config::{Args, Config},
};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = match Config::from_args(Args::parse()) {
        Ok(c) => c,
        Err(e) => {
            error!("❌ {}. Set it in the environment or .env file.", e);
            std::process::exit(1);
        }
    };

    let addr = config.listen_addr()?;
    info!("🔗 Upstream: {}", config.upstream_url);
    info!(
        "🔑 Finnhub key: set | News key: {}",
        if config.news_api_key.is_some() { "set" } else { "not set" }
    );

    let state = AppState::new(config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockpulse_backend=debug,stockpulse=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate directory (common when running with --manifest-path from elsewhere)
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
