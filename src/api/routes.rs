use anyhow::Result;
use axum::{middleware, response::Json, routing::get, Router};
use chrono::Utc;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::{crypto, insights, market, news};
use crate::config::Config;
use crate::middleware::request_logging;
use crate::models::HealthResponse;
use crate::scrapers::finnhub_rest::FinnhubClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub finnhub: FinnhubClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let finnhub = FinnhubClient::new(&config.finnhub_api_key, &config.upstream_url)?;
        Ok(Self {
            config: Arc::new(config),
            finnhub,
        })
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Equities
        .route("/api/search", get(market::search))
        .route("/api/stock/:symbol", get(market::stock_quote))
        .route("/api/company/:symbol", get(market::company_profile))
        .route("/api/candles/:symbol", get(market::stock_candles))
        .route("/api/watchlist", get(market::watchlist))
        // Crypto
        .route("/api/crypto/:symbol", get(crypto::crypto_quote))
        .route("/api/crypto-list", get(crypto::crypto_list))
        .route("/api/crypto-candles/:symbol", get(crypto::crypto_candles))
        // News
        .route("/api/news/:category", get(news::category_news))
        .route("/api/market-news", get(news::market_news))
        .route("/api/crypto-news", get(news::crypto_news))
        .route("/api/company-news/:symbol", get(news::company_news))
        .route("/api/stock-news/:symbol", get(news::company_news))
        // Derived
        .route("/api/indicators/:symbol", get(insights::indicators))
        .route("/api/prediction/:symbol", get(insights::prediction))
        .with_state(state)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "stockpulse",
        timestamp: Utc::now().to_rfc3339(),
    })
}
