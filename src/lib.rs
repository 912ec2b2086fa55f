//! StockPulse Backend Library
//!
//! Market-data proxy: thin JSON routes over the upstream API, plus synthetic
//! candles, formatted indicators and a sentiment-driven price projection.

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod scrapers;

pub use api::{create_router, AppState};
pub use config::Config;
