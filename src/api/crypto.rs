//! Crypto routes
//!
//! Crypto tickers are forwarded to the equity quote/candle endpoints after
//! being qualified as Binance USDT pairs (`BTC` → `BINANCE:BTCUSDT`).

use crate::{
    analytics::synthetic::{self, SECONDS_PER_DAY},
    api::market::{parse_epoch, seed_price},
    api::routes::AppState,
    config::FANOUT_TIMEOUT,
    error::{ApiError, UpstreamResultExt},
    models::{CandleSeries, CryptoListing},
    scrapers::finnhub_rest::FinnhubClient,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// (ticker, display name), in response order
pub const CRYPTO_ASSETS: [(&str, &str); 15] = [
    ("BTC", "Bitcoin"),
    ("ETH", "Ethereum"),
    ("BNB", "BNB"),
    ("SOL", "Solana"),
    ("XRP", "XRP"),
    ("ADA", "Cardano"),
    ("DOGE", "Dogecoin"),
    ("AVAX", "Avalanche"),
    ("DOT", "Polkadot"),
    ("MATIC", "Polygon"),
    ("LINK", "Chainlink"),
    ("LTC", "Litecoin"),
    ("UNI", "Uniswap"),
    ("ATOM", "Cosmos"),
    ("XLM", "Stellar"),
];

const DEFAULT_CRYPTO_RESOLUTION: &str = "D";
const DEFAULT_CRYPTO_LOOKBACK_DAYS: i64 = 30;

/// Exchange-qualified symbol; already-qualified input passes through.
pub fn crypto_symbol(symbol: &str) -> String {
    if symbol.contains(':') {
        symbol.to_string()
    } else {
        format!("BINANCE:{}USDT", symbol.trim().to_uppercase())
    }
}

/// GET /api/crypto/:symbol
pub async fn crypto_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let pair = crypto_symbol(&symbol);
    let quote = state.finnhub.quote(&pair).await.for_symbol(&symbol)?;
    if quote.is_empty() {
        return Err(ApiError::not_found("Cryptocurrency not found", &symbol));
    }
    Ok(Json(Value::Object(quote.0)))
}

#[derive(Debug, Deserialize)]
pub struct CryptoCandleQuery {
    pub resolution: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl CryptoCandleQuery {
    /// Missing parameters default to daily bars over the last 30 days.
    fn resolve(&self, now: i64) -> Result<(String, i64, i64), ApiError> {
        let bound = |raw: &Option<String>, default: i64| match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(_) => parse_epoch(raw.as_deref())
                .ok_or_else(|| ApiError::bad_request("from/to must be unix timestamps")),
        };

        let resolution = self
            .resolution
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_CRYPTO_RESOLUTION)
            .to_string();
        let to = bound(&self.to, now)?;
        let from = bound(
            &self.from,
            to.saturating_sub(DEFAULT_CRYPTO_LOOKBACK_DAYS * SECONDS_PER_DAY),
        )?;
        Ok((resolution, from, to))
    }
}

/// GET /api/crypto-candles/:symbol
pub async fn crypto_candles(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<CryptoCandleQuery>,
) -> Result<Json<CandleSeries>, ApiError> {
    let (resolution, from, to) = params.resolve(Utc::now().timestamp())?;
    let pair = crypto_symbol(&symbol);

    match state
        .finnhub
        .crypto_candles(&pair, &resolution, from, to)
        .await
    {
        Ok(series) if !series.is_no_data() => Ok(Json(series)),
        Ok(_) => {
            info!(%symbol, "no crypto candles upstream, serving synthetic series");
            let seed = seed_price(&state.finnhub, &pair).await;
            Ok(Json(synthetic::generate(seed, from, to)))
        }
        Err(e) if e.is_plan_restricted() => {
            info!(%symbol, "crypto candles restricted by plan, serving synthetic series");
            let seed = seed_price(&state.finnhub, &pair).await;
            Ok(Json(synthetic::generate(seed, from, to)))
        }
        Err(e) => Err(ApiError::from_upstream(e, Some(&symbol))),
    }
}

/// GET /api/crypto-list
///
/// One quote per reference asset, all in flight together. Failed or
/// zero-priced assets are dropped; order follows `CRYPTO_ASSETS`.
pub async fn crypto_list(State(state): State<AppState>) -> Json<Vec<CryptoListing>> {
    let fetches = CRYPTO_ASSETS.iter().map(|&(ticker, name)| {
        let finnhub = state.finnhub.clone();
        async move { fetch_listing(&finnhub, ticker, name).await }
    });
    let listings: Vec<CryptoListing> = join_all(fetches).await;

    let fetched = listings.len();
    let listings: Vec<CryptoListing> = listings
        .into_iter()
        .filter(|l| l.price > 0.0)
        .collect();
    debug!(fetched, kept = listings.len(), "crypto list assembled");

    Json(listings)
}

async fn fetch_listing(finnhub: &FinnhubClient, ticker: &str, name: &str) -> CryptoListing {
    let mut listing = CryptoListing {
        symbol: ticker.to_string(),
        name: name.to_string(),
        price: 0.0,
        change: 0.0,
        change_percent: 0.0,
        high: 0.0,
        low: 0.0,
        open: 0.0,
        previous_close: 0.0,
        error: None,
    };

    match finnhub
        .quote_with_timeout(&crypto_symbol(ticker), FANOUT_TIMEOUT)
        .await
    {
        Ok(q) => {
            listing.price = q.current();
            listing.change = q.change().unwrap_or(0.0);
            listing.change_percent = q.change_percent().unwrap_or(0.0);
            listing.high = q.high();
            listing.low = q.low();
            listing.open = q.open();
            listing.previous_close = q.previous_close();
        }
        Err(e) => {
            warn!(ticker, error = %e, "crypto quote failed");
            listing.error = Some(e.to_string());
        }
    }

    listing
}
