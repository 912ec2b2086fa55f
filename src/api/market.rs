//! Equity routes: search, quote, profile, candles, watchlist

use crate::{
    analytics::synthetic,
    api::routes::AppState,
    error::{ApiError, UpstreamResultExt},
    models::{CandleSeries, SearchResponse, SearchResult, WatchlistEntry},
    scrapers::finnhub_rest::{FinnhubClient, SymbolSearch},
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

pub const MAX_SEARCH_RESULTS: usize = 20;

/// Seed for synthetic candles when no live price can be had.
pub const DEFAULT_SEED_PRICE: f64 = 100.0;

const WATCHLIST: [(&str, &str); 5] = [
    ("AAPL", "Apple Inc."),
    ("GOOGL", "Alphabet Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("AMZN", "Amazon.com Inc."),
    ("TSLA", "Tesla Inc."),
];

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let q = params.q.as_deref().map(str::trim).unwrap_or_default();
    if q.is_empty() {
        return Err(ApiError::bad_request("Search query is required"));
    }

    let raw = state.finnhub.search_symbols(q).await.unscoped()?;
    Ok(Json(trim_search_results(raw)))
}

/// Keep up to 20 hits that carry both a symbol and a description.
pub fn trim_search_results(raw: SymbolSearch) -> SearchResponse {
    let result: Vec<SearchResult> = raw
        .result
        .into_iter()
        .filter_map(|m| {
            let symbol = m.symbol.filter(|s| !s.is_empty())?;
            let description = m.description.filter(|d| !d.is_empty())?;
            Some(SearchResult {
                instrument_type: m
                    .instrument_type
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| "Unknown".to_string()),
                display_symbol: m
                    .display_symbol
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| symbol.clone()),
                symbol,
                description,
            })
        })
        .take(MAX_SEARCH_RESULTS)
        .collect();

    SearchResponse {
        count: result.len(),
        result,
    }
}

/// GET /api/stock/:symbol
pub async fn stock_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let quote = state.finnhub.quote(&symbol).await.for_symbol(&symbol)?;
    if quote.is_empty() {
        return Err(ApiError::not_found("Stock symbol not found", &symbol));
    }
    Ok(Json(Value::Object(quote.0)))
}

/// GET /api/company/:symbol
pub async fn company_profile(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let profile = state
        .finnhub
        .company_profile(&symbol)
        .await
        .for_symbol(&symbol)?;
    if profile.is_empty() {
        return Err(ApiError::not_found("Company profile not found", &symbol));
    }
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct CandleQuery {
    pub resolution: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl CandleQuery {
    /// All three parameters present, non-blank, with numeric bounds.
    fn required(&self) -> Result<(String, i64, i64), ApiError> {
        let missing = || ApiError::bad_request("Missing required parameters: resolution, from, to");
        let resolution = self
            .resolution
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(missing)?;
        let from = parse_epoch(self.from.as_deref()).ok_or_else(missing)?;
        let to = parse_epoch(self.to.as_deref()).ok_or_else(missing)?;
        Ok((resolution.to_string(), from, to))
    }
}

pub(crate) fn parse_epoch(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i64>().ok())
}

/// GET /api/candles/:symbol?resolution=&from=&to=
pub async fn stock_candles(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<CandleQuery>,
) -> Result<Json<CandleSeries>, ApiError> {
    let (resolution, from, to) = params.required()?;

    match state
        .finnhub
        .stock_candles(&symbol, &resolution, from, to)
        .await
    {
        Ok(series) if series.is_no_data() => Err(ApiError::not_found(
            "No candle data available for this symbol",
            &symbol,
        )),
        Ok(series) => Ok(Json(series)),
        Err(e) if e.is_plan_restricted() => {
            info!(%symbol, "candles restricted by plan, serving synthetic series");
            let seed = seed_price(&state.finnhub, &symbol).await;
            Ok(Json(synthetic::generate(seed, from, to)))
        }
        Err(e) => Err(ApiError::from_upstream(e, Some(&symbol))),
    }
}

/// Best-effort live price to anchor a synthetic series.
pub(crate) async fn seed_price(finnhub: &FinnhubClient, symbol: &str) -> f64 {
    match finnhub.quote(symbol).await {
        Ok(q) if q.current() > 0.0 => q.current(),
        Ok(_) => DEFAULT_SEED_PRICE,
        Err(e) => {
            warn!(%symbol, error = %e, "seed price lookup failed, using default");
            DEFAULT_SEED_PRICE
        }
    }
}

/// GET /api/watchlist
pub async fn watchlist() -> Json<Vec<WatchlistEntry>> {
    Json(
        WATCHLIST
            .iter()
            .map(|(symbol, name)| WatchlistEntry {
                symbol: symbol.to_string(),
                name: name.to_string(),
            })
            .collect(),
    )
}
