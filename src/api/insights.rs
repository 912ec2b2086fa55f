//! Derived-data routes: formatted indicators and the sentiment prediction

use crate::{
    analytics::{build_indicator_set, predict, score_headlines},
    api::news::company_news_window,
    api::routes::AppState,
    error::{ApiError, UpstreamResultExt},
    models::{IndicatorsResponse, PredictionResponse},
    scrapers::finnhub_rest::headlines,
};
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use tracing::debug;

pub const PREDICTION_DISCLAIMER: &str =
    "This prediction is generated from news sentiment and random variation. It is not financial advice.";

/// GET /api/indicators/:symbol
pub async fn indicators(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<IndicatorsResponse>, ApiError> {
    let (quote, financials) = tokio::join!(
        state.finnhub.quote(&symbol),
        state.finnhub.basic_financials(&symbol),
    );
    let quote = quote.for_symbol(&symbol)?;
    let financials = financials.for_symbol(&symbol)?;

    let indicators = build_indicator_set(&financials);
    debug!(%symbol, count = indicators.len(), "indicators assembled");

    Ok(Json(IndicatorsResponse {
        current_price: quote.current(),
        change: quote.change(),
        change_percent: quote.change_percent(),
        indicators,
        symbol,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// GET /api/prediction/:symbol
pub async fn prediction(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let (from, to) = company_news_window(Utc::now().date_naive());
    let (quote, news) = tokio::join!(
        state.finnhub.quote(&symbol),
        state.finnhub.company_news(&symbol, from, to),
    );
    let quote = quote.for_symbol(&symbol)?;
    let news = news.for_symbol(&symbol)?;

    if quote.is_empty() {
        return Err(ApiError::not_found("Stock symbol not found", &symbol));
    }

    let sentiment = score_headlines(headlines(&news), news.len());
    debug!(%symbol, sentiment, news = news.len(), "sentiment scored");

    Ok(Json(PredictionResponse {
        prediction: predict(quote.current(), sentiment, news.len()),
        symbol,
        disclaimer: PREDICTION_DISCLAIMER,
        generated_at: Utc::now().to_rfc3339(),
    }))
}
