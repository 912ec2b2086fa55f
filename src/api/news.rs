//! News passthrough routes

use crate::{
    api::routes::AppState,
    error::{ApiError, UpstreamResultExt},
};
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::Value;

pub const COMPANY_NEWS_WINDOW_DAYS: i64 = 30;

/// `[today - 30d, today]` in UTC
pub fn company_news_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(COMPANY_NEWS_WINDOW_DAYS), today)
}

/// GET /api/news/:category
pub async fn category_news(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let category = category.trim();
    if category.is_empty() {
        return Err(ApiError::bad_request("News category is required"));
    }
    let news = state.finnhub.market_news(category).await.unscoped()?;
    Ok(Json(news))
}

/// GET /api/market-news
pub async fn market_news(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let news = state.finnhub.market_news("general").await.unscoped()?;
    Ok(Json(news))
}

/// GET /api/crypto-news
pub async fn crypto_news(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let news = state.finnhub.market_news("crypto").await.unscoped()?;
    Ok(Json(news))
}

/// GET /api/company-news/:symbol (also served as /api/stock-news/:symbol)
pub async fn company_news(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let (from, to) = company_news_window(Utc::now().date_naive());
    let news = state
        .finnhub
        .company_news(&symbol, from, to)
        .await
        .for_symbol(&symbol)?;
    Ok(Json(news))
}
