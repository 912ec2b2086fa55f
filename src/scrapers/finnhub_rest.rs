//! Finnhub REST API Client
//!
//! Every call appends the API key as the `token` query parameter and runs
//! under its own timeout. Non-2xx answers come back as
//! `UpstreamError::Status` so callers can tell plan restrictions (403)
//! apart from everything else.

use crate::config::{CANDLE_TIMEOUT, STANDARD_TIMEOUT};
use crate::error::UpstreamError;
use crate::models::CandleSeries;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct FinnhubClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(STANDARD_TIMEOUT)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent("StockPulse/1.0")
            .build()
            .context("Failed to build FinnhubClient")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    #[inline]
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T, UpstreamError> {
        debug!(endpoint = path, "upstream GET");

        let resp = self
            .client
            .get(self.url(path))
            .query(query)
            .query(&[("token", self.api_key.as_str())])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                let err = UpstreamError::from(e);
                warn!(endpoint = path, error = %err, "upstream request failed");
                err
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(endpoint = path, status = status.as_u16(), "upstream returned error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                endpoint: path.to_string(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| UpstreamError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }

    /// Symbol lookup by free-text query
    pub async fn search_symbols(&self, query: &str) -> Result<SymbolSearch, UpstreamError> {
        self.get_json("/search", &[("q", query.to_string())], STANDARD_TIMEOUT)
            .await
    }

    pub async fn quote(&self, symbol: &str) -> Result<Quote, UpstreamError> {
        self.quote_with_timeout(symbol, STANDARD_TIMEOUT).await
    }

    pub async fn quote_with_timeout(
        &self,
        symbol: &str,
        timeout: Duration,
    ) -> Result<Quote, UpstreamError> {
        self.get_json("/quote", &[("symbol", symbol.to_string())], timeout)
            .await
    }

    pub async fn company_profile(&self, symbol: &str) -> Result<Map<String, Value>, UpstreamError> {
        self.get_json(
            "/stock/profile2",
            &[("symbol", symbol.to_string())],
            STANDARD_TIMEOUT,
        )
        .await
    }

    pub async fn stock_candles(
        &self,
        symbol: &str,
        resolution: &str,
        from: i64,
        to: i64,
    ) -> Result<CandleSeries, UpstreamError> {
        self.candles("/stock/candle", symbol, resolution, from, to)
            .await
    }

    pub async fn crypto_candles(
        &self,
        symbol: &str,
        resolution: &str,
        from: i64,
        to: i64,
    ) -> Result<CandleSeries, UpstreamError> {
        self.candles("/crypto/candle", symbol, resolution, from, to)
            .await
    }

    async fn candles(
        &self,
        path: &str,
        symbol: &str,
        resolution: &str,
        from: i64,
        to: i64,
    ) -> Result<CandleSeries, UpstreamError> {
        let qp = [
            ("symbol", symbol.to_string()),
            ("resolution", resolution.to_string()),
            ("from", from.to_string()),
            ("to", to.to_string()),
        ];
        self.get_json(path, &qp, CANDLE_TIMEOUT).await
    }

    /// Market news by category (`general`, `forex`, `crypto`, `merger`)
    pub async fn market_news(&self, category: &str) -> Result<Value, UpstreamError> {
        self.get_json(
            "/news",
            &[("category", category.to_string())],
            STANDARD_TIMEOUT,
        )
        .await
    }

    pub async fn company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Value>, UpstreamError> {
        let qp = [
            ("symbol", symbol.to_string()),
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", to.format("%Y-%m-%d").to_string()),
        ];
        self.get_json("/company-news", &qp, STANDARD_TIMEOUT).await
    }

    /// Basic financials with `metric=all`
    pub async fn basic_financials(&self, symbol: &str) -> Result<BasicFinancials, UpstreamError> {
        let qp = [("symbol", symbol.to_string()), ("metric", "all".to_string())];
        self.get_json("/stock/metric", &qp, STANDARD_TIMEOUT).await
    }
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

/// Upstream quote, kept as the raw object so it can be echoed verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Quote(pub Map<String, Value>);

impl Quote {
    fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn current(&self) -> f64 {
        self.number("c").unwrap_or(0.0)
    }

    pub fn high(&self) -> f64 {
        self.number("h").unwrap_or(0.0)
    }

    pub fn low(&self) -> f64 {
        self.number("l").unwrap_or(0.0)
    }

    pub fn open(&self) -> f64 {
        self.number("o").unwrap_or(0.0)
    }

    pub fn previous_close(&self) -> f64 {
        self.number("pc").unwrap_or(0.0)
    }

    /// Absolute change; upstream sends null when unknown.
    pub fn change(&self) -> Option<f64> {
        self.number("d")
    }

    pub fn change_percent(&self) -> Option<f64> {
        self.number("dp")
    }

    /// Upstream answers unknown symbols with an all-zero quote.
    pub fn is_empty(&self) -> bool {
        self.current() == 0.0 && self.high() == 0.0 && self.low() == 0.0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolSearch {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub result: Vec<SymbolMatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMatch {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display_symbol: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, rename = "type")]
    pub instrument_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicFinancials {
    #[serde(default)]
    pub metric: Map<String, Value>,
}

impl BasicFinancials {
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metric.get(key).and_then(Value::as_f64)
    }
}

/// Headlines of a news payload, skipping items without one.
pub fn headlines(articles: &[Value]) -> Vec<&str> {
    articles
        .iter()
        .filter_map(|a| a.get("headline").and_then(Value::as_str))
        .collect()
}
