use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Candle status reported by upstream.
pub const CANDLE_STATUS_OK: &str = "ok";
pub const CANDLE_STATUS_NO_DATA: &str = "no_data";

/// Trimmed symbol-search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub symbol: String,
    pub description: String,
    #[serde(rename = "type")]
    pub instrument_type: String,
    pub display_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub count: usize,
    pub result: Vec<SearchResult>,
}

/// OHLCV series in upstream's column layout: parallel arrays, one entry per bar.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CandleSeries {
    pub s: String,
    #[serde(default)]
    pub t: Vec<i64>,
    #[serde(default)]
    pub o: Vec<f64>,
    #[serde(default)]
    pub h: Vec<f64>,
    #[serde(default)]
    pub l: Vec<f64>,
    #[serde(default)]
    pub c: Vec<f64>,
    /// Volumes exactly as upstream sent them (integers stay integers).
    #[serde(default)]
    pub v: Vec<Value>,
    /// Set on locally generated series.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub mock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Any other upstream fields, echoed back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CandleSeries {
    pub fn is_no_data(&self) -> bool {
        self.s == CANDLE_STATUS_NO_DATA
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// One row of `/api/crypto-list`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoListing {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub previous_close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

/// Formatted metric strings keyed by indicator name; absent metrics are omitted.
pub type IndicatorSet = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorsResponse {
    pub symbol: String,
    pub current_price: f64,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub indicators: IndicatorSet,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionPoint {
    /// YYYY-MM-DD
    pub date: String,
    pub day: u32,
    pub price: f64,
    /// Cumulative percent change versus the current price.
    pub change: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSummary {
    pub trend: Trend,
    pub expected_change: f64,
    pub target_price: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub current_price: f64,
    pub sentiment: f64,
    pub news_count: usize,
    pub predictions: Vec<PredictionPoint>,
    pub summary: PredictionSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub symbol: String,
    #[serde(flatten)]
    pub prediction: Prediction,
    pub disclaimer: &'static str,
    pub generated_at: String,
}

/// Round to cents.
#[inline]
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
