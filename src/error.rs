//! Error taxonomy
//!
//! `UpstreamError` is what the market-data client hands back; `ApiError` is
//! what a route answers with. `ApiError::from_upstream` is the single place
//! that maps one onto the other.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failure talking to the upstream market-data API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        endpoint: String,
        body: String,
    },

    /// Connect/read failures and timeouts. The request URL is stripped on
    /// construction since it carries the API key.
    #[error("{0}")]
    Transport(reqwest::Error),

    #[error("Failed to parse {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl UpstreamError {
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            UpstreamError::Transport(e) => e.status().map(|s| s.as_u16()),
            UpstreamError::Decode { .. } => None,
        }
    }

    /// Upstream refused the call under the current subscription.
    pub fn is_plan_restricted(&self) -> bool {
        self.status() == Some(403)
    }

}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Transport(err.without_url())
    }
}

/// Route-level error, rendered as `{ "error": ..., "symbol"?: ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    NotFound {
        message: String,
        symbol: Option<String>,
    },

    #[error("{}", plan_message(.symbol.as_deref()))]
    PlanRestricted { symbol: Option<String> },

    #[error("{message}")]
    Upstream {
        message: String,
        symbol: Option<String>,
    },
}

fn plan_message(symbol: Option<&str>) -> String {
    match symbol {
        Some(s) => format!(
            "Data for {} is not supported by this data plan. Try a US-listed stock symbol.",
            s
        ),
        None => "This data is not supported by this data plan.".to_string(),
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>, symbol: &str) -> Self {
        ApiError::NotFound {
            message: message.into(),
            symbol: Some(symbol.to_string()),
        }
    }

    /// Classify an upstream failure: 403 is a plan restriction, everything
    /// else (other statuses, network faults, timeouts, bad JSON) is a 500
    /// carrying the failure's message.
    pub fn from_upstream(err: UpstreamError, symbol: Option<&str>) -> Self {
        let symbol = symbol.map(str::to_string);
        if err.is_plan_restricted() {
            return ApiError::PlanRestricted { symbol };
        }
        ApiError::Upstream {
            message: err.to_string(),
            symbol,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::PlanRestricted { .. } => StatusCode::FORBIDDEN,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn symbol(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest(_) => None,
            ApiError::NotFound { symbol, .. }
            | ApiError::PlanRestricted { symbol }
            | ApiError::Upstream { symbol, .. } => symbol.as_deref(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({ "error": self.to_string() });
        if let Some(symbol) = self.symbol() {
            body["symbol"] = json!(symbol);
        }
        (status, Json(body)).into_response()
    }
}

/// Boundary helper so handlers can write `.for_symbol(&symbol)?`.
pub trait UpstreamResultExt<T> {
    fn for_symbol(self, symbol: &str) -> Result<T, ApiError>;
    fn unscoped(self) -> Result<T, ApiError>;
}

impl<T> UpstreamResultExt<T> for Result<T, UpstreamError> {
    fn for_symbol(self, symbol: &str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_upstream(e, Some(symbol)))
    }

    fn unscoped(self) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_upstream(e, None))
    }
}
