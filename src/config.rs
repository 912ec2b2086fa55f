//! Process configuration
//!
//! Built once at startup from CLI flags (every flag also reads its
//! environment variable) and shared read-only through `AppState`.

use anyhow::{bail, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_UPSTREAM_URL: &str = "https://finnhub.io/api/v1";
pub const DEFAULT_PORT: u16 = 5001;

/// Timeout for ordinary upstream lookups.
pub const STANDARD_TIMEOUT: Duration = Duration::from_secs(10);
/// Historical candle queries are slower upstream.
pub const CANDLE_TIMEOUT: Duration = Duration::from_secs(15);
/// Per-asset timeout inside the crypto-list fan-out.
pub const FANOUT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "stockpulse", about = "Market-data proxy API")]
pub struct Args {
    /// Primary market-data API key (required)
    #[arg(long, env = "FINNHUB_API_KEY", hide_env_values = true)]
    pub finnhub_api_key: Option<String>,

    /// News API key (accepted, currently unused)
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Upstream base URL, without trailing slash
    #[arg(long = "upstream-url", env = "FINNHUB_BASE_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub finnhub_api_key: String,
    pub news_api_key: Option<String>,
    pub host: String,
    pub port: u16,
    pub upstream_url: String,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let Some(finnhub_api_key) = args
            .finnhub_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
        else {
            bail!("FINNHUB_API_KEY is not set");
        };

        let news_api_key = args
            .news_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Ok(Self {
            finnhub_api_key,
            news_api_key,
            host: args.host,
            port: args.port,
            upstream_url: args.upstream_url.trim_end_matches('/').to_string(),
        })
    }

    /// Config for tests and embedding: explicit key and upstream, default port.
    pub fn new(finnhub_api_key: impl Into<String>, upstream_url: impl Into<String>) -> Self {
        let upstream_url: String = upstream_url.into();
        Self {
            finnhub_api_key: finnhub_api_key.into(),
            news_api_key: None,
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            upstream_url: upstream_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", addr, e))
    }
}
