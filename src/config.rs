use chrono::{Datelike, Utc};
use std::env;
use tracing::warn;

/// Which upstream serves daily price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Yahoo,
    Finnhub,
}

impl PriceSource {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Some(PriceSource::Yahoo),
            "finnhub" => Some(PriceSource::Finnhub),
            _ => None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Price history upstream.
    pub price_source: PriceSource,
    /// Finnhub API key, required when `price_source` is Finnhub.
    pub finnhub_api_key: Option<String>,
    /// Calendar days of history behind the indicator view.
    pub indicator_lookback_days: u32,
    /// Year whose trading calendar labels the seasonal slots.
    pub seasonal_reference_year: i32,
    /// How long fetched histories stay cached (seconds).
    pub history_cache_ttl_secs: u64,
    /// Upstream HTTP timeout (seconds).
    pub request_timeout_secs: u64,
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let finnhub_api_key = env::var("FINNHUB_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let requested = env::var("PRICE_SOURCE")
            .ok()
            .and_then(|s| PriceSource::from_str(&s))
            .unwrap_or(PriceSource::Yahoo);

        let price_source = match (requested, &finnhub_api_key) {
            (PriceSource::Finnhub, None) => {
                warn!("PRICE_SOURCE=finnhub but FINNHUB_API_KEY is not set, using yahoo");
                PriceSource::Yahoo
            }
            (source, _) => source,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT").unwrap_or(5000),
            price_source,
            finnhub_api_key,
            indicator_lookback_days: parse_var("INDICATOR_LOOKBACK_DAYS").unwrap_or(365),
            seasonal_reference_year: parse_var("SEASONAL_REFERENCE_YEAR")
                .unwrap_or_else(|| Utc::now().year()),
            history_cache_ttl_secs: parse_var("HISTORY_CACHE_TTL_SECS").unwrap_or(3600),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS").unwrap_or(10),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            price_source: PriceSource::Yahoo,
            finnhub_api_key: None,
            indicator_lookback_days: 365,
            seasonal_reference_year: Utc::now().year(),
            history_cache_ttl_secs: 3600,
            request_timeout_secs: 10,
        }
    }
}
