//! Finnhub API client for daily stock and ETF candles.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::PriceHistoryProvider;
use crate::error::{AppError, Result};
use crate::types::{round_price, DateRange, PriceBar};

const FINNHUB_URL: &str = "https://finnhub.io/api/v1";

/// Earliest bound sent when the caller asks for the full history.
const EPOCH_START: i64 = 0;

/// Finnhub candle response. Arrays are parallel, one entry per bar.
#[derive(Debug, Deserialize)]
struct FinnhubCandles {
    #[serde(rename = "s")]
    status: Option<String>,
    #[serde(rename = "o", default)]
    open: Vec<f64>,
    #[serde(rename = "h", default)]
    high: Vec<f64>,
    #[serde(rename = "l", default)]
    low: Vec<f64>,
    #[serde(rename = "c", default)]
    close: Vec<f64>,
    #[serde(rename = "v", default)]
    volume: Vec<f64>,
    #[serde(rename = "t", default)]
    timestamp: Vec<i64>,
    error: Option<String>,
}

fn parse_candles(symbol: &str, data: FinnhubCandles) -> Result<Vec<PriceBar>> {
    if let Some(error) = data.error {
        return Err(AppError::Unavailable(format!("Finnhub API error: {}", error)));
    }
    if data.status.as_deref() == Some("no_data") {
        return Err(AppError::NotFound(format!("No data found for {}", symbol)));
    }

    let n = data.timestamp.len();
    if [&data.open, &data.high, &data.low, &data.close]
        .iter()
        .any(|v| v.len() != n)
    {
        return Err(AppError::Unavailable(format!(
            "Finnhub returned ragged candle arrays for {}",
            symbol
        )));
    }

    let mut bars = Vec::with_capacity(n);
    for i in 0..n {
        let date = DateTime::from_timestamp(data.timestamp[i], 0)
            .ok_or_else(|| AppError::validation(i, format!("bad timestamp {}", data.timestamp[i])))?
            .date_naive();

        let volume = data.volume.get(i).copied().unwrap_or(0.0);
        if !volume.is_finite() || volume < 0.0 {
            return Err(AppError::validation(i, "volume must be non-negative"));
        }

        let bar = PriceBar {
            date,
            open: round_price(data.open[i]),
            high: round_price(data.high[i]),
            low: round_price(data.low[i]),
            close: round_price(data.close[i]),
            volume: volume.round() as u64,
        };
        bar.validate(i)?;
        bars.push(bar);
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

fn unix_bounds(range: DateRange, now: DateTime<Utc>) -> (i64, i64) {
    let start = |d: NaiveDate| d.and_time(NaiveTime::MIN).and_utc().timestamp();
    let from = range.since.map(start).unwrap_or(EPOCH_START);
    let to = range
        .until
        .map(|d| start(d + ChronoDuration::days(1)) - 1)
        .unwrap_or_else(|| now.timestamp());
    (from, to)
}

/// Finnhub API client.
pub struct FinnhubClient {
    client: Client,
    api_key: String,
}

impl FinnhubClient {
    /// Create a new Finnhub client.
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl PriceHistoryProvider for FinnhubClient {
    fn name(&self) -> &str {
        "finnhub"
    }

    async fn fetch(&self, symbol: &str, range: DateRange) -> Result<Vec<PriceBar>> {
        let (from, to) = unix_bounds(range, Utc::now());
        let url = format!("{}/stock/candle", FINNHUB_URL);

        debug!("Requesting Finnhub candles for {} ({}..{})", symbol, from, to);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("resolution", "D".to_string()),
                ("from", from.to_string()),
                ("to", to.to_string()),
                ("token", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Unavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Finnhub HTTP error {} for {}: {}", status, symbol, body);
            return Err(AppError::Unavailable(format!("HTTP {}: {}", status, body)));
        }

        let data: FinnhubCandles = response
            .json()
            .await
            .map_err(|e| AppError::Unavailable(format!("Parse error: {}", e)))?;

        let bars = parse_candles(symbol, data)?;
        Ok(bars.into_iter().filter(|b| range.contains(b.date)).collect())
    }
}
