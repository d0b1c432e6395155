//! Yahoo Finance chart API client for daily stock and ETF history.
//!
//! Uses the unofficial v8 chart endpoint, which needs no API key.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::PriceHistoryProvider;
use crate::error::{AppError, Result};
use crate::types::{round_price, DateRange, PriceBar};

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooMeta {
    symbol: String,
    /// Exchange offset from UTC in seconds; bar timestamps are session opens.
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Normalize symbol for Yahoo Finance API.
/// Yahoo uses hyphens instead of dots for share classes (e.g., BRK-B not BRK.B)
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.to_uppercase().replace('.', "-")
}

/// Query string selecting daily bars for `range`.
fn chart_query(range: DateRange, now: DateTime<Utc>) -> String {
    if range.since.is_none() && range.until.is_none() {
        return "range=max&interval=1d&includePrePost=false".to_string();
    }
    let start = range.since.map(day_start).unwrap_or(0);
    let end = range
        .until
        .map(|d| day_start(d + ChronoDuration::days(1)))
        .unwrap_or_else(|| now.timestamp());
    format!(
        "period1={}&period2={}&interval=1d&includePrePost=false",
        start, end
    )
}

fn day_start(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Turn a chart response into bars inside `range`.
///
/// Yahoo pads some timestamps with all-null quotes; those are skipped.
/// A row with only some fields missing is rejected.
fn parse_chart(data: YahooChartResponse, range: DateRange) -> Result<Vec<PriceBar>> {
    if let Some(error) = data.chart.error {
        return Err(if error.code.eq_ignore_ascii_case("not found") {
            AppError::NotFound(error.description)
        } else {
            AppError::Unavailable(format!("Yahoo API error: {} - {}", error.code, error.description))
        });
    }

    let result = data
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| AppError::Unavailable("Empty results array".to_string()))?;

    let offset = result.meta.gmtoffset.unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let field = |values: &[Option<f64>]| values.get(i).copied().flatten();
        let prices = [field(&opens), field(&highs), field(&lows), field(&closes)];

        if prices.iter().all(Option::is_none) {
            continue;
        }
        let [Some(open), Some(high), Some(low), Some(close)] = prices else {
            return Err(AppError::validation(
                i,
                format!("{} bar has missing prices", result.meta.symbol),
            ));
        };

        let date = DateTime::from_timestamp(timestamp + offset, 0)
            .ok_or_else(|| AppError::validation(i, format!("bad timestamp {}", timestamp)))?
            .date_naive();
        if !range.contains(date) {
            continue;
        }

        let bar = PriceBar {
            date,
            open: round_price(open),
            high: round_price(high),
            low: round_price(low),
            close: round_price(close),
            volume: volumes.get(i).copied().flatten().unwrap_or(0),
        };
        bar.validate(i)?;
        bars.push(bar);
    }

    // During market hours the live session bar repeats the last date; the later one wins.
    bars.sort_by_key(|b| b.date);
    let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => deduped.push(bar),
        }
    }

    Ok(deduped)
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, symbol: &str, range: DateRange) -> Result<Vec<PriceBar>> {
        let yahoo_symbol = normalize_yahoo_symbol(symbol);
        let url = format!(
            "{}/{}?{}",
            YAHOO_CHART_URL,
            yahoo_symbol,
            chart_query(range, Utc::now())
        );

        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Unavailable(format!("Request failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(AppError::NotFound(format!("Unknown symbol {}", symbol)))
            }
            status if !status.is_success() => {
                warn!("Yahoo Finance returned {} for {}", status, symbol);
                return Err(AppError::Unavailable(format!("API error: {}", status)));
            }
            _ => {}
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .map_err(|e| AppError::Unavailable(format!("Parse error: {}", e)))?;

        let bars = parse_chart(data, range)?;
        debug!("Yahoo Finance returned {} bars for {}", bars.len(), symbol);
        Ok(bars)
    }
}
