use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One trading day of OHLCV data for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Check that every price is a finite, positive number.
    ///
    /// `row` is the bar's position in the caller's series and is carried
    /// into the error so the offending row can be located.
    pub fn validate(&self, row: usize) -> Result<()> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            check_price(row, field, value)?;
        }
        Ok(())
    }
}

/// A price row as it arrives from an untrusted caller: any field may be
/// missing or hold a non-numeric JSON value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPriceRow {
    pub date: Option<String>,
    pub open: Option<serde_json::Value>,
    pub high: Option<serde_json::Value>,
    pub low: Option<serde_json::Value>,
    pub close: Option<serde_json::Value>,
    pub volume: Option<serde_json::Value>,
}

impl RawPriceRow {
    /// Convert into a [`PriceBar`], failing on the first bad field.
    /// Prices are rounded to cents like provider bars.
    pub fn into_bar(self, row: usize) -> Result<PriceBar> {
        let date = date_field(row, self.date.as_deref())?;

        let bar = PriceBar {
            date,
            open: round_price(numeric_field(row, "open", self.open)?),
            high: round_price(numeric_field(row, "high", self.high)?),
            low: round_price(numeric_field(row, "low", self.low)?),
            close: round_price(numeric_field(row, "close", self.close)?),
            volume: volume_field(row, self.volume)?,
        };
        bar.validate(row)?;
        Ok(bar)
    }

    /// Convert into a [`DailyOpen`]; only `date` and `open` are read.
    pub fn into_daily_open(self, row: usize) -> Result<DailyOpen> {
        let date = date_field(row, self.date.as_deref())?;
        let open = round_price(numeric_field(row, "open", self.open)?);
        check_price(row, "open", open)?;
        Ok(DailyOpen { date, open })
    }
}

fn date_field(row: usize, value: Option<&str>) -> Result<NaiveDate> {
    let value = value.ok_or_else(|| AppError::validation(row, "date is missing"))?;
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(row, format!("date '{}' is not YYYY-MM-DD", value)))
}

fn numeric_field(row: usize, field: &str, value: Option<serde_json::Value>) -> Result<f64> {
    match value {
        None | Some(serde_json::Value::Null) => {
            Err(AppError::validation(row, format!("{} is missing", field)))
        }
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| AppError::validation(row, format!("{} is not a number", field))),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::validation(row, format!("{} '{}' is not numeric", field, s))),
        Some(other) => Err(AppError::validation(
            row,
            format!("{} has unsupported value {}", field, other),
        )),
    }
}

fn volume_field(row: usize, value: Option<serde_json::Value>) -> Result<u64> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(0),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| AppError::validation(row, "volume must be a non-negative integer")),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| AppError::validation(row, format!("volume '{}' is not an integer", s))),
        Some(other) => Err(AppError::validation(
            row,
            format!("volume has unsupported value {}", other),
        )),
    }
}

pub(crate) fn check_price(row: usize, field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(AppError::validation(row, format!("{} is not finite", field)));
    }
    if value <= 0.0 {
        return Err(AppError::validation(
            row,
            format!("{} must be positive, got {}", field, value),
        ));
    }
    Ok(())
}

/// Date and opening price, the only inputs the seasonal backtest reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyOpen {
    pub date: NaiveDate,
    pub open: f64,
}

impl From<&PriceBar> for DailyOpen {
    fn from(bar: &PriceBar) -> Self {
        Self {
            date: bar.date,
            open: bar.open,
        }
    }
}

/// Inclusive date bounds for a history request. `None` leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl DateRange {
    /// The full available history.
    pub fn all() -> Self {
        Self::default()
    }

    /// The `days` calendar days ending at `until`.
    pub fn trailing_days(until: NaiveDate, days: u32) -> Self {
        Self {
            since: Some(until - Duration::days(i64::from(days))),
            until: Some(until),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.since.map_or(true, |s| date >= s) && self.until.map_or(true, |u| date <= u)
    }

    /// Key fragment used by the history cache.
    pub fn cache_key(&self) -> String {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "*".into());
        format!("{}:{}", fmt(self.since), fmt(self.until))
    }
}

/// Round a price to two decimal places, the precision prices are served at.
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
