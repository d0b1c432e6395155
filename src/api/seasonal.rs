//! Seasonal backtest endpoint.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::services::normalize_symbol;
use crate::types::{DailyOpen, DateRange, SeasonalSlot};
use crate::AppState;

const DEFAULT_SYMBOL: &str = "SPY";

#[derive(Debug, Deserialize)]
pub struct SeasonalQuery {
    pub symbol: Option<String>,
    /// Reference year for the calendar; defaults to the configured year.
    pub year: Option<i32>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/seasonal-data", get(get_seasonal_data))
}

async fn get_seasonal_data(
    State(state): State<AppState>,
    Query(query): Query<SeasonalQuery>,
) -> Result<Json<Vec<SeasonalSlot>>> {
    let symbol = normalize_symbol(query.symbol.as_deref().unwrap_or(DEFAULT_SYMBOL))?;
    let year = query.year.unwrap_or(state.config.seasonal_reference_year);

    info!("Seasonal backtest for {} against {}", symbol, year);
    let bars = state.history.history(&symbol, DateRange::all()).await?;
    let opens: Vec<DailyOpen> = bars.iter().map(DailyOpen::from).collect();

    let slots = state.seasonal.aggregate(&opens, year)?;
    Ok(Json(slots))
}
