//! Daily price history with the oscillator overlay.

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::services::normalize_symbol;
use crate::types::{DateRange, IndicatorRecord};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StockDataRequest {
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Serialize)]
pub struct StockDataResponse {
    pub symbol: String,
    pub data: Vec<IndicatorRecord>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/stock-data", post(get_stock_data))
}

/// Trailing history for a symbol, annotated with the oscillator overlay.
async fn get_stock_data(
    State(state): State<AppState>,
    Json(request): Json<StockDataRequest>,
) -> Result<Json<StockDataResponse>> {
    let symbol = normalize_symbol(&request.symbol)?;
    let range = DateRange::trailing_days(
        Utc::now().date_naive(),
        state.config.indicator_lookback_days,
    );

    info!("Requesting data for {}", symbol);
    let bars = state.history.history(&symbol, range).await?;
    let data = state.indicators.compute(&bars)?;

    Ok(Json(StockDataResponse { symbol, data }))
}
