//! Direct compute endpoints over caller-supplied rows.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{DailyOpen, IndicatorRecord, PriceBar, RawPriceRow, SeasonalSlot};
use crate::AppState;

/// Ordering of records in an indicator response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputOrder {
    /// Same order as the submitted rows.
    #[default]
    Input,
    Asc,
    Desc,
}

#[derive(Debug, Deserialize)]
pub struct IndicatorRequest {
    #[serde(default)]
    pub order: OutputOrder,
    #[serde(default)]
    pub rows: Vec<RawPriceRow>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonalRequest {
    pub year: i32,
    #[serde(default)]
    pub rows: Vec<RawPriceRow>,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/indicators", post(compute_indicators))
        .route("/seasonal", post(compute_seasonal))
}

async fn compute_indicators(
    State(state): State<AppState>,
    Json(request): Json<IndicatorRequest>,
) -> Result<Json<DataResponse<IndicatorRecord>>> {
    let bars = request
        .rows
        .into_iter()
        .enumerate()
        .map(|(row, raw)| raw.into_bar(row))
        .collect::<Result<Vec<PriceBar>>>()?;

    let mut data = state.indicators.compute(&bars)?;
    match request.order {
        OutputOrder::Input => {}
        OutputOrder::Asc => data.sort_by_key(|r| r.bar.date),
        OutputOrder::Desc => data.sort_by_key(|r| std::cmp::Reverse(r.bar.date)),
    }

    Ok(Json(DataResponse { data }))
}

async fn compute_seasonal(
    State(state): State<AppState>,
    Json(request): Json<SeasonalRequest>,
) -> Result<Json<DataResponse<SeasonalSlot>>> {
    let opens = request
        .rows
        .into_iter()
        .enumerate()
        .map(|(row, raw)| raw.into_daily_open(row))
        .collect::<Result<Vec<DailyOpen>>>()?;

    let data = state.seasonal.aggregate(&opens, request.year)?;
    Ok(Json(DataResponse { data }))
}
