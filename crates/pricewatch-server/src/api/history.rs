use axum::{
    extract::{Query, State},
    Extension, Json,
};
use pricewatch_data::{price_series, FilterOptions, HistoryFilter, PriceSeries};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_data_error, ApiError, ApiResponse, AppState, ObservationRow};

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    pub marketplace: Option<String>,
    pub manufacturer: Option<String>,
    pub sku: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub product_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct HistoryData {
    series: Vec<PriceSeries>,
    rows: Vec<ObservationRow>,
}

pub(super) async fn get_filters(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<FilterOptions>> {
    let dataset = state.snapshot().await;
    Json(ApiResponse::new(dataset.filter_options(), req_id.0))
}

pub(super) async fn get_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<HistoryData>>, ApiError> {
    let filter = HistoryFilter::from_parts(
        query.marketplace.as_deref(),
        query.manufacturer.as_deref(),
        query.sku.as_deref(),
        query.min_price,
        query.max_price,
        query.product_type.as_deref(),
    )
    .map_err(|e| map_data_error(req_id.0.clone(), &e))?;

    let dataset = state.snapshot().await;
    let rows = dataset
        .history(&filter)
        .map_err(|e| map_data_error(req_id.0.clone(), &e))?;

    let data = HistoryData {
        series: price_series(rows.iter().copied(), &state.catalog),
        rows: rows.into_iter().map(ObservationRow::from).collect(),
    };

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
