use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use pricewatch_core::{ComparisonResult, IndexError, IndexedObservation, Multipliers};
use pricewatch_data::{
    adjusted_price_series, price_series, DataError, PriceSeries, ProductCard,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_data_error, ApiError, ApiResponse, AppState, ErrorBody};

#[derive(Debug, Deserialize)]
pub(super) struct ComparisonRequest {
    pub reference_sku: String,
    #[serde(default)]
    pub multipliers: Multipliers,
}

#[derive(Debug, Serialize)]
pub(super) struct ComparisonRow {
    product_key: String,
    is_reference: bool,
    marketplace: String,
    manufacturer: String,
    product_name: String,
    sku: String,
    price: Decimal,
    currency: String,
    url: String,
    price_index: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    multiplier_pct: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adjusted_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adjusted_index: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub(super) struct ComparisonData {
    reference_sku: String,
    date: NaiveDate,
    reference: ProductCard,
    series: Vec<PriceSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adjusted_series: Option<Vec<PriceSeries>>,
    rows: Vec<ComparisonRow>,
    overall_index: Option<Decimal>,
    overall_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    adjusted_overall_index: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adjusted_overall_status: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub(super) struct SummaryPoint {
    product_key: String,
    manufacturer: String,
    marketplace: String,
    price: Decimal,
    price_index: Decimal,
}

#[derive(Debug, Serialize)]
pub(super) struct SummaryItem {
    reference_sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    points: Vec<SummaryPoint>,
    overall_index: Option<Decimal>,
    overall_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

/// `"ok"` or the error code explaining why there is no overall figure.
fn overall_status(overall: &Result<Decimal, IndexError>) -> &'static str {
    match overall {
        Ok(_) => "ok",
        Err(e) => e.code(),
    }
}

fn row(indexed: &IndexedObservation, adjusted: bool) -> ComparisonRow {
    let o = &indexed.observation;
    ComparisonRow {
        product_key: indexed.product_key.clone(),
        is_reference: indexed.is_reference,
        marketplace: o.marketplace.clone(),
        manufacturer: o.manufacturer.clone(),
        product_name: o.product_name.clone(),
        sku: o.sku.clone(),
        price: o.price,
        currency: o.currency.clone(),
        url: o.url.clone(),
        price_index: indexed.price_index,
        multiplier_pct: adjusted.then_some(indexed.multiplier_pct),
        adjusted_price: adjusted.then_some(indexed.adjusted_price),
        adjusted_index: adjusted.then_some(indexed.adjusted_index),
    }
}

async fn comparison_view(
    state: &AppState,
    req_id: &str,
    reference_sku: &str,
    multipliers: Option<&Multipliers>,
) -> Result<ComparisonData, ApiError> {
    let dataset = state.snapshot().await;
    let empty = Multipliers::new();
    let result: ComparisonResult = dataset
        .compare(reference_sku, multipliers.unwrap_or(&empty))
        .map_err(|e| map_data_error(req_id.to_string(), &e))?;

    let history = dataset.comparison_history(&result.reference_sku);
    let adjusted = multipliers.is_some();
    let adjusted_series = multipliers
        .map(|m| adjusted_price_series(history.iter().copied(), &state.catalog, m))
        .transpose()
        .map_err(|e| map_data_error(req_id.to_string(), &DataError::from(e)))?;

    Ok(ComparisonData {
        series: price_series(history.iter().copied(), &state.catalog),
        adjusted_series,
        rows: result.rows.iter().map(|r| row(r, adjusted)).collect(),
        overall_index: result.overall.as_ref().ok().copied(),
        overall_status: overall_status(&result.overall),
        adjusted_overall_index: if adjusted {
            result.adjusted_overall.as_ref().ok().copied()
        } else {
            None
        },
        adjusted_overall_status: adjusted.then(|| overall_status(&result.adjusted_overall)),
        reference: ProductCard::from(&result.reference),
        reference_sku: result.reference_sku,
        date: result.date,
    })
}

pub(super) async fn get_comparison(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(reference_sku): Path<String>,
) -> Result<Json<ApiResponse<ComparisonData>>, ApiError> {
    let data = comparison_view(&state, &req_id.0, &reference_sku, None).await?;
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// Comparison with per-product multipliers; adds the adjusted view.
pub(super) async fn post_comparison(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ComparisonRequest>,
) -> Result<Json<ApiResponse<ComparisonData>>, ApiError> {
    if body.reference_sku.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "reference_sku must not be empty",
        ));
    }
    let data =
        comparison_view(&state, &req_id.0, &body.reference_sku, Some(&body.multipliers)).await?;
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// Price index summary over the catalog's summary SKUs. A reference that
/// cannot be indexed is reported inline instead of failing the request.
pub(super) async fn get_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<SummaryItem>>> {
    let dataset = state.snapshot().await;
    let multipliers = Multipliers::new();

    let data = state
        .catalog
        .summary_skus
        .iter()
        .map(|sku| match dataset.compare(sku, &multipliers) {
            Ok(result) => SummaryItem {
                reference_name: Some(result.reference.product_name.clone()),
                date: Some(result.date),
                points: result
                    .rows
                    .iter()
                    .map(|r| SummaryPoint {
                        product_key: r.product_key.clone(),
                        manufacturer: r.observation.manufacturer.clone(),
                        marketplace: r.observation.marketplace.clone(),
                        price: r.observation.price,
                        price_index: r.price_index,
                    })
                    .collect(),
                overall_index: result.overall.as_ref().ok().copied(),
                overall_status: overall_status(&result.overall),
                error: None,
                reference_sku: result.reference_sku,
            },
            Err(e) => {
                tracing::warn!(reference_sku = %sku, error = %e, "summary: reference skipped");
                SummaryItem {
                    reference_sku: sku.clone(),
                    reference_name: None,
                    date: None,
                    points: Vec::new(),
                    overall_index: None,
                    overall_status: e.code(),
                    error: Some(ErrorBody {
                        code: e.code().to_string(),
                        message: e.to_string(),
                    }),
                }
            }
        })
        .collect();

    Json(ApiResponse::new(data, req_id.0))
}
