use axum::{
    extract::{Query, State},
    Extension, Json,
};
use pricewatch_data::{HistoryFilter, ProductCard};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_data_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReferenceQuery {
    pub product_type: Option<String>,
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<ProductCard>>, ApiError> {
    let dataset = state.snapshot().await;
    let observation = dataset
        .latest_for_product(query.key.trim())
        .map_err(|e| map_data_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(ProductCard::from(observation), req_id.0)))
}

/// Reference-brand products with their latest observation, for the
/// comparison picker.
pub(super) async fn list_references(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ReferenceQuery>,
) -> Result<Json<ApiResponse<Vec<ProductCard>>>, ApiError> {
    // Reuse the filter's normalization of blank and `All` product types.
    let filter = HistoryFilter::from_parts(None, None, None, None, None, query.product_type.as_deref())
        .map_err(|e| map_data_error(req_id.0.clone(), &e))?;

    let dataset = state.snapshot().await;
    let data = dataset
        .reference_products(&state.catalog, filter.product_type.as_deref())
        .into_iter()
        .map(ProductCard::from)
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
