use axum::{extract::State, Extension, Json};
use pricewatch_data::LoadStats;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

pub(super) async fn post_reload(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<LoadStats>>, ApiError> {
    match state.reload().await {
        Ok(stats) => {
            tracing::info!(
                observations = stats.observation_count,
                mapping = stats.mapping_count,
                "dataset reloaded on request"
            );
            Ok(Json(ApiResponse::new(stats, req_id.0)))
        }
        Err(e) => {
            tracing::error!(error = %e, "dataset reload failed");
            Err(ApiError::new(
                req_id.0,
                "internal_error",
                "dataset reload failed; previous dataset kept",
            ))
        }
    }
}
