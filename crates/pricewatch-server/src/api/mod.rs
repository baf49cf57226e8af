mod comparison;
mod history;
mod products;
mod reload;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use pricewatch_core::{AppConfig, CatalogConfig, Observation};
use pricewatch_data::{DataError, Dataset, LoadStats};
use serde::Serialize;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, require_bearer_auth, AuthState, RequestId};

/// Shared handler state.
///
/// The dataset is an immutable snapshot behind an `Arc`; a reload swaps in a
/// new snapshot while in-flight requests keep the one they started with.
#[derive(Clone)]
pub struct AppState {
    dataset: Arc<RwLock<Arc<Dataset>>>,
    pub catalog: Arc<CatalogConfig>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(dataset: Dataset, catalog: CatalogConfig, config: Arc<AppConfig>) -> Self {
        Self {
            dataset: Arc::new(RwLock::new(Arc::new(dataset))),
            catalog: Arc::new(catalog),
            config,
        }
    }

    pub async fn snapshot(&self) -> Arc<Dataset> {
        Arc::clone(&*self.dataset.read().await)
    }

    /// Re-read the observation files and mapping table and swap the new
    /// dataset in. On failure the current dataset stays in place.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or the blocking task panics.
    pub async fn reload(&self) -> anyhow::Result<LoadStats> {
        let data_dir = self.config.data_dir.clone();
        let mapping_path = self.config.mapping_path.clone();
        let dataset = tokio::task::spawn_blocking(move || {
            pricewatch_data::load_dataset(&data_dir, &mapping_path)
        })
        .await??;

        let stats = dataset.stats().clone();
        *self.dataset.write().await = Arc::new(dataset);
        Ok(stats)
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    dataset: LoadStats,
}

/// Grid row: one observation plus its product key.
#[derive(Debug, Serialize)]
pub(super) struct ObservationRow {
    product_key: String,
    #[serde(flatten)]
    observation: Observation,
}

impl From<&Observation> for ObservationRow {
    fn from(observation: &Observation) -> Self {
        Self {
            product_key: observation.product_key(),
            observation: observation.clone(),
        }
    }
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "invalid_price" | "missing_reference" | "insufficient_data" | "out_of_range" => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_data_error(request_id: String, error: &DataError) -> ApiError {
    let code = error.code();
    if code == "load_error" {
        tracing::error!(error = %error, "dataset load failed");
        return ApiError::new(request_id, "internal_error", "dataset load failed");
    }
    ApiError::new(request_id, code, error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/filters", get(history::get_filters))
        .route("/api/v1/history", get(history::get_history))
        .route("/api/v1/products", get(products::get_product))
        .route("/api/v1/references", get(products::list_references))
        .route(
            "/api/v1/comparison",
            post(comparison::post_comparison),
        )
        .route(
            "/api/v1/comparison/{reference_sku}",
            get(comparison::get_comparison),
        )
        .route("/api/v1/summary", get(comparison::get_summary))
        .route("/api/v1/reload", post(reload::post_reload))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let dataset = state.snapshot().await;
    Json(ApiResponse::new(
        HealthData {
            status: "ok",
            dataset: dataset.stats().clone(),
        },
        req_id.0,
    ))
}
