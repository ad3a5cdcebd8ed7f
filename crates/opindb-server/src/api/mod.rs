mod exports;
mod products;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use opindb_core::InvalidParam;
use opindb_scraper::{ReviewClient, ScrapeError};
use opindb_store::{ProductStore, StoreError};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub store: ProductStore,
    pub client: Arc<ReviewClient>,
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
    /// Rejected filter parameters; present only when a query carried any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_params: Vec<InvalidParam>,
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

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            invalid_params: Vec::new(),
        }
    }

    pub(super) fn with_invalid_params(request_id: String, invalid_params: Vec<InvalidParam>) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            invalid_params,
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
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "malformed_opinion" => StatusCode::UNPROCESSABLE_ENTITY,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    match error {
        StoreError::NotFound { product_id } => ApiError::new(
            request_id,
            "not_found",
            format!("no persisted record for product {product_id}"),
        ),
        StoreError::InvalidProductId { product_id } => ApiError::new(
            request_id,
            "bad_request",
            format!("invalid product id {product_id:?}"),
        ),
        other => {
            tracing::error!(error = %other, "store operation failed");
            ApiError::new(request_id, "internal_error", "store operation failed")
        }
    }
}

pub(super) fn map_scrape_error(request_id: String, error: &ScrapeError) -> ApiError {
    match error {
        ScrapeError::ProductNotFound { product_id } => ApiError::new(
            request_id,
            "not_found",
            format!("no product with code {product_id}"),
        ),
        ScrapeError::MalformedOpinion {
            opinion_id, field, ..
        } => ApiError::new(
            request_id,
            "malformed_opinion",
            format!("opinion {opinion_id}: unusable {field} field"),
        ),
        ScrapeError::Http(_) | ScrapeError::PaginationLimit { .. } => {
            tracing::warn!(error = %error, "crawl failed upstream");
            ApiError::new(request_id, "upstream_error", "review source unavailable")
        }
        ScrapeError::Selector { .. } => {
            tracing::error!(error = %error, "selector table is invalid");
            ApiError::new(request_id, "internal_error", "extraction failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/{product_id}", get(products::get_product))
        .route(
            "/api/v1/products/{product_id}/extract",
            post(products::extract_product),
        )
        .route(
            "/api/v1/products/{product_id}/opinions",
            get(products::list_opinions),
        )
        .route(
            "/api/v1/products/{product_id}/export/csv",
            get(exports::export_csv),
        )
        .route(
            "/api/v1/products/{product_id}/export/jsonl",
            get(exports::export_jsonl),
        )
        .route(
            "/api/v1/products/{product_id}/charts",
            get(exports::product_charts),
        )
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.store.list().await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    store: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        store: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}
