use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use opindb_core::{Opinion, OpinionQuery, Product, QueryParams};
use opindb_store::ProductSummary;

use crate::middleware::RequestId;

use super::{
    map_scrape_error, map_store_error, ApiError, ApiResponse, AppState, ResponseMeta,
};

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProductSummary>>>, ApiError> {
    let data = state
        .store
        .list()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let data = state
        .store
        .load(&product_id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Crawls the review source, analyzes the result and persists it. The
/// stored record is replaced wholesale on re-extraction.
pub(super) async fn extract_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<String>,
) -> Result<Json<ApiResponse<ProductSummary>>, ApiError> {
    let product = state
        .client
        .extract_product(&product_id)
        .await
        .map_err(|e| map_scrape_error(req_id.0.clone(), &e))?;

    state
        .store
        .save(&product)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ProductSummary::from(&product),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Runs the query engine over the persisted opinions. Unparsable filter
/// values are reported in `meta.invalid_params` while the rest of the
/// query still applies.
pub(super) async fn list_opinions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<String>,
    Query(params): Query<QueryParams>,
) -> Result<Json<ApiResponse<Vec<Opinion>>>, ApiError> {
    let product = state
        .store
        .load(&product_id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let (query, invalid_params) = OpinionQuery::parse(&params);
    let data = query.apply(&product.opinions);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::with_invalid_params(req_id.0, invalid_params),
    }))
}
