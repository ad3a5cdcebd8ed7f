use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};

use opindb_store::{chart_data, csv_document, jsonl_document, ChartData};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn export_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<String>,
) -> Result<Response, ApiError> {
    let product = state
        .store
        .load(&product_id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(download(
        "text/csv; charset=utf-8",
        &format!("{product_id}_opinions.csv"),
        csv_document(&product),
    ))
}

pub(super) async fn export_jsonl(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<String>,
) -> Result<Response, ApiError> {
    let product = state
        .store
        .load(&product_id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    let body =
        jsonl_document(&product).map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(download(
        "application/x-ndjson",
        &format!("{product_id}_opinions.jsonl"),
        body,
    ))
}

pub(super) async fn product_charts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<String>,
) -> Result<Json<ApiResponse<ChartData>>, ApiError> {
    let product = state
        .store
        .load(&product_id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: chart_data(&product),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn download(content_type: &str, filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
