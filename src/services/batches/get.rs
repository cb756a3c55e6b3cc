use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::BatchService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

pub async fn get_batch(
    service: &BatchService,
    request: &HttpRequest,
    batch_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_batch_by_id(batch_id).await {
        Ok(Some(batch)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            batch,
            "Batch retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::BatchNotFound,
            "Batch not found",
        ))),
        Err(e) => Ok(internal_error("Failed to get batch", e)),
    }
}
