use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::BatchService;
use crate::models::ApiResponse;
use crate::models::batches::requests::{BatchListQuery, BatchQueryParams};
use crate::services::internal_error;

pub async fn list_batches(
    service: &BatchService,
    request: &HttpRequest,
    query: BatchQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let list_query = BatchListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        department: query.department,
        search: query.search,
    };

    match storage.list_batches_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Batch list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve batch list", e)),
    }
}
