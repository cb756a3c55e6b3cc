use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, populate_assignment};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

pub async fn get_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "Assignment not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to get assignment", e)),
    };

    match populate_assignment(&storage, assignment).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Assignment retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to load assignment details", e)),
    }
}
