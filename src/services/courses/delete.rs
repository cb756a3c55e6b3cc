use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

pub async fn delete_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_course(course_id).await {
        Ok(true) => {
            info!("Course {} deleted", course_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Course deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Course not found",
        ))),
        Err(e) if e.is_reference() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::CourseInUse,
            "Course is referenced by assignments or attendance records",
        ))),
        Err(e) => Ok(internal_error("Course deletion failed", e)),
    }
}
