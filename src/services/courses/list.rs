use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::ApiResponse;
use crate::models::courses::requests::{CourseListQuery, CourseQueryParams};
use crate::services::internal_error;

pub async fn list_courses(
    service: &CourseService,
    request: &HttpRequest,
    query: CourseQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let list_query = CourseListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        department: query.department,
        search: query.search,
    };

    match storage.list_courses_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Course list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve course list", e)),
    }
}
