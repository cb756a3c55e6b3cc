pub mod assignments;
pub mod attendance;
pub mod batches;
pub mod courses;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

pub use assignments::AssignmentService;
pub use attendance::AttendanceService;
pub use batches::BatchService;
pub use courses::CourseService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse};
use tracing::error;

use crate::middlewares::RequireJWT;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};

// 存储层异常统一返回 500，并记录日志
pub(crate) fn internal_error(context: &str, err: impl std::fmt::Display) -> HttpResponse {
    error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("{context}: {err}"),
    ))
}

// 取出 RequireJWT 放入的当前用户
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user",
        ))
    })
}
