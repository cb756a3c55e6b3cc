use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{entities::UserRole, requests::CreateUserRequest, responses::UserResponse},
};
use crate::services::internal_error;
use crate::utils::validate::{validate_email, validate_username};

pub async fn create_user(
    service: &UserService,
    request: &HttpRequest,
    mut user_data: CreateUserRequest,
) -> ActixResult<HttpResponse> {
    // 验证用户名
    if let Err(msg) = validate_username(&user_data.username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    // 验证邮箱
    if let Err(msg) = validate_email(&user_data.email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    user_data.roll_number = user_data
        .roll_number
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    // 学号和批次只对学生有意义
    if user_data.role != UserRole::Student
        && (user_data.roll_number.is_some() || user_data.batch_id.is_some())
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "roll_number and batch_id are only allowed for students",
        )));
    }

    let storage = service.get_storage(request);

    if let Some(batch_id) = user_data.batch_id {
        match storage.get_batch_by_id(batch_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::BatchNotFound,
                    "Batch not found",
                )));
            }
            Err(e) => return Ok(internal_error("Failed to check batch", e)),
        }
    }

    match storage.create_user(user_data).await {
        Ok(user) => {
            info!("User {} created with role {}", user.id, user.role);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(UserResponse { user }, "User created successfully")))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserAlreadyExists,
            "Username, email or roll number already exists",
        ))),
        // 批次在检查之后被删除
        Err(e) if e.is_reference() => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::BatchNotFound,
            "Batch not found",
        ))),
        Err(e) => Ok(internal_error("User creation failed", e)),
    }
}
