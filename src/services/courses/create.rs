use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::models::courses::requests::CreateCourseRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

fn validate(course: &CreateCourseRequest) -> Vec<String> {
    let mut errors = Vec::new();
    if course.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if course.code.trim().is_empty() {
        errors.push("code is required".to_string());
    }
    if course.department.trim().is_empty() {
        errors.push("department is required".to_string());
    }
    if let Some(credits) = course.credits
        && !(0..=30).contains(&credits)
    {
        errors.push("credits must be between 0 and 30".to_string());
    }
    if course.semester < 1 {
        errors.push("semester must be at least 1".to_string());
    }
    errors
}

pub async fn create_course(
    service: &CourseService,
    request: &HttpRequest,
    mut course_data: CreateCourseRequest,
) -> ActixResult<HttpResponse> {
    let errors = validate(&course_data);
    if !errors.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::validation_failed(errors)));
    }
    // 课程代码统一大写
    course_data.code = course_data.code.trim().to_uppercase();

    let storage = service.get_storage(request);

    match storage.create_course(course_data).await {
        Ok(course) => {
            info!("Course {} ({}) created", course.id, course.code);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(course, "Course created successfully")))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::CourseAlreadyExists,
            "Course code already exists",
        ))),
        Err(e) => Ok(internal_error("Course creation failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{body_json, request_as, seed_user, storage};

    fn course(code: &str) -> CreateCourseRequest {
        CreateCourseRequest {
            name: "Operating Systems".to_string(),
            code: code.to_string(),
            description: None,
            credits: None,
            department: "CSE".to_string(),
            semester: 3,
        }
    }

    #[actix_web::test]
    async fn test_create_course_defaults_and_conflict() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin", UserRole::Admin, None, None).await;
        let req = request_as(&storage, &admin);
        let service = CourseService::new_lazy();

        let resp = service.create_course(&req, course("cs301")).await.unwrap();
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["code"], "CS301");
        assert_eq!(body["data"]["credits"], 3);

        let resp = service.create_course(&req, course("CS301")).await.unwrap();
        assert_eq!(resp.status(), actix_web::http::StatusCode::CONFLICT);
    }
}
