use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::{AssignmentService, populate_assignment};
use crate::models::assignments::requests::CreateAssignmentRequest;
use crate::models::assignments::responses::AssignmentConflictResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;
use crate::utils::validate::validate_assignment_request;

pub async fn create_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    data: CreateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let valid = match validate_assignment_request(&data) {
        Ok(valid) => valid,
        Err(errors) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::validation_failed(errors)));
        }
    };

    let storage = service.get_storage(request);

    match storage.get_batch_by_id(valid.batch_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::BatchNotFound,
                "Batch not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to check batch", e)),
    }

    match storage.get_course_by_id(valid.course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to check course", e)),
    }

    match storage.get_user_by_id(valid.faculty_id).await {
        Ok(Some(user)) if user.role == UserRole::Teacher => {}
        Ok(Some(_)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FacultyNotTeacher,
                "Faculty must be a user with role teacher",
            )));
        }
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "Faculty not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to check faculty", e)),
    }

    // 预检查，给出已有分配的信息
    match storage
        .get_assignment_by_pair(valid.batch_id, valid.course_id)
        .await
    {
        Ok(Some(existing)) => return Ok(conflict(existing.existing())),
        Ok(None) => {}
        Err(e) => return Ok(internal_error("Failed to check existing assignment", e)),
    }

    let created = match storage
        .create_assignment(valid.batch_id, valid.course_id, valid.faculty_id)
        .await
    {
        Ok(created) => created,
        Err(e) if e.is_conflict() => {
            // 并发创建时唯一索引兜底，重新读取胜出的分配
            warn!(
                "Concurrent assignment creation for batch {} course {}",
                valid.batch_id, valid.course_id
            );
            return match storage
                .get_assignment_by_pair(valid.batch_id, valid.course_id)
                .await
            {
                Ok(Some(existing)) => Ok(conflict(existing.existing())),
                Ok(None) => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::AssignmentAlreadyExists,
                    "Assignment already exists for this batch and course",
                ))),
                Err(e) => Ok(internal_error("Failed to read existing assignment", e)),
            };
        }
        Err(e) if e.is_reference() => {
            // 批次、课程或教师在检查之后被删除
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::NotFound,
                "Batch, course or faculty no longer exists",
            )));
        }
        Err(e) => return Ok(internal_error("Assignment creation failed", e)),
    };

    info!(
        "Assignment {} created: batch {} course {} faculty {}",
        created.id, created.batch_id, created.course_id, created.faculty_id
    );

    match populate_assignment(&storage, created).await {
        Ok(detail) => Ok(HttpResponse::Created().json(ApiResponse::success(
            detail,
            "Assignment created successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to load assignment details", e)),
    }
}

fn conflict(
    existing: crate::models::assignments::entities::ExistingAssignment,
) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error(
        ErrorCode::AssignmentAlreadyExists,
        AssignmentConflictResponse {
            existing_assignment: existing,
        },
        "Assignment already exists for this batch and course",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{
        body_json, request_as, seed_batch, seed_course, seed_user, storage,
    };
    use actix_web::http::StatusCode;

    fn body(batch_id: i64, course_id: i64, faculty_id: i64) -> CreateAssignmentRequest {
        CreateAssignmentRequest {
            batch_id: Some(batch_id),
            course_id: Some(course_id),
            faculty_id: Some(faculty_id),
        }
    }

    #[actix_web::test]
    async fn test_second_assignment_for_pair_conflicts_regardless_of_faculty() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin", UserRole::Admin, None, None).await;
        let f1 = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let f2 = seed_user(&storage, "faculty2", UserRole::Teacher, None, None).await;
        let batch = seed_batch(&storage, "B1").await;
        let course = seed_course(&storage, "C1", "Course One").await;
        let req = request_as(&storage, &admin);
        let service = AssignmentService::new_lazy();

        let resp = service
            .create_assignment(&req, body(batch.id, course.id, f1.id))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        assert_eq!(created["data"]["faculty"]["username"], "faculty1");
        assert_eq!(created["data"]["batch"]["name"], "B1");
        let assignment_id = created["data"]["id"].as_i64().unwrap();

        for faculty in [&f2, &f1] {
            let resp = service
                .create_assignment(&req, body(batch.id, course.id, faculty.id))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::CONFLICT);
            let conflict = body_json(resp).await;
            assert_eq!(
                conflict["data"]["existing_assignment"]["id"].as_i64(),
                Some(assignment_id)
            );
            assert_eq!(
                conflict["data"]["existing_assignment"]["faculty_id"].as_i64(),
                Some(f1.id)
            );
        }
    }

    #[actix_web::test]
    async fn test_missing_entities_and_wrong_role() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin", UserRole::Admin, None, None).await;
        let student = seed_user(&storage, "student1", UserRole::Student, None, None).await;
        let f1 = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let batch = seed_batch(&storage, "B1").await;
        let course = seed_course(&storage, "C1", "Course One").await;
        let req = request_as(&storage, &admin);
        let service = AssignmentService::new_lazy();

        let resp = service
            .create_assignment(&req, body(999, course.id, f1.id))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = service
            .create_assignment(&req, body(batch.id, course.id, 999))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = service
            .create_assignment(&req, body(batch.id, course.id, student.id))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = service
            .create_assignment(
                &req,
                CreateAssignmentRequest {
                    batch_id: None,
                    course_id: Some(-4),
                    faculty_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let errors = body_json(resp).await;
        assert_eq!(errors["data"].as_array().map(|a| a.len()), Some(3));
    }
}
