use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, populate_assignment};
use crate::models::assignments::requests::ReassignFacultyRequest;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

/// 更换负责教师；已有考勤记录保留原记录者
pub async fn reassign_faculty(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
    data: ReassignFacultyRequest,
) -> ActixResult<HttpResponse> {
    let faculty_id = match data.faculty_id {
        Some(id) if id > 0 => id,
        Some(_) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::validation_failed(vec![
                "Invalid faculty_id format".to_string(),
            ])));
        }
        None => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::validation_failed(vec![
                "faculty_id is required".to_string(),
            ])));
        }
    };

    let storage = service.get_storage(request);

    match storage.get_user_by_id(faculty_id).await {
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

    let updated = match storage
        .update_assignment_faculty(assignment_id, faculty_id)
        .await
    {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "Assignment not found",
            )));
        }
        Err(e) if e.is_reference() => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "Faculty not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to reassign faculty", e)),
    };

    info!(
        "Assignment {} reassigned to faculty {}",
        updated.id, updated.faculty_id
    );

    match populate_assignment(&storage, updated).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Faculty reassigned successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to load assignment details", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{
        body_json, request_as, seed_batch, seed_course, seed_user, storage,
    };
    use actix_web::http::StatusCode;

    fn to(faculty_id: Option<i64>) -> ReassignFacultyRequest {
        ReassignFacultyRequest { faculty_id }
    }

    #[actix_web::test]
    async fn test_reassign_faculty_outcomes() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin", UserRole::Admin, None, None).await;
        let f1 = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let f2 = seed_user(&storage, "faculty2", UserRole::Teacher, None, None).await;
        let student = seed_user(&storage, "student1", UserRole::Student, None, None).await;
        let batch = seed_batch(&storage, "B1").await;
        let course = seed_course(&storage, "C1", "Course One").await;
        let assignment = storage
            .create_assignment(batch.id, course.id, f1.id)
            .await
            .unwrap();
        let req = request_as(&storage, &admin);
        let service = AssignmentService::new_lazy();

        let resp = service
            .reassign_faculty(&req, assignment.id + 100, to(Some(f2.id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(resp).await["code"],
            ErrorCode::AssignmentNotFound as i32
        );

        let resp = service
            .reassign_faculty(&req, assignment.id, to(Some(student.id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await["code"],
            ErrorCode::FacultyNotTeacher as i32
        );

        let resp = service
            .reassign_faculty(&req, assignment.id, to(Some(9999)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["code"], ErrorCode::UserNotFound as i32);

        for bad in [None, Some(0)] {
            let resp = service
                .reassign_faculty(&req, assignment.id, to(bad))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        // 失败的请求不改变负责教师
        let current = storage.get_assignment_by_id(assignment.id).await.unwrap().unwrap();
        assert_eq!(current.faculty_id, f1.id);

        let resp = service
            .reassign_faculty(&req, assignment.id, to(Some(f2.id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["id"].as_i64(), Some(assignment.id));
        assert_eq!(body["data"]["faculty"]["username"], "faculty2");
        assert_eq!(
            storage
                .get_assignment_by_pair(batch.id, course.id)
                .await
                .unwrap()
                .map(|a| a.faculty_id),
            Some(f2.id)
        );
    }
}
