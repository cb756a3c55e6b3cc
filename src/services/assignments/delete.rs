use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssignmentService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

/// 删除分配，已有考勤记录不受影响
pub async fn delete_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_assignment(assignment_id).await {
        Ok(true) => {
            info!("Assignment {} deleted", assignment_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Assignment deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        ))),
        Err(e) => Ok(internal_error("Assignment deletion failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::{AttendanceEntry, AttendanceStatus, NewAttendance};
    use crate::models::attendance::requests::AttendanceListQuery;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{
        body_json, request_as, seed_batch, seed_course, seed_user, storage,
    };
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_delete_keeps_recorded_attendance() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin", UserRole::Admin, None, None).await;
        let faculty = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let batch = seed_batch(&storage, "B1").await;
        let course = seed_course(&storage, "C1", "Course One").await;
        let student =
            seed_user(&storage, "student1", UserRole::Student, Some("R001"), Some(batch.id)).await;
        let assignment = storage
            .create_assignment(batch.id, course.id, faculty.id)
            .await
            .unwrap();
        let record = storage
            .create_attendance(NewAttendance {
                batch_id: batch.id,
                course_id: course.id,
                faculty_id: faculty.id,
                date: chrono::NaiveDate::from_ymd_opt(2025, 11, 9).unwrap(),
                records: vec![AttendanceEntry {
                    student_id: student.id,
                    status: AttendanceStatus::Present,
                    remark: None,
                }],
            })
            .await
            .unwrap();

        let req = request_as(&storage, &admin);
        let service = AssignmentService::new_lazy();

        let resp = service.delete_assignment(&req, assignment.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            storage
                .get_assignment_by_pair(batch.id, course.id)
                .await
                .unwrap()
                .is_none()
        );

        let kept = storage.get_attendance_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(kept.faculty_id, faculty.id);
        assert_eq!(kept.records.len(), 1);
        let all = storage
            .list_attendance(AttendanceListQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);

        let resp = service.delete_assignment(&req, assignment.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(resp).await["code"],
            ErrorCode::AssignmentNotFound as i32
        );
    }
}
