use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AttendanceService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

pub async fn delete_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    record_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_attendance(record_id).await {
        Ok(true) => {
            info!("Attendance record {} deleted", record_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Attendance record deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AttendanceNotFound,
            "Attendance record not found",
        ))),
        Err(e) => Ok(internal_error("Attendance deletion failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::{AttendanceEntry, AttendanceStatus, NewAttendance};
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{
        body_json, request_as, seed_batch, seed_course, seed_user, storage,
    };
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_delete_then_missing() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin", UserRole::Admin, None, None).await;
        let faculty = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let batch = seed_batch(&storage, "B1").await;
        let course = seed_course(&storage, "C1", "Course One").await;
        let student =
            seed_user(&storage, "student1", UserRole::Student, Some("R001"), Some(batch.id)).await;
        let date = chrono::NaiveDate::from_ymd_opt(2025, 11, 9).unwrap();
        let record = storage
            .create_attendance(NewAttendance {
                batch_id: batch.id,
                course_id: course.id,
                faculty_id: faculty.id,
                date,
                records: vec![AttendanceEntry {
                    student_id: student.id,
                    status: AttendanceStatus::Absent,
                    remark: None,
                }],
            })
            .await
            .unwrap();

        let service = AttendanceService::new_lazy();
        let req = request_as(&storage, &admin);

        let resp = service.delete_attendance(&req, record.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(storage.get_attendance_by_id(record.id).await.unwrap().is_none());
        assert!(
            storage
                .find_attendance(batch.id, course.id, date)
                .await
                .unwrap()
                .is_none()
        );

        let resp = service.delete_attendance(&req, record.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::AttendanceNotFound as i32);

        // 删除后同一天可以重新记录
        storage
            .create_attendance(NewAttendance {
                batch_id: batch.id,
                course_id: course.id,
                faculty_id: faculty.id,
                date,
                records: vec![],
            })
            .await
            .unwrap();
    }
}
