use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use super::{AttendanceService, load_record_summaries, populate_records};
use crate::models::attendance::entities::OwnAttendanceEntry;
use crate::models::attendance::requests::{
    AttendanceListParams, AttendanceListQuery, AttendanceRangeParams, OwnAttendanceParams,
};
use crate::models::attendance::responses::{AttendanceListResponse, OwnAttendanceResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::assignments::find_assignment_for_faculty;
use crate::services::{current_user, internal_error};
use crate::utils::date::normalize_range;

fn invalid_range(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::AttendanceInvalidDate,
        format!("Invalid date range: {message}"),
    ))
}

/// 负责教师查询某批次课程的考勤，日期倒序
pub async fn list_batch_course_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    batch_id: i64,
    course_id: i64,
    params: AttendanceRangeParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let (start_date, end_date) =
        match normalize_range(params.start_date.as_deref(), params.end_date.as_deref()) {
            Ok(range) => range,
            Err(e) => return Ok(invalid_range(e.message())),
        };

    let storage = service.get_storage(request);

    match find_assignment_for_faculty(&storage, batch_id, course_id, user.id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!(
                "User {} is not assigned to batch {} course {}, attendance read rejected",
                user.id, batch_id, course_id
            );
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::NotAssigned,
                "You are not assigned to this batch and course",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to check assignment", e)),
    }

    let query = AttendanceListQuery {
        batch_id: Some(batch_id),
        course_id: Some(course_id),
        start_date,
        end_date,
        ..Default::default()
    };

    let records = match storage.list_attendance(query).await {
        Ok(records) => records,
        Err(e) => return Ok(internal_error("Failed to list attendance", e)),
    };

    match populate_records(&storage, records).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AttendanceListResponse { items },
            "Attendance retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to load attendance details", e)),
    }
}

/// 学生本人的考勤，只投影本人条目
pub async fn list_own_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    params: OwnAttendanceParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let (start_date, end_date) =
        match normalize_range(params.start_date.as_deref(), params.end_date.as_deref()) {
            Ok(range) => range,
            Err(e) => return Ok(invalid_range(e.message())),
        };

    let storage = service.get_storage(request);

    let query = AttendanceListQuery {
        course_id: params.course_id,
        student_id: Some(user.id),
        start_date,
        end_date,
        ..Default::default()
    };

    let records = match storage.list_attendance(query).await {
        Ok(records) => records,
        Err(e) => return Ok(internal_error("Failed to list attendance", e)),
    };

    // 不加载其他学生的摘要
    let index = match load_record_summaries(&storage, &records, false).await {
        Ok(index) => index,
        Err(e) => return Ok(internal_error("Failed to load attendance details", e)),
    };

    let items: Vec<OwnAttendanceEntry> = records
        .into_iter()
        .filter_map(|record| {
            let entry = record.records.iter().find(|e| e.student_id == user.id)?;
            Some(OwnAttendanceEntry {
                id: record.id,
                date: record.date,
                status: entry.status,
                remark: entry.remark.clone(),
                batch: index.batches.get(&record.batch_id)?.clone(),
                course: index.courses.get(&record.course_id)?.clone(),
                faculty: index.users.get(&record.faculty_id)?.clone(),
                created_at: record.created_at,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        OwnAttendanceResponse { items },
        "Attendance retrieved successfully",
    )))
}

/// 管理员按条件查询全部考勤
pub async fn list_all_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    params: AttendanceListParams,
) -> ActixResult<HttpResponse> {
    let (start_date, end_date) =
        match normalize_range(params.start_date.as_deref(), params.end_date.as_deref()) {
            Ok(range) => range,
            Err(e) => return Ok(invalid_range(e.message())),
        };

    let storage = service.get_storage(request);

    let query = AttendanceListQuery {
        batch_id: params.batch_id,
        course_id: params.course_id,
        faculty_id: params.faculty_id,
        student_id: None,
        start_date,
        end_date,
    };

    let records = match storage.list_attendance(query).await {
        Ok(records) => records,
        Err(e) => return Ok(internal_error("Failed to list attendance", e)),
    };

    match populate_records(&storage, records).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AttendanceListResponse { items },
            "Attendance retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to load attendance details", e)),
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
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    fn present(student_id: i64) -> AttendanceEntry {
        AttendanceEntry {
            student_id,
            status: AttendanceStatus::Present,
            remark: None,
        }
    }

    #[actix_web::test]
    async fn test_faculty_list_range_and_order() {
        let storage = storage().await;
        let batch = seed_batch(&storage, "B1").await;
        let course = seed_course(&storage, "C1", "Course One").await;
        let f1 = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let f2 = seed_user(&storage, "faculty2", UserRole::Teacher, None, None).await;
        let s1 = seed_user(&storage, "student1", UserRole::Student, Some("R001"), Some(batch.id)).await;
        storage.create_assignment(batch.id, course.id, f1.id).await.unwrap();

        for d in [3, 9, 5] {
            storage
                .create_attendance(NewAttendance {
                    batch_id: batch.id,
                    course_id: course.id,
                    faculty_id: f1.id,
                    date: day(d),
                    records: vec![present(s1.id)],
                })
                .await
                .unwrap();
        }

        let service = AttendanceService::new_lazy();
        let resp = service
            .list_batch_course_attendance(
                &request_as(&storage, &f1),
                batch.id,
                course.id,
                AttendanceRangeParams {
                    start_date: Some("2025-11-04".to_string()),
                    end_date: Some("2025-11-09T12:00:00Z".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        let dates: Vec<&str> = body["data"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r["date"].as_str())
            .collect();
        assert_eq!(dates, vec!["2025-11-09", "2025-11-05"]);

        let resp = service
            .list_batch_course_attendance(
                &request_as(&storage, &f2),
                batch.id,
                course.id,
                AttendanceRangeParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = service
            .list_batch_course_attendance(
                &request_as(&storage, &f1),
                batch.id,
                course.id,
                AttendanceRangeParams {
                    start_date: Some("2025-11-09".to_string()),
                    end_date: Some("2025-11-01".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_student_sees_only_own_entries() {
        let storage = storage().await;
        let batch = seed_batch(&storage, "B1").await;
        let c1 = seed_course(&storage, "C1", "Course One").await;
        let c2 = seed_course(&storage, "C2", "Course Two").await;
        let f1 = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let s1 = seed_user(&storage, "student1", UserRole::Student, Some("R001"), Some(batch.id)).await;
        let s2 = seed_user(&storage, "student2", UserRole::Student, Some("R002"), Some(batch.id)).await;

        storage
            .create_attendance(NewAttendance {
                batch_id: batch.id,
                course_id: c1.id,
                faculty_id: f1.id,
                date: day(9),
                records: vec![
                    AttendanceEntry {
                        student_id: s2.id,
                        status: AttendanceStatus::Absent,
                        remark: Some("sick leave".to_string()),
                    },
                    present(s1.id),
                ],
            })
            .await
            .unwrap();
        storage
            .create_attendance(NewAttendance {
                batch_id: batch.id,
                course_id: c2.id,
                faculty_id: f1.id,
                date: day(10),
                records: vec![present(s2.id)],
            })
            .await
            .unwrap();

        let service = AttendanceService::new_lazy();
        let resp = service
            .list_own_attendance(&request_as(&storage, &s1), OwnAttendanceParams::default())
            .await
            .unwrap();
        let body = body_json(resp).await;
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["status"], "present");
        assert_eq!(items[0]["course"]["code"], "C1");
        let text = body.to_string();
        assert!(!text.contains("sick leave"));
        assert!(!text.contains("student2"));

        let resp = service
            .list_own_attendance(
                &request_as(&storage, &s2),
                OwnAttendanceParams {
                    course_id: Some(c2.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["data"]["items"].as_array().map(|a| a.len()), Some(1));
    }

    #[actix_web::test]
    async fn test_admin_list_filters() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin", UserRole::Admin, None, None).await;
        let b1 = seed_batch(&storage, "B1").await;
        let b2 = seed_batch(&storage, "B2").await;
        let c1 = seed_course(&storage, "C1", "Course One").await;
        let c2 = seed_course(&storage, "C2", "Course Two").await;
        let f1 = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let f2 = seed_user(&storage, "faculty2", UserRole::Teacher, None, None).await;
        let s1 = seed_user(&storage, "student1", UserRole::Student, Some("R001"), Some(b1.id)).await;
        let s2 = seed_user(&storage, "student2", UserRole::Student, Some("R002"), Some(b2.id)).await;

        for (batch_id, course_id, faculty_id, d, student_id) in [
            (b1.id, c1.id, f1.id, 3, s1.id),
            (b1.id, c2.id, f2.id, 9, s1.id),
            (b2.id, c1.id, f1.id, 5, s2.id),
        ] {
            storage
                .create_attendance(NewAttendance {
                    batch_id,
                    course_id,
                    faculty_id,
                    date: day(d),
                    records: vec![present(student_id)],
                })
                .await
                .unwrap();
        }

        let service = AttendanceService::new_lazy();
        let req = request_as(&storage, &admin);
        let dates = |body: &serde_json::Value| -> Vec<String> {
            body["data"]["items"]
                .as_array()
                .unwrap()
                .iter()
                .filter_map(|r| r["date"].as_str().map(str::to_string))
                .collect()
        };

        let cases = [
            (AttendanceListParams::default(), vec!["2025-11-09", "2025-11-05", "2025-11-03"]),
            (
                AttendanceListParams {
                    batch_id: Some(b1.id),
                    ..Default::default()
                },
                vec!["2025-11-09", "2025-11-03"],
            ),
            (
                AttendanceListParams {
                    course_id: Some(c1.id),
                    ..Default::default()
                },
                vec!["2025-11-05", "2025-11-03"],
            ),
            (
                AttendanceListParams {
                    faculty_id: Some(f2.id),
                    ..Default::default()
                },
                vec!["2025-11-09"],
            ),
            (
                AttendanceListParams {
                    start_date: Some("2025-11-04".to_string()),
                    end_date: Some("2025-11-09".to_string()),
                    ..Default::default()
                },
                vec!["2025-11-09", "2025-11-05"],
            ),
            (
                AttendanceListParams {
                    batch_id: Some(b1.id),
                    course_id: Some(c1.id),
                    ..Default::default()
                },
                vec!["2025-11-03"],
            ),
        ];

        for (params, expected) in cases {
            let label = format!("{params:?}");
            let resp = service.list_all_attendance(&req, params).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{label}");
            let body = body_json(resp).await;
            assert_eq!(dates(&body), expected, "{label}");
        }

        let resp = service
            .list_all_attendance(
                &req,
                AttendanceListParams {
                    faculty_id: Some(f2.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["data"]["items"][0]["faculty"]["username"], "faculty2");
        assert_eq!(body["data"]["items"][0]["course"]["code"], "C2");

        let resp = service
            .list_all_attendance(
                &req,
                AttendanceListParams {
                    start_date: Some("2025-11-09".to_string()),
                    end_date: Some("2025-11-01".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::AttendanceInvalidDate as i32);
    }
}
