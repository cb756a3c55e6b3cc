use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use super::AttendanceService;
use crate::models::attendance::entities::{AttendanceStatus, StudentAttendanceStats};
use crate::models::attendance::requests::AttendanceListQuery;
use crate::models::attendance::responses::AttendanceStatsResponse;
use crate::models::users::entities::{UserRole, roll_number_order};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::assignments::find_assignment_for_faculty;
use crate::services::{current_user, internal_error};

/// 按学生统计某批次课程的出勤情况
pub async fn get_attendance_stats(
    service: &AttendanceService,
    request: &HttpRequest,
    batch_id: i64,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    // 教师只能查看自己负责的批次课程
    if user.role != UserRole::Admin {
        match find_assignment_for_faculty(&storage, batch_id, course_id, user.id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(
                    "User {} is not assigned to batch {} course {}, statistics rejected",
                    user.id, batch_id, course_id
                );
                return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                    ErrorCode::NotAssigned,
                    "You are not assigned to this batch and course",
                )));
            }
            Err(e) => return Ok(internal_error("Failed to check assignment", e)),
        }
    }

    let records = match storage
        .list_attendance(AttendanceListQuery {
            batch_id: Some(batch_id),
            course_id: Some(course_id),
            ..Default::default()
        })
        .await
    {
        Ok(records) => records,
        Err(e) => return Ok(internal_error("Failed to list attendance", e)),
    };

    if records.is_empty() {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AttendanceStatsEmpty,
            "No attendance records found for this batch and course",
        )));
    }

    let mut statuses: HashMap<i64, Vec<AttendanceStatus>> = HashMap::new();
    for entry in records.iter().flat_map(|r| r.records.iter()) {
        statuses.entry(entry.student_id).or_default().push(entry.status);
    }
    let student_ids: Vec<i64> = statuses.keys().copied().collect();

    let index = match storage
        .load_summaries(&[batch_id], &[course_id], &student_ids)
        .await
    {
        Ok(index) => index,
        Err(e) => return Ok(internal_error("Failed to load statistics details", e)),
    };

    let (Some(batch), Some(course)) = (
        index.batches.get(&batch_id).cloned(),
        index.courses.get(&course_id).cloned(),
    ) else {
        return Ok(internal_error(
            "Failed to load statistics details",
            "batch or course missing",
        ));
    };

    let mut students: Vec<StudentAttendanceStats> = statuses
        .into_iter()
        .filter_map(|(student_id, list)| {
            let mut stats = StudentAttendanceStats::new(index.users.get(&student_id)?.clone());
            for status in list {
                stats.tally(status);
            }
            stats.finish();
            Some(stats)
        })
        .collect();
    students.sort_by(|a, b| {
        roll_number_order(
            (a.student.roll_number.as_deref(), a.student.id),
            (b.student.roll_number.as_deref(), b.student.id),
        )
    });

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AttendanceStatsResponse {
            batch,
            course,
            total_days: records.len() as i64,
            students,
        },
        "Attendance statistics retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::{AttendanceEntry, NewAttendance};
    use crate::services::test_support::{
        body_json, request_as, seed_batch, seed_course, seed_user, storage,
    };
    use actix_web::http::StatusCode;
    use chrono::NaiveDate;

    #[actix_web::test]
    async fn test_three_present_one_absent_is_seventy_five() {
        let storage = storage().await;
        let batch = seed_batch(&storage, "B1").await;
        let course = seed_course(&storage, "C1", "Course One").await;
        let f1 = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let f2 = seed_user(&storage, "faculty2", UserRole::Teacher, None, None).await;
        let s1 = seed_user(&storage, "student1", UserRole::Student, None, Some(batch.id)).await;
        let s2 = seed_user(&storage, "student2", UserRole::Student, Some("R002"), Some(batch.id)).await;
        storage.create_assignment(batch.id, course.id, f1.id).await.unwrap();

        let service = AttendanceService::new_lazy();
        let resp = service
            .get_attendance_stats(&request_as(&storage, &f1), batch.id, course.id)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let statuses = [
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Present,
            AttendanceStatus::Present,
        ];
        for (day, status) in (1..).zip(statuses) {
            storage
                .create_attendance(NewAttendance {
                    batch_id: batch.id,
                    course_id: course.id,
                    faculty_id: f1.id,
                    date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
                    records: vec![
                        AttendanceEntry {
                            student_id: s1.id,
                            status,
                            remark: None,
                        },
                        AttendanceEntry {
                            student_id: s2.id,
                            status: AttendanceStatus::Late,
                            remark: None,
                        },
                    ],
                })
                .await
                .unwrap();
        }

        let resp = service
            .get_attendance_stats(&request_as(&storage, &f1), batch.id, course.id)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["total_days"], 4);
        let students = body["data"]["students"].as_array().unwrap();
        // 有学号的排在前面
        assert_eq!(students[0]["student"]["id"].as_i64(), Some(s2.id));
        assert_eq!(students[0]["late_count"], 4);
        assert_eq!(students[0]["percentage"], 0.0);
        assert_eq!(students[1]["present_count"], 3);
        assert_eq!(students[1]["percentage"], 75.0);

        let resp = service
            .get_attendance_stats(&request_as(&storage, &f2), batch.id, course.id)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
