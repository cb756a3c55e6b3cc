use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::{AttendanceService, populate_record};
use crate::models::attendance::entities::{ExistingAttendance, NewAttendance};
use crate::models::attendance::requests::MarkAttendanceRequest;
use crate::models::attendance::responses::AttendanceConflictResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::assignments::find_assignment_for_faculty;
use crate::services::{current_user, internal_error};
use crate::storage::Storage;
use crate::utils::validate::{positive_id, validate_attendance_request};

/// 检查每条记录引用的学生是否存在且角色为学生
async fn check_students(
    storage: &std::sync::Arc<dyn Storage>,
    data: &MarkAttendanceRequest,
) -> crate::errors::Result<Vec<String>> {
    let referenced: Vec<(usize, i64)> = data
        .records
        .as_deref()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(index, input)| positive_id(input.student_id.as_ref()).map(|id| (index, id)))
        .collect();
    if referenced.is_empty() {
        return Ok(Vec::new());
    }

    let mut ids: Vec<i64> = referenced.iter().map(|(_, id)| *id).collect();
    ids.sort_unstable();
    ids.dedup();
    let users: HashMap<i64, UserRole> = storage
        .get_users_by_ids(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.role))
        .collect();

    Ok(referenced
        .into_iter()
        .filter_map(|(index, id)| match users.get(&id) {
            None => Some(format!("Record {index}: student {id} not found")),
            Some(UserRole::Student) => None,
            Some(_) => Some(format!("Record {index}: user {id} is not a student")),
        })
        .collect())
}

fn conflict(existing: ExistingAttendance) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error(
        ErrorCode::AttendanceAlreadyExists,
        AttendanceConflictResponse {
            existing_attendance: existing,
        },
        "Attendance already recorded for this batch, course and date",
    ))
}

/// 写入时外键失败：引用的学生、批次或课程在检查之后被删除
async fn stale_reference(
    storage: &std::sync::Arc<dyn Storage>,
    data: &MarkAttendanceRequest,
) -> HttpResponse {
    match check_students(storage, data).await {
        Ok(errors) if !errors.is_empty() => {
            HttpResponse::BadRequest().json(ApiResponse::validation_failed(errors))
        }
        Ok(_) => HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotFound,
            "Batch, course or student no longer exists",
        )),
        Err(e) => internal_error("Failed to check students", e),
    }
}

pub async fn mark_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    data: MarkAttendanceRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    // 先收集结构错误，再追加学生检查的错误，一次性返回
    let validated = validate_attendance_request(&data);
    let student_errors = match check_students(&storage, &data).await {
        Ok(errors) => errors,
        Err(e) => return Ok(internal_error("Failed to check students", e)),
    };
    let valid = match validated {
        Ok(valid) if student_errors.is_empty() => valid,
        Ok(_) => {
            return Ok(
                HttpResponse::BadRequest().json(ApiResponse::validation_failed(student_errors))
            );
        }
        Err(mut errors) => {
            errors.extend(student_errors);
            return Ok(HttpResponse::BadRequest().json(ApiResponse::validation_failed(errors)));
        }
    };

    match find_assignment_for_faculty(&storage, valid.batch_id, valid.course_id, user.id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!(
                "User {} is not assigned to batch {} course {}, attendance rejected",
                user.id, valid.batch_id, valid.course_id
            );
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::NotAssigned,
                "You are not assigned to this batch and course",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to check assignment", e)),
    }

    let existing = match storage
        .find_attendance(valid.batch_id, valid.course_id, valid.date)
        .await
    {
        Ok(existing) => existing,
        Err(e) => return Ok(internal_error("Failed to check existing attendance", e)),
    };

    if let Some(existing) = existing {
        if !service.allow_update() {
            return Ok(conflict(existing.existing()));
        }

        let updated = match storage
            .replace_attendance_entries(existing.id, valid.records)
            .await
        {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::AttendanceNotFound,
                    "Attendance record not found",
                )));
            }
            Err(e) if e.is_reference() => return Ok(stale_reference(&storage, &data).await),
            Err(e) => return Ok(internal_error("Attendance update failed", e)),
        };

        info!(
            "Attendance {} for batch {} course {} on {} updated by {}",
            updated.id, updated.batch_id, updated.course_id, updated.date, user.id
        );

        return match populate_record(&storage, updated).await {
            Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                detail,
                "Attendance updated successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to load attendance details", e)),
        };
    }

    let created = match storage
        .create_attendance(NewAttendance {
            batch_id: valid.batch_id,
            course_id: valid.course_id,
            faculty_id: user.id,
            date: valid.date,
            records: valid.records,
        })
        .await
    {
        Ok(created) => created,
        Err(e) if e.is_conflict() => {
            // 并发提交由唯一索引拦截，返回胜出的记录
            warn!(
                "Concurrent attendance submission for batch {} course {} on {}",
                valid.batch_id, valid.course_id, valid.date
            );
            return match storage
                .find_attendance(valid.batch_id, valid.course_id, valid.date)
                .await
            {
                Ok(Some(winner)) => Ok(conflict(winner.existing())),
                Ok(None) => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::AttendanceAlreadyExists,
                    "Attendance already recorded for this batch, course and date",
                ))),
                Err(e) => Ok(internal_error("Failed to read existing attendance", e)),
            };
        }
        Err(e) if e.is_reference() => {
            warn!(
                "Attendance for batch {} course {} on {} references a removed row",
                valid.batch_id, valid.course_id, valid.date
            );
            return Ok(stale_reference(&storage, &data).await);
        }
        Err(e) => return Ok(internal_error("Attendance creation failed", e)),
    };

    info!(
        "Attendance {} for batch {} course {} on {} recorded by {} ({} entries)",
        created.id,
        created.batch_id,
        created.course_id,
        created.date,
        user.id,
        created.records.len()
    );

    match populate_record(&storage, created).await {
        Ok(detail) => Ok(HttpResponse::Created().json(ApiResponse::success(
            detail,
            "Attendance recorded successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to load attendance details", e)),
    }
}
