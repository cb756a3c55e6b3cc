use std::collections::HashSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::attendance::entities::{AttendanceEntry, AttendanceStatus};
use crate::models::attendance::requests::MarkAttendanceRequest;
use crate::models::assignments::requests::CreateAssignmentRequest;
use crate::utils::date::normalize_date;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    // 用户名长度校验：5 <= x <= 16
    if username.len() < 5 || username.len() > 16 {
        return Err("Username length must be between 5 and 16 characters");
    }
    // 用户名格式校验：只能包含字母、数字、下划线或连字符
    if !USERNAME_RE.is_match(username) {
        return Err("Username must contain only letters, numbers, underscores or hyphens");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

fn check_id(field: &str, value: Option<i64>, errors: &mut Vec<String>) -> i64 {
    match value {
        None => {
            errors.push(format!("{field} is required"));
            0
        }
        Some(id) if id <= 0 => {
            errors.push(format!("Invalid {field} format"));
            0
        }
        Some(id) => id,
    }
}

/// 请求体中的原始 ID：只接受正整数
enum RawId {
    Missing,
    Invalid,
    Valid(i64),
}

fn parse_raw_id(value: Option<&Value>) -> RawId {
    match value {
        None | Some(Value::Null) => RawId::Missing,
        Some(v) => match v.as_i64() {
            Some(id) if id > 0 => RawId::Valid(id),
            _ => RawId::Invalid,
        },
    }
}

/// 解析正整数 ID，类型不对或非正数时返回 None
pub fn positive_id(value: Option<&Value>) -> Option<i64> {
    match parse_raw_id(value) {
        RawId::Valid(id) => Some(id),
        _ => None,
    }
}

fn check_raw_id(field: &str, value: Option<&Value>, errors: &mut Vec<String>) -> i64 {
    check_id(
        field,
        match parse_raw_id(value) {
            RawId::Missing => None,
            RawId::Invalid => Some(0),
            RawId::Valid(id) => Some(id),
        },
        errors,
    )
}

/// 校验通过的分配请求
#[derive(Debug, Clone, PartialEq)]
pub struct ValidAssignment {
    pub batch_id: i64,
    pub course_id: i64,
    pub faculty_id: i64,
}

/// 校验分配请求，收集所有错误
pub fn validate_assignment_request(
    req: &CreateAssignmentRequest,
) -> Result<ValidAssignment, Vec<String>> {
    let mut errors = Vec::new();
    let batch_id = check_id("batch_id", req.batch_id, &mut errors);
    let course_id = check_id("course_id", req.course_id, &mut errors);
    let faculty_id = check_id("faculty_id", req.faculty_id, &mut errors);

    if errors.is_empty() {
        Ok(ValidAssignment {
            batch_id,
            course_id,
            faculty_id,
        })
    } else {
        Err(errors)
    }
}

/// 校验通过的考勤提交，日期已规范化
#[derive(Debug, Clone, PartialEq)]
pub struct ValidAttendance {
    pub batch_id: i64,
    pub course_id: i64,
    pub date: NaiveDate,
    pub records: Vec<AttendanceEntry>,
}

/// 校验考勤提交，收集所有错误而不是遇到第一个就返回
///
/// 学生是否存在以及角色是否正确需要查库，由服务层追加。
pub fn validate_attendance_request(
    req: &MarkAttendanceRequest,
) -> Result<ValidAttendance, Vec<String>> {
    let mut errors = Vec::new();
    let batch_id = check_raw_id("batch_id", req.batch_id.as_ref(), &mut errors);
    let course_id = check_raw_id("course_id", req.course_id.as_ref(), &mut errors);

    let date = match req.date.as_deref() {
        None => {
            errors.push("date is required".to_string());
            None
        }
        Some(raw) => match normalize_date(raw) {
            Ok(date) => Some(date),
            Err(e) => {
                errors.push(format!("Invalid date: {}", e.message()));
                None
            }
        },
    };

    let mut records = Vec::new();
    match req.records.as_deref() {
        None => errors.push("Records must be an array".to_string()),
        Some([]) => errors.push("Records array cannot be empty".to_string()),
        Some(inputs) => {
            let mut seen = HashSet::new();
            for (index, input) in inputs.iter().enumerate() {
                let student_id = match parse_raw_id(input.student_id.as_ref()) {
                    RawId::Missing => {
                        errors.push(format!("Record {index}: student_id is required"));
                        None
                    }
                    RawId::Invalid => {
                        errors.push(format!("Record {index}: invalid student_id format"));
                        None
                    }
                    RawId::Valid(id) => {
                        if !seen.insert(id) {
                            errors.push(format!("Record {index}: duplicate student_id {id}"));
                        }
                        Some(id)
                    }
                };

                let status = match input.status.as_ref() {
                    None | Some(Value::Null) => {
                        errors.push(format!("Record {index}: status is required"));
                        None
                    }
                    Some(Value::String(raw)) if raw.is_empty() => {
                        errors.push(format!("Record {index}: status is required"));
                        None
                    }
                    Some(raw) => match raw.as_str().map(str::parse::<AttendanceStatus>) {
                        Some(Ok(status)) => Some(status),
                        _ => {
                            errors.push(format!("Record {index}: invalid status value"));
                            None
                        }
                    },
                };

                if let (Some(student_id), Some(status)) = (student_id, status) {
                    records.push(AttendanceEntry {
                        student_id,
                        status,
                        remark: input.remark.clone().filter(|r| !r.trim().is_empty()),
                    });
                }
            }
        }
    }

    match date {
        Some(date) if errors.is_empty() => Ok(ValidAttendance {
            batch_id,
            course_id,
            date,
            records,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::requests::AttendanceEntryInput;
    use serde_json::json;

    fn entry(student_id: Option<i64>, status: Option<&str>) -> AttendanceEntryInput {
        AttendanceEntryInput {
            student_id: student_id.map(Value::from),
            status: status.map(Value::from),
            remark: None,
        }
    }

    fn request(records: Option<Vec<AttendanceEntryInput>>) -> MarkAttendanceRequest {
        MarkAttendanceRequest {
            batch_id: Some(json!(1)),
            course_id: Some(json!(2)),
            date: Some("2025-11-09T23:45:00Z".to_string()),
            records,
        }
    }

    #[test]
    fn test_username_and_email() {
        assert!(validate_username("teacher_01").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username("bad name!").is_err());
        assert!(validate_email("s1@college.edu").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_valid_submission_normalizes_date() {
        let valid = validate_attendance_request(&request(Some(vec![
            entry(Some(10), Some("present")),
            entry(Some(11), Some("late")),
        ])))
        .unwrap();
        assert_eq!(valid.date, NaiveDate::from_ymd_opt(2025, 11, 9).unwrap());
        assert_eq!(valid.records.len(), 2);
        assert_eq!(valid.records[1].status, AttendanceStatus::Late);
    }

    #[test]
    fn test_empty_records_rejected() {
        let errors = validate_attendance_request(&request(Some(vec![]))).unwrap_err();
        assert_eq!(errors, vec!["Records array cannot be empty".to_string()]);

        let errors = validate_attendance_request(&request(None)).unwrap_err();
        assert_eq!(errors, vec!["Records must be an array".to_string()]);
    }

    #[test]
    fn test_collects_one_message_per_faulty_entry() {
        let errors = validate_attendance_request(&request(Some(vec![
            entry(Some(10), Some("present")),
            entry(None, Some("absent")),
            entry(Some(12), Some("excused")),
            entry(Some(10), None),
        ])))
        .unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Record 1: student_id is required".to_string(),
                "Record 2: invalid status value".to_string(),
                "Record 3: duplicate student_id 10".to_string(),
                "Record 3: status is required".to_string(),
            ]
        );
    }

    #[test]
    fn test_header_fields_collected_together() {
        let req = MarkAttendanceRequest {
            batch_id: None,
            course_id: Some(json!(-1)),
            date: Some("2025-13-01".to_string()),
            records: Some(vec![entry(Some(1), Some("present"))]),
        };
        let errors = validate_attendance_request(&req).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], "batch_id is required");
        assert_eq!(errors[1], "Invalid course_id format");
        assert!(errors[2].starts_with("Invalid date"));
    }

    #[test]
    fn test_wrongly_typed_ids_reported_per_record() {
        let req: MarkAttendanceRequest = serde_json::from_value(json!({
            "batch_id": "B1",
            "course_id": 2,
            "date": "2025-11-09",
            "records": [
                {"student_id": "S1", "status": "present"},
                {"student_id": 5, "status": "excused"},
                {"student_id": 6.5, "status": 1},
                {"student_id": null, "status": "absent"}
            ]
        }))
        .unwrap();

        let errors = validate_attendance_request(&req).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Invalid batch_id format".to_string(),
                "Record 0: invalid student_id format".to_string(),
                "Record 1: invalid status value".to_string(),
                "Record 2: invalid student_id format".to_string(),
                "Record 2: invalid status value".to_string(),
                "Record 3: student_id is required".to_string(),
            ]
        );
    }

    #[test]
    fn test_positive_id() {
        assert_eq!(positive_id(Some(&json!(7))), Some(7));
        assert_eq!(positive_id(Some(&json!("7"))), None);
        assert_eq!(positive_id(Some(&json!(0))), None);
        assert_eq!(positive_id(None), None);
    }

    #[test]
    fn test_assignment_request_collects_all_fields() {
        let errors = validate_assignment_request(&CreateAssignmentRequest {
            batch_id: None,
            course_id: Some(0),
            faculty_id: None,
        })
        .unwrap_err();
        assert_eq!(
            errors,
            vec![
                "batch_id is required".to_string(),
                "Invalid course_id format".to_string(),
                "faculty_id is required".to_string(),
            ]
        );
    }
}
