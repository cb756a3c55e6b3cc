use crate::models::common::pagination::deserialize_optional_string_to_i64;
use serde::Deserialize;
use serde_json::Value;
use ts_rs::TS;

// 单条考勤输入
//
// 学生 ID 和状态保持原始 JSON 值，类型不对时逐条报告而不是整个请求体解析失败
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceEntryInput {
    #[ts(type = "number | null")]
    pub student_id: Option<Value>,
    #[ts(type = "string | null")]
    pub status: Option<Value>,
    pub remark: Option<String>,
}

// 提交考勤请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct MarkAttendanceRequest {
    #[ts(type = "number | null")]
    pub batch_id: Option<Value>,
    #[ts(type = "number | null")]
    pub course_id: Option<Value>,
    // YYYY-MM-DD 或 RFC 3339 时间戳
    pub date: Option<String>,
    pub records: Option<Vec<AttendanceEntryInput>>,
}

// 日期范围查询参数（闭区间）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceRangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// 学生查询本人考勤参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct OwnAttendanceParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub course_id: Option<i64>,
}

// 管理员查询考勤参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceListParams {
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub batch_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub faculty_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// 考勤列表查询参数（用于存储层），日期已规范化
#[derive(Debug, Clone, Default)]
pub struct AttendanceListQuery {
    pub batch_id: Option<i64>,
    pub course_id: Option<i64>,
    pub faculty_id: Option<i64>,
    pub student_id: Option<i64>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}
