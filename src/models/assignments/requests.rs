use crate::models::common::pagination::deserialize_optional_string_to_i64;
use serde::Deserialize;
use ts_rs::TS;

// 创建分配请求，字段缺失时统一收集校验错误
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct CreateAssignmentRequest {
    pub batch_id: Option<i64>,
    pub course_id: Option<i64>,
    pub faculty_id: Option<i64>,
}

// 更换教师请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct ReassignFacultyRequest {
    pub faculty_id: Option<i64>,
}

// 分配列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub batch_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub faculty_id: Option<i64>,
}
