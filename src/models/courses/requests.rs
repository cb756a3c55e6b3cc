use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 课程查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub department: Option<String>,
    pub search: Option<String>,
}

// 创建课程请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CreateCourseRequest {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    // 缺省为 3
    pub credits: Option<i32>,
    pub department: String,
    pub semester: i32,
}

// 课程列表查询参数（用于存储层）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub department: Option<String>,
    pub search: Option<String>,
}
