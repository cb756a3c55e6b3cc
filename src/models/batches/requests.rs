use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 批次查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "batch.ts")]
pub struct BatchQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub department: Option<String>,
    pub search: Option<String>,
}

// 创建批次请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "batch.ts")]
pub struct CreateBatchRequest {
    pub name: String,
    pub year: i32,
    pub department: String,
    pub semester: i32,
}

// 批次列表查询参数（用于存储层）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "batch.ts")]
pub struct BatchListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub department: Option<String>,
    pub search: Option<String>,
}
