use super::entities::Batch;
use crate::models::common::PaginationInfo;
use crate::models::users::entities::UserSummary;
use serde::Serialize;
use ts_rs::TS;

// 批次列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "batch.ts")]
pub struct BatchListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Batch>,
}

// 批次学生列表响应，按学号排序
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "batch.ts")]
pub struct BatchStudentsResponse {
    pub batch: Batch,
    pub students: Vec<UserSummary>,
}
