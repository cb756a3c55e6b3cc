use super::entities::{AssignmentDetail, ExistingAssignment};
use serde::Serialize;
use ts_rs::TS;

// 分配列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<AssignmentDetail>,
}

// 分配冲突响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentConflictResponse {
    pub existing_assignment: ExistingAssignment,
}
