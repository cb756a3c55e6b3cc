use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "batch.ts")]
pub struct Batch {
    // 批次ID
    pub id: i64,
    // 批次名称，全局唯一
    pub name: String,
    // 入学年份
    pub year: i32,
    // 所属院系
    pub department: String,
    // 当前学期
    pub semester: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Batch {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            id: self.id,
            name: self.name.clone(),
            year: self.year,
            department: self.department.clone(),
            semester: self.semester,
        }
    }
}

// 批次摘要
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "batch.ts")]
pub struct BatchSummary {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub department: String,
    pub semester: i32,
}
