use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::batches::entities::BatchSummary;
use crate::models::courses::entities::CourseSummary;
use crate::models::users::entities::UserSummary;

// 批次-课程分配，(batch_id, course_id) 全局唯一
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub batch_id: i64,
    pub course_id: i64,
    // 唯一有权为该批次课程记录考勤的教师
    pub faculty_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Assignment {
    pub fn existing(&self) -> ExistingAssignment {
        ExistingAssignment {
            id: self.id,
            faculty_id: self.faculty_id,
            created_at: self.created_at,
        }
    }
}

// 带关联信息的分配
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentDetail {
    pub id: i64,
    pub batch: BatchSummary,
    pub course: CourseSummary,
    pub faculty: UserSummary,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 冲突时返回的已有分配
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct ExistingAssignment {
    pub id: i64,
    pub faculty_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
