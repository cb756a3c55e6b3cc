use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Course {
    // 课程ID
    pub id: i64,
    // 课程名称
    pub name: String,
    // 课程代码，全局唯一
    pub code: String,
    // 课程描述
    pub description: Option<String>,
    // 学分
    pub credits: i32,
    pub department: String,
    pub semester: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Course {
    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id,
            name: self.name.clone(),
            code: self.code.clone(),
            credits: self.credits,
        }
    }
}

// 课程摘要
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseSummary {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub credits: i32,
}
