use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::batches::entities::BatchSummary;
use crate::models::courses::entities::CourseSummary;
use crate::models::users::entities::UserSummary;

// 考勤状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "attendance.ts")]
pub enum AttendanceStatus {
    Present, // 出勤
    Absent,  // 缺勤
    Late,    // 迟到
}

impl AttendanceStatus {
    pub const PRESENT: &'static str = "present";
    pub const ABSENT: &'static str = "absent";
    pub const LATE: &'static str = "late";
}

impl<'de> Deserialize<'de> for AttendanceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<AttendanceStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的考勤状态: '{s}'. 支持的状态: present, absent, late"
            ))
        })
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "{}", AttendanceStatus::PRESENT),
            AttendanceStatus::Absent => write!(f, "{}", AttendanceStatus::ABSENT),
            AttendanceStatus::Late => write!(f, "{}", AttendanceStatus::LATE),
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            AttendanceStatus::PRESENT => Ok(AttendanceStatus::Present),
            AttendanceStatus::ABSENT => Ok(AttendanceStatus::Absent),
            AttendanceStatus::LATE => Ok(AttendanceStatus::Late),
            _ => Err(format!("Invalid attendance status: {s}")),
        }
    }
}

// 单个学生的考勤条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceEntry {
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub remark: Option<String>,
}

// 考勤记录，(batch_id, course_id, date) 全局唯一
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceRecord {
    pub id: i64,
    pub batch_id: i64,
    pub course_id: i64,
    // 记录者，更换教师后保持不变
    pub faculty_id: i64,
    pub date: NaiveDate,
    pub records: Vec<AttendanceEntry>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl AttendanceRecord {
    pub fn existing(&self) -> ExistingAttendance {
        ExistingAttendance {
            id: self.id,
            date: self.date,
            record_count: self.records.len(),
        }
    }
}

// 写入存储层的新考勤
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub batch_id: i64,
    pub course_id: i64,
    pub faculty_id: i64,
    pub date: NaiveDate,
    pub records: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceEntryDetail {
    pub student: UserSummary,
    pub status: AttendanceStatus,
    pub remark: Option<String>,
}

// 带关联信息的考勤记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceRecordDetail {
    pub id: i64,
    pub batch: BatchSummary,
    pub course: CourseSummary,
    pub faculty: UserSummary,
    pub date: NaiveDate,
    pub records: Vec<AttendanceEntryDetail>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 学生视角的考勤，只含本人条目
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct OwnAttendanceEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub remark: Option<String>,
    pub batch: BatchSummary,
    pub course: CourseSummary,
    pub faculty: UserSummary,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 冲突时返回的已有考勤
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct ExistingAttendance {
    pub id: i64,
    pub date: NaiveDate,
    #[ts(type = "number")]
    pub record_count: usize,
}

// 单个学生的出勤统计
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct StudentAttendanceStats {
    pub student: UserSummary,
    pub total_days: i64,
    pub present_count: i64,
    pub absent_count: i64,
    pub late_count: i64,
    pub percentage: f64,
}

impl StudentAttendanceStats {
    pub fn new(student: UserSummary) -> Self {
        Self {
            student,
            total_days: 0,
            present_count: 0,
            absent_count: 0,
            late_count: 0,
            percentage: 0.0,
        }
    }

    pub fn tally(&mut self, status: AttendanceStatus) {
        self.total_days += 1;
        match status {
            AttendanceStatus::Present => self.present_count += 1,
            AttendanceStatus::Absent => self.absent_count += 1,
            AttendanceStatus::Late => self.late_count += 1,
        }
    }

    /// 出勤率，保留两位小数，迟到不计入出勤
    pub fn finish(&mut self) {
        self.percentage = if self.total_days == 0 {
            0.0
        } else {
            let raw = self.present_count as f64 / self.total_days as f64 * 100.0;
            (raw * 100.0).round() / 100.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> UserSummary {
        UserSummary {
            id: 1,
            username: "student1".to_string(),
            profile_name: None,
            email: "s1@example.com".to_string(),
            roll_number: Some("R001".to_string()),
        }
    }

    #[test]
    fn test_percentage_three_present_one_absent() {
        let mut stats = StudentAttendanceStats::new(student());
        for status in [
            AttendanceStatus::Present,
            AttendanceStatus::Present,
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
        ] {
            stats.tally(status);
        }
        stats.finish();
        assert_eq!(stats.total_days, 4);
        assert_eq!(stats.absent_count, 1);
        assert_eq!(stats.percentage, 75.0);
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals_and_ignores_late() {
        let mut stats = StudentAttendanceStats::new(student());
        stats.tally(AttendanceStatus::Present);
        stats.tally(AttendanceStatus::Late);
        stats.tally(AttendanceStatus::Absent);
        stats.finish();
        assert_eq!(stats.late_count, 1);
        assert_eq!(stats.percentage, 33.33);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "late".parse::<AttendanceStatus>(),
            Ok(AttendanceStatus::Late)
        );
        assert!("excused".parse::<AttendanceStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::Present).unwrap(),
            "\"present\""
        );
    }
}
