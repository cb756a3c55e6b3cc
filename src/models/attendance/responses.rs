use super::entities::{
    AttendanceRecordDetail, ExistingAttendance, OwnAttendanceEntry, StudentAttendanceStats,
};
use crate::models::batches::entities::BatchSummary;
use crate::models::courses::entities::CourseSummary;
use serde::Serialize;
use ts_rs::TS;

// 考勤列表响应，日期倒序
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceListResponse {
    pub items: Vec<AttendanceRecordDetail>,
}

// 学生本人考勤响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct OwnAttendanceResponse {
    pub items: Vec<OwnAttendanceEntry>,
}

// 考勤冲突响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceConflictResponse {
    pub existing_attendance: ExistingAttendance,
}

// 出勤统计响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceStatsResponse {
    pub batch: BatchSummary,
    pub course: CourseSummary,
    // 该批次课程的考勤记录数
    pub total_days: i64,
    pub students: Vec<StudentAttendanceStats>,
}
