//! 考勤台账
//!
//! 每个 (批次, 课程, 日期) 最多一条考勤记录。写入和教师查询前都要先确认
//! 调用者是该批次课程的负责教师。重复提交默认返回 409，
//! 开启 `attendance.allow_update` 后改为原地覆盖。

pub mod delete;
pub mod list;
pub mod mark;
pub mod stats;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::{AttendanceSystemError, Result};
use crate::models::attendance::entities::{
    AttendanceEntryDetail, AttendanceRecord, AttendanceRecordDetail,
};
use crate::models::attendance::requests::{
    AttendanceListParams, AttendanceRangeParams, MarkAttendanceRequest, OwnAttendanceParams,
};
use crate::storage::{Storage, SummaryIndex};

pub struct AttendanceService {
    storage: Option<Arc<dyn Storage>>,
    // 未设置时读取全局配置
    allow_update: Option<bool>,
}

impl AttendanceService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            allow_update: None,
        }
    }

    /// 显式指定重复提交时是否覆盖
    pub fn with_update_mode(mut self, allow_update: bool) -> Self {
        self.allow_update = Some(allow_update);
        self
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn allow_update(&self) -> bool {
        self.allow_update
            .unwrap_or_else(|| AppConfig::get().attendance.allow_update)
    }

    // 提交考勤（负责教师）
    pub async fn mark_attendance(
        &self,
        request: &HttpRequest,
        data: MarkAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        mark::mark_attendance(self, request, data).await
    }

    // 负责教师查询某批次课程的考勤
    pub async fn list_batch_course_attendance(
        &self,
        request: &HttpRequest,
        batch_id: i64,
        course_id: i64,
        params: AttendanceRangeParams,
    ) -> ActixResult<HttpResponse> {
        list::list_batch_course_attendance(self, request, batch_id, course_id, params).await
    }

    // 学生查询本人考勤
    pub async fn list_own_attendance(
        &self,
        request: &HttpRequest,
        params: OwnAttendanceParams,
    ) -> ActixResult<HttpResponse> {
        list::list_own_attendance(self, request, params).await
    }

    // 管理员查询全部考勤
    pub async fn list_all_attendance(
        &self,
        request: &HttpRequest,
        params: AttendanceListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_all_attendance(self, request, params).await
    }

    pub async fn delete_attendance(
        &self,
        request: &HttpRequest,
        record_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_attendance(self, request, record_id).await
    }

    // 出勤统计
    pub async fn get_attendance_stats(
        &self,
        request: &HttpRequest,
        batch_id: i64,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        stats::get_attendance_stats(self, request, batch_id, course_id).await
    }
}

fn sorted_unique(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// 批量加载考勤记录涉及的批次、课程、教师和学生摘要
pub(crate) async fn load_record_summaries(
    storage: &Arc<dyn Storage>,
    records: &[AttendanceRecord],
    with_students: bool,
) -> Result<SummaryIndex> {
    let batch_ids = sorted_unique(records.iter().map(|r| r.batch_id).collect());
    let course_ids = sorted_unique(records.iter().map(|r| r.course_id).collect());
    let mut user_ids: Vec<i64> = records.iter().map(|r| r.faculty_id).collect();
    if with_students {
        user_ids.extend(
            records
                .iter()
                .flat_map(|r| r.records.iter().map(|e| e.student_id)),
        );
    }
    storage
        .load_summaries(&batch_ids, &course_ids, &sorted_unique(user_ids))
        .await
}

fn dangling(record_id: i64) -> AttendanceSystemError {
    AttendanceSystemError::database_operation(format!("考勤记录 {record_id} 的关联数据缺失"))
}

/// 为考勤记录填充关联摘要，条目保持提交顺序
pub(crate) async fn populate_records(
    storage: &Arc<dyn Storage>,
    records: Vec<AttendanceRecord>,
) -> Result<Vec<AttendanceRecordDetail>> {
    let index = load_record_summaries(storage, &records, true).await?;

    records
        .into_iter()
        .map(|record| {
            let entries = record
                .records
                .into_iter()
                .map(|entry| {
                    Ok(AttendanceEntryDetail {
                        student: index
                            .users
                            .get(&entry.student_id)
                            .cloned()
                            .ok_or_else(|| dangling(record.id))?,
                        status: entry.status,
                        remark: entry.remark,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(AttendanceRecordDetail {
                id: record.id,
                batch: index
                    .batches
                    .get(&record.batch_id)
                    .cloned()
                    .ok_or_else(|| dangling(record.id))?,
                course: index
                    .courses
                    .get(&record.course_id)
                    .cloned()
                    .ok_or_else(|| dangling(record.id))?,
                faculty: index
                    .users
                    .get(&record.faculty_id)
                    .cloned()
                    .ok_or_else(|| dangling(record.id))?,
                date: record.date,
                records: entries,
                created_at: record.created_at,
                updated_at: record.updated_at,
            })
        })
        .collect()
}

pub(crate) async fn populate_record(
    storage: &Arc<dyn Storage>,
    record: AttendanceRecord,
) -> Result<AttendanceRecordDetail> {
    let id = record.id;
    populate_records(storage, vec![record])
        .await?
        .pop()
        .ok_or_else(|| dangling(id))
}
