//! 批次-课程分配
//!
//! 每个 (批次, 课程) 只能有一名负责教师，只有该教师可以为其记录考勤。
//! 唯一性由存储层的复合唯一索引保证，这里的预检查只用于给出友好的冲突信息。

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod reassign;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{AttendanceSystemError, Result};
use crate::models::assignments::entities::{Assignment, AssignmentDetail};
use crate::models::assignments::requests::{
    AssignmentListQuery, CreateAssignmentRequest, ReassignFacultyRequest,
};
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
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

    // 创建分配（管理员）
    pub async fn create_assignment(
        &self,
        request: &HttpRequest,
        data: CreateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assignment(self, request, data).await
    }

    // 更换负责教师（管理员）
    pub async fn reassign_faculty(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        data: ReassignFacultyRequest,
    ) -> ActixResult<HttpResponse> {
        reassign::reassign_faculty(self, request, assignment_id, data).await
    }

    pub async fn get_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_assignment(self, request, assignment_id).await
    }

    // 当前教师的分配
    pub async fn list_my_assignments(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_my_assignments(self, request).await
    }

    // 全部分配（管理员）
    pub async fn list_all_assignments(
        &self,
        request: &HttpRequest,
        query: AssignmentListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_all_assignments(self, request, query).await
    }

    pub async fn delete_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_assignment(self, request, assignment_id).await
    }
}

/// 查找教师在该批次课程上的分配，不是负责教师时返回 None
pub(crate) async fn find_assignment_for_faculty(
    storage: &Arc<dyn Storage>,
    batch_id: i64,
    course_id: i64,
    faculty_id: i64,
) -> Result<Option<Assignment>> {
    Ok(storage
        .get_assignment_by_pair(batch_id, course_id)
        .await?
        .filter(|a| a.faculty_id == faculty_id))
}

/// 为分配填充批次、课程和教师摘要
pub(crate) async fn populate_assignments(
    storage: &Arc<dyn Storage>,
    assignments: Vec<Assignment>,
) -> Result<Vec<AssignmentDetail>> {
    let mut batch_ids: Vec<i64> = assignments.iter().map(|a| a.batch_id).collect();
    let mut course_ids: Vec<i64> = assignments.iter().map(|a| a.course_id).collect();
    let mut user_ids: Vec<i64> = assignments.iter().map(|a| a.faculty_id).collect();
    for ids in [&mut batch_ids, &mut course_ids, &mut user_ids] {
        ids.sort_unstable();
        ids.dedup();
    }

    let index = storage
        .load_summaries(&batch_ids, &course_ids, &user_ids)
        .await?;

    assignments
        .into_iter()
        .map(|a| {
            let missing =
                || AttendanceSystemError::database_operation(format!("分配 {} 的关联数据缺失", a.id));
            Ok(AssignmentDetail {
                id: a.id,
                batch: index.batches.get(&a.batch_id).cloned().ok_or_else(missing)?,
                course: index.courses.get(&a.course_id).cloned().ok_or_else(missing)?,
                faculty: index.users.get(&a.faculty_id).cloned().ok_or_else(missing)?,
                created_at: a.created_at,
                updated_at: a.updated_at,
            })
        })
        .collect()
}

pub(crate) async fn populate_assignment(
    storage: &Arc<dyn Storage>,
    assignment: Assignment,
) -> Result<AssignmentDetail> {
    populate_assignments(storage, vec![assignment])
        .await?
        .pop()
        .ok_or_else(|| AttendanceSystemError::database_operation("分配数据缺失"))
}
