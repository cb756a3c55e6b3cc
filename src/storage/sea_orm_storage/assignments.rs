use super::SeaOrmStorage;
use crate::entity::batch_course_assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::{AttendanceSystemError, Result};
use crate::models::assignments::{entities::Assignment, requests::AssignmentListQuery};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建分配，唯一索引冲突时返回 Conflict
    pub async fn create_assignment_impl(
        &self,
        batch_id: i64,
        course_id: i64,
        faculty_id: i64,
    ) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            batch_id: Set(batch_id),
            course_id: Set(course_id),
            faculty_id: Set(faculty_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::from_db_err("创建分配失败", e))?;

        Ok(result.into_assignment())
    }

    pub async fn get_assignment_by_id_impl(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("查询分配失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    pub async fn get_assignment_by_pair_impl(
        &self,
        batch_id: i64,
        course_id: i64,
    ) -> Result<Option<Assignment>> {
        let result = Assignments::find()
            .filter(Column::BatchId.eq(batch_id))
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("查询分配失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 更换负责教师，不影响已有考勤记录
    pub async fn update_assignment_faculty_impl(
        &self,
        assignment_id: i64,
        faculty_id: i64,
    ) -> Result<Option<Assignment>> {
        let existing = Assignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("查询分配失败: {e}")))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.faculty_id = Set(faculty_id);
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::from_db_err("更新分配失败", e))?;

        Ok(Some(updated.into_assignment()))
    }

    /// 按条件列出分配，创建时间倒序
    pub async fn list_assignments_impl(&self, query: AssignmentListQuery) -> Result<Vec<Assignment>> {
        let mut select = Assignments::find();

        if let Some(batch_id) = query.batch_id {
            select = select.filter(Column::BatchId.eq(batch_id));
        }
        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }
        if let Some(faculty_id) = query.faculty_id {
            select = select.filter(Column::FacultyId.eq(faculty_id));
        }

        let result = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("查询分配列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 删除分配，不级联删除考勤记录
    pub async fn delete_assignment_impl(&self, assignment_id: i64) -> Result<bool> {
        let result = Assignments::delete_by_id(assignment_id)
            .exec(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::from_db_err("删除分配失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
