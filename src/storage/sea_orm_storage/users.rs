use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{AttendanceSystemError, Result};
use crate::models::{
    PaginationInfo,
    users::{
        entities::{User, UserRole, UserStatus, UserSummary, roll_number_order},
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            role: Set(req.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            profile_name: Set(req.profile_name),
            roll_number: Set(req.roll_number),
            batch_id: Set(req.batch_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::from_db_err("创建用户失败", e))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 批量获取用户
    pub async fn get_users_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Users::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("批量查询用户失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user()).collect())
    }

    /// 批量获取用户摘要
    pub(crate) async fn user_summaries_impl(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, UserSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let result = Users::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("批量查询用户失败: {e}")))?;

        Ok(result
            .into_iter()
            .map(|m| (m.id, m.into_summary()))
            .collect())
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Users::find();

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Username.contains(&escaped))
                    .add(Column::Email.contains(&escaped))
                    .add(Column::ProfileName.contains(&escaped))
                    .add(Column::RollNumber.contains(&escaped)),
            );
        }

        // 角色筛选
        if let Some(ref role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        // 状态筛选
        if let Some(ref status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        // 批次筛选
        if let Some(batch_id) = query.batch_id {
            select = select.filter(Column::BatchId.eq(batch_id));
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            AttendanceSystemError::database_operation(format!("查询用户总数失败: {e}"))
        })?;

        let pages = paginator.num_pages().await.map_err(|e| {
            AttendanceSystemError::database_operation(format!("查询用户页数失败: {e}"))
        })?;

        let users = paginator.fetch_page(page - 1).await.map_err(|e| {
            AttendanceSystemError::database_operation(format!("查询用户列表失败: {e}"))
        })?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 列出批次内的学生，按学号排序，无学号的排在最后
    pub async fn list_batch_students_impl(&self, batch_id: i64) -> Result<Vec<User>> {
        let result = Users::find()
            .filter(Column::BatchId.eq(batch_id))
            .filter(Column::Role.eq(UserRole::STUDENT))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                AttendanceSystemError::database_operation(format!("查询批次学生失败: {e}"))
            })?;

        let mut students: Vec<User> = result.into_iter().map(|m| m.into_user()).collect();
        students.sort_by(|a, b| {
            roll_number_order(
                (a.roll_number.as_deref(), a.id),
                (b.roll_number.as_deref(), b.id),
            )
        });

        Ok(students)
    }

    /// 删除用户，被分配或考勤引用时返回 Conflict
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::from_db_err("删除用户失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 统计用户数量
    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find().count(&self.db).await.map_err(|e| {
            AttendanceSystemError::database_operation(format!("统计用户数量失败: {e}"))
        })?;

        Ok(count)
    }
}
