use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::batches::{ActiveModel, Column, Entity as Batches};
use crate::errors::{AttendanceSystemError, Result};
use crate::models::{
    PaginationInfo,
    batches::{
        entities::{Batch, BatchSummary},
        requests::{BatchListQuery, CreateBatchRequest},
        responses::BatchListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建批次
    pub async fn create_batch_impl(&self, req: CreateBatchRequest) -> Result<Batch> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            year: Set(req.year),
            department: Set(req.department),
            semester: Set(req.semester),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::from_db_err("创建批次失败", e))?;

        Ok(result.into_batch())
    }

    /// 通过 ID 获取批次
    pub async fn get_batch_by_id_impl(&self, batch_id: i64) -> Result<Option<Batch>> {
        let result = Batches::find_by_id(batch_id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("查询批次失败: {e}")))?;

        Ok(result.map(|m| m.into_batch()))
    }

    pub(crate) async fn batch_summaries_impl(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, BatchSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let result = Batches::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("批量查询批次失败: {e}")))?;

        Ok(result
            .into_iter()
            .map(|m| (m.id, m.into_summary()))
            .collect())
    }

    /// 分页列出批次
    pub async fn list_batches_with_pagination_impl(
        &self,
        query: BatchListQuery,
    ) -> Result<BatchListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Batches::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Name.contains(&escaped))
                    .add(Column::Department.contains(&escaped)),
            );
        }

        if let Some(ref department) = query.department {
            select = select.filter(Column::Department.eq(department.as_str()));
        }

        select = select
            .order_by_desc(Column::Year)
            .order_by_asc(Column::Name);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            AttendanceSystemError::database_operation(format!("查询批次总数失败: {e}"))
        })?;

        let pages = paginator.num_pages().await.map_err(|e| {
            AttendanceSystemError::database_operation(format!("查询批次页数失败: {e}"))
        })?;

        let batches = paginator.fetch_page(page - 1).await.map_err(|e| {
            AttendanceSystemError::database_operation(format!("查询批次列表失败: {e}"))
        })?;

        Ok(BatchListResponse {
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
            items: batches.into_iter().map(|m| m.into_batch()).collect(),
        })
    }

    /// 删除批次，被引用时返回 Conflict
    pub async fn delete_batch_impl(&self, batch_id: i64) -> Result<bool> {
        let result = Batches::delete_by_id(batch_id)
            .exec(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::from_db_err("删除批次失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
