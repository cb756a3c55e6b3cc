use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::errors::{AttendanceSystemError, Result};
use crate::models::{
    PaginationInfo,
    courses::{
        entities::{Course, CourseSummary},
        requests::{CourseListQuery, CreateCourseRequest},
        responses::CourseListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

// 未指定学分时的默认值
const DEFAULT_CREDITS: i32 = 3;

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(&self, req: CreateCourseRequest) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            code: Set(req.code),
            description: Set(req.description),
            credits: Set(req.credits.unwrap_or(DEFAULT_CREDITS)),
            department: Set(req.department),
            semester: Set(req.semester),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::from_db_err("创建课程失败", e))?;

        Ok(result.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, course_id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    pub(crate) async fn course_summaries_impl(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, CourseSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let result = Courses::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("批量查询课程失败: {e}")))?;

        Ok(result
            .into_iter()
            .map(|m| (m.id, m.into_summary()))
            .collect())
    }

    /// 分页列出课程
    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Courses::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Name.contains(&escaped))
                    .add(Column::Code.contains(&escaped)),
            );
        }

        if let Some(ref department) = query.department {
            select = select.filter(Column::Department.eq(department.as_str()));
        }

        select = select.order_by_asc(Column::Code);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            AttendanceSystemError::database_operation(format!("查询课程总数失败: {e}"))
        })?;

        let pages = paginator.num_pages().await.map_err(|e| {
            AttendanceSystemError::database_operation(format!("查询课程页数失败: {e}"))
        })?;

        let courses = paginator.fetch_page(page - 1).await.map_err(|e| {
            AttendanceSystemError::database_operation(format!("查询课程列表失败: {e}"))
        })?;

        Ok(CourseListResponse {
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
            items: courses.into_iter().map(|m| m.into_course()).collect(),
        })
    }

    /// 删除课程，被引用时返回 Conflict
    pub async fn delete_course_impl(&self, course_id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(course_id)
            .exec(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::from_db_err("删除课程失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
