use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{
    assignments::{entities::Assignment, requests::AssignmentListQuery},
    attendance::{
        entities::{AttendanceEntry, AttendanceRecord, NewAttendance},
        requests::AttendanceListQuery,
    },
    batches::{
        entities::{Batch, BatchSummary},
        requests::{BatchListQuery, CreateBatchRequest},
        responses::BatchListResponse,
    },
    courses::{
        entities::{Course, CourseSummary},
        requests::{CourseListQuery, CreateCourseRequest},
        responses::CourseListResponse,
    },
    users::{
        entities::{User, UserSummary},
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 批量加载的关联摘要，用于组装带关联信息的响应
#[derive(Debug, Default, Clone)]
pub struct SummaryIndex {
    pub batches: HashMap<i64, BatchSummary>,
    pub courses: HashMap<i64, CourseSummary>,
    pub users: HashMap<i64, UserSummary>,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 批量获取用户
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;
    // 列出批次内学生，按学号排序
    async fn list_batch_students(&self, batch_id: i64) -> Result<Vec<User>>;

    /// 批次管理方法
    async fn create_batch(&self, batch: CreateBatchRequest) -> Result<Batch>;
    async fn get_batch_by_id(&self, batch_id: i64) -> Result<Option<Batch>>;
    async fn list_batches_with_pagination(
        &self,
        query: BatchListQuery,
    ) -> Result<BatchListResponse>;
    async fn delete_batch(&self, batch_id: i64) -> Result<bool>;

    /// 课程管理方法
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse>;
    async fn delete_course(&self, course_id: i64) -> Result<bool>;

    /// 批次-课程分配方法
    // 创建分配，(batch_id, course_id) 重复时返回 Conflict
    async fn create_assignment(
        &self,
        batch_id: i64,
        course_id: i64,
        faculty_id: i64,
    ) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>>;
    // 通过批次和课程查找分配
    async fn get_assignment_by_pair(
        &self,
        batch_id: i64,
        course_id: i64,
    ) -> Result<Option<Assignment>>;
    // 更换负责教师
    async fn update_assignment_faculty(
        &self,
        assignment_id: i64,
        faculty_id: i64,
    ) -> Result<Option<Assignment>>;
    // 按条件列出分配，创建时间倒序
    async fn list_assignments(&self, query: AssignmentListQuery) -> Result<Vec<Assignment>>;
    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool>;

    /// 考勤方法
    // 通过 (batch_id, course_id, date) 查找考勤
    async fn find_attendance(
        &self,
        batch_id: i64,
        course_id: i64,
        date: chrono::NaiveDate,
    ) -> Result<Option<AttendanceRecord>>;
    // 在一个事务中写入考勤记录及其条目，键重复时返回 Conflict
    async fn create_attendance(&self, attendance: NewAttendance) -> Result<AttendanceRecord>;
    // 在一个事务中替换考勤条目
    async fn replace_attendance_entries(
        &self,
        record_id: i64,
        records: Vec<AttendanceEntry>,
    ) -> Result<Option<AttendanceRecord>>;
    async fn get_attendance_by_id(&self, record_id: i64) -> Result<Option<AttendanceRecord>>;
    // 按条件列出考勤，日期倒序
    async fn list_attendance(&self, query: AttendanceListQuery) -> Result<Vec<AttendanceRecord>>;
    async fn delete_attendance(&self, record_id: i64) -> Result<bool>;

    /// 批量加载批次、课程和用户摘要
    async fn load_summaries(
        &self,
        batch_ids: &[i64],
        course_ids: &[i64],
        user_ids: &[i64],
    ) -> Result<SummaryIndex>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
