//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod attendance;
mod batches;
mod courses;
mod users;

use crate::config::AppConfig;
use crate::errors::{AttendanceSystemError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(storage)
    }

    /// 使用已有连接创建存储并运行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// 单连接的内存 SQLite，用于测试
    pub async fn connect_memory() -> Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let db = Database::connect(opt).await.map_err(|e| {
            AttendanceSystemError::database_connection(format!("内存数据库连接失败: {e}"))
        })?;

        Self::from_connection(db).await
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| AttendanceSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        if !in_memory {
            opt = opt
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("wal_autocheckpoint", "1000");
        }

        // 内存数据库每个连接相互独立，只能使用单连接
        let max_connections = if in_memory {
            1
        } else {
            config.database.pool_size
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .connect_with(opt)
            .await
            .map_err(|e| AttendanceSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt).await.map_err(|e| {
            AttendanceSystemError::database_connection(format!("无法连接到数据库: {e}"))
        })
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(AttendanceSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite:, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    assignments::{entities::Assignment, requests::AssignmentListQuery},
    attendance::{
        entities::{AttendanceEntry, AttendanceRecord, NewAttendance},
        requests::AttendanceListQuery,
    },
    batches::{
        entities::Batch,
        requests::{BatchListQuery, CreateBatchRequest},
        responses::BatchListResponse,
    },
    courses::{
        entities::Course,
        requests::{CourseListQuery, CreateCourseRequest},
        responses::CourseListResponse,
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::{Storage, SummaryIndex};
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn list_batch_students(&self, batch_id: i64) -> Result<Vec<User>> {
        self.list_batch_students_impl(batch_id).await
    }

    // 批次模块
    async fn create_batch(&self, batch: CreateBatchRequest) -> Result<Batch> {
        self.create_batch_impl(batch).await
    }

    async fn get_batch_by_id(&self, batch_id: i64) -> Result<Option<Batch>> {
        self.get_batch_by_id_impl(batch_id).await
    }

    async fn list_batches_with_pagination(
        &self,
        query: BatchListQuery,
    ) -> Result<BatchListResponse> {
        self.list_batches_with_pagination_impl(query).await
    }

    async fn delete_batch(&self, batch_id: i64) -> Result<bool> {
        self.delete_batch_impl(batch_id).await
    }

    // 课程模块
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(course_id).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn delete_course(&self, course_id: i64) -> Result<bool> {
        self.delete_course_impl(course_id).await
    }

    // 分配模块
    async fn create_assignment(
        &self,
        batch_id: i64,
        course_id: i64,
        faculty_id: i64,
    ) -> Result<Assignment> {
        self.create_assignment_impl(batch_id, course_id, faculty_id)
            .await
    }

    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(assignment_id).await
    }

    async fn get_assignment_by_pair(
        &self,
        batch_id: i64,
        course_id: i64,
    ) -> Result<Option<Assignment>> {
        self.get_assignment_by_pair_impl(batch_id, course_id).await
    }

    async fn update_assignment_faculty(
        &self,
        assignment_id: i64,
        faculty_id: i64,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_faculty_impl(assignment_id, faculty_id)
            .await
    }

    async fn list_assignments(&self, query: AssignmentListQuery) -> Result<Vec<Assignment>> {
        self.list_assignments_impl(query).await
    }

    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool> {
        self.delete_assignment_impl(assignment_id).await
    }

    // 考勤模块
    async fn find_attendance(
        &self,
        batch_id: i64,
        course_id: i64,
        date: chrono::NaiveDate,
    ) -> Result<Option<AttendanceRecord>> {
        self.find_attendance_impl(batch_id, course_id, date).await
    }

    async fn create_attendance(&self, attendance: NewAttendance) -> Result<AttendanceRecord> {
        self.create_attendance_impl(attendance).await
    }

    async fn replace_attendance_entries(
        &self,
        record_id: i64,
        records: Vec<AttendanceEntry>,
    ) -> Result<Option<AttendanceRecord>> {
        self.replace_attendance_entries_impl(record_id, records)
            .await
    }

    async fn get_attendance_by_id(&self, record_id: i64) -> Result<Option<AttendanceRecord>> {
        self.get_attendance_by_id_impl(record_id).await
    }

    async fn list_attendance(&self, query: AttendanceListQuery) -> Result<Vec<AttendanceRecord>> {
        self.list_attendance_impl(query).await
    }

    async fn delete_attendance(&self, record_id: i64) -> Result<bool> {
        self.delete_attendance_impl(record_id).await
    }

    async fn load_summaries(
        &self,
        batch_ids: &[i64],
        course_ids: &[i64],
        user_ids: &[i64],
    ) -> Result<SummaryIndex> {
        Ok(SummaryIndex {
            batches: self.batch_summaries_impl(batch_ids).await?,
            courses: self.course_summaries_impl(course_ids).await?,
            users: self.user_summaries_impl(user_ids).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("attendance.db").unwrap(),
            "sqlite://attendance.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("sqlite::memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert!(SeaOrmStorage::build_database_url("postgres://u:p@localhost/att").is_ok());
        assert!(SeaOrmStorage::build_database_url("redis://localhost").is_err());
    }
}
