pub mod assignments;
pub mod attendance;
pub mod batches;
pub mod common;
pub mod courses;
pub mod users;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误代码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    ValidationFailed = 1001,
    Unauthorized = 1002,
    PermissionDenied = 1003,
    NotFound = 1004,
    InternalServerError = 1005,

    // 用户
    UserNotFound = 2000,
    UserAlreadyExists = 2001,
    UserNameInvalid = 2002,
    UserEmailInvalid = 2003,
    UserInUse = 2004,

    // 批次
    BatchNotFound = 3000,
    BatchAlreadyExists = 3001,
    BatchInUse = 3002,

    // 课程
    CourseNotFound = 4000,
    CourseAlreadyExists = 4001,
    CourseInUse = 4002,

    // 批次-课程分配
    AssignmentNotFound = 5000,
    AssignmentAlreadyExists = 5001,
    FacultyNotTeacher = 5002,
    NotAssigned = 5003,

    // 考勤
    AttendanceNotFound = 6000,
    AttendanceAlreadyExists = 6001,
    AttendanceInvalidDate = 6002,
    AttendanceStatsEmpty = 6003,
}
