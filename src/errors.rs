//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_attendance_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum AttendanceSystemError {
            $($variant(String),)*
        }

        impl AttendanceSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(AttendanceSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(AttendanceSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(AttendanceSystemError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl AttendanceSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        AttendanceSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_attendance_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    Validation("E004", "Validation Error"),
    Conflict("E005", "Conflict Error"),
    Reference("E006", "Reference Error"),
    DateParse("E007", "Date Parse Error"),
}

impl AttendanceSystemError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为唯一约束冲突
    pub fn is_conflict(&self) -> bool {
        matches!(self, AttendanceSystemError::Conflict(_))
    }

    /// 是否为外键引用失败（引用的行不存在，或删除仍被引用的行）
    pub fn is_reference(&self) -> bool {
        matches!(self, AttendanceSystemError::Reference(_))
    }

    /// 将数据库错误按约束类型归类
    ///
    /// 唯一约束归为 `Conflict`，外键约束归为 `Reference`，其余归为 `DatabaseOperation`。
    pub fn from_db_err(context: &str, err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                AttendanceSystemError::Conflict(format!("{context}: {detail}"))
            }
            Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(detail)) => {
                AttendanceSystemError::Reference(format!("{context}: {detail}"))
            }
            _ => AttendanceSystemError::DatabaseOperation(format!("{context}: {err}")),
        }
    }
}

impl fmt::Display for AttendanceSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AttendanceSystemError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for AttendanceSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        AttendanceSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<chrono::ParseError> for AttendanceSystemError {
    fn from(err: chrono::ParseError) -> Self {
        AttendanceSystemError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AttendanceSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AttendanceSystemError::database_config("test").code(), "E001");
        assert_eq!(AttendanceSystemError::validation("test").code(), "E004");
        assert_eq!(AttendanceSystemError::conflict("test").code(), "E005");
        assert_eq!(AttendanceSystemError::reference("test").code(), "E006");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            AttendanceSystemError::reference("test").error_type(),
            "Reference Error"
        );
        assert_eq!(
            AttendanceSystemError::conflict("test").error_type(),
            "Conflict Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = AttendanceSystemError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_format_simple() {
        let err = AttendanceSystemError::conflict("duplicate key");
        let formatted = err.format_simple();
        assert!(formatted.contains("Conflict Error"));
        assert!(formatted.contains("duplicate key"));
    }

    #[test]
    fn test_generic_db_error_is_not_conflict() {
        let err = AttendanceSystemError::from_db_err(
            "查询失败",
            sea_orm::DbErr::Custom("connection reset".to_string()),
        );
        assert!(!err.is_conflict());
        assert!(!err.is_reference());
        assert_eq!(err.code(), "E003");
    }
}
