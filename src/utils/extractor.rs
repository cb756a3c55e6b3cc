use actix_web::{HttpResponse, error::InternalError};

use crate::models::{ApiResponse, ErrorCode};

/// 解析路径中的正整数 ID
pub fn parse_positive_i64(raw: Option<&str>, param: &str) -> Result<i64, String> {
    let raw = raw.ok_or_else(|| format!("Missing path parameter: {param}"))?;
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(format!("Invalid {param}: must be a positive integer")),
    }
}

/// 构造 400 错误，供提取器使用
pub fn bad_path_parameter(msg: String) -> actix_web::Error {
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &msg));
    InternalError::from_response(msg, response).into()
}

/// 定义从路径安全提取 i64 ID 的提取器，非数字或不大于 0 时返回 400
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = std::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _payload: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                std::future::ready(
                    $crate::utils::extractor::parse_positive_i64(req.match_info().get($param), $param)
                        .map($name)
                        .map_err($crate::utils::extractor::bad_path_parameter),
                )
            }
        }
    };
}

define_safe_i64_extractor!(SafeUserIdI64, "user_id");
define_safe_i64_extractor!(SafeBatchIdI64, "batch_id");
define_safe_i64_extractor!(SafeCourseIdI64, "course_id");
define_safe_i64_extractor!(SafeAssignmentIdI64, "assignment_id");
define_safe_i64_extractor!(SafeRecordIdI64, "record_id");

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::FromRequest;
    use actix_web::test::TestRequest;

    #[test]
    fn test_parse_positive_i64() {
        assert_eq!(parse_positive_i64(Some("42"), "id"), Ok(42));
        assert!(parse_positive_i64(Some("0"), "id").is_err());
        assert!(parse_positive_i64(Some("-3"), "id").is_err());
        assert!(parse_positive_i64(Some("abc"), "id").is_err());
        assert!(parse_positive_i64(None, "id").is_err());
    }

    #[actix_web::test]
    async fn test_extractor_reads_named_segment() {
        let req = TestRequest::default()
            .param("batch_id", "7")
            .to_http_request();
        let id = SafeBatchIdI64::extract(&req).await.expect("valid id");
        assert_eq!(id.0, 7);
    }

    #[actix_web::test]
    async fn test_user_id_ignores_other_segments() {
        let req = TestRequest::default()
            .param("id", "7")
            .to_http_request();
        assert!(SafeUserIdI64::extract(&req).await.is_err());

        let req = TestRequest::default()
            .param("user_id", "12")
            .to_http_request();
        assert_eq!(SafeUserIdI64::extract(&req).await.expect("valid id").0, 12);
    }

    #[actix_web::test]
    async fn test_extractor_rejects_non_numeric() {
        let req = TestRequest::default()
            .param("record_id", "abc")
            .to_http_request();
        let err = SafeRecordIdI64::extract(&req).await.unwrap_err();
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::BAD_REQUEST
        );
    }
}
