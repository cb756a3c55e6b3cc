use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{Error, HttpRequest, HttpResponse};

use crate::models::{ApiResponse, ErrorCode};

/// JSON 请求体解析失败时返回统一的 400 响应
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    let message = match &err {
        JsonPayloadError::ContentType => "Content type must be application/json".to_string(),
        JsonPayloadError::Deserialize(e) => format!("Invalid JSON body: {e}"),
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "Request body is too large".to_string()
        }
        other => format!("Invalid request body: {other}"),
    };
    tracing::debug!("JSON payload error on {}: {}", req.path(), message);

    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(err, response).into()
}

/// 查询参数解析失败时返回统一的 400 响应
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    let message = format!("Invalid query parameters: {err}");
    tracing::debug!("Query error on {}: {}", req.path(), message);

    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(err, response).into()
}
