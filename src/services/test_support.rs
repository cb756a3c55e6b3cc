//! 服务层测试辅助：内存数据库、种子数据和带用户的请求

use std::sync::Arc;

use actix_web::{HttpMessage, HttpRequest, HttpResponse, test::TestRequest, web};
use serde_json::Value;

use crate::models::batches::{entities::Batch, requests::CreateBatchRequest};
use crate::models::courses::{entities::Course, requests::CreateCourseRequest};
use crate::models::users::{
    entities::{User, UserRole},
    requests::CreateUserRequest,
};
use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};

pub(crate) async fn storage() -> Arc<dyn Storage> {
    Arc::new(
        SeaOrmStorage::connect_memory()
            .await
            .expect("in-memory storage"),
    )
}

pub(crate) async fn seed_batch(storage: &Arc<dyn Storage>, name: &str) -> Batch {
    storage
        .create_batch(CreateBatchRequest {
            name: name.to_string(),
            year: 2025,
            department: "CSE".to_string(),
            semester: 1,
        })
        .await
        .expect("seed batch")
}

pub(crate) async fn seed_course(storage: &Arc<dyn Storage>, code: &str, name: &str) -> Course {
    storage
        .create_course(CreateCourseRequest {
            name: name.to_string(),
            code: code.to_string(),
            description: None,
            credits: None,
            department: "CSE".to_string(),
            semester: 1,
        })
        .await
        .expect("seed course")
}

pub(crate) async fn seed_user(
    storage: &Arc<dyn Storage>,
    username: &str,
    role: UserRole,
    roll_number: Option<&str>,
    batch_id: Option<i64>,
) -> User {
    storage
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@college.edu"),
            role,
            profile_name: None,
            roll_number: roll_number.map(str::to_string),
            batch_id,
        })
        .await
        .expect("seed user")
}

/// 构造已通过认证的请求
pub(crate) fn request_as(storage: &Arc<dyn Storage>, user: &User) -> HttpRequest {
    let req = TestRequest::default()
        .app_data(web::Data::new(storage.clone()))
        .to_http_request();
    req.extensions_mut().insert(user.clone());
    req
}

pub(crate) async fn body_json(resp: HttpResponse) -> Value {
    let bytes = actix_web::body::to_bytes(resp.into_body())
        .await
        .expect("response body");
    serde_json::from_slice(&bytes).expect("json body")
}
