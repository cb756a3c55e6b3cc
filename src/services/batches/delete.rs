use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::BatchService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

pub async fn delete_batch(
    service: &BatchService,
    request: &HttpRequest,
    batch_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_batch(batch_id).await {
        Ok(true) => {
            info!("Batch {} deleted", batch_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Batch deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::BatchNotFound,
            "Batch not found",
        ))),
        Err(e) if e.is_reference() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::BatchInUse,
            "Batch is referenced by assignments or attendance records",
        ))),
        Err(e) => Ok(internal_error("Batch deletion failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{
        body_json, request_as, seed_batch, seed_course, seed_user, storage,
    };
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_batch_with_assignment_is_in_use() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin", UserRole::Admin, None, None).await;
        let faculty = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let batch = seed_batch(&storage, "CSE-2025-A").await;
        let course = seed_course(&storage, "CS101", "Programming").await;
        storage
            .create_assignment(batch.id, course.id, faculty.id)
            .await
            .unwrap();

        let req = request_as(&storage, &admin);
        let service = BatchService::new_lazy();

        let resp = service.delete_batch(&req, batch.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body = body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::BatchInUse as i32);
        assert!(storage.get_batch_by_id(batch.id).await.unwrap().is_some());

        let resp = service.delete_batch(&req, batch.id + 100).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
