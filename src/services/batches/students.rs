use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::BatchService;
use crate::models::batches::responses::BatchStudentsResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

pub async fn list_batch_students(
    service: &BatchService,
    request: &HttpRequest,
    batch_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let batch = match storage.get_batch_by_id(batch_id).await {
        Ok(Some(batch)) => batch,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::BatchNotFound,
                "Batch not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to get batch", e)),
    };

    match storage.list_batch_students(batch_id).await {
        Ok(students) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            BatchStudentsResponse {
                batch,
                students: students.iter().map(|s| s.summary()).collect(),
            },
            "Batch students retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to list batch students", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{body_json, request_as, seed_batch, seed_user, storage};

    #[actix_web::test]
    async fn test_students_sorted_by_roll_number() {
        let storage = storage().await;
        let batch = seed_batch(&storage, "CSE-2025-A").await;
        let teacher = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        seed_user(&storage, "student2", UserRole::Student, Some("R002"), Some(batch.id)).await;
        seed_user(&storage, "student9", UserRole::Student, None, Some(batch.id)).await;
        seed_user(&storage, "student1", UserRole::Student, Some("R001"), Some(batch.id)).await;

        let req = request_as(&storage, &teacher);
        let resp = BatchService::new_lazy()
            .list_batch_students(&req, batch.id)
            .await
            .unwrap();
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

        let body = body_json(resp).await;
        let names: Vec<&str> = body["data"]["students"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["username"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["student1", "student2", "student9"]);
    }

    #[actix_web::test]
    async fn test_unknown_batch_is_not_found() {
        let storage = storage().await;
        let teacher = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let req = request_as(&storage, &teacher);
        let resp = BatchService::new_lazy()
            .list_batch_students(&req, 999)
            .await
            .unwrap();
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
