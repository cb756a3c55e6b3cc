use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::BatchService;
use crate::models::batches::requests::CreateBatchRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

fn validate(batch: &CreateBatchRequest) -> Vec<String> {
    let mut errors = Vec::new();
    if batch.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if batch.department.trim().is_empty() {
        errors.push("department is required".to_string());
    }
    if !(1900..=2200).contains(&batch.year) {
        errors.push("year is out of range".to_string());
    }
    if batch.semester < 1 {
        errors.push("semester must be at least 1".to_string());
    }
    errors
}

pub async fn create_batch(
    service: &BatchService,
    request: &HttpRequest,
    mut batch_data: CreateBatchRequest,
) -> ActixResult<HttpResponse> {
    let errors = validate(&batch_data);
    if !errors.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::validation_failed(errors)));
    }
    batch_data.name = batch_data.name.trim().to_string();

    let storage = service.get_storage(request);

    match storage.create_batch(batch_data).await {
        Ok(batch) => {
            info!("Batch {} ({}) created", batch.id, batch.name);
            Ok(HttpResponse::Created().json(ApiResponse::success(batch, "Batch created successfully")))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::BatchAlreadyExists,
            "Batch name already exists",
        ))),
        Err(e) => Ok(internal_error("Batch creation failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_collects_errors() {
        let errors = validate(&CreateBatchRequest {
            name: " ".to_string(),
            year: 2025,
            department: "".to_string(),
            semester: 0,
        });
        assert_eq!(errors.len(), 3);
    }
}
