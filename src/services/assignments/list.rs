use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, populate_assignments};
use crate::models::ApiResponse;
use crate::models::assignments::{
    requests::AssignmentListQuery, responses::AssignmentListResponse,
};
use crate::services::{current_user, internal_error};

/// 当前教师的分配，按批次名、课程名排序
pub async fn list_my_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let query = AssignmentListQuery {
        faculty_id: Some(user.id),
        ..Default::default()
    };

    let assignments = match storage.list_assignments(query).await {
        Ok(assignments) => assignments,
        Err(e) => return Ok(internal_error("Failed to list assignments", e)),
    };

    match populate_assignments(&storage, assignments).await {
        Ok(mut items) => {
            items.sort_by(|a, b| {
                a.batch
                    .name
                    .cmp(&b.batch.name)
                    .then_with(|| a.course.name.cmp(&b.course.name))
            });
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                AssignmentListResponse { items },
                "Assignments retrieved successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to load assignment details", e)),
    }
}

/// 全部分配，创建时间倒序
pub async fn list_all_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
    query: AssignmentListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let assignments = match storage.list_assignments(query).await {
        Ok(assignments) => assignments,
        Err(e) => return Ok(internal_error("Failed to list assignments", e)),
    };

    match populate_assignments(&storage, assignments).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssignmentListResponse { items },
            "Assignments retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to load assignment details", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{
        body_json, request_as, seed_batch, seed_course, seed_user, storage,
    };

    #[actix_web::test]
    async fn test_my_assignments_sorted_by_batch_then_course() {
        let storage = storage().await;
        let f1 = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let f2 = seed_user(&storage, "faculty2", UserRole::Teacher, None, None).await;
        let b1 = seed_batch(&storage, "B1").await;
        let b2 = seed_batch(&storage, "B2").await;
        let algebra = seed_course(&storage, "MA101", "Algebra").await;
        let physics = seed_course(&storage, "PH101", "Physics").await;

        storage.create_assignment(b2.id, algebra.id, f1.id).await.unwrap();
        storage.create_assignment(b1.id, physics.id, f1.id).await.unwrap();
        storage.create_assignment(b1.id, algebra.id, f1.id).await.unwrap();
        storage.create_assignment(b2.id, physics.id, f2.id).await.unwrap();

        let resp = AssignmentService::new_lazy()
            .list_my_assignments(&request_as(&storage, &f1))
            .await
            .unwrap();
        let body = body_json(resp).await;
        let pairs: Vec<(String, String)> = body["data"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| {
                (
                    a["batch"]["name"].as_str().unwrap().to_string(),
                    a["course"]["name"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("B1".to_string(), "Algebra".to_string()),
                ("B1".to_string(), "Physics".to_string()),
                ("B2".to_string(), "Algebra".to_string()),
            ]
        );
    }

    #[actix_web::test]
    async fn test_all_assignments_filtered_by_faculty() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin", UserRole::Admin, None, None).await;
        let f1 = seed_user(&storage, "faculty1", UserRole::Teacher, None, None).await;
        let f2 = seed_user(&storage, "faculty2", UserRole::Teacher, None, None).await;
        let b1 = seed_batch(&storage, "B1").await;
        let c1 = seed_course(&storage, "C1", "Course One").await;
        let c2 = seed_course(&storage, "C2", "Course Two").await;
        storage.create_assignment(b1.id, c1.id, f1.id).await.unwrap();
        storage.create_assignment(b1.id, c2.id, f2.id).await.unwrap();

        let resp = AssignmentService::new_lazy()
            .list_all_assignments(
                &request_as(&storage, &admin),
                AssignmentListQuery {
                    faculty_id: Some(f2.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let body = body_json(resp).await;
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["course"]["code"], "C2");
    }
}
