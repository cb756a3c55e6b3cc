use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assignments::requests::{
    AssignmentListQuery, CreateAssignmentRequest, ReassignFacultyRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AssignmentService;
use crate::utils::SafeAssignmentIdI64;

// 懒加载的全局 ASSIGNMENT_SERVICE 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

// HTTP处理程序
pub async fn create_assignment(
    req: HttpRequest,
    data: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .create_assignment(&req, data.into_inner())
        .await
}

pub async fn list_all_assignments(
    req: HttpRequest,
    query: web::Query<AssignmentListQuery>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_all_assignments(&req, query.into_inner())
        .await
}

pub async fn list_my_assignments(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_my_assignments(&req).await
}

pub async fn get_assignment(
    req: HttpRequest,
    assignment_id: SafeAssignmentIdI64,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .get_assignment(&req, assignment_id.0)
        .await
}

pub async fn reassign_faculty(
    req: HttpRequest,
    assignment_id: SafeAssignmentIdI64,
    data: web::Json<ReassignFacultyRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .reassign_faculty(&req, assignment_id.0, data.into_inner())
        .await
}

pub async fn delete_assignment(
    req: HttpRequest,
    assignment_id: SafeAssignmentIdI64,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .delete_assignment(&req, assignment_id.0)
        .await
}

// 配置路由
pub fn configure_assignment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route(web::get().to(list_all_assignments))
                    .route(web::post().to(create_assignment)),
            )
            // 必须在 /{assignment_id} 之前注册
            .service(
                web::resource("/mine")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route(web::get().to(list_my_assignments)),
            )
            .service(
                web::resource("/{assignment_id}")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route(web::get().to(get_assignment))
                    .route(web::put().to(reassign_faculty))
                    .route(web::delete().to(delete_assignment)),
            ),
    );
}
