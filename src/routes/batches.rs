use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::batches::requests::{BatchQueryParams, CreateBatchRequest};
use crate::models::users::entities::UserRole;
use crate::services::BatchService;
use crate::utils::SafeBatchIdI64;

// 懒加载的全局 BATCH_SERVICE 实例
static BATCH_SERVICE: Lazy<BatchService> = Lazy::new(BatchService::new_lazy);

// HTTP处理程序
pub async fn list_batches(
    req: HttpRequest,
    query: web::Query<BatchQueryParams>,
) -> ActixResult<HttpResponse> {
    BATCH_SERVICE.list_batches(&req, query.into_inner()).await
}

pub async fn create_batch(
    req: HttpRequest,
    batch_data: web::Json<CreateBatchRequest>,
) -> ActixResult<HttpResponse> {
    BATCH_SERVICE
        .create_batch(&req, batch_data.into_inner())
        .await
}

pub async fn get_batch(req: HttpRequest, batch_id: SafeBatchIdI64) -> ActixResult<HttpResponse> {
    BATCH_SERVICE.get_batch(&req, batch_id.0).await
}

pub async fn delete_batch(req: HttpRequest, batch_id: SafeBatchIdI64) -> ActixResult<HttpResponse> {
    BATCH_SERVICE.delete_batch(&req, batch_id.0).await
}

pub async fn list_batch_students(
    req: HttpRequest,
    batch_id: SafeBatchIdI64,
) -> ActixResult<HttpResponse> {
    BATCH_SERVICE.list_batch_students(&req, batch_id.0).await
}

// 配置路由
pub fn configure_batch_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/batches")
            .wrap(middlewares::RequireJWT)
            .service(
                // 所有登录用户可以查询批次，仅管理员可以创建
                web::resource("").route(web::get().to(list_batches)).route(
                    web::post()
                        .to(create_batch)
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/{batch_id}")
                    .route(web::get().to(get_batch))
                    .route(
                        web::delete()
                            .to(delete_batch)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/{batch_id}/students").route(
                    web::get()
                        .to(list_batch_students)
                        // 教师点名需要学生名单
                        .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                ),
            ),
    );
}
