use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::attendance::requests::{
    AttendanceListParams, AttendanceRangeParams, MarkAttendanceRequest, OwnAttendanceParams,
};
use crate::models::users::entities::UserRole;
use crate::services::AttendanceService;
use crate::utils::{SafeBatchIdI64, SafeCourseIdI64, SafeRecordIdI64};

// 懒加载的全局 ATTENDANCE_SERVICE 实例，更新模式取自配置
static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

// HTTP处理程序
pub async fn mark_attendance(
    req: HttpRequest,
    data: web::Json<MarkAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .mark_attendance(&req, data.into_inner())
        .await
}

pub async fn list_all_attendance(
    req: HttpRequest,
    query: web::Query<AttendanceListParams>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_all_attendance(&req, query.into_inner())
        .await
}

pub async fn list_own_attendance(
    req: HttpRequest,
    query: web::Query<OwnAttendanceParams>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_own_attendance(&req, query.into_inner())
        .await
}

pub async fn delete_attendance(
    req: HttpRequest,
    record_id: SafeRecordIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.delete_attendance(&req, record_id.0).await
}

pub async fn list_batch_course_attendance(
    req: HttpRequest,
    batch_id: SafeBatchIdI64,
    course_id: SafeCourseIdI64,
    query: web::Query<AttendanceRangeParams>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_batch_course_attendance(&req, batch_id.0, course_id.0, query.into_inner())
        .await
}

pub async fn get_attendance_stats(
    req: HttpRequest,
    batch_id: SafeBatchIdI64,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .get_attendance_stats(&req, batch_id.0, course_id.0)
        .await
}

// 配置路由
pub fn configure_attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/attendance")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::post()
                            .to(mark_attendance)
                            // 仅负责教师可以提交，服务层再检查分配
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    )
                    .route(
                        web::get()
                            .to(list_all_attendance)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            // 必须在 /{record_id} 之前注册
            .service(
                web::resource("/me")
                    .wrap(middlewares::RequireRole::new(&UserRole::Student))
                    .route(web::get().to(list_own_attendance)),
            )
            .service(
                web::resource("/batches/{batch_id}/courses/{course_id}")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route(web::get().to(list_batch_course_attendance)),
            )
            .service(
                web::resource("/batches/{batch_id}/courses/{course_id}/stats")
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
                    .route(web::get().to(get_attendance_stats)),
            )
            .service(
                web::resource("/{record_id}")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route(web::delete().to(delete_attendance)),
            ),
    );
}
