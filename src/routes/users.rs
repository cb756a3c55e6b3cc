use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::{CreateUserRequest, UserListParams};
use crate::services::UserService;
use crate::utils::SafeUserIdI64;

// 懒加载的全局 USER_SERVICE 实例
static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

// 目录管理：教师、学生账号由管理员维护，学号和批次只属于学生
pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_users(&req, query.into_inner()).await
}

pub async fn create_user(
    req: HttpRequest,
    user_data: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.create_user(&req, user_data.into_inner()).await
}

pub async fn get_user(req: HttpRequest, user_id: SafeUserIdI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.get_user(&req, user_id.0).await
}

pub async fn delete_user(req: HttpRequest, user_id: SafeUserIdI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.delete_user(&req, user_id.0).await
}

// 配置路由，全部仅限管理员
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_users))
                    .route(web::post().to(create_user)),
            )
            .service(
                web::resource("/{user_id}")
                    .route(web::get().to(get_user))
                    .route(web::delete().to(delete_user)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};

    #[actix_web::test]
    async fn test_user_routes_require_token() {
        let app = test::init_service(App::new().configure(configure_user_routes)).await;

        for req in [
            test::TestRequest::get().uri("/api/v1/users").to_request(),
            test::TestRequest::post().uri("/api/v1/users").to_request(),
            test::TestRequest::get().uri("/api/v1/users/5").to_request(),
            test::TestRequest::delete().uri("/api/v1/users/5").to_request(),
        ] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }

        // 未注册的方法不进入处理程序
        let req = test::TestRequest::put().uri("/api/v1/users/5").to_request();
        let resp = test::call_service(&app, req).await;
        assert_ne!(resp.status(), StatusCode::OK);
    }
}
