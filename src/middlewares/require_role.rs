/*!
 * 基于角色的访问控制中间件
 *
 * 必须在 RequireJWT 之后使用。角色以数据库中的用户为准，不读取令牌中的角色声明。
 *
 * ```rust,ignore
 * web::scope("/api/v1/assignments")
 *     .wrap(RequireJWT)
 *     .service(
 *         web::resource("/mine")
 *             .wrap(RequireRole::new_any(UserRole::teacher_roles()))
 *             .route(web::get().to(list_my_assignments)),
 *     )
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{info, warn};

use crate::{
    middlewares::RequireJWT,
    models::{
        ErrorCode,
        users::entities::{self, UserRole},
    },
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    required_roles: Vec<UserRole>,
    require_all: bool, // true表示需要所有角色，false表示任一角色即可
}

impl RequireRole {
    /// 创建需要特定角色的中间件
    pub fn new(role: &UserRole) -> Self {
        Self {
            required_roles: vec![role.clone()],
            require_all: true,
        }
    }

    /// 创建需要任一角色的中间件
    pub fn new_any(roles: &[&UserRole]) -> Self {
        Self {
            required_roles: roles.iter().map(|r| (*r).clone()).collect(),
            require_all: false,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_roles: self.required_roles.clone(),
            require_all: self.require_all,
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_roles: Vec<UserRole>,
    require_all: bool,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let required_roles = self.required_roles.clone();
        let require_all = self.require_all;

        Box::pin(async move {
            // 从请求扩展中获取用户Claims
            let user_claims = req.extensions().get::<entities::User>().cloned();

            match user_claims {
                Some(claims) => {
                    let user_sub = claims.id;
                    let user_role = RequireJWT::extract_user_role(req.request());
                    let has_permission = if require_all {
                        // 需要所有角色（通常用于单一角色验证）
                        required_roles
                            .iter()
                            .all(|role| user_role.as_ref() == Some(role))
                    } else {
                        // 需要任一角色
                        required_roles
                            .iter()
                            .any(|role| user_role.as_ref() == Some(role))
                    };

                    if has_permission {
                        let res = srv.call(req).await?.map_into_left_body();
                        Ok(res)
                    } else {
                        warn!(
                            "Access denied for user {} (role: {:?}). Required roles: {:?}",
                            user_sub, user_role, required_roles
                        );
                        Ok(req.into_response(
                            create_error_response(
                                StatusCode::FORBIDDEN,
                                ErrorCode::PermissionDenied,
                                "Access denied: insufficient role",
                            )
                            .map_into_right_body(),
                        ))
                    }
                }
                None => {
                    info!(
                        "Role check failed: No user claims found in request. Make sure RequireJWT middleware is applied first."
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Authentication required",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{User, UserStatus};
    use actix_web::{App, HttpResponse, dev::Service as _, test, web};

    fn user(role: UserRole) -> User {
        User {
            id: 7,
            username: "someone".to_string(),
            email: "someone@college.edu".to_string(),
            profile_name: None,
            role,
            status: UserStatus::Active,
            roll_number: None,
            batch_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    async fn status_for(current: Option<UserRole>) -> StatusCode {
        let app = test::init_service(
            App::new().service(
                web::scope("")
                    .wrap(RequireRole::new_any(UserRole::staff_roles()))
                    .wrap_fn(move |req, srv| {
                        if let Some(role) = current.clone() {
                            req.extensions_mut().insert(user(role));
                        }
                        srv.call(req)
                    })
                    .route("/guarded", web::get().to(HttpResponse::Ok)),
            ),
        )
        .await;
        let req = test::TestRequest::get().uri("/guarded").to_request();
        test::call_service(&app, req).await.status()
    }

    #[actix_web::test]
    async fn test_role_guard() {
        assert_eq!(status_for(Some(UserRole::Teacher)).await, StatusCode::OK);
        assert_eq!(status_for(Some(UserRole::Admin)).await, StatusCode::OK);
        assert_eq!(
            status_for(Some(UserRole::Student)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_for(None).await, StatusCode::UNAUTHORIZED);
    }
}
