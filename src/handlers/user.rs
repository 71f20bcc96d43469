use crate::models::*;
use crate::services::UserService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All accounts", body = [UserResponse]),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    actor: Actor,
) -> Result<HttpResponse> {
    match user_service.list_users(&actor).await {
        Ok(users) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": users
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn create_user(
    user_service: web::Data<UserService>,
    actor: Actor,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    match user_service.create_user(&actor, request.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/users/{id}/campus",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = AssignCampusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Campus assigned", body = UserResponse),
        (status = 404, description = "User or campus not found")
    )
)]
pub async fn assign_campus(
    user_service: web::Data<UserService>,
    actor: Actor,
    path: web::Path<i64>,
    request: web::Json<AssignCampusRequest>,
) -> Result<HttpResponse> {
    match user_service
        .assign_campus(&actor, path.into_inner(), request.campus_id)
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users/{id}/toggle-active",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account enabled or disabled", body = UserResponse),
        (status = 400, description = "Administrators cannot be disabled")
    )
)]
pub async fn toggle_active(
    user_service: web::Data<UserService>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match user_service.toggle_active(&actor, path.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("", web::post().to(create_user))
            .route("/{id}/campus", web::put().to(assign_campus))
            .route("/{id}/toggle-active", web::post().to(toggle_active)),
    );
}
