use crate::handlers::deletion_response;
use crate::handlers::subject::{create_subject, list_subjects};
use crate::models::*;
use crate::services::{CareerService, DeletionRequestService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/careers",
    tag = "careers",
    params(CareerQuery),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Career catalog", body = [CareerResponse]))
)]
pub async fn list_careers(
    career_service: web::Data<CareerService>,
    _actor: Actor,
    query: web::Query<CareerQuery>,
) -> Result<HttpResponse> {
    match career_service.list_careers(query.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/careers",
    tag = "careers",
    request_body = CreateCareerRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Career created", body = CareerResponse),
        (status = 400, description = "Invalid fees or duration")
    )
)]
pub async fn create_career(
    career_service: web::Data<CareerService>,
    actor: Actor,
    request: web::Json<CreateCareerRequest>,
) -> Result<HttpResponse> {
    match career_service.create_career(&actor, request.into_inner()).await {
        Ok(career) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": career
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/careers/{id}",
    tag = "careers",
    params(("id" = i64, Path, description = "Career id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Career", body = CareerResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_career(
    career_service: web::Data<CareerService>,
    _actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match career_service.get_career(path.into_inner()).await {
        Ok(career) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": career
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/careers/{id}",
    tag = "careers",
    params(("id" = i64, Path, description = "Career id")),
    request_body = UpdateCareerRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Career updated", body = CareerResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_career(
    career_service: web::Data<CareerService>,
    actor: Actor,
    path: web::Path<i64>,
    request: web::Json<UpdateCareerRequest>,
) -> Result<HttpResponse> {
    match career_service
        .update_career(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(career) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": career
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/careers/{id}",
    tag = "careers",
    params(("id" = i64, Path, description = "Career id")),
    request_body(
        content = DeleteRequest,
        description = "Reason, required unless the caller is an administrator"
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted", body = DeletionOutcome),
        (status = 202, description = "Deletion request filed", body = DeletionOutcome),
        (status = 409, description = "Career has enrolled students or a request is pending")
    )
)]
pub async fn delete_career(
    deletion_service: web::Data<DeletionRequestService>,
    actor: Actor,
    path: web::Path<i64>,
    request: Option<web::Json<DeleteRequest>>,
) -> Result<HttpResponse> {
    let target = DeletionTarget::Career(path.into_inner());
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    match deletion_service
        .delete_or_request(&actor, target, request)
        .await
    {
        Ok(outcome) => Ok(deletion_response(outcome)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn career_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/careers")
            .route("", web::get().to(list_careers))
            .route("", web::post().to(create_career))
            .route("/{id}", web::get().to(get_career))
            .route("/{id}", web::put().to(update_career))
            .route("/{id}", web::delete().to(delete_career))
            .route("/{id}/subjects", web::get().to(list_subjects))
            .route("/{id}/subjects", web::post().to(create_subject)),
    );
}
