use crate::models::*;
use crate::services::DeletionRequestService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/deletion-requests",
    tag = "deletion-requests",
    params(DeletionRequestQuery),
    security(("bearer_auth" = [])),
    responses(
        (
            status = 200,
            description = "Deletion requests visible to the caller",
            body = [DeletionRequestResponse]
        )
    )
)]
pub async fn list_requests(
    deletion_service: web::Data<DeletionRequestService>,
    actor: Actor,
    query: web::Query<DeletionRequestQuery>,
) -> Result<HttpResponse> {
    match deletion_service
        .list_requests(&actor, query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/deletion-requests/{id}",
    tag = "deletion-requests",
    params(("id" = i64, Path, description = "Deletion request id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deletion request", body = DeletionRequestResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_request(
    deletion_service: web::Data<DeletionRequestService>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match deletion_service.get_request(&actor, path.into_inner()).await {
        Ok(request) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": request
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Deletes the target and closes the request. Nothing changes if the
/// deletion fails.
#[utoipa::path(
    post,
    path = "/deletion-requests/{id}/approve",
    tag = "deletion-requests",
    params(("id" = i64, Path, description = "Deletion request id")),
    request_body = DecisionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Approved and deleted", body = DeletionRequestResponse),
        (status = 403, description = "Administrators only"),
        (status = 409, description = "Request already decided or target still referenced")
    )
)]
pub async fn approve_request(
    deletion_service: web::Data<DeletionRequestService>,
    actor: Actor,
    path: web::Path<i64>,
    request: Option<web::Json<DecisionRequest>>,
) -> Result<HttpResponse> {
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    match deletion_service
        .approve(&actor, path.into_inner(), request)
        .await
    {
        Ok(decided) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": decided
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/deletion-requests/{id}/reject",
    tag = "deletion-requests",
    params(("id" = i64, Path, description = "Deletion request id")),
    request_body = DecisionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Rejected", body = DeletionRequestResponse),
        (status = 403, description = "Administrators only"),
        (status = 409, description = "Request already decided")
    )
)]
pub async fn reject_request(
    deletion_service: web::Data<DeletionRequestService>,
    actor: Actor,
    path: web::Path<i64>,
    request: Option<web::Json<DecisionRequest>>,
) -> Result<HttpResponse> {
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    match deletion_service
        .reject(&actor, path.into_inner(), request)
        .await
    {
        Ok(decided) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": decided
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn deletion_request_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/deletion-requests")
            .route("", web::get().to(list_requests))
            .route("/{id}", web::get().to(get_request))
            .route("/{id}/approve", web::post().to(approve_request))
            .route("/{id}/reject", web::post().to(reject_request)),
    );
}
