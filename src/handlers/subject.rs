use crate::models::*;
use crate::services::CareerService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/careers/{id}/subjects",
    tag = "subjects",
    params(("id" = i64, Path, description = "Career id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Study plan in order", body = [SubjectResponse]),
        (status = 404, description = "Career not found")
    )
)]
pub async fn list_subjects(
    career_service: web::Data<CareerService>,
    _actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match career_service.list_subjects(path.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/careers/{id}/subjects",
    tag = "subjects",
    params(("id" = i64, Path, description = "Career id")),
    request_body = CreateSubjectRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Subject created", body = SubjectResponse),
        (status = 400, description = "Missing name or invalid term"),
        (status = 404, description = "Career not found")
    )
)]
pub async fn create_subject(
    career_service: web::Data<CareerService>,
    actor: Actor,
    path: web::Path<i64>,
    request: web::Json<CreateSubjectRequest>,
) -> Result<HttpResponse> {
    match career_service
        .create_subject(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(subject) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": subject
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/subjects/{id}",
    tag = "subjects",
    params(("id" = i64, Path, description = "Subject id")),
    request_body = UpdateSubjectRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subject updated", body = SubjectResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_subject(
    career_service: web::Data<CareerService>,
    actor: Actor,
    path: web::Path<i64>,
    request: web::Json<UpdateSubjectRequest>,
) -> Result<HttpResponse> {
    match career_service
        .update_subject(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(subject) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": subject
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/subjects/{id}/teacher",
    tag = "subjects",
    params(("id" = i64, Path, description = "Subject id")),
    request_body = AssignTeacherRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Teacher assigned or cleared", body = SubjectResponse),
        (status = 400, description = "Staff member is not active teaching staff"),
        (status = 404, description = "Subject or staff member not found")
    )
)]
pub async fn assign_teacher(
    career_service: web::Data<CareerService>,
    actor: Actor,
    path: web::Path<i64>,
    request: web::Json<AssignTeacherRequest>,
) -> Result<HttpResponse> {
    match career_service
        .assign_teacher(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(subject) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": subject
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subject_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subjects")
            .route("/{id}", web::put().to(update_subject))
            .route("/{id}/teacher", web::put().to(assign_teacher)),
    );
}
