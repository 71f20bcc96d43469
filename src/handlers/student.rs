use crate::handlers::deletion_response;
use crate::ledger::Coverage;
use crate::models::*;
use crate::services::{DeletionRequestService, RedemptionService, StudentService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    params(StudentQuery),
    security(("bearer_auth" = [])),
    responses(
        (
            status = 200,
            description = "Paginated students with coverage",
            body = [StudentSummaryResponse]
        ),
        (status = 403, description = "No campus assigned")
    )
)]
pub async fn list_students(
    student_service: web::Data<StudentService>,
    actor: Actor,
    query: web::Query<StudentQuery>,
) -> Result<HttpResponse> {
    match student_service
        .list_students(&actor, query.into_inner())
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
    post,
    path = "/students",
    tag = "students",
    request_body = EnrollStudentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Student enrolled", body = StudentResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "National id already registered")
    )
)]
pub async fn enroll_student(
    student_service: web::Data<StudentService>,
    actor: Actor,
    request: web::Json<EnrollStudentRequest>,
) -> Result<HttpResponse> {
    match student_service
        .enroll_student(&actor, request.into_inner())
        .await
    {
        Ok(student) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": student
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = "students",
    params(("id" = i64, Path, description = "Student id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Student detail", body = StudentDetailResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_student(
    student_service: web::Data<StudentService>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match student_service.get_student(&actor, path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": detail
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/students/{id}",
    tag = "students",
    params(("id" = i64, Path, description = "Student id")),
    request_body = UpdateStudentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_student(
    student_service: web::Data<StudentService>,
    actor: Actor,
    path: web::Path<i64>,
    request: web::Json<UpdateStudentRequest>,
) -> Result<HttpResponse> {
    match student_service
        .update_student(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(student) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": student
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/students/{id}",
    tag = "students",
    params(("id" = i64, Path, description = "Student id")),
    request_body(
        content = DeleteRequest,
        description = "Reason, required unless the caller is an administrator"
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted", body = DeletionOutcome),
        (status = 202, description = "Deletion request filed", body = DeletionOutcome)
    )
)]
pub async fn delete_student(
    deletion_service: web::Data<DeletionRequestService>,
    actor: Actor,
    path: web::Path<i64>,
    request: Option<web::Json<DeleteRequest>>,
) -> Result<HttpResponse> {
    let target = DeletionTarget::Student(path.into_inner());
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    match deletion_service
        .delete_or_request(&actor, target, request)
        .await
    {
        Ok(outcome) => Ok(deletion_response(outcome)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/students/{id}/coverage",
    tag = "students",
    params(("id" = i64, Path, description = "Student id")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Coverage as of today", body = Coverage))
)]
pub async fn get_coverage(
    student_service: web::Data<StudentService>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match student_service.coverage(&actor, path.into_inner()).await {
        Ok(coverage) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": coverage
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/students/{id}/schedule",
    tag = "students",
    params(("id" = i64, Path, description = "Student id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Twelve-month installment card", body = ScheduleResponse)
    )
)]
pub async fn get_schedule(
    student_service: web::Data<StudentService>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match student_service.schedule(&actor, path.into_inner()).await {
        Ok(schedule) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": schedule
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/students/{id}/points",
    tag = "students",
    params(("id" = i64, Path, description = "Student id")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Loyalty balance", body = PointsResponse))
)]
pub async fn get_points(
    student_service: web::Data<StudentService>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match student_service.points(&actor, path.into_inner()).await {
        Ok(points) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": points
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/students/{id}/redemptions",
    tag = "students",
    params(("id" = i64, Path, description = "Student id")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Redemption history", body = [RedemptionResponse]))
)]
pub async fn list_redemptions(
    redemption_service: web::Data<RedemptionService>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match redemption_service
        .list_redemptions(&actor, path.into_inner())
        .await
    {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/students/{id}/redemptions",
    tag = "students",
    params(("id" = i64, Path, description = "Student id")),
    request_body = CreateRedemptionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Points redeemed", body = RedemptionResponse),
        (status = 400, description = "Insufficient points or missing reason")
    )
)]
pub async fn create_redemption(
    redemption_service: web::Data<RedemptionService>,
    actor: Actor,
    path: web::Path<i64>,
    request: web::Json<CreateRedemptionRequest>,
) -> Result<HttpResponse> {
    match redemption_service
        .create_redemption(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(redemption) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": redemption
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn student_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/students")
            .route("", web::get().to(list_students))
            .route("", web::post().to(enroll_student))
            .route("/{id}", web::get().to(get_student))
            .route("/{id}", web::put().to(update_student))
            .route("/{id}", web::delete().to(delete_student))
            .route("/{id}/coverage", web::get().to(get_coverage))
            .route("/{id}/schedule", web::get().to(get_schedule))
            .route("/{id}/points", web::get().to(get_points))
            .route("/{id}/redemptions", web::get().to(list_redemptions))
            .route("/{id}/redemptions", web::post().to(create_redemption)),
    );
}
