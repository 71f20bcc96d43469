use crate::handlers::deletion_response;
use crate::models::*;
use crate::services::{DeletionRequestService, StaffService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/staff",
    tag = "staff",
    params(StaffQuery),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Staff members", body = [StaffMemberResponse]))
)]
pub async fn list_staff(
    staff_service: web::Data<StaffService>,
    actor: Actor,
    query: web::Query<StaffQuery>,
) -> Result<HttpResponse> {
    match staff_service.list_staff(&actor, query.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/staff",
    tag = "staff",
    request_body = CreateStaffMemberRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Staff member added", body = StaffMemberResponse),
        (status = 409, description = "National id already registered")
    )
)]
pub async fn create_staff_member(
    staff_service: web::Data<StaffService>,
    actor: Actor,
    request: web::Json<CreateStaffMemberRequest>,
) -> Result<HttpResponse> {
    match staff_service
        .create_staff_member(&actor, request.into_inner())
        .await
    {
        Ok(member) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": member
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/staff/attendance",
    tag = "staff",
    params(AttendanceQuery),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Attendance for one day", body = [AttendanceResponse]))
)]
pub async fn list_attendance(
    staff_service: web::Data<StaffService>,
    actor: Actor,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse> {
    match staff_service
        .list_attendance(&actor, query.into_inner())
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
    path = "/staff/attendance",
    tag = "staff",
    request_body = RecordAttendanceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceResponse),
        (status = 409, description = "Already recorded for that day")
    )
)]
pub async fn record_attendance(
    staff_service: web::Data<StaffService>,
    actor: Actor,
    request: web::Json<RecordAttendanceRequest>,
) -> Result<HttpResponse> {
    match staff_service
        .record_attendance(&actor, request.into_inner())
        .await
    {
        Ok(row) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": row
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/staff/{id}",
    tag = "staff",
    params(("id" = i64, Path, description = "Staff member id")),
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
pub async fn delete_staff_member(
    deletion_service: web::Data<DeletionRequestService>,
    actor: Actor,
    path: web::Path<i64>,
    request: Option<web::Json<DeleteRequest>>,
) -> Result<HttpResponse> {
    let target = DeletionTarget::StaffMember(path.into_inner());
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    match deletion_service
        .delete_or_request(&actor, target, request)
        .await
    {
        Ok(outcome) => Ok(deletion_response(outcome)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn staff_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/staff")
            .route("", web::get().to(list_staff))
            .route("", web::post().to(create_staff_member))
            .route("/attendance", web::get().to(list_attendance))
            .route("/attendance", web::post().to(record_attendance))
            .route("/{id}", web::delete().to(delete_staff_member)),
    );
}
