use crate::models::*;
use crate::services::CampusService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/campuses",
    tag = "campuses",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Visible campuses", body = [CampusResponse]))
)]
pub async fn list_campuses(
    campus_service: web::Data<CampusService>,
    actor: Actor,
) -> Result<HttpResponse> {
    match campus_service.list_campuses(&actor).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/campuses",
    tag = "campuses",
    request_body = CreateCampusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Campus created", body = CampusResponse),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn create_campus(
    campus_service: web::Data<CampusService>,
    actor: Actor,
    request: web::Json<CreateCampusRequest>,
) -> Result<HttpResponse> {
    match campus_service.create_campus(&actor, request.into_inner()).await {
        Ok(campus) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": campus
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/bank-accounts",
    tag = "campuses",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Active bank accounts", body = [BankAccountResponse]))
)]
pub async fn list_bank_accounts(
    campus_service: web::Data<CampusService>,
    _actor: Actor,
) -> Result<HttpResponse> {
    match campus_service.list_bank_accounts().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/bank-accounts",
    tag = "campuses",
    request_body = CreateBankAccountRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Bank account created", body = BankAccountResponse),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn create_bank_account(
    campus_service: web::Data<CampusService>,
    actor: Actor,
    request: web::Json<CreateBankAccountRequest>,
) -> Result<HttpResponse> {
    match campus_service
        .create_bank_account(&actor, request.into_inner())
        .await
    {
        Ok(account) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": account
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn campus_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/campuses")
            .route("", web::get().to(list_campuses))
            .route("", web::post().to(create_campus)),
    )
    .service(
        web::scope("/bank-accounts")
            .route("", web::get().to(list_bank_accounts))
            .route("", web::post().to(create_bank_account)),
    );
}
