use crate::models::*;
use crate::services::ReportService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/reports/daily",
    tag = "reports",
    params(DailyReportQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payments taken on one day", body = DailyReportResponse),
        (status = 400, description = "Administrators must name a campus")
    )
)]
pub async fn daily_report(
    report_service: web::Data<ReportService>,
    actor: Actor,
    query: web::Query<DailyReportQuery>,
) -> Result<HttpResponse> {
    match report_service
        .daily_report(&actor, query.into_inner())
        .await
    {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": report
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/reports/cash-balance",
    tag = "reports",
    params(CashBalanceQuery),
    security(("bearer_auth" = [])),
    responses(
        (
            status = 200,
            description = "Income minus expenses over a date range",
            body = CashBalanceResponse
        ),
        (status = 400, description = "Invalid range")
    )
)]
pub async fn cash_balance(
    report_service: web::Data<ReportService>,
    actor: Actor,
    query: web::Query<CashBalanceQuery>,
) -> Result<HttpResponse> {
    match report_service
        .cash_balance(&actor, query.into_inner())
        .await
    {
        Ok(balance) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": balance
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/reports/dashboard",
    tag = "reports",
    params(DashboardQuery),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Today's figures", body = DashboardResponse))
)]
pub async fn dashboard(
    report_service: web::Data<ReportService>,
    actor: Actor,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse> {
    match report_service.dashboard(&actor, query.into_inner()).await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": dashboard
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn report_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/daily", web::get().to(daily_report))
            .route("/cash-balance", web::get().to(cash_balance))
            .route("/dashboard", web::get().to(dashboard)),
    );
}
