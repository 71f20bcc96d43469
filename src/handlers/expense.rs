use crate::handlers::deletion_response;
use crate::models::*;
use crate::services::{DeletionRequestService, ExpenseService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/expenses",
    tag = "expenses",
    params(ExpenseQuery),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Paginated expenses", body = [ExpenseResponse]))
)]
pub async fn list_expenses(
    expense_service: web::Data<ExpenseService>,
    actor: Actor,
    query: web::Query<ExpenseQuery>,
) -> Result<HttpResponse> {
    match expense_service
        .list_expenses(&actor, query.into_inner())
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
    path = "/expenses",
    tag = "expenses",
    request_body = CreateExpenseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Expense registered", body = ExpenseResponse),
        (status = 400, description = "Invalid amount or salary recipient")
    )
)]
pub async fn create_expense(
    expense_service: web::Data<ExpenseService>,
    actor: Actor,
    request: web::Json<CreateExpenseRequest>,
) -> Result<HttpResponse> {
    match expense_service
        .create_expense(&actor, request.into_inner())
        .await
    {
        Ok(expense) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": expense
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/expenses/{id}",
    tag = "expenses",
    params(("id" = i64, Path, description = "Expense id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Expense", body = ExpenseResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_expense(
    expense_service: web::Data<ExpenseService>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match expense_service.get_expense(&actor, path.into_inner()).await {
        Ok(expense) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": expense
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/expenses/{id}",
    tag = "expenses",
    params(("id" = i64, Path, description = "Expense id")),
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
pub async fn delete_expense(
    deletion_service: web::Data<DeletionRequestService>,
    actor: Actor,
    path: web::Path<i64>,
    request: Option<web::Json<DeleteRequest>>,
) -> Result<HttpResponse> {
    let target = DeletionTarget::Expense(path.into_inner());
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    match deletion_service
        .delete_or_request(&actor, target, request)
        .await
    {
        Ok(outcome) => Ok(deletion_response(outcome)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn expense_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/expenses")
            .route("", web::get().to(list_expenses))
            .route("", web::post().to(create_expense))
            .route("/{id}", web::get().to(get_expense))
            .route("/{id}", web::delete().to(delete_expense)),
    );
}
