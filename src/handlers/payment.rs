use crate::handlers::deletion_response;
use crate::models::*;
use crate::services::{DeletionRequestService, PaymentService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/payments",
    tag = "payments",
    params(PaymentQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paginated payments, newest first", body = [PaymentResponse])
    )
)]
pub async fn list_payments(
    payment_service: web::Data<PaymentService>,
    actor: Actor,
    query: web::Query<PaymentQuery>,
) -> Result<HttpResponse> {
    match payment_service
        .list_payments(&actor, query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Records a payment. Installment, points and late fee are worked out from
/// the payment date and the student's due dates.
#[utoipa::path(
    post,
    path = "/payments",
    tag = "payments",
    request_body = CreatePaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Payment recorded", body = PaymentResponse),
        (status = 400, description = "Invalid payment data"),
        (status = 409, description = "Receipt number already used")
    )
)]
pub async fn create_payment(
    payment_service: web::Data<PaymentService>,
    actor: Actor,
    request: web::Json<CreatePaymentRequest>,
) -> Result<HttpResponse> {
    match payment_service
        .create_payment(&actor, request.into_inner())
        .await
    {
        Ok(payment) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments/{id}",
    tag = "payments",
    params(("id" = i64, Path, description = "Payment id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payment", body = PaymentResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_payment(
    payment_service: web::Data<PaymentService>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match payment_service.get_payment(&actor, path.into_inner()).await {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/payments/{id}",
    tag = "payments",
    params(("id" = i64, Path, description = "Payment id")),
    request_body = UpdatePaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payment updated", body = PaymentResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_payment(
    payment_service: web::Data<PaymentService>,
    actor: Actor,
    path: web::Path<i64>,
    request: web::Json<UpdatePaymentRequest>,
) -> Result<HttpResponse> {
    match payment_service
        .update_payment(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/payments/{id}",
    tag = "payments",
    params(("id" = i64, Path, description = "Payment id")),
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
pub async fn delete_payment(
    deletion_service: web::Data<DeletionRequestService>,
    actor: Actor,
    path: web::Path<i64>,
    request: Option<web::Json<DeleteRequest>>,
) -> Result<HttpResponse> {
    let target = DeletionTarget::Payment(path.into_inner());
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    match deletion_service
        .delete_or_request(&actor, target, request)
        .await
    {
        Ok(outcome) => Ok(deletion_response(outcome)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("", web::get().to(list_payments))
            .route("", web::post().to(create_payment))
            .route("/{id}", web::get().to(get_payment))
            .route("/{id}", web::put().to(update_payment))
            .route("/{id}", web::delete().to(delete_payment)),
    );
}
