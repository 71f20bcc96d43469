use crate::models::HealthResponse;
use actix_web::{HttpResponse, Result, web};
use sea_orm::DatabaseConnection;

/// Liveness check that also pings the database. Not under `/api/v1`.
pub async fn health(pool: web::Data<DatabaseConnection>) -> Result<HttpResponse> {
    match pool.ping().await {
        Ok(()) => Ok(HttpResponse::Ok().json(HealthResponse {
            status: "ok".to_string(),
            database: "up".to_string(),
        })),
        Err(e) => {
            log::warn!("Health check failed to reach the database: {}", e);
            Ok(HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "degraded".to_string(),
                database: "down".to_string(),
            }))
        }
    }
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
