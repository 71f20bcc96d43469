use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use syscep_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::{JwtService, SharedClock, SystemClock},
};

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {e}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config =
        Config::from_toml().map_err(|e| startup_error("Failed to load configuration", e))?;

    let pool = create_pool(&config.database)
        .await
        .map_err(|e| startup_error("Failed to create database connection pool", e))?;

    run_migrations(&pool)
        .await
        .map_err(|e| startup_error("Failed to run database migrations", e))?;

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );
    let clock: SharedClock = Arc::new(SystemClock);

    let auth_service = AuthService::new(pool.clone(), jwt_service.clone(), clock.clone());
    let user_service = UserService::new(pool.clone(), clock.clone());
    let campus_service = CampusService::new(pool.clone(), clock.clone());
    let career_service = CareerService::new(pool.clone(), clock.clone());
    let student_service = StudentService::new(
        pool.clone(),
        clock.clone(),
        config.ledger.installment_match,
    );
    let payment_service = PaymentService::new(
        pool.clone(),
        clock.clone(),
        config.ledger.receipt_number_width,
    );
    let redemption_service = RedemptionService::new(pool.clone(), clock.clone());
    let expense_service = ExpenseService::new(pool.clone(), clock.clone());
    let staff_service = StaffService::new(pool.clone(), clock.clone());
    let report_service = ReportService::new(pool.clone(), clock.clone());
    let deletion_service = DeletionRequestService::new(pool.clone(), clock.clone());

    auth_service
        .bootstrap_admin(&config.bootstrap)
        .await
        .map_err(|e| startup_error("Failed to bootstrap the administrator account", e))?;

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let allowed_origins = config.server.allowed_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors(&allowed_origins))
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(campus_service.clone()))
            .app_data(web::Data::new(career_service.clone()))
            .app_data(web::Data::new(student_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(redemption_service.clone()))
            .app_data(web::Data::new(expense_service.clone()))
            .app_data(web::Data::new(staff_service.clone()))
            .app_data(web::Data::new(report_service.clone()))
            .app_data(web::Data::new(deletion_service.clone()))
            .configure(swagger_config)
            .configure(handlers::health_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::user_config)
                    .configure(handlers::campus_config)
                    .configure(handlers::career_config)
                    .configure(handlers::subject_config)
                    .configure(handlers::student_config)
                    .configure(handlers::payment_config)
                    .configure(handlers::expense_config)
                    .configure(handlers::staff_config)
                    .configure(handlers::report_config)
                    .configure(handlers::deletion_request_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
