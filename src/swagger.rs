use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    CareerKind, DeletionStatus, DeletionTargetKind, ExpenseCategory, PaymentMethod, StaffRole,
};
use crate::handlers;
use crate::ledger::{Coverage, CoverageStatus, PaymentTiming, ScheduleSlot, SlotState};
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::user::list_users,
        handlers::user::create_user,
        handlers::user::assign_campus,
        handlers::user::toggle_active,
        handlers::campus::list_campuses,
        handlers::campus::create_campus,
        handlers::campus::list_bank_accounts,
        handlers::campus::create_bank_account,
        handlers::career::list_careers,
        handlers::career::create_career,
        handlers::career::get_career,
        handlers::career::update_career,
        handlers::career::delete_career,
        handlers::subject::list_subjects,
        handlers::subject::create_subject,
        handlers::subject::update_subject,
        handlers::subject::assign_teacher,
        handlers::student::list_students,
        handlers::student::enroll_student,
        handlers::student::get_student,
        handlers::student::update_student,
        handlers::student::delete_student,
        handlers::student::get_coverage,
        handlers::student::get_schedule,
        handlers::student::get_points,
        handlers::student::list_redemptions,
        handlers::student::create_redemption,
        handlers::payment::list_payments,
        handlers::payment::create_payment,
        handlers::payment::get_payment,
        handlers::payment::update_payment,
        handlers::payment::delete_payment,
        handlers::expense::list_expenses,
        handlers::expense::create_expense,
        handlers::expense::get_expense,
        handlers::expense::delete_expense,
        handlers::staff::list_staff,
        handlers::staff::create_staff_member,
        handlers::staff::list_attendance,
        handlers::staff::record_attendance,
        handlers::staff::delete_staff_member,
        handlers::report::daily_report,
        handlers::report::cash_balance,
        handlers::report::dashboard,
        handlers::deletion_request::list_requests,
        handlers::deletion_request::get_request,
        handlers::deletion_request::approve_request,
        handlers::deletion_request::reject_request,
    ),
    components(
        schemas(
            LoginRequest,
            RefreshTokenRequest,
            AuthResponse,
            CreateUserRequest,
            AssignCampusRequest,
            UserResponse,
            CreateCampusRequest,
            CampusResponse,
            CreateBankAccountRequest,
            BankAccountResponse,
            CareerKind,
            CreateCareerRequest,
            UpdateCareerRequest,
            CareerResponse,
            CreateSubjectRequest,
            UpdateSubjectRequest,
            AssignTeacherRequest,
            SubjectResponse,
            EnrollStudentRequest,
            UpdateStudentRequest,
            StudentResponse,
            StudentSummaryResponse,
            StudentDetailResponse,
            PointsResponse,
            ScheduleResponse,
            ScheduleSlot,
            SlotState,
            PaymentTiming,
            Coverage,
            CoverageStatus,
            PaymentMethod,
            CreatePaymentRequest,
            UpdatePaymentRequest,
            PaymentResponse,
            CreateRedemptionRequest,
            RedemptionResponse,
            ExpenseCategory,
            CreateExpenseRequest,
            ExpenseResponse,
            StaffRole,
            CreateStaffMemberRequest,
            StaffMemberResponse,
            RecordAttendanceRequest,
            AttendanceResponse,
            DailyReportResponse,
            CashBalanceResponse,
            CoverageBreakdown,
            DashboardResponse,
            DeletionTarget,
            DeletionTargetKind,
            DeletionStatus,
            DeletionSnapshot,
            DeleteRequest,
            DecisionRequest,
            DeletionRequestResponse,
            DeletionOutcome,
            MessageResponse,
            HealthResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "users", description = "Back-office accounts"),
        (name = "campuses", description = "Campuses and bank accounts"),
        (name = "careers", description = "Career catalog"),
        (name = "subjects", description = "Study plans and teacher assignment"),
        (name = "students", description = "Enrollment, coverage, installments and points"),
        (name = "payments", description = "Payment recording"),
        (name = "expenses", description = "Outgoing payments"),
        (name = "staff", description = "Staff and attendance"),
        (name = "reports", description = "Daily report, cash balance and dashboard"),
        (name = "deletion-requests", description = "Deletion approval workflow"),
    ),
    info(
        title = "Back Office API",
        version = "1.0.0",
        description = "Multi-campus school back office REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_ledger_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/payments",
            "/students/{id}/schedule",
            "/students/{id}/redemptions",
            "/deletion-requests/{id}/approve",
            "/careers/{id}/subjects",
            "/subjects/{id}/teacher",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemes = doc
            .components
            .as_ref()
            .map(|c| c.security_schemes.contains_key("bearer_auth"));
        assert_eq!(schemes, Some(true));
    }
}
