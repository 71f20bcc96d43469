use crate::models::PaymentResponse;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyReportQuery {
    /// Required for administrators
    pub campus_id: Option<i64>,
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

/// Day-end cash report ("rendición") of a campus.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DailyReportResponse {
    pub campus_id: i64,
    pub date: NaiveDate,
    pub payment_count: u64,
    pub total: i64,
    pub payments: Vec<PaymentResponse>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CashBalanceQuery {
    /// Required for administrators
    pub campus_id: Option<i64>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CashBalanceResponse {
    pub campus_id: i64,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub income: i64,
    pub expenses: i64,
    pub balance: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Optional narrowing for administrators
    pub campus_id: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CoverageBreakdown {
    pub up_to_date: u64,
    pub due_soon: u64,
    pub overdue: u64,
    pub no_payments: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub campus_id: Option<i64>,
    pub date: NaiveDate,
    pub income_today: i64,
    pub payments_today: u64,
    pub active_students: u64,
    pub active_staff: u64,
    pub active_careers: u64,
    /// Active campuses visible to the caller
    pub active_campuses: u64,
    pub coverage: CoverageBreakdown,
    /// Latest payments registered, newest first
    pub recent_payments: Vec<PaymentResponse>,
}
