use crate::entities::{ExpenseCategory, expense_entity};
use crate::models::PaginationParams;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateExpenseRequest {
    pub campus_id: Option<i64>,
    pub category: ExpenseCategory,
    #[schema(example = 1500000)]
    pub amount: i64,
    /// Defaults to today
    pub expense_date: Option<NaiveDate>,
    pub receipt_number: Option<String>,
    /// Only kept for salary expenses
    pub staff_member_id: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseQuery {
    pub campus_id: Option<i64>,
    pub category: Option<ExpenseCategory>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl ExpenseQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpenseResponse {
    pub id: i64,
    pub campus_id: i64,
    pub category: ExpenseCategory,
    pub amount: i64,
    pub expense_date: NaiveDate,
    pub receipt_number: Option<String>,
    pub staff_member_id: Option<i64>,
    pub description: Option<String>,
    pub registered_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<expense_entity::Model> for ExpenseResponse {
    fn from(m: expense_entity::Model) -> Self {
        Self {
            id: m.id,
            campus_id: m.campus_id,
            category: m.category,
            amount: m.amount,
            expense_date: m.expense_date,
            receipt_number: m.receipt_number,
            staff_member_id: m.staff_member_id,
            description: m.description,
            registered_by: m.registered_by,
            created_at: m.created_at,
        }
    }
}
