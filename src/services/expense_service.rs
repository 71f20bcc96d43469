use crate::entities::{ExpenseCategory, expense_entity as expenses};
use crate::error::{AppResult, ValidationError};
use crate::models::*;
use crate::services::lookup;
use crate::utils::SharedClock;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct ExpenseService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl ExpenseService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Registers an outgoing payment. A staff member is only linked to salary
    /// expenses and is dropped for every other category.
    pub async fn create_expense(
        &self,
        actor: &Actor,
        request: CreateExpenseRequest,
    ) -> AppResult<ExpenseResponse> {
        let scope = actor.campus_scope()?;
        let campus_id = scope.campus_for_write(request.campus_id)?;
        if request.amount <= 0 {
            return Err(
                ValidationError::new("amount", "amount must be greater than 0").into(),
            );
        }

        let staff_member_id = match (request.category, request.staff_member_id) {
            (ExpenseCategory::Salary, Some(id)) => {
                let member = lookup::staff_member_in_scope(&self.pool, &scope, id).await?;
                if member.campus_id != campus_id {
                    return Err(ValidationError::new(
                        "staff_member_id",
                        "staff member works at another campus",
                    )
                    .into());
                }
                Some(member.id)
            }
            _ => None,
        };

        let expense = expenses::ActiveModel {
            campus_id: Set(campus_id),
            category: Set(request.category),
            amount: Set(request.amount),
            expense_date: Set(request.expense_date.unwrap_or_else(|| self.clock.today())),
            receipt_number: Set(trimmed(request.receipt_number)),
            staff_member_id: Set(staff_member_id),
            description: Set(trimmed(request.description)),
            registered_by: Set(Some(actor.user_id)),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Expense {} ({}) of {} registered at campus {} by {}",
            expense.id,
            expense.category,
            expense.amount,
            campus_id,
            actor.username
        );
        Ok(expense.into())
    }

    pub async fn get_expense(&self, actor: &Actor, id: i64) -> AppResult<ExpenseResponse> {
        let scope = actor.campus_scope()?;
        Ok(lookup::expense_in_scope(&self.pool, &scope, id)
            .await?
            .into())
    }

    pub async fn list_expenses(
        &self,
        actor: &Actor,
        query: ExpenseQuery,
    ) -> AppResult<PaginatedResponse<ExpenseResponse>> {
        let scope = actor.campus_scope()?;
        let params = query.pagination();

        let mut condition = Condition::all();
        if let Some(campus_id) = scope.filter(query.campus_id) {
            condition = condition.add(expenses::Column::CampusId.eq(campus_id));
        }
        if let Some(category) = query.category {
            condition = condition.add(expenses::Column::Category.eq(category));
        }
        if let Some(from) = query.from {
            condition = condition.add(expenses::Column::ExpenseDate.gte(from));
        }
        if let Some(to) = query.to {
            condition = condition.add(expenses::Column::ExpenseDate.lte(to));
        }

        let base_query = expenses::Entity::find()
            .filter(condition)
            .order_by_desc(expenses::Column::ExpenseDate)
            .order_by_desc(expenses::Column::Id);
        let total = base_query.clone().count(&self.pool).await?;
        let rows = base_query
            .limit(params.page_size())
            .offset(params.page_index() * params.page_size())
            .all(&self.pool)
            .await?;
        Ok(PaginatedResponse::new(
            rows.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::ledger::testing::date;
    use crate::models::actor::tests::clerk;
    use crate::utils::FixedClock;
    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> ExpenseService {
        ExpenseService::new(db, Arc::new(FixedClock::on(date(2024, 6, 1))))
    }

    fn request(category: ExpenseCategory, staff_member_id: Option<i64>) -> CreateExpenseRequest {
        CreateExpenseRequest {
            campus_id: None,
            category,
            amount: 2_500_000,
            expense_date: None,
            receipt_number: None,
            staff_member_id,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_staff_member_dropped_for_non_salary_expense() {
        let stored = expenses::Model {
            id: 5,
            campus_id: 1,
            category: ExpenseCategory::Rent,
            amount: 2_500_000,
            expense_date: date(2024, 6, 1),
            receipt_number: None,
            staff_member_id: None,
            description: None,
            registered_by: Some(2),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
        };
        // no staff lookup is issued: the only queued result is the insert
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored]])
            .into_connection();
        let created = service(db)
            .create_expense(&clerk(1), request(ExpenseCategory::Rent, Some(9)))
            .await
            .unwrap();
        assert_eq!(created.staff_member_id, None);
        assert_eq!(created.campus_id, 1);
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut zero = request(ExpenseCategory::Supplies, None);
        zero.amount = 0;
        match service(db).create_expense(&clerk(1), zero).await {
            Err(AppError::InvalidField(err)) => assert_eq!(err.field, "amount"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_salary_recipient_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<crate::entities::staff_member_entity::Model>::new()])
            .into_connection();
        let result = service(db)
            .create_expense(&clerk(1), request(ExpenseCategory::Salary, Some(9)))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
