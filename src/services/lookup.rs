//! Scoped record loaders shared by the services.

use crate::entities::{
    bank_account_entity as bank_accounts, campus_entity as campuses, career_entity as careers,
    expense_entity as expenses, payment_entity as payments, staff_member_entity as staff,
    student_entity as students,
};
use crate::error::{AppError, AppResult};
use crate::models::CampusScope;
use chrono::NaiveDate;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect, SqlErr,
};
use std::collections::HashMap;

pub(crate) async fn student_in_scope<C: ConnectionTrait>(
    conn: &C,
    scope: &CampusScope,
    id: i64,
) -> AppResult<students::Model> {
    let student = students::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;
    scope.ensure_visible(student.campus_id, "Student")?;
    Ok(student)
}

pub(crate) async fn career_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> AppResult<careers::Model> {
    careers::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Career not found".to_string()))
}

pub(crate) async fn campus_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> AppResult<campuses::Model> {
    campuses::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Campus not found".to_string()))
}

pub(crate) async fn bank_account_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> AppResult<bank_accounts::Model> {
    bank_accounts::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Bank account not found".to_string()))
}

pub(crate) async fn payment_in_scope<C: ConnectionTrait>(
    conn: &C,
    scope: &CampusScope,
    id: i64,
) -> AppResult<payments::Model> {
    let payment = payments::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;
    scope.ensure_visible(payment.campus_id, "Payment")?;
    Ok(payment)
}

pub(crate) async fn expense_in_scope<C: ConnectionTrait>(
    conn: &C,
    scope: &CampusScope,
    id: i64,
) -> AppResult<expenses::Model> {
    let expense = expenses::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Expense not found".to_string()))?;
    scope.ensure_visible(expense.campus_id, "Expense")?;
    Ok(expense)
}

pub(crate) async fn staff_member_in_scope<C: ConnectionTrait>(
    conn: &C,
    scope: &CampusScope,
    id: i64,
) -> AppResult<staff::Model> {
    let member = staff::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Staff member not found".to_string()))?;
    scope.ensure_visible(member.campus_id, "Staff member")?;
    Ok(member)
}

/// Latest `valid_until` of installment payments, per student.
pub(crate) async fn latest_coverage_dates<C: ConnectionTrait>(
    conn: &C,
    student_ids: &[i64],
) -> AppResult<HashMap<i64, NaiveDate>> {
    if student_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Option<i64>, Option<NaiveDate>)> = payments::Entity::find()
        .select_only()
        .column(payments::Column::StudentId)
        .column_as(Expr::col(payments::Column::ValidUntil).max(), "latest")
        .filter(payments::Column::StudentId.is_in(student_ids.iter().copied()))
        .filter(payments::Column::IsEnrollmentFee.eq(false))
        .group_by(payments::Column::StudentId)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(student_id, latest)| Some((student_id?, latest?)))
        .collect())
}

/// Σ amount_paid over payments matching `condition`, 0 when none.
pub(crate) async fn sum_amount_paid<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
) -> AppResult<i64> {
    let total: Option<Option<i64>> = payments::Entity::find()
        .select_only()
        .column_as(
            Expr::col(payments::Column::AmountPaid)
                .sum()
                .cast_as(Alias::new("BIGINT")),
            "total",
        )
        .filter(condition)
        .into_tuple()
        .one(conn)
        .await?;
    Ok(total.flatten().unwrap_or(0))
}

/// Σ amount over expenses matching `condition`, 0 when none.
pub(crate) async fn sum_expenses<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
) -> AppResult<i64> {
    let total: Option<Option<i64>> = expenses::Entity::find()
        .select_only()
        .column_as(
            Expr::col(expenses::Column::Amount)
                .sum()
                .cast_as(Alias::new("BIGINT")),
            "total",
        )
        .filter(condition)
        .into_tuple()
        .one(conn)
        .await?;
    Ok(total.flatten().unwrap_or(0))
}

/// Maps a unique-index violation to `Conflict`; other errors pass through.
pub(crate) fn unique_violation_as_conflict(err: DbErr, message: impl Into<String>) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(message.into()),
        _ => AppError::DatabaseError(err),
    }
}
