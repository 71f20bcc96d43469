use crate::entities::{
    campus_entity as campuses, career_entity as careers, expense_entity as expenses,
    payment_entity as payments, staff_member_entity as staff, student_entity as students,
};
use crate::error::{AppResult, ValidationError};
use crate::ledger::{CoverageStatus, coverage_from};
use crate::models::*;
use crate::services::lookup;
use crate::services::payment_service::student_names;
use crate::utils::SharedClock;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Latest payments listed on the dashboard.
const RECENT_PAYMENTS: u64 = 10;

#[derive(Clone)]
pub struct ReportService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl ReportService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Payments taken at one campus on one day.
    pub async fn daily_report(
        &self,
        actor: &Actor,
        query: DailyReportQuery,
    ) -> AppResult<DailyReportResponse> {
        let scope = actor.campus_scope()?;
        let campus_id = scope.campus_for_write(query.campus_id)?;
        let date = query.date.unwrap_or_else(|| self.clock.today());

        let rows = payments::Entity::find()
            .filter(payments::Column::CampusId.eq(campus_id))
            .filter(payments::Column::PaymentDate.eq(date))
            .order_by_asc(payments::Column::Id)
            .all(&self.pool)
            .await?;
        let total = rows.iter().map(|p| p.amount_paid).sum();
        let names = student_names(&self.pool, &rows).await?;

        Ok(DailyReportResponse {
            campus_id,
            date,
            payment_count: rows.len() as u64,
            total,
            payments: rows
                .into_iter()
                .map(|p| {
                    let name = p.student_id.and_then(|sid| names.get(&sid).cloned());
                    PaymentResponse::new(p, name)
                })
                .collect(),
        })
    }

    pub async fn cash_balance(
        &self,
        actor: &Actor,
        query: CashBalanceQuery,
    ) -> AppResult<CashBalanceResponse> {
        let scope = actor.campus_scope()?;
        let campus_id = scope.campus_for_write(query.campus_id)?;
        if query.to < query.from {
            return Err(ValidationError::new("to", "end date is before start date").into());
        }

        let income = lookup::sum_amount_paid(
            &self.pool,
            Condition::all()
                .add(payments::Column::CampusId.eq(campus_id))
                .add(payments::Column::PaymentDate.between(query.from, query.to)),
        )
        .await?;
        let spent = lookup::sum_expenses(
            &self.pool,
            Condition::all()
                .add(expenses::Column::CampusId.eq(campus_id))
                .add(expenses::Column::ExpenseDate.between(query.from, query.to)),
        )
        .await?;

        Ok(CashBalanceResponse {
            campus_id,
            from: query.from,
            to: query.to,
            income,
            expenses: spent,
            balance: income - spent,
        })
    }

    pub async fn dashboard(
        &self,
        actor: &Actor,
        query: DashboardQuery,
    ) -> AppResult<DashboardResponse> {
        let scope = actor.campus_scope()?;
        let campus_id = scope.filter(query.campus_id);
        let today = self.clock.today();

        let mut todays = Condition::all().add(payments::Column::PaymentDate.eq(today));
        let mut active = Condition::all().add(students::Column::Active.eq(true));
        if let Some(id) = campus_id {
            todays = todays.add(payments::Column::CampusId.eq(id));
            active = active.add(students::Column::CampusId.eq(id));
        }

        let income_today = lookup::sum_amount_paid(&self.pool, todays.clone()).await?;
        let payments_today = payments::Entity::find()
            .filter(todays)
            .count(&self.pool)
            .await?;

        let student_ids: Vec<i64> = students::Entity::find()
            .select_only()
            .column(students::Column::Id)
            .filter(active)
            .into_tuple()
            .all(&self.pool)
            .await?;
        let latest = lookup::latest_coverage_dates(&self.pool, &student_ids).await?;

        let mut coverage = CoverageBreakdown::default();
        for id in &student_ids {
            match coverage_from(latest.get(id).copied(), today).status {
                CoverageStatus::UpToDate => coverage.up_to_date += 1,
                CoverageStatus::DueSoon => coverage.due_soon += 1,
                CoverageStatus::Overdue => coverage.overdue += 1,
                CoverageStatus::NoPayments => coverage.no_payments += 1,
            }
        }

        let mut recent = payments::Entity::find()
            .order_by_desc(payments::Column::CreatedAt)
            .order_by_desc(payments::Column::Id)
            .limit(RECENT_PAYMENTS);
        let mut active_staff = staff::Entity::find().filter(staff::Column::Active.eq(true));
        let mut active_campuses =
            campuses::Entity::find().filter(campuses::Column::Active.eq(true));
        if let Some(id) = campus_id {
            recent = recent.filter(payments::Column::CampusId.eq(id));
            active_staff = active_staff.filter(staff::Column::CampusId.eq(id));
            active_campuses = active_campuses.filter(campuses::Column::Id.eq(id));
        }

        let recent = recent.all(&self.pool).await?;
        let names = student_names(&self.pool, &recent).await?;
        let recent_payments = recent
            .into_iter()
            .map(|p| {
                let name = p.student_id.and_then(|sid| names.get(&sid).cloned());
                PaymentResponse::new(p, name)
            })
            .collect();

        let active_staff = active_staff.count(&self.pool).await?;
        let active_careers = careers::Entity::find()
            .filter(careers::Column::Active.eq(true))
            .count(&self.pool)
            .await?;
        let active_campuses = active_campuses.count(&self.pool).await?;

        Ok(DashboardResponse {
            campus_id,
            date: today,
            income_today,
            payments_today,
            active_students: student_ids.len() as u64,
            active_staff,
            active_careers,
            active_campuses,
            coverage,
            recent_payments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::ledger::testing::{date, payment, student};
    use crate::models::actor::tests::{admin, clerk};
    use crate::utils::FixedClock;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> ReportService {
        ReportService::new(db, Arc::new(FixedClock::on(date(2024, 6, 1))))
    }

    fn total(value: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("total", sea_orm::Value::BigInt(Some(value)))])
    }

    fn count(value: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(value)))])
    }

    #[tokio::test]
    async fn test_cash_balance_subtracts_expenses() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[total(3_000_000)]])
            .append_query_results([[total(1_200_000)]])
            .into_connection();
        let balance = service(db)
            .cash_balance(
                &clerk(1),
                CashBalanceQuery {
                    campus_id: None,
                    from: date(2024, 5, 1),
                    to: date(2024, 5, 31),
                },
            )
            .await
            .unwrap();
        assert_eq!(balance.campus_id, 1);
        assert_eq!(balance.income, 3_000_000);
        assert_eq!(balance.expenses, 1_200_000);
        assert_eq!(balance.balance, 1_800_000);
    }

    #[tokio::test]
    async fn test_inverted_range_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = service(db)
            .cash_balance(
                &clerk(1),
                CashBalanceQuery {
                    campus_id: None,
                    from: date(2024, 5, 31),
                    to: date(2024, 5, 1),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidField(_))));
    }

    #[tokio::test]
    async fn test_daily_report_requires_campus_for_admins() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = service(db)
            .daily_report(
                &admin(),
                DailyReportQuery {
                    campus_id: None,
                    date: None,
                },
            )
            .await;
        match result {
            Err(AppError::InvalidField(err)) => assert_eq!(err.field, "campus_id"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dashboard_lists_recent_payments_and_catalog_counts() {
        let mut walk_in = payment(6, date(2024, 6, 1));
        walk_in.student_id = None;
        walk_in.client_name = Some("Carlos Giménez".into());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[total(1_000_000)]])
            .append_query_results([[count(2)]])
            .append_query_results([[BTreeMap::from([("id", Value::BigInt(Some(1)))])]])
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .append_query_results([[walk_in, payment(5, date(2024, 6, 1))]])
            .append_query_results([[student(10, Some(date(2024, 3, 1)))]])
            .append_query_results([[count(4)]])
            .append_query_results([[count(3)]])
            .append_query_results([[count(1)]])
            .into_connection();
        let log_handle = db.clone();

        let dashboard = service(db)
            .dashboard(&clerk(1), DashboardQuery { campus_id: None })
            .await
            .unwrap();
        assert_eq!(dashboard.campus_id, Some(1));
        assert_eq!(dashboard.income_today, 1_000_000);
        assert_eq!(dashboard.payments_today, 2);
        assert_eq!(dashboard.active_students, 1);
        assert_eq!(dashboard.coverage.no_payments, 1);
        assert_eq!(dashboard.active_staff, 4);
        assert_eq!(dashboard.active_careers, 3);
        assert_eq!(dashboard.active_campuses, 1);

        let payers: Vec<&str> = dashboard
            .recent_payments
            .iter()
            .map(|p| p.payer_name.as_str())
            .collect();
        assert_eq!(payers, ["Carlos Giménez", "Ana Benítez"]);

        let statements = format!("{:?}", log_handle.into_transaction_log());
        assert!(statements.contains("LIMIT"));
    }
}
