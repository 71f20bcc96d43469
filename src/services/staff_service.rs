use crate::entities::{staff_attendance_entity as attendance, staff_member_entity as staff};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::*;
use crate::services::lookup;
use crate::utils::{SharedClock, normalize_py_phone};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[derive(Clone)]
pub struct StaffService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl StaffService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    pub async fn create_staff_member(
        &self,
        actor: &Actor,
        request: CreateStaffMemberRequest,
    ) -> AppResult<StaffMemberResponse> {
        let scope = actor.campus_scope()?;
        let campus_id = scope.campus_for_write(request.campus_id)?;

        let national_id = request.national_id.trim().to_string();
        if national_id.is_empty() {
            return Err(ValidationError::new("national_id", "national id is required").into());
        }
        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(ValidationError::new("first_name", "full name is required").into());
        }
        let phone = normalize_py_phone(&request.phone)?;

        let member = staff::ActiveModel {
            campus_id: Set(campus_id),
            first_name: Set(request.first_name.trim().to_string()),
            last_name: Set(request.last_name.trim().to_string()),
            national_id: Set(national_id.clone()),
            role: Set(request.role),
            phone: Set(phone),
            hired_on: Set(request.hired_on.unwrap_or_else(|| self.clock.today())),
            active: Set(true),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| {
            lookup::unique_violation_as_conflict(
                e,
                format!("a staff member with national id {national_id} already exists"),
            )
        })?;

        log::info!(
            "Staff member {} ({}) added to campus {}",
            member.full_name(),
            member.role,
            campus_id
        );
        Ok(member.into())
    }

    pub async fn list_staff(
        &self,
        actor: &Actor,
        query: StaffQuery,
    ) -> AppResult<Vec<StaffMemberResponse>> {
        let scope = actor.campus_scope()?;
        let mut select = staff::Entity::find()
            .order_by_asc(staff::Column::LastName)
            .order_by_asc(staff::Column::FirstName);
        if let Some(campus_id) = scope.filter(query.campus_id) {
            select = select.filter(staff::Column::CampusId.eq(campus_id));
        }
        if let Some(role) = query.role {
            select = select.filter(staff::Column::Role.eq(role));
        }
        if let Some(active) = query.active {
            select = select.filter(staff::Column::Active.eq(active));
        }
        let list = select.all(&self.pool).await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// One attendance row per member and day; a second one is a conflict.
    pub async fn record_attendance(
        &self,
        actor: &Actor,
        request: RecordAttendanceRequest,
    ) -> AppResult<AttendanceResponse> {
        let scope = actor.campus_scope()?;
        let member = lookup::staff_member_in_scope(&self.pool, &scope, request.staff_member_id)
            .await?;
        let date = request.date.unwrap_or_else(|| self.clock.today());

        let existing = attendance::Entity::find()
            .filter(attendance::Column::StaffMemberId.eq(member.id))
            .filter(attendance::Column::Date.eq(date))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "attendance of {} on {date} is already recorded",
                member.full_name()
            )));
        }

        let row = attendance::ActiveModel {
            staff_member_id: Set(member.id),
            date: Set(date),
            present: Set(request.present),
            notes: Set(request.notes.trim().to_string()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| {
            lookup::unique_violation_as_conflict(e, "attendance is already recorded for that day")
        })?;
        Ok(row.into())
    }

    pub async fn list_attendance(
        &self,
        actor: &Actor,
        query: AttendanceQuery,
    ) -> AppResult<Vec<AttendanceResponse>> {
        let scope = actor.campus_scope()?;
        let date = query.date.unwrap_or_else(|| self.clock.today());

        let mut members = staff::Entity::find();
        if let Some(campus_id) = scope.campus_id() {
            members = members.filter(staff::Column::CampusId.eq(campus_id));
        }
        if let Some(id) = query.staff_member_id {
            members = members.filter(staff::Column::Id.eq(id));
        }
        let member_ids: Vec<i64> = members
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = attendance::Entity::find()
            .filter(attendance::Column::StaffMemberId.is_in(member_ids))
            .filter(attendance::Column::Date.eq(date))
            .order_by_asc(attendance::Column::StaffMemberId)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StaffRole;
    use crate::ledger::testing::date;
    use crate::models::actor::tests::clerk;
    use crate::utils::FixedClock;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn member(campus_id: i64) -> staff::Model {
        staff::Model {
            id: 4,
            campus_id,
            first_name: "Luis".into(),
            last_name: "Acosta".into(),
            national_id: "3210987".into(),
            role: StaffRole::Teaching,
            phone: "+595991234567".into(),
            hired_on: date(2023, 2, 1),
            active: true,
        }
    }

    fn service(db: DatabaseConnection) -> StaffService {
        StaffService::new(db, Arc::new(FixedClock::on(date(2024, 6, 3))))
    }

    fn request() -> RecordAttendanceRequest {
        RecordAttendanceRequest {
            staff_member_id: 4,
            date: None,
            present: true,
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_second_attendance_on_same_day_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[member(1)]])
            .append_query_results([[attendance::Model {
                id: 1,
                staff_member_id: 4,
                date: date(2024, 6, 3),
                present: true,
                notes: String::new(),
            }]])
            .into_connection();
        let result = service(db).record_attendance(&clerk(1), request()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_attendance_defaults_to_today() {
        let recorded = attendance::Model {
            id: 2,
            staff_member_id: 4,
            date: date(2024, 6, 3),
            present: true,
            notes: String::new(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[member(1)]])
            .append_query_results([Vec::<attendance::Model>::new()])
            .append_query_results([[recorded]])
            .into_connection();
        let row = service(db)
            .record_attendance(&clerk(1), request())
            .await
            .unwrap();
        assert_eq!(row.date, date(2024, 6, 3));
    }

    #[tokio::test]
    async fn test_member_of_other_campus_is_hidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[member(2)]])
            .into_connection();
        let result = service(db).record_attendance(&clerk(1), request()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
