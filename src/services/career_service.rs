use crate::entities::{
    StaffRole, career_entity as careers, staff_member_entity as staff,
    subject_entity as subjects,
};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::*;
use crate::services::lookup;
use crate::utils::SharedClock;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

#[derive(Clone)]
pub struct CareerService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl CareerService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    pub async fn create_career(
        &self,
        actor: &Actor,
        request: CreateCareerRequest,
    ) -> AppResult<CareerResponse> {
        actor.require_admin()?;
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::new("name", "career name is required").into());
        }
        check_fees(request.enrollment_fee, request.monthly_fee)?;
        check_duration(request.duration_months)?;

        let career = careers::ActiveModel {
            name: Set(name),
            kind: Set(request.kind),
            duration_months: Set(request.duration_months),
            description: Set(request.description.trim().to_string()),
            enrollment_fee: Set(request.enrollment_fee),
            monthly_fee: Set(request.monthly_fee),
            active: Set(true),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Career {} ({}) created", career.name, career.kind);
        Ok(career.into())
    }

    pub async fn list_careers(&self, query: CareerQuery) -> AppResult<Vec<CareerResponse>> {
        let mut select = careers::Entity::find().order_by_asc(careers::Column::Name);
        if !query.include_inactive.unwrap_or(false) {
            select = select.filter(careers::Column::Active.eq(true));
        }
        let list = select.all(&self.pool).await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn get_career(&self, id: i64) -> AppResult<CareerResponse> {
        Ok(lookup::career_by_id(&self.pool, id).await?.into())
    }

    pub async fn update_career(
        &self,
        actor: &Actor,
        id: i64,
        request: UpdateCareerRequest,
    ) -> AppResult<CareerResponse> {
        actor.require_admin()?;
        let career = lookup::career_by_id(&self.pool, id).await?;
        check_fees(
            request.enrollment_fee.unwrap_or(career.enrollment_fee),
            request.monthly_fee.unwrap_or(career.monthly_fee),
        )?;
        if let Some(months) = request.duration_months {
            check_duration(months)?;
        }

        let mut am = career.into_active_model();
        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ValidationError::new("name", "career name is required").into());
            }
            am.name = Set(name);
        }
        if let Some(kind) = request.kind {
            am.kind = Set(kind);
        }
        if let Some(months) = request.duration_months {
            am.duration_months = Set(months);
        }
        if let Some(description) = request.description {
            am.description = Set(description.trim().to_string());
        }
        if let Some(fee) = request.enrollment_fee {
            am.enrollment_fee = Set(fee);
        }
        if let Some(fee) = request.monthly_fee {
            am.monthly_fee = Set(fee);
        }
        if let Some(active) = request.active {
            am.active = Set(active);
        }
        Ok(am.update(&self.pool).await?.into())
    }

    /// Study plan of a career, in plan order.
    pub async fn list_subjects(&self, career_id: i64) -> AppResult<Vec<SubjectResponse>> {
        lookup::career_by_id(&self.pool, career_id).await?;
        let list = subjects::Entity::find()
            .filter(subjects::Column::CareerId.eq(career_id))
            .order_by_asc(subjects::Column::Position)
            .order_by_asc(subjects::Column::Id)
            .all(&self.pool)
            .await?;

        let teacher_ids: Vec<i64> = list.iter().filter_map(|s| s.teacher_id).collect();
        let names: HashMap<i64, String> = if teacher_ids.is_empty() {
            HashMap::new()
        } else {
            staff::Entity::find()
                .filter(staff::Column::Id.is_in(teacher_ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|m| (m.id, m.full_name()))
                .collect()
        };

        Ok(list
            .into_iter()
            .map(|m| {
                let teacher = m.teacher_id.and_then(|id| names.get(&id).cloned());
                SubjectResponse::new(m, teacher)
            })
            .collect())
    }

    pub async fn create_subject(
        &self,
        actor: &Actor,
        career_id: i64,
        request: CreateSubjectRequest,
    ) -> AppResult<SubjectResponse> {
        actor.require_admin()?;
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::new("name", "subject name is required").into());
        }
        if let Some(term) = request.term {
            check_term(term)?;
        }
        let career = lookup::career_by_id(&self.pool, career_id).await?;

        let position = match request.position {
            Some(position) => position,
            None => {
                let highest: Option<Option<i32>> = subjects::Entity::find()
                    .select_only()
                    .column_as(Expr::col(subjects::Column::Position).max(), "max_position")
                    .filter(subjects::Column::CareerId.eq(career.id))
                    .into_tuple()
                    .one(&self.pool)
                    .await?;
                highest.flatten().unwrap_or(0) + 1
            }
        };

        let subject = subjects::ActiveModel {
            career_id: Set(career.id),
            name: Set(name),
            classroom_link: Set(request
                .classroom_link
                .map(|link| link.trim().to_string())
                .unwrap_or_default()),
            term: Set(request.term),
            position: Set(position),
            teacher_id: Set(None),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Subject {} added to career {} at position {}",
            subject.name,
            career.name,
            subject.position
        );
        Ok(SubjectResponse::new(subject, None))
    }

    pub async fn update_subject(
        &self,
        actor: &Actor,
        id: i64,
        request: UpdateSubjectRequest,
    ) -> AppResult<SubjectResponse> {
        actor.require_admin()?;
        let subject = subject_by_id(&self.pool, id).await?;
        if let Some(term) = request.term {
            check_term(term)?;
        }

        let mut am = subject.into_active_model();
        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ValidationError::new("name", "subject name is required").into());
            }
            am.name = Set(name);
        }
        if let Some(link) = request.classroom_link {
            am.classroom_link = Set(link.trim().to_string());
        }
        if let Some(term) = request.term {
            am.term = Set(Some(term));
        }
        if let Some(position) = request.position {
            am.position = Set(position);
        }
        let updated = am.update(&self.pool).await?;
        let teacher = self.teacher_name(updated.teacher_id).await?;
        Ok(SubjectResponse::new(updated, teacher))
    }

    /// Sets or clears the subject's teacher. Only active teaching staff qualify.
    pub async fn assign_teacher(
        &self,
        actor: &Actor,
        subject_id: i64,
        request: AssignTeacherRequest,
    ) -> AppResult<SubjectResponse> {
        actor.require_admin()?;
        let subject = subject_by_id(&self.pool, subject_id).await?;

        let teacher = match request.teacher_id {
            Some(teacher_id) => {
                let member = staff::Entity::find_by_id(teacher_id)
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Staff member not found".to_string()))?;
                if member.role != StaffRole::Teaching {
                    return Err(ValidationError::new(
                        "teacher_id",
                        "only teaching staff can be assigned to a subject",
                    )
                    .into());
                }
                if !member.active {
                    return Err(ValidationError::new(
                        "teacher_id",
                        "staff member is not active",
                    )
                    .into());
                }
                Some(member)
            }
            None => None,
        };

        let mut am = subject.into_active_model();
        am.teacher_id = Set(teacher.as_ref().map(|m| m.id));
        let updated = am.update(&self.pool).await?;

        match &teacher {
            Some(member) => log::info!(
                "Subject {} assigned to {}",
                updated.id,
                member.full_name()
            ),
            None => log::info!("Subject {} has no teacher now", updated.id),
        }
        Ok(SubjectResponse::new(
            updated,
            teacher.map(|m| m.full_name()),
        ))
    }

    async fn teacher_name(&self, teacher_id: Option<i64>) -> AppResult<Option<String>> {
        let Some(id) = teacher_id else {
            return Ok(None);
        };
        Ok(staff::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .map(|m| m.full_name()))
    }
}

async fn subject_by_id(conn: &DatabaseConnection, id: i64) -> AppResult<subjects::Model> {
    subjects::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Subject not found".to_string()))
}

fn check_term(term: i32) -> Result<(), ValidationError> {
    if term < 1 {
        return Err(ValidationError::new("term", "term starts at 1"));
    }
    Ok(())
}

fn check_fees(enrollment_fee: i64, monthly_fee: i64) -> Result<(), ValidationError> {
    if enrollment_fee < 0 {
        return Err(ValidationError::new(
            "enrollment_fee",
            "enrollment fee cannot be negative",
        ));
    }
    if monthly_fee < 0 {
        return Err(ValidationError::new(
            "monthly_fee",
            "monthly fee cannot be negative",
        ));
    }
    Ok(())
}

fn check_duration(months: i32) -> Result<(), ValidationError> {
    if months < 1 {
        return Err(ValidationError::new(
            "duration_months",
            "duration must be at least one month",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CareerKind;
    use crate::ledger::testing::{career, date};
    use crate::models::actor::tests::{admin, clerk};
    use crate::utils::FixedClock;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> CareerService {
        CareerService::new(db, Arc::new(FixedClock::on(date(2024, 6, 1))))
    }

    fn subject(id: i64, position: i32) -> subjects::Model {
        subjects::Model {
            id,
            career_id: 10,
            name: "Anatomía".into(),
            classroom_link: String::new(),
            term: Some(1),
            position,
            teacher_id: None,
        }
    }

    fn staff_member(id: i64, role: StaffRole, active: bool) -> staff::Model {
        staff::Model {
            id,
            campus_id: 1,
            first_name: "Lucía".into(),
            last_name: "Benítez".into(),
            national_id: format!("{id}000"),
            role,
            phone: String::new(),
            hired_on: date(2023, 3, 1),
            active,
        }
    }

    #[tokio::test]
    async fn test_negative_fee_is_rejected_on_the_fee_field() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = service(db)
            .create_career(
                &admin(),
                CreateCareerRequest {
                    name: "Peluquería".into(),
                    kind: CareerKind::VocationalTraining,
                    duration_months: 12,
                    description: String::new(),
                    enrollment_fee: 100_000,
                    monthly_fee: -1,
                },
            )
            .await;
        match result {
            Err(AppError::InvalidField(err)) => assert_eq!(err.field, "monthly_fee"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_staff_cannot_edit_catalog() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = service(db)
            .update_career(&clerk(1), 10, UpdateCareerRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::PermissionDenied)));
    }

    #[tokio::test]
    async fn test_deactivate_keeps_other_fields() {
        let stored = career(CareerKind::Technical, 300_000, 500_000);
        let mut retired = stored.clone();
        retired.active = false;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored]])
            .append_query_results([[retired]])
            .into_connection();
        let updated = service(db)
            .update_career(
                &admin(),
                10,
                UpdateCareerRequest {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.active);
        assert_eq!(updated.monthly_fee, 500_000);
    }

    #[tokio::test]
    async fn test_subject_without_position_goes_after_the_last_one() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[career(CareerKind::Technical, 300_000, 500_000)]])
            .append_query_results([[BTreeMap::from([(
                "max_position",
                Value::Int(Some(4)),
            )])]])
            .append_query_results([[subject(31, 5)]])
            .into_connection();
        let log_handle = db.clone();
        let created = service(db)
            .create_subject(
                &admin(),
                10,
                CreateSubjectRequest {
                    name: "Farmacología".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.position, 5);

        let log = format!("{:?}", log_handle.into_transaction_log());
        assert!(log.contains("MAX"));
        assert!(log.contains("Int(Some(5))"));
    }

    #[tokio::test]
    async fn test_first_subject_of_a_career_starts_at_one() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[career(CareerKind::Technical, 300_000, 500_000)]])
            .append_query_results([[BTreeMap::from([("max_position", Value::Int(None))])]])
            .append_query_results([[subject(30, 1)]])
            .into_connection();
        let log_handle = db.clone();
        service(db)
            .create_subject(
                &admin(),
                10,
                CreateSubjectRequest {
                    name: "Anatomía".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let log = format!("{:?}", log_handle.into_transaction_log());
        assert!(log.contains("Int(Some(1))"));
    }

    #[tokio::test]
    async fn test_term_below_one_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = service(db)
            .create_subject(
                &admin(),
                10,
                CreateSubjectRequest {
                    name: "Anatomía".into(),
                    term: Some(0),
                    ..Default::default()
                },
            )
            .await;
        match result {
            Err(AppError::InvalidField(err)) => assert_eq!(err.field, "term"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_administrative_staff_cannot_teach_a_subject() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[subject(30, 1)]])
            .append_query_results([[staff_member(7, StaffRole::Administrative, true)]])
            .into_connection();
        let result = service(db)
            .assign_teacher(
                &admin(),
                30,
                AssignTeacherRequest {
                    teacher_id: Some(7),
                },
            )
            .await;
        match result {
            Err(AppError::InvalidField(err)) => assert_eq!(err.field, "teacher_id"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inactive_teacher_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[subject(30, 1)]])
            .append_query_results([[staff_member(8, StaffRole::Teaching, false)]])
            .into_connection();
        let result = service(db)
            .assign_teacher(
                &admin(),
                30,
                AssignTeacherRequest {
                    teacher_id: Some(8),
                },
            )
            .await;
        match result {
            Err(AppError::InvalidField(err)) => assert_eq!(err.field, "teacher_id"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_active_teacher_is_assigned() {
        let mut assigned = subject(30, 1);
        assigned.teacher_id = Some(9);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[subject(30, 1)]])
            .append_query_results([[staff_member(9, StaffRole::Teaching, true)]])
            .append_query_results([[assigned]])
            .into_connection();
        let response = service(db)
            .assign_teacher(
                &admin(),
                30,
                AssignTeacherRequest {
                    teacher_id: Some(9),
                },
            )
            .await
            .unwrap();
        assert_eq!(response.teacher_id, Some(9));
        assert_eq!(response.teacher_name.as_deref(), Some("Lucía Benítez"));
    }

    #[tokio::test]
    async fn test_null_teacher_clears_the_assignment() {
        let mut assigned = subject(30, 1);
        assigned.teacher_id = Some(9);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[assigned]])
            .append_query_results([[subject(30, 1)]])
            .into_connection();
        let response = service(db)
            .assign_teacher(&admin(), 30, AssignTeacherRequest { teacher_id: None })
            .await
            .unwrap();
        assert_eq!(response.teacher_id, None);
        assert!(response.teacher_name.is_none());
    }
}
