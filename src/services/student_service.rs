use crate::entities::{
    payment_entity as payments, redemption_entity as redemptions, student_entity as students,
};
use crate::error::{AppError, AppResult, ValidationError};
use crate::ledger::{
    Coverage, InstallmentMatch, available_points, build_installment_schedule, coverage_from,
    coverage_status, displayed_points,
};
use crate::models::*;
use crate::services::lookup;
use crate::utils::{SharedClock, normalize_py_phone};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct StudentService {
    pool: DatabaseConnection,
    clock: SharedClock,
    installment_match: InstallmentMatch,
}

impl StudentService {
    pub fn new(
        pool: DatabaseConnection,
        clock: SharedClock,
        installment_match: InstallmentMatch,
    ) -> Self {
        Self {
            pool,
            clock,
            installment_match,
        }
    }

    pub async fn enroll_student(
        &self,
        actor: &Actor,
        request: EnrollStudentRequest,
    ) -> AppResult<StudentResponse> {
        let scope = actor.campus_scope()?;
        let campus_id = scope.campus_for_write(request.campus_id)?;
        lookup::campus_by_id(&self.pool, campus_id).await?;

        let career = lookup::career_by_id(&self.pool, request.career_id).await?;
        if !career.active {
            return Err(ValidationError::new(
                "career_id",
                "career is no longer open for enrollment",
            )
            .into());
        }

        let first_name = required(request.first_name, "first_name")?;
        let last_name = required(request.last_name, "last_name")?;
        let national_id = required(request.national_id, "national_id")?;
        let phone = normalize_py_phone(&request.phone)?;
        let current_course = request.current_course.unwrap_or(1);
        if current_course < 1 {
            return Err(
                ValidationError::new("current_course", "course must be at least 1").into(),
            );
        }
        self.ensure_national_id_free(&national_id, None).await?;

        let student = students::ActiveModel {
            campus_id: Set(campus_id),
            career_id: Set(career.id),
            first_name: Set(first_name),
            last_name: Set(last_name),
            national_id: Set(national_id.clone()),
            phone: Set(phone),
            birth_date: Set(request.birth_date),
            start_date: Set(request.start_date),
            current_course: Set(current_course),
            emergency_contact: Set(blank_to_none(request.emergency_contact)),
            active: Set(true),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| {
            lookup::unique_violation_as_conflict(
                e,
                format!("a student with national id {national_id} already exists"),
            )
        })?;

        log::info!(
            "Student {} enrolled in career {} at campus {} by {}",
            student.id,
            career.name,
            campus_id,
            actor.username
        );
        Ok(student.into())
    }

    pub async fn update_student(
        &self,
        actor: &Actor,
        id: i64,
        request: UpdateStudentRequest,
    ) -> AppResult<StudentResponse> {
        let scope = actor.campus_scope()?;
        let student = lookup::student_in_scope(&self.pool, &scope, id).await?;
        let mut am = student.clone().into_active_model();

        if let Some(career_id) = request.career_id
            && career_id != student.career_id
        {
            lookup::career_by_id(&self.pool, career_id).await?;
            am.career_id = Set(career_id);
        }
        if let Some(first_name) = request.first_name {
            am.first_name = Set(required(first_name, "first_name")?);
        }
        if let Some(last_name) = request.last_name {
            am.last_name = Set(required(last_name, "last_name")?);
        }
        if let Some(national_id) = request.national_id {
            let national_id = required(national_id, "national_id")?;
            if national_id != student.national_id {
                self.ensure_national_id_free(&national_id, Some(student.id))
                    .await?;
            }
            am.national_id = Set(national_id);
        }
        if let Some(phone) = request.phone {
            am.phone = Set(normalize_py_phone(&phone)?);
        }
        if request.birth_date.is_some() {
            am.birth_date = Set(request.birth_date);
        }
        if request.start_date.is_some() {
            am.start_date = Set(request.start_date);
        }
        if let Some(course) = request.current_course {
            if course < 1 {
                return Err(
                    ValidationError::new("current_course", "course must be at least 1").into(),
                );
            }
            am.current_course = Set(course);
        }
        if request.emergency_contact.is_some() {
            am.emergency_contact = Set(blank_to_none(request.emergency_contact));
        }
        if let Some(active) = request.active {
            am.active = Set(active);
        }

        let updated = am.update(&self.pool).await.map_err(|e| {
            lookup::unique_violation_as_conflict(e, "national id is already registered")
        })?;
        Ok(updated.into())
    }

    pub async fn get_student(&self, actor: &Actor, id: i64) -> AppResult<StudentDetailResponse> {
        let scope = actor.campus_scope()?;
        let student = lookup::student_in_scope(&self.pool, &scope, id).await?;
        let career = lookup::career_by_id(&self.pool, student.career_id).await?;
        let paid = self.payments_of(student.id).await?;
        let redeemed = self.redemptions_of(student.id).await?;

        let today = self.clock.today();
        let coverage = coverage_status(&paid, today);
        let total_paid = paid.iter().map(|p| p.amount_paid).sum();

        Ok(StudentDetailResponse {
            career_name: career.name,
            can_take_exam: coverage.can_take_exam(),
            coverage,
            available_points: displayed_points(available_points(&paid, &redeemed)),
            total_paid,
            student: student.into(),
        })
    }

    pub async fn list_students(
        &self,
        actor: &Actor,
        query: StudentQuery,
    ) -> AppResult<PaginatedResponse<StudentSummaryResponse>> {
        let scope = actor.campus_scope()?;
        let params = query.pagination();

        let mut condition = Condition::all();
        if let Some(campus_id) = scope.filter(query.campus_id) {
            condition = condition.add(students::Column::CampusId.eq(campus_id));
        }
        if let Some(career_id) = query.career_id {
            condition = condition.add(students::Column::CareerId.eq(career_id));
        }
        if let Some(active) = query.active {
            condition = condition.add(students::Column::Active.eq(active));
        }
        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(students::Column::FirstName.contains(term))
                    .add(students::Column::LastName.contains(term))
                    .add(students::Column::NationalId.contains(term)),
            );
        }

        let base_query = students::Entity::find()
            .filter(condition)
            .order_by_asc(students::Column::LastName)
            .order_by_asc(students::Column::FirstName)
            .order_by_asc(students::Column::Id);
        let today = self.clock.today();

        // coverage is derived, so a coverage filter has to be applied after loading
        if let Some(wanted) = query.coverage {
            let all = base_query.all(&self.pool).await?;
            let ids: Vec<i64> = all.iter().map(|s| s.id).collect();
            let latest = lookup::latest_coverage_dates(&self.pool, &ids).await?;
            let matching: Vec<StudentSummaryResponse> = all
                .into_iter()
                .map(|s| {
                    let coverage = coverage_from(latest.get(&s.id).copied(), today);
                    summary(s, coverage)
                })
                .filter(|row| row.coverage.status == wanted)
                .collect();
            let total = matching.len() as u64;
            let page: Vec<_> = matching
                .into_iter()
                .skip((params.page_index() * params.page_size()) as usize)
                .take(params.page_size() as usize)
                .collect();
            return Ok(PaginatedResponse::new(page, &params, total));
        }

        let total = base_query.clone().count(&self.pool).await?;
        let rows = base_query
            .limit(params.page_size())
            .offset(params.page_index() * params.page_size())
            .all(&self.pool)
            .await?;
        let ids: Vec<i64> = rows.iter().map(|s| s.id).collect();
        let latest = lookup::latest_coverage_dates(&self.pool, &ids).await?;
        let data = rows
            .into_iter()
            .map(|s| {
                let coverage = coverage_from(latest.get(&s.id).copied(), today);
                summary(s, coverage)
            })
            .collect();
        Ok(PaginatedResponse::new(data, &params, total))
    }

    pub async fn coverage(&self, actor: &Actor, id: i64) -> AppResult<Coverage> {
        let scope = actor.campus_scope()?;
        let student = lookup::student_in_scope(&self.pool, &scope, id).await?;
        let paid = self.payments_of(student.id).await?;
        Ok(coverage_status(&paid, self.clock.today()))
    }

    pub async fn schedule(&self, actor: &Actor, id: i64) -> AppResult<ScheduleResponse> {
        let scope = actor.campus_scope()?;
        let student = lookup::student_in_scope(&self.pool, &scope, id).await?;
        if student.start_date.is_none() {
            log::debug!("Student {} has no start date; schedule left empty", student.id);
            return Ok(ScheduleResponse::new(&student, &[]));
        }
        let paid = self.payments_of(student.id).await?;
        let slots =
            build_installment_schedule(&student, &paid, self.clock.today(), self.installment_match);
        Ok(ScheduleResponse::new(&student, &slots))
    }

    pub async fn points(&self, actor: &Actor, id: i64) -> AppResult<PointsResponse> {
        let scope = actor.campus_scope()?;
        let student = lookup::student_in_scope(&self.pool, &scope, id).await?;
        let paid = self.payments_of(student.id).await?;
        let redeemed = self.redemptions_of(student.id).await?;

        let earned = paid
            .iter()
            .filter(|p| !p.is_enrollment_fee)
            .map(|p| i64::from(p.points))
            .sum();
        let spent = redeemed.iter().map(|r| i64::from(r.points_spent)).sum();
        Ok(PointsResponse {
            student_id: student.id,
            earned,
            spent,
            available: displayed_points(available_points(&paid, &redeemed)),
        })
    }

    async fn payments_of(&self, student_id: i64) -> AppResult<Vec<payments::Model>> {
        Ok(payments::Entity::find()
            .filter(payments::Column::StudentId.eq(student_id))
            .order_by_asc(payments::Column::PaymentDate)
            .order_by_asc(payments::Column::Id)
            .all(&self.pool)
            .await?)
    }

    async fn redemptions_of(&self, student_id: i64) -> AppResult<Vec<redemptions::Model>> {
        Ok(redemptions::Entity::find()
            .filter(redemptions::Column::StudentId.eq(student_id))
            .all(&self.pool)
            .await?)
    }

    async fn ensure_national_id_free(
        &self,
        national_id: &str,
        except: Option<i64>,
    ) -> AppResult<()> {
        let mut query =
            students::Entity::find().filter(students::Column::NationalId.eq(national_id));
        if let Some(id) = except {
            query = query.filter(students::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "a student with national id {national_id} already exists"
            )));
        }
        Ok(())
    }
}

fn summary(student: students::Model, coverage: Coverage) -> StudentSummaryResponse {
    StudentSummaryResponse {
        student: student.into(),
        coverage,
    }
}

fn required(value: String, field: &'static str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CareerKind;
    use crate::ledger::CoverageStatus;
    use crate::ledger::testing::{career, date, payment, redemption, scored_payment, student};
    use crate::models::actor::tests::clerk;
    use crate::utils::FixedClock;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: DatabaseConnection, today: chrono::NaiveDate) -> StudentService {
        StudentService::new(
            db,
            Arc::new(FixedClock::on(today)),
            InstallmentMatch::Exact,
        )
    }

    #[tokio::test]
    async fn test_student_of_other_campus_is_not_found() {
        let mut foreign = student(10, None);
        foreign.campus_id = 2;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[foreign]])
            .into_connection();
        let result = service(db, date(2024, 6, 1)).get_student(&clerk(1), 1).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_detail_aggregates_coverage_and_points() {
        let mut covered = scored_payment(1, 2);
        covered.valid_until = Some(date(2024, 6, 8));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[student(10, Some(date(2024, 3, 1)))]])
            .append_query_results([[career(CareerKind::Technical, 300_000, 500_000)]])
            .append_query_results([[covered, scored_payment(2, 1)]])
            .append_query_results([[redemption(1, 1)]])
            .into_connection();

        let detail = service(db, date(2024, 6, 1))
            .get_student(&clerk(1), 1)
            .await
            .unwrap();
        assert_eq!(detail.coverage.status, CoverageStatus::DueSoon);
        assert!(detail.can_take_exam);
        assert_eq!(detail.available_points, 2);
        assert_eq!(detail.total_paid, 1_000_000);
        assert_eq!(detail.career_name, "Enfermería");
    }

    #[tokio::test]
    async fn test_schedule_without_start_date_is_flagged() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[student(10, None)]])
            .into_connection();
        let schedule = service(db, date(2024, 6, 1))
            .schedule(&clerk(1), 1)
            .await
            .unwrap();
        assert!(schedule.insufficient_data);
        assert!(schedule.first_half.is_empty() && schedule.second_half.is_empty());
    }

    #[tokio::test]
    async fn test_schedule_splits_twelve_slots() {
        let mut paid = payment(1, date(2024, 3, 25));
        paid.due_date = Some(date(2024, 4, 1));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[student(10, Some(date(2024, 3, 1)))]])
            .append_query_results([[paid]])
            .into_connection();
        let schedule = service(db, date(2024, 6, 1))
            .schedule(&clerk(1), 1)
            .await
            .unwrap();
        assert_eq!(schedule.first_half.len(), 6);
        assert_eq!(schedule.second_half.len(), 6);
        assert_eq!(schedule.first_half[0].payment_id, Some(1));
    }

    #[tokio::test]
    async fn test_points_are_clamped_for_display() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[student(10, None)]])
            .append_query_results([[scored_payment(1, 1)]])
            .append_query_results([[redemption(1, 3)]])
            .into_connection();
        let points = service(db, date(2024, 6, 1))
            .points(&clerk(1), 1)
            .await
            .unwrap();
        assert_eq!(points.earned, 1);
        assert_eq!(points.spent, 3);
        assert_eq!(points.available, 0);
    }

    #[tokio::test]
    async fn test_enrollment_rejects_unknown_phone_format() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[crate::entities::campus_entity::Model {
                id: 1,
                name: "Sede Central".into(),
                address: String::new(),
                phone: String::new(),
                active: true,
                created_at: chrono::Utc::now(),
            }]])
            .append_query_results([[career(CareerKind::Technical, 300_000, 500_000)]])
            .into_connection();
        let result = service(db, date(2024, 6, 1))
            .enroll_student(
                &clerk(1),
                EnrollStudentRequest {
                    campus_id: None,
                    career_id: 10,
                    first_name: "Ana".into(),
                    last_name: "Benítez".into(),
                    national_id: "4567890".into(),
                    phone: "12-34".into(),
                    birth_date: None,
                    start_date: None,
                    current_course: None,
                    emergency_contact: None,
                },
            )
            .await;
        match result {
            Err(AppError::InvalidField(err)) => assert_eq!(err.field, "phone"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
