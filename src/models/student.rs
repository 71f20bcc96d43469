use crate::entities::student_entity;
use crate::ledger::{Coverage, CoverageStatus, ScheduleSlot, schedule_halves};
use crate::models::PaginationParams;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnrollStudentRequest {
    /// Required for administrators; staff always enroll into their own campus
    pub campus_id: Option<i64>,
    pub career_id: i64,
    #[schema(example = "Ana")]
    pub first_name: String,
    #[schema(example = "Benítez")]
    pub last_name: String,
    #[schema(example = "4567890")]
    pub national_id: String,
    #[schema(example = "0981 123 456")]
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub current_course: Option<i32>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    pub career_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub current_course: Option<i32>,
    pub emergency_contact: Option<String>,
    /// `false` soft-disables the student
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentQuery {
    /// Ignored for campus-bound staff
    pub campus_id: Option<i64>,
    pub career_id: Option<i64>,
    pub coverage: Option<CoverageStatus>,
    /// Matches first name, last name or national id
    pub search: Option<String>,
    pub active: Option<bool>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl StudentQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    pub id: i64,
    pub campus_id: i64,
    pub career_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub national_id: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub current_course: i32,
    pub emergency_contact: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<student_entity::Model> for StudentResponse {
    fn from(m: student_entity::Model) -> Self {
        let full_name = m.full_name();
        Self {
            id: m.id,
            campus_id: m.campus_id,
            career_id: m.career_id,
            first_name: m.first_name,
            last_name: m.last_name,
            full_name,
            national_id: m.national_id,
            phone: m.phone,
            birth_date: m.birth_date,
            start_date: m.start_date,
            current_course: m.current_course,
            emergency_contact: m.emergency_contact,
            active: m.active,
            created_at: m.created_at,
        }
    }
}

/// List row: the student plus their coverage as of today.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentSummaryResponse {
    #[serde(flatten)]
    pub student: StudentResponse,
    pub coverage: Coverage,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentDetailResponse {
    pub student: StudentResponse,
    pub career_name: String,
    pub coverage: Coverage,
    pub can_take_exam: bool,
    /// Never negative
    pub available_points: i64,
    pub total_paid: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointsResponse {
    pub student_id: i64,
    pub earned: i64,
    pub spent: i64,
    /// Never negative
    pub available: i64,
}

/// Installment card. `insufficient_data` is set when the student has no start
/// date, in which case both halves are empty.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleResponse {
    pub student_id: i64,
    pub student_name: String,
    pub start_date: Option<NaiveDate>,
    pub insufficient_data: bool,
    pub first_half: Vec<ScheduleSlot>,
    pub second_half: Vec<ScheduleSlot>,
}

impl ScheduleResponse {
    pub fn new(student: &student_entity::Model, slots: &[ScheduleSlot]) -> Self {
        let (first, second) = schedule_halves(slots);
        Self {
            student_id: student.id,
            student_name: student.full_name(),
            start_date: student.start_date,
            insufficient_data: slots.is_empty(),
            first_half: first.to_vec(),
            second_half: second.to_vec(),
        }
    }
}
