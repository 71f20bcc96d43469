use crate::entities::{StaffRole, staff_attendance_entity, staff_member_entity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateStaffMemberRequest {
    pub campus_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub role: StaffRole,
    pub phone: String,
    /// Defaults to today
    pub hired_on: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StaffQuery {
    pub campus_id: Option<i64>,
    pub role: Option<StaffRole>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StaffMemberResponse {
    pub id: i64,
    pub campus_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub national_id: String,
    pub role: StaffRole,
    pub phone: String,
    pub hired_on: NaiveDate,
    pub active: bool,
}

impl From<staff_member_entity::Model> for StaffMemberResponse {
    fn from(m: staff_member_entity::Model) -> Self {
        let full_name = m.full_name();
        Self {
            id: m.id,
            campus_id: m.campus_id,
            first_name: m.first_name,
            last_name: m.last_name,
            full_name,
            national_id: m.national_id,
            role: m.role,
            phone: m.phone,
            hired_on: m.hired_on,
            active: m.active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordAttendanceRequest {
    pub staff_member_id: i64,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    #[serde(default = "default_present")]
    pub present: bool,
    #[serde(default)]
    pub notes: String,
}

fn default_present() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    pub date: Option<NaiveDate>,
    pub staff_member_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceResponse {
    pub id: i64,
    pub staff_member_id: i64,
    pub date: NaiveDate,
    pub present: bool,
    pub notes: String,
}

impl From<staff_attendance_entity::Model> for AttendanceResponse {
    fn from(m: staff_attendance_entity::Model) -> Self {
        Self {
            id: m.id,
            staff_member_id: m.staff_member_id,
            date: m.date,
            present: m.present,
            notes: m.notes,
        }
    }
}
