use crate::entities::{CareerKind, career_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCareerRequest {
    #[schema(example = "Técnico en Enfermería")]
    pub name: String,
    pub kind: CareerKind,
    #[schema(example = 24)]
    pub duration_months: i32,
    #[serde(default)]
    pub description: String,
    #[schema(example = 300000)]
    pub enrollment_fee: i64,
    #[schema(example = 500000)]
    pub monthly_fee: i64,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCareerRequest {
    pub name: Option<String>,
    pub kind: Option<CareerKind>,
    pub duration_months: Option<i32>,
    pub description: Option<String>,
    pub enrollment_fee: Option<i64>,
    pub monthly_fee: Option<i64>,
    /// `false` retires the career from new enrollments
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CareerQuery {
    /// Include inactive careers (default false)
    pub include_inactive: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CareerResponse {
    pub id: i64,
    pub name: String,
    pub kind: CareerKind,
    pub duration_months: i32,
    pub description: String,
    pub enrollment_fee: i64,
    pub monthly_fee: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<career_entity::Model> for CareerResponse {
    fn from(m: career_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            kind: m.kind,
            duration_months: m.duration_months,
            description: m.description,
            enrollment_fee: m.enrollment_fee,
            monthly_fee: m.monthly_fee,
            active: m.active,
            created_at: m.created_at,
        }
    }
}
