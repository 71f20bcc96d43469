use crate::entities::redemption_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRedemptionRequest {
    #[schema(example = 2)]
    pub points_spent: i32,
    #[schema(example = "Discount on uniform")]
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedemptionResponse {
    pub id: i64,
    pub student_id: i64,
    pub points_spent: i32,
    pub reason: String,
    pub registered_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<redemption_entity::Model> for RedemptionResponse {
    fn from(m: redemption_entity::Model) -> Self {
        Self {
            id: m.id,
            student_id: m.student_id,
            points_spent: m.points_spent,
            reason: m.reason,
            registered_by: m.registered_by,
            created_at: m.created_at,
        }
    }
}
