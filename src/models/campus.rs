use crate::entities::{bank_account_entity, campus_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCampusRequest {
    #[schema(example = "Sede Luque")]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampusResponse {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<campus_entity::Model> for CampusResponse {
    fn from(m: campus_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            address: m.address,
            phone: m.phone,
            active: m.active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateBankAccountRequest {
    #[schema(example = "Banco Continental")]
    pub bank_name: String,
    pub account_number: String,
    pub holder: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BankAccountResponse {
    pub id: i64,
    pub bank_name: String,
    pub account_number: String,
    pub holder: String,
    pub active: bool,
}

impl From<bank_account_entity::Model> for BankAccountResponse {
    fn from(m: bank_account_entity::Model) -> Self {
        Self {
            id: m.id,
            bank_name: m.bank_name,
            account_number: m.account_number,
            holder: m.holder,
            active: m.active,
        }
    }
}
