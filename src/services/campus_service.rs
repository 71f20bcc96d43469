use crate::entities::{bank_account_entity as bank_accounts, campus_entity as campuses};
use crate::error::{AppResult, ValidationError};
use crate::models::*;
use crate::utils::SharedClock;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[derive(Clone)]
pub struct CampusService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl CampusService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Staff only see their own campus.
    pub async fn list_campuses(&self, actor: &Actor) -> AppResult<Vec<CampusResponse>> {
        let scope = actor.campus_scope()?;
        let mut query = campuses::Entity::find().order_by_asc(campuses::Column::Name);
        if let Some(id) = scope.campus_id() {
            query = query.filter(campuses::Column::Id.eq(id));
        }
        let list = query.all(&self.pool).await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn create_campus(
        &self,
        actor: &Actor,
        request: CreateCampusRequest,
    ) -> AppResult<CampusResponse> {
        actor.require_admin()?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("name", "campus name is required").into());
        }
        let campus = campuses::ActiveModel {
            name: Set(name.to_string()),
            address: Set(request.address.trim().to_string()),
            phone: Set(request.phone.trim().to_string()),
            active: Set(true),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        log::info!("Campus {} created by {}", campus.name, actor.username);
        Ok(campus.into())
    }

    pub async fn list_bank_accounts(&self) -> AppResult<Vec<BankAccountResponse>> {
        let list = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::Active.eq(true))
            .order_by_asc(bank_accounts::Column::BankName)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn create_bank_account(
        &self,
        actor: &Actor,
        request: CreateBankAccountRequest,
    ) -> AppResult<BankAccountResponse> {
        actor.require_admin()?;
        if request.account_number.trim().is_empty() {
            return Err(
                ValidationError::new("account_number", "account number is required").into(),
            );
        }
        let account = bank_accounts::ActiveModel {
            bank_name: Set(request.bank_name.trim().to_string()),
            account_number: Set(request.account_number.trim().to_string()),
            holder: Set(request.holder.trim().to_string()),
            active: Set(true),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(account.into())
    }
}
