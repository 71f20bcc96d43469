use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::*;
use crate::services::lookup;
use crate::utils::{SharedClock, hash_password, validate_password};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

/// Staff account administration. Every operation is admin-only.
#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl UserService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    pub async fn create_user(
        &self,
        actor: &Actor,
        request: CreateUserRequest,
    ) -> AppResult<UserResponse> {
        actor.require_admin()?;

        let username = request.username.trim().to_string();
        if username.is_empty() {
            return Err(ValidationError::new("username", "username is required").into());
        }
        validate_password(&request.password)?;

        let taken = users::Entity::find()
            .filter(users::Column::Username.eq(username.as_str()))
            .one(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(format!(
                "username {username} is already taken"
            )));
        }
        if let Some(campus_id) = request.campus_id {
            lookup::campus_by_id(&self.pool, campus_id).await?;
        }

        let user = users::ActiveModel {
            username: Set(username),
            password_hash: Set(hash_password(&request.password)?),
            full_name: Set(request.full_name.trim().to_string()),
            is_admin: Set(request.is_admin),
            campus_id: Set(request.campus_id),
            active: Set(true),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        if !user.is_admin && user.campus_id.is_none() {
            log::warn!(
                "User {} created without a campus; it cannot work until one is assigned",
                user.username
            );
        }
        Ok(user.into())
    }

    pub async fn list_users(&self, actor: &Actor) -> AppResult<Vec<UserResponse>> {
        actor.require_admin()?;
        let list = users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn assign_campus(
        &self,
        actor: &Actor,
        user_id: i64,
        campus_id: Option<i64>,
    ) -> AppResult<UserResponse> {
        actor.require_admin()?;
        let user = self.find(user_id).await?;
        if let Some(id) = campus_id {
            lookup::campus_by_id(&self.pool, id).await?;
        }

        let mut am = user.into_active_model();
        am.campus_id = Set(campus_id);
        let updated = am.update(&self.pool).await?;
        log::info!(
            "User {} assigned to campus {:?} by {}",
            updated.username,
            campus_id,
            actor.username
        );
        Ok(updated.into())
    }

    /// Flips `active`. Administrator accounts cannot be disabled.
    pub async fn toggle_active(&self, actor: &Actor, user_id: i64) -> AppResult<UserResponse> {
        actor.require_admin()?;
        let user = self.find(user_id).await?;
        if user.is_admin && user.active {
            return Err(AppError::ValidationError(
                "administrator accounts cannot be deactivated".to_string(),
            ));
        }

        let active = !user.active;
        let mut am = user.into_active_model();
        am.active = Set(active);
        Ok(am.update(&self.pool).await?.into())
    }

    async fn find(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::actor::tests::{admin, clerk};
    use crate::utils::FixedClock;
    use chrono::{NaiveDate, TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> UserService {
        let clock: SharedClock = Arc::new(FixedClock::on(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ));
        UserService::new(db, clock)
    }

    fn stored(is_admin: bool) -> users::Model {
        users::Model {
            id: 3,
            username: "root".into(),
            password_hash: String::new(),
            full_name: "Root".into(),
            is_admin,
            campus_id: None,
            active: true,
            last_login_at: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_staff_cannot_manage_users() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = service(db).list_users(&clerk(1)).await;
        assert!(matches!(result, Err(AppError::PermissionDenied)));
    }

    #[tokio::test]
    async fn test_admin_accounts_cannot_be_deactivated() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored(true)]])
            .into_connection();
        let result = service(db).toggle_active(&admin(), 3).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_toggle_disables_staff_account() {
        let mut disabled = stored(false);
        disabled.active = false;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored(false)]])
            .append_query_results([[disabled]])
            .into_connection();
        let updated = service(db).toggle_active(&admin(), 3).await.unwrap();
        assert!(!updated.active);
    }
}
