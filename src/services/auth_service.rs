use crate::config::BootstrapConfig;
use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set,
};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    clock: SharedClock,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService, clock: SharedClock) -> Self {
        Self {
            pool,
            jwt_service,
            clock,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(request.username.trim()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            log::warn!("Failed login for {}", user.username);
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }
        if !user.active {
            return Err(AppError::AuthError("Account is disabled".to_string()));
        }

        let mut am = user.into_active_model();
        am.last_login_at = Set(Some(self.clock.now()));
        let user = am.update(&self.pool).await?;

        log::info!("User {} logged in", user.username);
        self.issue_tokens(user)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user = users::Entity::find_by_id(claims.user_id()?)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;
        if !user.active {
            return Err(AppError::AuthError("Account is disabled".to_string()));
        }
        // fresh claims pick up campus or role changes made since login
        self.issue_tokens(user)
    }

    pub async fn me(&self, actor: &Actor) -> AppResult<UserResponse> {
        let user = users::Entity::find_by_id(actor.user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(user.into())
    }

    /// Creates the first administrator when no account exists yet.
    pub async fn bootstrap_admin(&self, config: &BootstrapConfig) -> AppResult<()> {
        let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password)
        else {
            return Ok(());
        };
        if users::Entity::find().count(&self.pool).await? > 0 {
            return Ok(());
        }
        validate_password(password)?;

        users::ActiveModel {
            username: Set(username.trim().to_string()),
            password_hash: Set(hash_password(password)?),
            full_name: Set("Administrator".to_string()),
            is_admin: Set(true),
            campus_id: Set(None),
            active: Set(true),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Bootstrap administrator {username} created");
        Ok(())
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(&user)?;
        let refresh_token = self.jwt_service.generate_refresh_token(&user)?;
        Ok(AuthResponse {
            user: user.into(),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn user(password: &str, active: bool) -> users::Model {
        users::Model {
            id: 7,
            username: "cajera.luque".into(),
            password_hash: hash_password(password).unwrap(),
            full_name: "María Ortiz".into(),
            is_admin: false,
            campus_id: Some(2),
            active,
            last_login_at: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn service(db: DatabaseConnection) -> AuthService {
        let clock: SharedClock = Arc::new(FixedClock::on(
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ));
        AuthService::new(db, JwtService::new("test", 3600, 7200), clock)
    }

    #[tokio::test]
    async fn test_login_issues_tokens_with_campus() {
        let stored = user("Password123", true);
        let mut logged_in = stored.clone();
        logged_in.last_login_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored]])
            .append_query_results([[logged_in]])
            .into_connection();

        let svc = service(db);
        let response = svc
            .login(LoginRequest {
                username: "cajera.luque".into(),
                password: "Password123".into(),
            })
            .await
            .unwrap();

        assert_eq!(response.user.campus_id, Some(2));
        let claims = svc
            .jwt_service
            .verify_access_token(&response.access_token)
            .unwrap();
        assert_eq!(claims.campus_id, Some(2));
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_disabled_accounts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user("Password123", true)]])
            .append_query_results([[user("Password123", false)]])
            .into_connection();
        let svc = service(db);

        let wrong = svc
            .login(LoginRequest {
                username: "cajera.luque".into(),
                password: "Password124".into(),
            })
            .await;
        assert!(matches!(wrong, Err(AppError::AuthError(_))));

        let disabled = svc
            .login(LoginRequest {
                username: "cajera.luque".into(),
                password: "Password123".into(),
            })
            .await;
        assert!(matches!(disabled, Err(AppError::AuthError(_))));
    }
}
