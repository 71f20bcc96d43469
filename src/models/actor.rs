use crate::error::{AppError, AppResult, ValidationError};
use crate::utils::Claims;

/// Authenticated staff member performing a request.
///
/// Built by the auth middleware from the access token and handed to every
/// service call explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
    pub campus_id: Option<i64>,
}

/// Campuses an actor may see and write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampusScope {
    All,
    Campus(i64),
}

impl Actor {
    pub fn from_claims(claims: &Claims) -> AppResult<Self> {
        Ok(Self {
            user_id: claims.user_id()?,
            username: claims.username.clone(),
            is_admin: claims.is_admin,
            campus_id: claims.campus_id,
        })
    }

    /// Non-admin accounts without a campus are a setup mistake and are blocked.
    pub fn campus_scope(&self) -> AppResult<CampusScope> {
        if self.is_admin {
            return Ok(CampusScope::All);
        }
        match self.campus_id {
            Some(id) => Ok(CampusScope::Campus(id)),
            None => {
                log::warn!(
                    "User {} ({}) has no campus assigned; an administrator must assign one",
                    self.user_id,
                    self.username
                );
                Err(AppError::ConfigError(
                    "no campus is assigned to this account".to_string(),
                ))
            }
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl CampusScope {
    pub fn allows(&self, campus_id: i64) -> bool {
        match self {
            CampusScope::All => true,
            CampusScope::Campus(own) => *own == campus_id,
        }
    }

    /// Restricting campus for queries, `None` meaning unrestricted.
    pub fn campus_id(&self) -> Option<i64> {
        match self {
            CampusScope::All => None,
            CampusScope::Campus(id) => Some(*id),
        }
    }

    /// Narrows an optional campus filter to what the scope permits.
    pub fn filter(&self, requested: Option<i64>) -> Option<i64> {
        match self {
            CampusScope::All => requested,
            CampusScope::Campus(id) => Some(*id),
        }
    }

    /// Records outside the scope are reported as missing.
    pub fn ensure_visible(&self, campus_id: i64, what: &str) -> AppResult<()> {
        if self.allows(campus_id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("{what} not found")))
        }
    }

    /// Campus a new record is written to.
    pub fn campus_for_write(&self, requested: Option<i64>) -> AppResult<i64> {
        match (self, requested) {
            (CampusScope::All, Some(id)) => Ok(id),
            (CampusScope::All, None) => {
                Err(ValidationError::new("campus_id", "campus is required").into())
            }
            (CampusScope::Campus(own), Some(id)) if *own != id => Err(AppError::PermissionDenied),
            (CampusScope::Campus(own), _) => Ok(*own),
        }
    }
}
