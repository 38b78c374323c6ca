//! Caller sessions
//!
//! A [`Session`] is resolved once per request and passed explicitly into
//! every service call that depends on who is asking.

use std::sync::Arc;
use uuid::Uuid;

use super::jwt::{verify_token, JwtError};
use crate::error::{ApiError, ApiResult};
use crate::store::RecordStore;

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
    /// Read from the caller's profile row at resolution time
    pub is_admin: bool,
}

impl Session {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id,
            email: None,
            is_admin: false,
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            email: None,
            is_admin: true,
        }
    }

    pub fn require_admin(&self) -> ApiResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }
}

/// Turns bearer tokens into sessions
pub struct SessionResolver {
    jwt_secret: String,
    store: Arc<dyn RecordStore>,
}

impl SessionResolver {
    pub fn new(jwt_secret: String, store: Arc<dyn RecordStore>) -> Self {
        Self { jwt_secret, store }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Verify the token and look up the admin flag. An identity without a
    /// profile row yet still gets a (non-admin) session so it can create one.
    pub async fn resolve(&self, token: &str) -> Result<Session, ResolveError> {
        let claims = verify_token(token, &self.jwt_secret)?;
        let user_id = claims.user_id()?;

        let user = self
            .store
            .get_user(user_id)
            .await
            .map_err(ResolveError::Store)?;

        Ok(Session {
            user_id,
            email: claims.email,
            is_admin: user.map(|u| u.is_admin).unwrap_or(false),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Token(#[from] JwtError),

    #[error("Session lookup failed: {0}")]
    Store(ApiError),
}
