use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};
use crate::models::User;
use crate::profile::model::{CreateProfileRequest, ProfileUpdate};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn RecordStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> ApiResult<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    pub async fn me(&self, session: &Session) -> ApiResult<User> {
        self.get_profile(session.user_id).await
    }

    /// Create the profile row for an identity that has just signed up
    pub async fn create_profile(
        &self,
        session: &Session,
        request: CreateProfileRequest,
    ) -> ApiResult<User> {
        request.validate()?;

        if self.store.get_user(session.user_id).await?.is_some() {
            return Err(ApiError::Conflict("Profile already exists".to_string()));
        }

        let user = User::new(
            session.user_id,
            request.name.trim().to_string(),
            request.email.trim().to_string(),
        );
        let user = self.store.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, "Profile created");
        Ok(user)
    }

    pub async fn update_profile(
        &self,
        session: &Session,
        update: ProfileUpdate,
    ) -> ApiResult<User> {
        update.validate()?;

        self.store
            .update_user_profile(session.user_id, &update)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }
}
