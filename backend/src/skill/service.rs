use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};
use crate::skill::model::{CreateSkillRequest, Skill, SkillFilter, SkillWithOwner};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct SkillService {
    store: Arc<dyn RecordStore>,
}

impl SkillService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list_skills(&self, filter: SkillFilter) -> ApiResult<Vec<Skill>> {
        self.store.list_skills(&filter).await
    }

    pub async fn list_categories(&self) -> ApiResult<Vec<String>> {
        self.store.list_categories().await
    }

    pub async fn get_skill(&self, id: Uuid) -> ApiResult<SkillWithOwner> {
        let skill = self
            .store
            .get_skill(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Skill not found".to_string()))?;
        let owner = self
            .store
            .get_user(skill.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Skill owner not found".to_string()))?;

        Ok(SkillWithOwner { skill, owner })
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Skill>> {
        self.store.list_skills_for_user(user_id).await
    }

    pub async fn create_skill(
        &self,
        session: &Session,
        request: CreateSkillRequest,
    ) -> ApiResult<Skill> {
        request.validate()?;

        if self.store.get_user(session.user_id).await?.is_none() {
            return Err(ApiError::BadRequest(
                "Create your profile before listing skills".to_string(),
            ));
        }

        let skill = self.store.insert_skill(&request.into_skill(session.user_id)).await?;

        tracing::info!(skill_id = %skill.id, owner_id = %skill.user_id, "Skill listed");
        Ok(skill)
    }
}
