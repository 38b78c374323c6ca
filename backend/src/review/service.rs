use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};
use crate::review::model::{CreateReviewRequest, Review, ReviewStatus};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn RecordStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Review a skill the caller has traded for in an accepted swap
    pub async fn create_review(
        &self,
        session: &Session,
        request: CreateReviewRequest,
    ) -> ApiResult<Review> {
        request.validate()?;

        let skill = self
            .store
            .get_skill(request.skill_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Skill not found".to_string()))?;

        if skill.user_id == session.user_id {
            return Err(ApiError::ValidationError(
                "Cannot review your own skill".to_string(),
            ));
        }

        if !self
            .store
            .has_accepted_swap(session.user_id, skill.user_id, skill.id)
            .await?
        {
            return Err(ApiError::Forbidden(
                "Reviews require an accepted swap involving this skill".to_string(),
            ));
        }

        let reviewer = self
            .store
            .get_user(session.user_id)
            .await?
            .ok_or_else(|| ApiError::BadRequest("Create your profile first".to_string()))?;

        let review = Review::new(skill.user_id, &reviewer, request);
        let review = self.store.insert_review(&review).await?;

        tracing::info!(
            review_id = %review.id,
            skill_id = %review.skill_id,
            rating = review.rating,
            "Review created"
        );

        Ok(review)
    }

    /// Reviews shown on a skill page; removed ones are withheld
    pub async fn list_for_skill(&self, skill_id: Uuid) -> ApiResult<Vec<Review>> {
        let reviews = self.store.list_reviews_for_skill(skill_id).await?;
        Ok(reviews
            .into_iter()
            .filter(|r| r.status.is_visible())
            .collect())
    }

    /// Report a review into the moderation queue
    pub async fn flag_review(&self, session: &Session, review_id: Uuid) -> ApiResult<Review> {
        let review = self
            .store
            .get_review(review_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;

        if review.reviewer.id == session.user_id {
            return Err(ApiError::ValidationError(
                "Cannot flag your own review".to_string(),
            ));
        }
        if review.status != ReviewStatus::Pending {
            return Err(ApiError::Conflict(format!(
                "Review cannot be flagged from status {:?}",
                review.status
            )));
        }

        let flagged = self
            .store
            .update_review_status(review_id, ReviewStatus::Pending, ReviewStatus::Flagged, None)
            .await?
            .ok_or_else(|| ApiError::Conflict("Review was moderated concurrently".to_string()))?;

        tracing::info!(review_id = %flagged.id, flagged_by = %session.user_id, "Review flagged");
        Ok(flagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::skill::{CreateSkillRequest, ExperienceLevel, Skill};
    use crate::store::InMemoryRecordStore;
    use crate::swap::{CreateSwapRequest, SkillSwapRequest, SwapStatus};

    struct Fixture {
        store: Arc<InMemoryRecordStore>,
        service: ReviewService,
        owner: User,
        reviewer: User,
        skill: Skill,
        offered: Skill,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryRecordStore::new());
        let owner = User::new(Uuid::new_v4(), "Owner".to_string(), "o@example.com".to_string());
        let mut reviewer =
            User::new(Uuid::new_v4(), "Reviewer".to_string(), "r@example.com".to_string());
        reviewer.profile_image = Some("https://img.local/r.png".to_string());
        store.insert_user(&owner).await.unwrap();
        store.insert_user(&reviewer).await.unwrap();

        let new_skill = |owner: Uuid, name: &str| {
            CreateSkillRequest {
                name: name.to_string(),
                category: "Programming".to_string(),
                description: String::new(),
                experience_level: ExperienceLevel::Expert,
                tags: vec![],
            }
            .into_skill(owner)
        };
        let skill = store.insert_skill(&new_skill(owner.id, "Rust")).await.unwrap();
        let offered = store.insert_skill(&new_skill(reviewer.id, "Go")).await.unwrap();

        Fixture {
            service: ReviewService::new(store.clone()),
            store,
            owner,
            reviewer,
            skill,
            offered,
        }
    }

    async fn accept_swap(f: &Fixture) {
        let swap = SkillSwapRequest::new(
            f.reviewer.id,
            CreateSwapRequest {
                provider_id: f.owner.id,
                requested_skill_id: f.skill.id,
                offered_skill_id: f.offered.id,
                message: String::new(),
            },
        );
        f.store.insert_swap_request(&swap).await.unwrap();
        f.store
            .transition_swap_status(swap.id, SwapStatus::Pending, SwapStatus::Accepted)
            .await
            .unwrap();
    }

    fn request(f: &Fixture, rating: i32) -> CreateReviewRequest {
        CreateReviewRequest {
            skill_id: f.skill.id,
            rating,
            comment: "Great teacher".to_string(),
        }
    }

    #[tokio::test]
    async fn test_review_requires_accepted_swap() {
        let f = fixture().await;
        let session = Session::user(f.reviewer.id);

        let err = f.service.create_review(&session, request(&f, 5)).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        accept_swap(&f).await;
        let review = f.service.create_review(&session, request(&f, 5)).await.unwrap();
        assert_eq!(review.user_id, f.owner.id);
        assert_eq!(review.status, ReviewStatus::Pending);
        assert_eq!(review.reviewer.name, "Reviewer");
        assert_eq!(
            review.reviewer.profile_image.as_deref(),
            Some("https://img.local/r.png")
        );
    }

    #[tokio::test]
    async fn test_rating_out_of_range() {
        let f = fixture().await;
        accept_swap(&f).await;
        let session = Session::user(f.reviewer.id);

        for rating in [0, 6] {
            let err = f
                .service
                .create_review(&session, request(&f, rating))
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::ValidationError(_)));
        }
    }

    #[tokio::test]
    async fn test_own_skill_cannot_be_reviewed() {
        let f = fixture().await;
        let err = f
            .service
            .create_review(&Session::user(f.owner.id), request(&f, 4))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_flag_once() {
        let f = fixture().await;
        accept_swap(&f).await;
        let review = f
            .service
            .create_review(&Session::user(f.reviewer.id), request(&f, 1))
            .await
            .unwrap();

        let owner = Session::user(f.owner.id);
        let flagged = f.service.flag_review(&owner, review.id).await.unwrap();
        assert_eq!(flagged.status, ReviewStatus::Flagged);

        let err = f.service.flag_review(&owner, review.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_removed_reviews_are_hidden() {
        let f = fixture().await;
        accept_swap(&f).await;
        let review = f
            .service
            .create_review(&Session::user(f.reviewer.id), request(&f, 2))
            .await
            .unwrap();
        assert_eq!(f.service.list_for_skill(f.skill.id).await.unwrap().len(), 1);

        f.store
            .update_review_status(review.id, ReviewStatus::Pending, ReviewStatus::Removed, None)
            .await
            .unwrap();
        assert!(f.service.list_for_skill(f.skill.id).await.unwrap().is_empty());
    }
}
