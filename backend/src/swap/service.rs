//! Swap request lifecycle

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};
use crate::store::RecordStore;
use crate::swap::model::{
    CreateSwapRequest, OpenDisputeRequest, SkillSwapRequest, SwapBuckets, SwapStatus,
};

#[derive(Clone)]
pub struct SwapService {
    store: Arc<dyn RecordStore>,
}

impl SwapService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Propose trading the caller's `offered_skill_id` for the provider's
    /// `requested_skill_id`
    pub async fn create_request(
        &self,
        session: &Session,
        request: CreateSwapRequest,
    ) -> ApiResult<SkillSwapRequest> {
        request.validate()?;

        if request.provider_id == session.user_id {
            return Err(ApiError::ValidationError(
                "Cannot request a swap with yourself".to_string(),
            ));
        }

        let requested = self
            .store
            .get_skill(request.requested_skill_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Requested skill not found".to_string()))?;
        let offered = self
            .store
            .get_skill(request.offered_skill_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Offered skill not found".to_string()))?;

        if requested.user_id != request.provider_id {
            return Err(ApiError::ValidationError(
                "Requested skill does not belong to the provider".to_string(),
            ));
        }
        if offered.user_id != session.user_id {
            return Err(ApiError::ValidationError(
                "Offered skill does not belong to the requester".to_string(),
            ));
        }

        let swap = SkillSwapRequest::new(session.user_id, request);
        let swap = self.store.insert_swap_request(&swap).await?;

        tracing::info!(
            request_id = %swap.id,
            requester_id = %swap.requester_id,
            provider_id = %swap.provider_id,
            "Swap request created"
        );

        Ok(swap)
    }

    /// Accept or reject a pending request; only the provider decides
    pub async fn update_status(
        &self,
        session: &Session,
        request_id: Uuid,
        new_status: SwapStatus,
    ) -> ApiResult<SkillSwapRequest> {
        if !new_status.is_decision() {
            return Err(ApiError::ValidationError(format!(
                "Status must be accepted or rejected, got '{}'",
                new_status.as_str()
            )));
        }

        let current = self.get_existing(request_id).await?;

        if current.provider_id != session.user_id {
            return Err(ApiError::Forbidden(
                "Only the provider can accept or reject a swap request".to_string(),
            ));
        }
        if !current.status.can_transition_to(new_status) {
            return Err(ApiError::Conflict(format!(
                "Swap request is already {}",
                current.status.as_str()
            )));
        }

        let updated = self
            .store
            .transition_swap_status(request_id, current.status, new_status)
            .await?
            .ok_or_else(|| {
                ApiError::Conflict("Swap request was decided concurrently".to_string())
            })?;

        tracing::info!(
            request_id = %updated.id,
            from = %current.status.as_str(),
            status = %updated.status.as_str(),
            "Swap request status updated"
        );

        Ok(updated)
    }

    /// Every request the caller is a party to, oldest first
    pub async fn list_requests(&self, session: &Session) -> ApiResult<Vec<SkillSwapRequest>> {
        self.store.list_swap_requests_for_user(session.user_id).await
    }

    pub async fn buckets(&self, session: &Session) -> ApiResult<SwapBuckets> {
        let requests = self.list_requests(session).await?;
        Ok(SwapBuckets::partition(requests))
    }

    pub async fn get_request(
        &self,
        session: &Session,
        request_id: Uuid,
    ) -> ApiResult<SkillSwapRequest> {
        let request = self.get_existing(request_id).await?;
        if !request.involves(session.user_id) && !session.is_admin {
            return Err(ApiError::Forbidden(
                "Not a party to this swap request".to_string(),
            ));
        }
        Ok(request)
    }

    /// Escalate a pending or accepted request to admin arbitration
    pub async fn open_dispute(
        &self,
        session: &Session,
        request_id: Uuid,
        request: OpenDisputeRequest,
    ) -> ApiResult<SkillSwapRequest> {
        request.validate()?;

        let current = self.get_existing(request_id).await?;
        if !current.involves(session.user_id) {
            return Err(ApiError::Forbidden(
                "Only a party to the swap can dispute it".to_string(),
            ));
        }
        if !current.status.can_transition_to(SwapStatus::Disputed) {
            return Err(ApiError::Conflict(format!(
                "A {} swap request cannot be disputed",
                current.status.as_str()
            )));
        }

        let updated = self
            .store
            .open_swap_dispute(request_id, current.status, request.reason.trim())
            .await?
            .ok_or_else(|| {
                ApiError::Conflict("Swap request changed while opening the dispute".to_string())
            })?;

        tracing::info!(
            request_id = %updated.id,
            opened_by = %session.user_id,
            "Swap dispute opened"
        );

        Ok(updated)
    }

    /// Record the admin's resolution of a dispute. Resolving again
    /// overwrites the previous resolution.
    pub async fn resolve_dispute(
        &self,
        session: &Session,
        request_id: Uuid,
        resolution: &str,
        notes: Option<&str>,
    ) -> ApiResult<SkillSwapRequest> {
        session.require_admin()?;

        let current = self.get_existing(request_id).await?;
        if current.dispute.is_none() {
            return Err(ApiError::Conflict(
                "Swap request has no dispute to resolve".to_string(),
            ));
        }

        let updated = self
            .store
            .resolve_swap_dispute(request_id, resolution, notes)
            .await?
            .ok_or_else(|| ApiError::NotFound("Swap request not found".to_string()))?;

        tracing::info!(
            request_id = %updated.id,
            admin_id = %session.user_id,
            "Swap dispute resolved"
        );

        Ok(updated)
    }

    async fn get_existing(&self, request_id: Uuid) -> ApiResult<SkillSwapRequest> {
        self.store
            .get_swap_request(request_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Swap request not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::skill::{CreateSkillRequest, ExperienceLevel, Skill};
    use crate::store::InMemoryRecordStore;
    use crate::swap::DisputeStatus;

    struct Fixture {
        service: SwapService,
        requester: Session,
        provider: Session,
        offered: Skill,
        requested: Skill,
    }

    async fn skill(store: &InMemoryRecordStore, owner: Uuid, name: &str) -> Skill {
        let skill = CreateSkillRequest {
            name: name.to_string(),
            category: "General".to_string(),
            description: String::new(),
            experience_level: ExperienceLevel::Beginner,
            tags: vec![],
        }
        .into_skill(owner);
        store.insert_skill(&skill).await.unwrap()
    }

    async fn fixture() -> Fixture {
        let store = InMemoryRecordStore::new();
        let a = User::new(Uuid::new_v4(), "A".to_string(), "a@example.com".to_string());
        let b = User::new(Uuid::new_v4(), "B".to_string(), "b@example.com".to_string());
        store.insert_user(&a).await.unwrap();
        store.insert_user(&b).await.unwrap();
        let requested = skill(&store, a.id, "Web Development").await;
        let offered = skill(&store, b.id, "Digital Marketing").await;

        Fixture {
            service: SwapService::new(Arc::new(store)),
            requester: Session::user(b.id),
            provider: Session::user(a.id),
            offered,
            requested,
        }
    }

    fn create(f: &Fixture) -> CreateSwapRequest {
        CreateSwapRequest {
            provider_id: f.provider.user_id,
            requested_skill_id: f.requested.id,
            offered_skill_id: f.offered.id,
            message: "Let's trade".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_starts_pending() {
        let f = fixture().await;
        let swap = f.service.create_request(&f.requester, create(&f)).await.unwrap();

        assert_eq!(swap.status, SwapStatus::Pending);
        assert_eq!(swap.requester_id, f.requester.user_id);
        assert!(swap.dispute.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_swapped_skills() {
        let f = fixture().await;
        let mut request = create(&f);
        std::mem::swap(&mut request.requested_skill_id, &mut request.offered_skill_id);

        let err = f.service.create_request(&f.requester, request).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_with_self_fails() {
        let f = fixture().await;
        let mut request = create(&f);
        request.provider_id = f.requester.user_id;

        let err = f.service.create_request(&f.requester, request).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_with_unknown_skill() {
        let f = fixture().await;
        let mut request = create(&f);
        request.requested_skill_id = Uuid::new_v4();

        let err = f.service.create_request(&f.requester, request).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_only_provider_decides() {
        let f = fixture().await;
        let swap = f.service.create_request(&f.requester, create(&f)).await.unwrap();

        let err = f
            .service
            .update_status(&f.requester, swap.id, SwapStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_decided_request_is_final() {
        let f = fixture().await;
        let swap = f.service.create_request(&f.requester, create(&f)).await.unwrap();

        f.service
            .update_status(&f.provider, swap.id, SwapStatus::Rejected)
            .await
            .unwrap();
        let err = f
            .service
            .update_status(&f.provider, swap.id, SwapStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_to_non_decision_status() {
        let f = fixture().await;
        let swap = f.service.create_request(&f.requester, create(&f)).await.unwrap();

        let err = f
            .service
            .update_status(&f.provider, swap.id, SwapStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_dispute_then_resolve() {
        let f = fixture().await;
        let swap = f.service.create_request(&f.requester, create(&f)).await.unwrap();
        f.service
            .update_status(&f.provider, swap.id, SwapStatus::Accepted)
            .await
            .unwrap();

        let disputed = f
            .service
            .open_dispute(
                &f.requester,
                swap.id,
                OpenDisputeRequest {
                    reason: "No show".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(disputed.status, SwapStatus::Disputed);
        assert_eq!(disputed.dispute.as_ref().unwrap().status, DisputeStatus::Pending);

        let admin = Session::admin(Uuid::new_v4());
        let resolved = f
            .service
            .resolve_dispute(&admin, swap.id, "Refunded", Some("checked logs"))
            .await
            .unwrap();
        let dispute = resolved.dispute.unwrap();
        assert_eq!(dispute.status, DisputeStatus::Resolved);
        assert_eq!(dispute.resolution.as_deref(), Some("Refunded"));
        assert_eq!(dispute.admin_notes.as_deref(), Some("checked logs"));
    }

    #[tokio::test]
    async fn test_resolve_without_dispute_conflicts() {
        let f = fixture().await;
        let swap = f.service.create_request(&f.requester, create(&f)).await.unwrap();
        let admin = Session::admin(Uuid::new_v4());

        let err = f
            .service
            .resolve_dispute(&admin, swap.id, "n/a", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err = f
            .service
            .resolve_dispute(&admin, Uuid::new_v4(), "n/a", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_outsider_cannot_read() {
        let f = fixture().await;
        let swap = f.service.create_request(&f.requester, create(&f)).await.unwrap();

        let err = f
            .service
            .get_request(&Session::user(Uuid::new_v4()), swap.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(f
            .service
            .get_request(&Session::admin(Uuid::new_v4()), swap.id)
            .await
            .is_ok());
    }
}
