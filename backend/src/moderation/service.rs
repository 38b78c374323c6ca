//! Admin moderation overlay
//!
//! Every operation starts with [`Session::require_admin`]. Queue listings
//! are enriched with the names admins need to act on an item, fetched in
//! one batch per table.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};
use crate::message::Message;
use crate::models::{User, UserSummary};
use crate::moderation::model::{
    DashboardStats, DecideVerificationRequest, DisputeQueueItem, FlaggedMessageItem,
    FlaggedReviewItem, ModerateRequest, ModerationAction, ResolveDisputeRequest,
    VerificationDecision, VerificationQueueItem,
};
use crate::review::{Review, ReviewStatus};
use crate::store::RecordStore;
use crate::swap::{DisputeStatus, SkillSwapRequest, SwapService};
use crate::verification::{VerificationDocument, VerificationStatus};

#[derive(Clone)]
pub struct ModerationService {
    store: Arc<dyn RecordStore>,
    swaps: Arc<SwapService>,
}

impl ModerationService {
    pub fn new(store: Arc<dyn RecordStore>, swaps: Arc<SwapService>) -> Self {
        Self { store, swaps }
    }

    /// The four queue counters, fetched concurrently. They are independent
    /// reads, not one snapshot.
    pub async fn dashboard(&self, session: &Session) -> ApiResult<DashboardStats> {
        session.require_admin()?;

        let (pending_verifications, pending_reviews, active_disputes, flagged_messages) = tokio::try_join!(
            self.store
                .count_verification_documents_by_status(VerificationStatus::Pending),
            self.store.count_reviews_by_status(ReviewStatus::Flagged),
            self.store
                .count_swap_requests_by_dispute_status(DisputeStatus::Pending),
            self.store.count_flagged_messages(),
        )?;

        Ok(DashboardStats {
            pending_verifications,
            pending_reviews,
            active_disputes,
            flagged_messages,
        })
    }

    // ===== Verification =====

    pub async fn pending_verifications(
        &self,
        session: &Session,
    ) -> ApiResult<Vec<VerificationQueueItem>> {
        session.require_admin()?;

        let documents = self
            .store
            .list_verification_documents_by_status(VerificationStatus::Pending)
            .await?;

        let users = self
            .users_by_id(documents.iter().map(|d| d.user_id).collect())
            .await?;
        let skills = self
            .skill_names(documents.iter().filter_map(|d| d.skill_id).collect())
            .await?;

        Ok(documents
            .into_iter()
            .map(|document| VerificationQueueItem {
                owner: users.get(&document.user_id).map(UserSummary::from),
                skill_name: document.skill_id.and_then(|id| skills.get(&id).cloned()),
                document,
            })
            .collect())
    }

    /// Approve or reject a pending document. Approval also sets the
    /// matching verified flag on the owner or the skill.
    pub async fn decide_verification(
        &self,
        session: &Session,
        document_id: Uuid,
        request: DecideVerificationRequest,
    ) -> ApiResult<VerificationDocument> {
        session.require_admin()?;
        request.validate()?;

        let document = self
            .store
            .get_verification_document(document_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Verification document not found".to_string()))?;
        if document.status != VerificationStatus::Pending {
            return Err(ApiError::Conflict(
                "Verification document has already been decided".to_string(),
            ));
        }

        let status = match request.decision {
            VerificationDecision::Approve => VerificationStatus::Approved,
            VerificationDecision::Reject => VerificationStatus::Rejected,
        };

        let decided = self
            .store
            .decide_verification_document(document_id, status, Utc::now(), request.notes.as_deref())
            .await?
            .ok_or_else(|| {
                ApiError::Conflict("Verification document was decided concurrently".to_string())
            })?;

        tracing::info!(
            document_id = %decided.id,
            admin_id = %session.user_id,
            status = ?decided.status,
            "Verification decided"
        );

        Ok(decided)
    }

    // ===== Reviews =====

    pub async fn flagged_reviews(&self, session: &Session) -> ApiResult<Vec<FlaggedReviewItem>> {
        session.require_admin()?;

        let reviews = self.store.list_reviews_by_status(ReviewStatus::Flagged).await?;
        let skills = self
            .skill_names(reviews.iter().map(|r| r.skill_id).collect())
            .await?;

        Ok(reviews
            .into_iter()
            .map(|review| FlaggedReviewItem {
                skill_name: skills.get(&review.skill_id).cloned(),
                review,
            })
            .collect())
    }

    pub async fn moderate_review(
        &self,
        session: &Session,
        review_id: Uuid,
        request: ModerateRequest,
    ) -> ApiResult<Review> {
        session.require_admin()?;
        request.validate()?;

        let review = self
            .store
            .get_review(review_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;
        if !review.status.is_moderatable() {
            return Err(ApiError::Conflict(
                "Review has already been moderated".to_string(),
            ));
        }

        let to = match request.action {
            ModerationAction::Approve => ReviewStatus::Approved,
            ModerationAction::Remove => ReviewStatus::Removed,
        };

        let moderated = self
            .store
            .update_review_status(review_id, review.status, to, request.notes.as_deref())
            .await?
            .ok_or_else(|| ApiError::Conflict("Review was moderated concurrently".to_string()))?;

        tracing::info!(
            review_id = %moderated.id,
            admin_id = %session.user_id,
            status = ?moderated.status,
            "Review moderated"
        );

        Ok(moderated)
    }

    // ===== Disputes =====

    pub async fn active_disputes(&self, session: &Session) -> ApiResult<Vec<DisputeQueueItem>> {
        session.require_admin()?;

        let requests = self
            .store
            .list_swap_requests_by_dispute_status(DisputeStatus::Pending)
            .await?;

        let users = self
            .users_by_id(
                requests
                    .iter()
                    .flat_map(|r| [r.requester_id, r.provider_id])
                    .collect(),
            )
            .await?;
        let skills = self
            .skill_names(
                requests
                    .iter()
                    .flat_map(|r| [r.requested_skill_id, r.offered_skill_id])
                    .collect(),
            )
            .await?;

        Ok(requests
            .into_iter()
            .map(|request| DisputeQueueItem {
                requester: users.get(&request.requester_id).map(UserSummary::from),
                provider: users.get(&request.provider_id).map(UserSummary::from),
                requested_skill_name: skills.get(&request.requested_skill_id).cloned(),
                offered_skill_name: skills.get(&request.offered_skill_id).cloned(),
                request,
            })
            .collect())
    }

    pub async fn resolve_dispute(
        &self,
        session: &Session,
        request_id: Uuid,
        request: ResolveDisputeRequest,
    ) -> ApiResult<SkillSwapRequest> {
        session.require_admin()?;
        request.validate()?;

        self.swaps
            .resolve_dispute(
                session,
                request_id,
                request.resolution.trim(),
                request.notes.as_deref(),
            )
            .await
    }

    // ===== Messages =====

    pub async fn flagged_messages(&self, session: &Session) -> ApiResult<Vec<FlaggedMessageItem>> {
        session.require_admin()?;

        let messages = self.store.list_flagged_messages().await?;
        let users = self
            .users_by_id(
                messages
                    .iter()
                    .flat_map(|m| [m.sender_id, m.recipient_id])
                    .collect(),
            )
            .await?;

        Ok(messages
            .into_iter()
            .map(|message| FlaggedMessageItem {
                sender: users.get(&message.sender_id).map(UserSummary::from),
                recipient: users.get(&message.recipient_id).map(UserSummary::from),
                message,
            })
            .collect())
    }

    /// Close the review of a flagged message. Approving clears the flag;
    /// removing keeps it, which hides the message from both participants.
    pub async fn review_message(
        &self,
        session: &Session,
        message_id: Uuid,
        request: ModerateRequest,
    ) -> ApiResult<Message> {
        session.require_admin()?;
        request.validate()?;

        let message = self
            .store
            .get_message(message_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;
        if !message.is_awaiting_review() {
            return Err(ApiError::Conflict(
                "Message is not awaiting review".to_string(),
            ));
        }

        let keep_flag = request.action == ModerationAction::Remove;
        let reviewed = self
            .store
            .review_message(message_id, keep_flag, request.notes.as_deref())
            .await?
            .ok_or_else(|| ApiError::Conflict("Message was reviewed concurrently".to_string()))?;

        tracing::info!(
            message_id = %reviewed.id,
            admin_id = %session.user_id,
            action = ?request.action,
            "Message reviewed"
        );

        Ok(reviewed)
    }

    // ===== Users =====

    pub async fn promote_to_admin(&self, session: &Session, user_id: Uuid) -> ApiResult<()> {
        session.require_admin()?;

        if !self.store.promote_to_admin(user_id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        tracing::info!(user_id = %user_id, promoted_by = %session.user_id, "User promoted to admin");
        Ok(())
    }

    async fn users_by_id(&self, mut ids: Vec<Uuid>) -> ApiResult<HashMap<Uuid, User>> {
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self.store.get_users(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    async fn skill_names(&self, mut ids: Vec<Uuid>) -> ApiResult<HashMap<Uuid, String>> {
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let skills = self.store.get_skills(&ids).await?;
        Ok(skills.into_iter().map(|s| (s.id, s.name)).collect())
    }
}
