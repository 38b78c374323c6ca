//! In-memory record store for tests and local demos

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RecordStore;
use crate::error::{ApiError, ApiResult};
use crate::message::{AdminReview, Message, MessageReviewStatus};
use crate::models::User;
use crate::profile::ProfileUpdate;
use crate::review::{Review, ReviewStatus};
use crate::skill::{Skill, SkillFilter};
use crate::swap::{Dispute, DisputeStatus, SkillSwapRequest, SwapStatus};
use crate::verification::{DocumentKind, VerificationDocument, VerificationStatus};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    skills: Vec<Skill>,
    swap_requests: Vec<SkillSwapRequest>,
    verification_documents: Vec<VerificationDocument>,
    reviews: Vec<Review>,
    messages: Vec<Message>,
}

/// Rows live in insertion-ordered vectors behind one lock
#[derive(Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
    latency: Duration,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `latency` before touching the tables
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            tables: RwLock::default(),
            latency,
        }
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn duplicate(table: &str, id: Uuid) -> ApiError {
    ApiError::DatabaseError(format!("duplicate key in {}: {}", table, id))
}

fn missing_row(table: &str, id: Uuid) -> ApiError {
    ApiError::DatabaseError(format!("no row in {} for {}", table, id))
}

fn count(n: usize) -> i64 {
    n as i64
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn health_check(&self) -> ApiResult<()> {
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> ApiResult<User> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.id == user.id) {
            return Err(duplicate("users", user.id));
        }
        tables.users.push(user.clone());
        Ok(user.clone())
    }

    async fn get_user(&self, id: Uuid) -> ApiResult<Option<User>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_users(&self, ids: &[Uuid]) -> ApiResult<Vec<User>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> ApiResult<Option<User>> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.name = update.name.clone();
            user.bio = update.bio.clone();
            user.email = update.email.clone();
            user.clone()
        }))
    }

    async fn promote_to_admin(&self, id: Uuid) -> ApiResult<bool> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        match tables.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_admin = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_skill(&self, skill: &Skill) -> ApiResult<Skill> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        if tables.skills.iter().any(|s| s.id == skill.id) {
            return Err(duplicate("skills", skill.id));
        }
        if !tables.users.iter().any(|u| u.id == skill.user_id) {
            return Err(ApiError::DatabaseError(format!(
                "skills.user_id references missing user {}",
                skill.user_id
            )));
        }
        tables.skills.push(skill.clone());
        Ok(skill.clone())
    }

    async fn get_skill(&self, id: Uuid) -> ApiResult<Option<Skill>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables.skills.iter().find(|s| s.id == id).cloned())
    }

    async fn get_skills(&self, ids: &[Uuid]) -> ApiResult<Vec<Skill>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .skills
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn list_skills(&self, filter: &SkillFilter) -> ApiResult<Vec<Skill>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .skills
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn list_skills_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Skill>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .skills
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_categories(&self) -> ApiResult<Vec<String>> {
        self.delay().await;
        let tables = self.tables.read().await;
        let categories: BTreeSet<String> =
            tables.skills.iter().map(|s| s.category.clone()).collect();
        Ok(categories.into_iter().collect())
    }

    async fn insert_swap_request(
        &self,
        request: &SkillSwapRequest,
    ) -> ApiResult<SkillSwapRequest> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        if tables.swap_requests.iter().any(|r| r.id == request.id) {
            return Err(duplicate("skill_swap_requests", request.id));
        }
        if request.requester_id == request.provider_id {
            return Err(ApiError::DatabaseError(
                "check constraint swap_parties_distinct violated".to_string(),
            ));
        }
        tables.swap_requests.push(request.clone());
        Ok(request.clone())
    }

    async fn get_swap_request(&self, id: Uuid) -> ApiResult<Option<SkillSwapRequest>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables.swap_requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list_swap_requests_for_user(
        &self,
        user_id: Uuid,
    ) -> ApiResult<Vec<SkillSwapRequest>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .swap_requests
            .iter()
            .filter(|r| r.involves(user_id))
            .cloned()
            .collect())
    }

    async fn has_accepted_swap(&self, a: Uuid, b: Uuid, skill_id: Uuid) -> ApiResult<bool> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .swap_requests
            .iter()
            .any(|r| r.status == SwapStatus::Accepted && r.trades_between(a, b, skill_id)))
    }

    async fn transition_swap_status(
        &self,
        id: Uuid,
        from: SwapStatus,
        to: SwapStatus,
    ) -> ApiResult<Option<SkillSwapRequest>> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        Ok(tables
            .swap_requests
            .iter_mut()
            .find(|r| r.id == id && r.status == from)
            .map(|request| {
                request.status = to;
                request.updated_at = Utc::now();
                request.clone()
            }))
    }

    async fn open_swap_dispute(
        &self,
        id: Uuid,
        from: SwapStatus,
        reason: &str,
    ) -> ApiResult<Option<SkillSwapRequest>> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        Ok(tables
            .swap_requests
            .iter_mut()
            .find(|r| r.id == id && r.status == from)
            .map(|request| {
                request.status = SwapStatus::Disputed;
                request.dispute = Some(Dispute {
                    reason: reason.to_string(),
                    status: DisputeStatus::Pending,
                    resolution: None,
                    admin_notes: None,
                });
                request.updated_at = Utc::now();
                request.clone()
            }))
    }

    async fn resolve_swap_dispute(
        &self,
        id: Uuid,
        resolution: &str,
        notes: Option<&str>,
    ) -> ApiResult<Option<SkillSwapRequest>> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        let Some(request) = tables.swap_requests.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        let Some(dispute) = request.dispute.as_mut() else {
            return Ok(None);
        };
        dispute.status = DisputeStatus::Resolved;
        dispute.resolution = Some(resolution.to_string());
        dispute.admin_notes = notes.map(str::to_string);
        request.updated_at = Utc::now();
        Ok(Some(request.clone()))
    }

    async fn list_swap_requests_by_dispute_status(
        &self,
        status: DisputeStatus,
    ) -> ApiResult<Vec<SkillSwapRequest>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .swap_requests
            .iter()
            .filter(|r| r.dispute.as_ref().map(|d| d.status) == Some(status))
            .cloned()
            .collect())
    }

    async fn count_swap_requests_by_dispute_status(
        &self,
        status: DisputeStatus,
    ) -> ApiResult<i64> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(count(
            tables
                .swap_requests
                .iter()
                .filter(|r| r.dispute.as_ref().map(|d| d.status) == Some(status))
                .count(),
        ))
    }

    async fn insert_verification_documents(
        &self,
        documents: &[VerificationDocument],
    ) -> ApiResult<Vec<VerificationDocument>> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        for (index, document) in documents.iter().enumerate() {
            let mut seen = tables.verification_documents.iter().chain(&documents[..index]);
            if seen.any(|d| d.id == document.id) {
                return Err(duplicate("verification_documents", document.id));
            }
        }
        tables.verification_documents.extend_from_slice(documents);
        Ok(documents.to_vec())
    }

    async fn get_verification_document(
        &self,
        id: Uuid,
    ) -> ApiResult<Option<VerificationDocument>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .verification_documents
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn list_verification_documents_for_user(
        &self,
        user_id: Uuid,
    ) -> ApiResult<Vec<VerificationDocument>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .verification_documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_verification_documents_by_status(
        &self,
        status: VerificationStatus,
    ) -> ApiResult<Vec<VerificationDocument>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .verification_documents
            .iter()
            .filter(|d| d.status == status)
            .cloned()
            .collect())
    }

    async fn count_verification_documents_by_status(
        &self,
        status: VerificationStatus,
    ) -> ApiResult<i64> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(count(
            tables
                .verification_documents
                .iter()
                .filter(|d| d.status == status)
                .count(),
        ))
    }

    async fn decide_verification_document(
        &self,
        id: Uuid,
        status: VerificationStatus,
        reviewed_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> ApiResult<Option<VerificationDocument>> {
        self.delay().await;
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        let Some(document) = tables
            .verification_documents
            .iter_mut()
            .find(|d| d.id == id && d.status == VerificationStatus::Pending)
        else {
            return Ok(None);
        };

        // Flag first so a missing target leaves the document pending
        if status == VerificationStatus::Approved {
            match (document.kind, document.skill_id) {
                (DocumentKind::Identity, _) => {
                    let user = tables
                        .users
                        .iter_mut()
                        .find(|u| u.id == document.user_id)
                        .ok_or_else(|| missing_row("users", document.user_id))?;
                    user.identity_verified = true;
                }
                (DocumentKind::Skill, Some(skill_id)) => {
                    let skill = tables
                        .skills
                        .iter_mut()
                        .find(|s| s.id == skill_id)
                        .ok_or_else(|| missing_row("skills", skill_id))?;
                    skill.is_verified = true;
                }
                (DocumentKind::Skill, None) => {
                    return Err(ApiError::DatabaseError(format!(
                        "skill document {} has no skill",
                        document.id
                    )));
                }
            }
        }

        document.status = status;
        document.reviewed_at = Some(reviewed_at);
        document.admin_notes = notes.map(str::to_string);
        Ok(Some(document.clone()))
    }

    async fn insert_review(&self, review: &Review) -> ApiResult<Review> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        if tables.reviews.iter().any(|r| r.id == review.id) {
            return Err(duplicate("reviews", review.id));
        }
        if !(1..=5).contains(&review.rating) {
            return Err(ApiError::DatabaseError(
                "check constraint reviews_rating_check violated".to_string(),
            ));
        }
        tables.reviews.push(review.clone());
        Ok(review.clone())
    }

    async fn get_review(&self, id: Uuid) -> ApiResult<Option<Review>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn list_reviews_for_skill(&self, skill_id: Uuid) -> ApiResult<Vec<Review>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .iter()
            .rev()
            .filter(|r| r.skill_id == skill_id)
            .cloned()
            .collect())
    }

    async fn list_reviews_by_status(&self, status: ReviewStatus) -> ApiResult<Vec<Review>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }

    async fn count_reviews_by_status(&self, status: ReviewStatus) -> ApiResult<i64> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(count(
            tables.reviews.iter().filter(|r| r.status == status).count(),
        ))
    }

    async fn update_review_status(
        &self,
        id: Uuid,
        from: ReviewStatus,
        to: ReviewStatus,
        notes: Option<&str>,
    ) -> ApiResult<Option<Review>> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        Ok(tables
            .reviews
            .iter_mut()
            .find(|r| r.id == id && r.status == from)
            .map(|review| {
                review.status = to;
                review.admin_notes = notes.map(str::to_string);
                review.clone()
            }))
    }

    async fn insert_message(&self, message: &Message) -> ApiResult<Message> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        if tables.messages.iter().any(|m| m.id == message.id) {
            return Err(duplicate("messages", message.id));
        }
        tables.messages.push(message.clone());
        Ok(message.clone())
    }

    async fn get_message(&self, id: Uuid) -> ApiResult<Option<Message>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn list_messages_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Message>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect())
    }

    async fn list_flagged_messages(&self) -> ApiResult<Vec<Message>> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.is_awaiting_review())
            .cloned()
            .collect())
    }

    async fn count_flagged_messages(&self) -> ApiResult<i64> {
        self.delay().await;
        let tables = self.tables.read().await;
        Ok(count(
            tables
                .messages
                .iter()
                .filter(|m| m.is_awaiting_review())
                .count(),
        ))
    }

    async fn flag_message(&self, id: Uuid) -> ApiResult<Option<Message>> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        Ok(tables
            .messages
            .iter_mut()
            .find(|m| m.id == id && !m.is_reviewed())
            .map(|message| {
                message.is_flagged = true;
                if message.admin_review.is_none() {
                    message.admin_review = Some(AdminReview {
                        status: MessageReviewStatus::Pending,
                        notes: None,
                    });
                }
                message.clone()
            }))
    }

    async fn review_message(
        &self,
        id: Uuid,
        keep_flag: bool,
        notes: Option<&str>,
    ) -> ApiResult<Option<Message>> {
        self.delay().await;
        let mut tables = self.tables.write().await;
        Ok(tables
            .messages
            .iter_mut()
            .find(|m| m.id == id && m.is_awaiting_review())
            .map(|message| {
                message.is_flagged = keep_flag;
                message.admin_review = Some(AdminReview {
                    status: MessageReviewStatus::Reviewed,
                    notes: notes.map(str::to_string),
                });
                message.clone()
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swap::CreateSwapRequest;
    use std::time::Instant;

    fn swap(requester: Uuid, provider: Uuid) -> SkillSwapRequest {
        SkillSwapRequest::new(
            requester,
            CreateSwapRequest {
                provider_id: provider,
                requested_skill_id: Uuid::new_v4(),
                offered_skill_id: Uuid::new_v4(),
                message: "Let's trade".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_set() {
        let store = InMemoryRecordStore::new();
        let request = store
            .insert_swap_request(&swap(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        let accepted = store
            .transition_swap_status(request.id, SwapStatus::Pending, SwapStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(accepted.unwrap().status, SwapStatus::Accepted);

        let again = store
            .transition_swap_status(request.id, SwapStatus::Pending, SwapStatus::Rejected)
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_rejects_self_swap_rows() {
        let store = InMemoryRecordStore::new();
        let user = Uuid::new_v4();
        assert!(store.insert_swap_request(&swap(user, user)).await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_requires_dispute() {
        let store = InMemoryRecordStore::new();
        let request = store
            .insert_swap_request(&swap(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        let resolved = store
            .resolve_swap_dispute(request.id, "refund", None)
            .await
            .unwrap();
        assert!(resolved.is_none());
        assert!(store
            .get_swap_request(request.id)
            .await
            .unwrap()
            .unwrap()
            .dispute
            .is_none());
    }

    #[tokio::test]
    async fn test_promote_unknown_user() {
        let store = InMemoryRecordStore::new();
        let user = User::new(Uuid::new_v4(), "Sarah".to_string(), "sarah@example.com".to_string());
        store.insert_user(&user).await.unwrap();

        assert!(!store.promote_to_admin(Uuid::new_v4()).await.unwrap());
        assert!(!store.get_user(user.id).await.unwrap().unwrap().is_admin);
    }

    fn identity_document(user_id: Uuid, name: &str) -> VerificationDocument {
        VerificationDocument::pending(user_id, None, DocumentKind::Identity, name.to_string())
    }

    #[tokio::test]
    async fn test_document_batch_is_all_or_nothing() {
        let store = InMemoryRecordStore::new();
        let user = Uuid::new_v4();
        let passport = identity_document(user, "passport.pdf");
        store
            .insert_verification_documents(std::slice::from_ref(&passport))
            .await
            .unwrap();

        let batch = [identity_document(user, "selfie.jpg"), passport.clone()];
        let err = store.insert_verification_documents(&batch).await.unwrap_err();
        assert!(matches!(err, ApiError::DatabaseError(_)));

        let stored = store.list_verification_documents_for_user(user).await.unwrap();
        assert_eq!(stored, vec![passport]);
    }

    #[tokio::test]
    async fn test_approval_without_owner_row_applies_nothing() {
        let store = InMemoryRecordStore::new();
        let document = identity_document(Uuid::new_v4(), "passport.pdf");
        store
            .insert_verification_documents(std::slice::from_ref(&document))
            .await
            .unwrap();

        let err = store
            .decide_verification_document(document.id, VerificationStatus::Approved, Utc::now(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DatabaseError(_)));

        let stored = store.get_verification_document(document.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VerificationStatus::Pending);
        assert!(stored.reviewed_at.is_none());
    }

    #[tokio::test]
    async fn test_approval_sets_owner_flag() {
        let store = InMemoryRecordStore::new();
        let user = User::new(Uuid::new_v4(), "Sarah".to_string(), "sarah@example.com".to_string());
        store.insert_user(&user).await.unwrap();
        let document = identity_document(user.id, "passport.pdf");
        store
            .insert_verification_documents(std::slice::from_ref(&document))
            .await
            .unwrap();

        let decided = store
            .decide_verification_document(document.id, VerificationStatus::Approved, Utc::now(), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(decided.status, VerificationStatus::Approved);
        assert!(store.get_user(user.id).await.unwrap().unwrap().identity_verified);
    }

    #[tokio::test]
    async fn test_latency_is_applied() {
        let store = InMemoryRecordStore::with_latency(Duration::from_millis(20));
        let start = Instant::now();
        store.get_user(Uuid::new_v4()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
