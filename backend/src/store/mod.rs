//! Record and object storage seams
//!
//! Services talk to persistence only through [`RecordStore`] and
//! [`ObjectStorage`]. Production runs on PostgreSQL ([`PgRecordStore`]);
//! tests and demos run on [`InMemoryRecordStore`], which can add artificial
//! latency to each call.
//!
//! Status-changing updates are compare-and-set: they take the status the
//! caller observed and return `None` when the row is missing or has moved
//! on, so two interleaved decisions cannot both apply.

mod memory;
pub mod object;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::message::Message;
use crate::models::User;
use crate::profile::ProfileUpdate;
use crate::review::{Review, ReviewStatus};
use crate::skill::{Skill, SkillFilter};
use crate::swap::{DisputeStatus, SkillSwapRequest, SwapStatus};
use crate::verification::{VerificationDocument, VerificationStatus};

pub use memory::InMemoryRecordStore;
pub use object::{HttpObjectStorage, InMemoryObjectStorage, LocalObjectStorage, ObjectStorage};
pub use postgres::PgRecordStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn health_check(&self) -> ApiResult<()>;

    // ===== Users =====

    async fn insert_user(&self, user: &User) -> ApiResult<User>;
    async fn get_user(&self, id: Uuid) -> ApiResult<Option<User>>;
    async fn get_users(&self, ids: &[Uuid]) -> ApiResult<Vec<User>>;
    async fn update_user_profile(&self, id: Uuid, update: &ProfileUpdate)
        -> ApiResult<Option<User>>;
    /// Privileged procedure; `false` when no such user exists
    async fn promote_to_admin(&self, id: Uuid) -> ApiResult<bool>;

    // ===== Skills =====

    async fn insert_skill(&self, skill: &Skill) -> ApiResult<Skill>;
    async fn get_skill(&self, id: Uuid) -> ApiResult<Option<Skill>>;
    async fn get_skills(&self, ids: &[Uuid]) -> ApiResult<Vec<Skill>>;
    async fn list_skills(&self, filter: &SkillFilter) -> ApiResult<Vec<Skill>>;
    async fn list_skills_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Skill>>;
    async fn list_categories(&self) -> ApiResult<Vec<String>>;

    // ===== Swap requests =====

    async fn insert_swap_request(&self, request: &SkillSwapRequest)
        -> ApiResult<SkillSwapRequest>;
    async fn get_swap_request(&self, id: Uuid) -> ApiResult<Option<SkillSwapRequest>>;
    /// Requests where the user is requester or provider, in creation order
    async fn list_swap_requests_for_user(&self, user_id: Uuid)
        -> ApiResult<Vec<SkillSwapRequest>>;
    /// Whether an accepted swap between the two users trades the skill
    async fn has_accepted_swap(&self, a: Uuid, b: Uuid, skill_id: Uuid) -> ApiResult<bool>;
    async fn transition_swap_status(
        &self,
        id: Uuid,
        from: SwapStatus,
        to: SwapStatus,
    ) -> ApiResult<Option<SkillSwapRequest>>;
    /// Moves the request from `from` to disputed and opens a pending dispute
    async fn open_swap_dispute(
        &self,
        id: Uuid,
        from: SwapStatus,
        reason: &str,
    ) -> ApiResult<Option<SkillSwapRequest>>;
    /// Marks an existing dispute resolved; `None` when the request carries no dispute
    async fn resolve_swap_dispute(
        &self,
        id: Uuid,
        resolution: &str,
        notes: Option<&str>,
    ) -> ApiResult<Option<SkillSwapRequest>>;
    async fn list_swap_requests_by_dispute_status(
        &self,
        status: DisputeStatus,
    ) -> ApiResult<Vec<SkillSwapRequest>>;
    async fn count_swap_requests_by_dispute_status(&self, status: DisputeStatus)
        -> ApiResult<i64>;

    // ===== Verification documents =====

    /// Inserts a whole submission; either every row lands or none does
    async fn insert_verification_documents(
        &self,
        documents: &[VerificationDocument],
    ) -> ApiResult<Vec<VerificationDocument>>;
    async fn get_verification_document(&self, id: Uuid)
        -> ApiResult<Option<VerificationDocument>>;
    async fn list_verification_documents_for_user(
        &self,
        user_id: Uuid,
    ) -> ApiResult<Vec<VerificationDocument>>;
    async fn list_verification_documents_by_status(
        &self,
        status: VerificationStatus,
    ) -> ApiResult<Vec<VerificationDocument>>;
    async fn count_verification_documents_by_status(
        &self,
        status: VerificationStatus,
    ) -> ApiResult<i64>;
    /// Records the admin decision on a pending document. An approval sets
    /// the owner's `identity_verified` or the skill's `is_verified` in the
    /// same write; if that target row is missing nothing is applied.
    async fn decide_verification_document(
        &self,
        id: Uuid,
        status: VerificationStatus,
        reviewed_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> ApiResult<Option<VerificationDocument>>;

    // ===== Reviews =====

    async fn insert_review(&self, review: &Review) -> ApiResult<Review>;
    async fn get_review(&self, id: Uuid) -> ApiResult<Option<Review>>;
    /// Newest first
    async fn list_reviews_for_skill(&self, skill_id: Uuid) -> ApiResult<Vec<Review>>;
    async fn list_reviews_by_status(&self, status: ReviewStatus) -> ApiResult<Vec<Review>>;
    async fn count_reviews_by_status(&self, status: ReviewStatus) -> ApiResult<i64>;
    async fn update_review_status(
        &self,
        id: Uuid,
        from: ReviewStatus,
        to: ReviewStatus,
        notes: Option<&str>,
    ) -> ApiResult<Option<Review>>;

    // ===== Messages =====

    async fn insert_message(&self, message: &Message) -> ApiResult<Message>;
    async fn get_message(&self, id: Uuid) -> ApiResult<Option<Message>>;
    async fn list_messages_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Message>>;
    /// Flagged messages whose admin review is still pending
    async fn list_flagged_messages(&self) -> ApiResult<Vec<Message>>;
    async fn count_flagged_messages(&self) -> ApiResult<i64>;
    /// Sets the flag and opens a pending admin review; never reopens a reviewed message
    async fn flag_message(&self, id: Uuid) -> ApiResult<Option<Message>>;
    /// Closes a pending admin review
    async fn review_message(
        &self,
        id: Uuid,
        keep_flag: bool,
        notes: Option<&str>,
    ) -> ApiResult<Option<Message>>;
}
