//! Moderation overlay models

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::message::Message;
use crate::models::UserSummary;
use crate::review::Review;
use crate::swap::SkillSwapRequest;
use crate::verification::VerificationDocument;

/// Counters shown on the admin dashboard
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub pending_verifications: i64,
    pub pending_reviews: i64,
    pub active_disputes: i64,
    pub flagged_messages: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerificationDecision {
    Approve,
    Reject,
}

/// Outcome of reviewing a flagged review or message
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Remove,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DecideVerificationRequest {
    pub decision: VerificationDecision,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ModerateRequest {
    pub action: ModerationAction,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResolveDisputeRequest {
    #[validate(length(min = 1, max = 4000))]
    pub resolution: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerificationQueueItem {
    #[serde(flatten)]
    pub document: VerificationDocument,
    pub owner: Option<UserSummary>,
    pub skill_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FlaggedReviewItem {
    #[serde(flatten)]
    pub review: Review,
    pub skill_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DisputeQueueItem {
    #[serde(flatten)]
    pub request: SkillSwapRequest,
    pub requester: Option<UserSummary>,
    pub provider: Option<UserSummary>,
    pub requested_skill_name: Option<String>,
    pub offered_skill_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FlaggedMessageItem {
    #[serde(flatten)]
    pub message: Message,
    pub sender: Option<UserSummary>,
    pub recipient: Option<UserSummary>,
}
