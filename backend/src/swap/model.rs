//! Swap request models and the status rules of the swap lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Outer status of a swap request
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "swap_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,  // Awaiting the provider's decision
    Accepted, // Provider agreed to the swap
    Rejected, // Provider declined
    Disputed, // Escalated to admin arbitration
}

impl SwapStatus {
    /// Legal moves of the outer state machine
    pub fn can_transition_to(self, next: SwapStatus) -> bool {
        use SwapStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Rejected) | (Pending, Disputed) | (Accepted, Disputed)
        )
    }

    /// Statuses a provider may answer a request with
    pub fn is_decision(self) -> bool {
        matches!(self, SwapStatus::Accepted | SwapStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Accepted => "accepted",
            SwapStatus::Rejected => "rejected",
            SwapStatus::Disputed => "disputed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "dispute_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DisputeStatus {
    Pending,
    Resolved,
}

/// Admin arbitration attached to a disputed swap request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Dispute {
    pub reason: String,
    pub status: DisputeStatus,
    pub resolution: Option<String>,
    pub admin_notes: Option<String>,
}

/// A proposal to trade the requester's offered skill for the provider's
/// requested skill
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SkillSwapRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub provider_id: Uuid,
    pub requested_skill_id: Uuid,
    pub offered_skill_id: Uuid,
    pub message: String,
    pub status: SwapStatus,
    pub dispute: Option<Dispute>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SkillSwapRequest {
    pub fn new(requester_id: Uuid, request: CreateSwapRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            requester_id,
            provider_id: request.provider_id,
            requested_skill_id: request.requested_skill_id,
            offered_skill_id: request.offered_skill_id,
            message: request.message,
            status: SwapStatus::Pending,
            dispute: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the user is requester or provider of this swap
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.requester_id == user_id || self.provider_id == user_id
    }

    /// Whether the swap is between the two users and trades the given skill
    pub fn trades_between(&self, a: Uuid, b: Uuid, skill_id: Uuid) -> bool {
        let parties = (self.requester_id == a && self.provider_id == b)
            || (self.requester_id == b && self.provider_id == a);
        parties && (self.requested_skill_id == skill_id || self.offered_skill_id == skill_id)
    }
}

/// Flat `skill_swap_requests` row; the dispute columns fold into [`Dispute`]
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SwapRequestRow {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub provider_id: Uuid,
    pub requested_skill_id: Uuid,
    pub offered_skill_id: Uuid,
    pub message: String,
    pub status: SwapStatus,
    pub dispute_reason: Option<String>,
    pub dispute_status: Option<DisputeStatus>,
    pub dispute_resolution: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SwapRequestRow> for SkillSwapRequest {
    fn from(row: SwapRequestRow) -> Self {
        let dispute = row.dispute_status.map(|status| Dispute {
            reason: row.dispute_reason.unwrap_or_default(),
            status,
            resolution: row.dispute_resolution,
            admin_notes: row.admin_notes,
        });

        Self {
            id: row.id,
            requester_id: row.requester_id,
            provider_id: row.provider_id,
            requested_skill_id: row.requested_skill_id,
            offered_skill_id: row.offered_skill_id,
            message: row.message,
            status: row.status,
            dispute,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Request DTO for proposing a swap
#[derive(Debug, Deserialize, Validate, Clone)]
pub struct CreateSwapRequest {
    pub provider_id: Uuid,
    pub requested_skill_id: Uuid,
    pub offered_skill_id: Uuid,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub message: String,
}

/// Request DTO for the provider's answer
#[derive(Debug, Deserialize)]
pub struct UpdateSwapStatusRequest {
    pub status: SwapStatus,
}

/// Request DTO for escalating a swap to arbitration
#[derive(Debug, Deserialize, Validate)]
pub struct OpenDisputeRequest {
    #[validate(length(min = 1, max = 2000))]
    pub reason: String,
}

/// A user's swap requests partitioned by status
#[derive(Debug, Default, Serialize)]
pub struct SwapBuckets {
    pub pending: Vec<SkillSwapRequest>,
    pub accepted: Vec<SkillSwapRequest>,
    pub rejected: Vec<SkillSwapRequest>,
    pub disputed: Vec<SkillSwapRequest>,
}

impl SwapBuckets {
    pub fn partition(requests: Vec<SkillSwapRequest>) -> Self {
        let mut buckets = SwapBuckets::default();
        for request in requests {
            match request.status {
                SwapStatus::Pending => buckets.pending.push(request),
                SwapStatus::Accepted => buckets.accepted.push(request),
                SwapStatus::Rejected => buckets.rejected.push(request),
                SwapStatus::Disputed => buckets.disputed.push(request),
            }
        }
        buckets
    }
}
