//! Direct message models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "message_review_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageReviewStatus {
    Pending,
    Reviewed,
}

/// Admin review attached to a message once it has been flagged
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AdminReview {
    pub status: MessageReviewStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub is_flagged: bool,
    pub admin_review: Option<AdminReview>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(sender_id: Uuid, recipient_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            content,
            is_flagged: false,
            admin_review: None,
            created_at: Utc::now(),
        }
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.recipient_id == user_id
    }

    /// Flagged and still waiting for an admin
    pub fn is_awaiting_review(&self) -> bool {
        self.is_flagged
            && matches!(
                self.admin_review,
                Some(AdminReview {
                    status: MessageReviewStatus::Pending,
                    ..
                })
            )
    }

    pub fn is_reviewed(&self) -> bool {
        matches!(
            self.admin_review,
            Some(AdminReview {
                status: MessageReviewStatus::Reviewed,
                ..
            })
        )
    }

    /// An admin reviewed the message and kept the flag: withheld from listings
    pub fn is_removed(&self) -> bool {
        self.is_flagged && self.is_reviewed()
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub is_flagged: bool,
    pub admin_review_status: Option<MessageReviewStatus>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            sender_id: row.sender_id,
            recipient_id: row.recipient_id,
            content: row.content,
            is_flagged: row.is_flagged,
            admin_review: row.admin_review_status.map(|status| AdminReview {
                status,
                notes: row.admin_notes,
            }),
            created_at: row.created_at,
        }
    }
}

/// Request DTO for sending a message
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub recipient_id: Uuid,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

/// Query parameters for listing a user's messages
#[derive(Debug, Default, Deserialize)]
pub struct ListMessagesQuery {
    /// Narrow the listing to the conversation with this user
    pub with: Option<Uuid>,
}
