//! Review models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::User;

#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "review_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,  // Published, not yet looked at by an admin
    Approved, // Confirmed by an admin
    Flagged,  // Reported, waiting in the moderation queue
    Removed,  // Taken down by an admin
}

impl ReviewStatus {
    /// Approved and removed reviews are final
    pub fn is_moderatable(self) -> bool {
        matches!(self, ReviewStatus::Pending | ReviewStatus::Flagged)
    }

    pub fn is_visible(self) -> bool {
        !matches!(self, ReviewStatus::Removed)
    }
}

/// Display snapshot of the reviewer taken when the review was written
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Reviewer {
    pub id: Uuid,
    pub name: String,
    pub profile_image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Review {
    pub id: Uuid,
    /// The reviewed user (owner of the skill)
    pub user_id: Uuid,
    pub skill_id: Uuid,
    pub reviewer: Reviewer,
    pub rating: i32,
    pub comment: String,
    pub status: ReviewStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(owner_id: Uuid, reviewer: &User, request: CreateReviewRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: owner_id,
            skill_id: request.skill_id,
            reviewer: Reviewer {
                id: reviewer.id,
                name: reviewer.name.clone(),
                profile_image: reviewer.profile_image.clone(),
            },
            rating: request.rating,
            comment: request.comment,
            status: ReviewStatus::Pending,
            admin_notes: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewer_name: String,
    pub reviewer_image: Option<String>,
    pub rating: i32,
    pub comment: String,
    pub status: ReviewStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            skill_id: row.skill_id,
            reviewer: Reviewer {
                id: row.reviewer_id,
                name: row.reviewer_name,
                profile_image: row.reviewer_image,
            },
            rating: row.rating,
            comment: row.comment,
            status: row.status,
            admin_notes: row.admin_notes,
            created_at: row.created_at,
        }
    }
}

/// Request DTO for writing a review
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub skill_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(rating: i32) -> CreateReviewRequest {
        CreateReviewRequest {
            skill_id: Uuid::new_v4(),
            rating,
            comment: "Very patient teacher".to_string(),
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert!(request(0).validate().is_err());
        assert!(request(1).validate().is_ok());
        assert!(request(5).validate().is_ok());
        assert!(request(6).validate().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ReviewStatus::Pending.is_moderatable());
        assert!(ReviewStatus::Flagged.is_moderatable());
        assert!(!ReviewStatus::Approved.is_moderatable());
        assert!(!ReviewStatus::Removed.is_moderatable());
        assert!(!ReviewStatus::Removed.is_visible());
    }
}
