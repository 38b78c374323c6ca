//! Shared data models for the SkillSwap backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User profile row
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub rating: f64,
    pub review_count: i32,
    pub is_verified: bool,
    pub is_admin: bool,
    pub identity_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Fresh profile for an identity that just signed up
    pub fn new(id: Uuid, name: String, email: String) -> Self {
        Self {
            id,
            name,
            email,
            bio: None,
            profile_image: None,
            rating: 0.0,
            review_count: 0,
            is_verified: false,
            is_admin: false,
            identity_verified: false,
            created_at: Utc::now(),
        }
    }
}

/// Name and contact of a user, attached to moderation queue items
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}
