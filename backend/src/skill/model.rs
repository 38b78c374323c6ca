//! Skill listing models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::User;

#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "experience_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Expert,
}

/// A skill listed by its owner. `rating` and `review_count` are an
/// aggregate maintained outside this service.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Skill {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub experience_level: ExperienceLevel,
    pub tags: Vec<String>,
    pub rating: f64,
    pub review_count: i32,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for listing a new skill
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSkillRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 60))]
    pub category: String,
    #[validate(length(max = 2000))]
    pub description: String,
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub tags: Vec<String>,
}

impl CreateSkillRequest {
    pub fn into_skill(self, owner_id: Uuid) -> Skill {
        Skill {
            id: Uuid::new_v4(),
            user_id: owner_id,
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            description: self.description,
            experience_level: self.experience_level,
            tags: self
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            rating: 0.0,
            review_count: 0,
            is_verified: false,
            created_at: Utc::now(),
        }
    }
}

/// Query parameters for browsing skills
#[derive(Debug, Default, Deserialize, Clone)]
pub struct SkillFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl SkillFilter {
    /// Category must match exactly; search is a case-insensitive substring
    /// match against name, description, and tags.
    pub fn matches(&self, skill: &Skill) -> bool {
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if skill.category != category {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(search) => {
                let needle = search.to_lowercase();
                skill.name.to_lowercase().contains(&needle)
                    || skill.description.to_lowercase().contains(&needle)
                    || skill
                        .tags
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Skill detail together with its owner's profile
#[derive(Debug, Serialize)]
pub struct SkillWithOwner {
    pub skill: Skill,
    pub owner: User,
}
