//! Profile request models

use serde::Deserialize;
use validator::Validate;

/// Request DTO for creating the profile of a freshly signed-up identity
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

/// Profile fields a user may change
#[derive(Debug, Deserialize, Validate, Clone)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[validate(email)]
    pub email: String,
}
