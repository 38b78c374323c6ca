//! Profile handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{ApiResponse, User};
use crate::profile::{CreateProfileRequest, ProfileService, ProfileUpdate};

pub async fn create_profile(
    State(service): State<Arc<ProfileService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(request): Json<CreateProfileRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = service.create_profile(&session, request).await?;
    Ok(Json(ApiResponse::ok(user)))
}

pub async fn get_me(
    State(service): State<Arc<ProfileService>>,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = service.me(&session).await?;
    Ok(Json(ApiResponse::ok(user)))
}

pub async fn update_me(
    State(service): State<Arc<ProfileService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = service.update_profile(&session, update).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Public profile of any user
pub async fn get_profile(
    State(service): State<Arc<ProfileService>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = service.get_profile(user_id).await?;
    Ok(Json(ApiResponse::ok(user)))
}
