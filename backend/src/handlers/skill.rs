//! Skill listing handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::ApiResponse;
use crate::review::{Review, ReviewService};
use crate::skill::{CreateSkillRequest, Skill, SkillFilter, SkillService, SkillWithOwner};

pub async fn list_skills(
    State(service): State<Arc<SkillService>>,
    Query(filter): Query<SkillFilter>,
) -> Result<Json<ApiResponse<Vec<Skill>>>, ApiError> {
    let skills = service.list_skills(filter).await?;
    Ok(Json(ApiResponse::ok(skills)))
}

pub async fn list_categories(
    State(service): State<Arc<SkillService>>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let categories = service.list_categories().await?;
    Ok(Json(ApiResponse::ok(categories)))
}

pub async fn get_skill(
    State(service): State<Arc<SkillService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SkillWithOwner>>, ApiError> {
    let skill = service.get_skill(id).await?;
    Ok(Json(ApiResponse::ok(skill)))
}

pub async fn list_user_skills(
    State(service): State<Arc<SkillService>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Skill>>>, ApiError> {
    let skills = service.list_for_user(user_id).await?;
    Ok(Json(ApiResponse::ok(skills)))
}

pub async fn create_skill(
    State(service): State<Arc<SkillService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(request): Json<CreateSkillRequest>,
) -> Result<Json<ApiResponse<Skill>>, ApiError> {
    let skill = service.create_skill(&session, request).await?;
    Ok(Json(ApiResponse::ok(skill)))
}

pub async fn list_skill_reviews(
    State(service): State<Arc<ReviewService>>,
    Path(skill_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Review>>>, ApiError> {
    let reviews = service.list_for_skill(skill_id).await?;
    Ok(Json(ApiResponse::ok(reviews)))
}
