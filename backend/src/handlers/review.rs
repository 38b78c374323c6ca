//! Review handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::ApiResponse;
use crate::review::{CreateReviewRequest, Review, ReviewService};

pub async fn create_review(
    State(service): State<Arc<ReviewService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Json<ApiResponse<Review>>, ApiError> {
    let review = service.create_review(&session, request).await?;
    Ok(Json(ApiResponse::ok(review)))
}

pub async fn flag_review(
    State(service): State<Arc<ReviewService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Review>>, ApiError> {
    let review = service.flag_review(&session, id).await?;
    Ok(Json(ApiResponse::ok(review)))
}
