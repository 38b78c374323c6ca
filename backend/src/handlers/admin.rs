//! Admin moderation handlers
//!
//! All routes here take [`AdminUser`], so non-admins are turned away
//! before any service call.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::message::Message;
use crate::middleware::AdminUser;
use crate::models::ApiResponse;
use crate::moderation::{
    DashboardStats, DecideVerificationRequest, DisputeQueueItem, FlaggedMessageItem,
    FlaggedReviewItem, ModerateRequest, ModerationService, ResolveDisputeRequest,
    VerificationQueueItem,
};
use crate::review::Review;
use crate::swap::SkillSwapRequest;
use crate::verification::VerificationDocument;

pub async fn dashboard(
    State(service): State<Arc<ModerationService>>,
    AdminUser(session): AdminUser,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let stats = service.dashboard(&session).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

pub async fn list_pending_verifications(
    State(service): State<Arc<ModerationService>>,
    AdminUser(session): AdminUser,
) -> Result<Json<ApiResponse<Vec<VerificationQueueItem>>>, ApiError> {
    let queue = service.pending_verifications(&session).await?;
    Ok(Json(ApiResponse::ok(queue)))
}

pub async fn decide_verification(
    State(service): State<Arc<ModerationService>>,
    AdminUser(session): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<DecideVerificationRequest>,
) -> Result<Json<ApiResponse<VerificationDocument>>, ApiError> {
    let document = service.decide_verification(&session, id, request).await?;
    Ok(Json(ApiResponse::ok(document)))
}

pub async fn list_flagged_reviews(
    State(service): State<Arc<ModerationService>>,
    AdminUser(session): AdminUser,
) -> Result<Json<ApiResponse<Vec<FlaggedReviewItem>>>, ApiError> {
    let queue = service.flagged_reviews(&session).await?;
    Ok(Json(ApiResponse::ok(queue)))
}

pub async fn moderate_review(
    State(service): State<Arc<ModerationService>>,
    AdminUser(session): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ModerateRequest>,
) -> Result<Json<ApiResponse<Review>>, ApiError> {
    let review = service.moderate_review(&session, id, request).await?;
    Ok(Json(ApiResponse::ok(review)))
}

pub async fn list_active_disputes(
    State(service): State<Arc<ModerationService>>,
    AdminUser(session): AdminUser,
) -> Result<Json<ApiResponse<Vec<DisputeQueueItem>>>, ApiError> {
    let queue = service.active_disputes(&session).await?;
    Ok(Json(ApiResponse::ok(queue)))
}

pub async fn resolve_dispute(
    State(service): State<Arc<ModerationService>>,
    AdminUser(session): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveDisputeRequest>,
) -> Result<Json<ApiResponse<SkillSwapRequest>>, ApiError> {
    let resolved = service.resolve_dispute(&session, id, request).await?;
    Ok(Json(ApiResponse::ok(resolved)))
}

pub async fn list_flagged_messages(
    State(service): State<Arc<ModerationService>>,
    AdminUser(session): AdminUser,
) -> Result<Json<ApiResponse<Vec<FlaggedMessageItem>>>, ApiError> {
    let queue = service.flagged_messages(&session).await?;
    Ok(Json(ApiResponse::ok(queue)))
}

pub async fn review_message(
    State(service): State<Arc<ModerationService>>,
    AdminUser(session): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ModerateRequest>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let message = service.review_message(&session, id, request).await?;
    Ok(Json(ApiResponse::ok(message)))
}

pub async fn promote_user(
    State(service): State<Arc<ModerationService>>,
    AdminUser(session): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, ApiError> {
    service.promote_to_admin(&session, user_id).await?;
    Ok(Json(ApiResponse::ok(user_id)))
}
