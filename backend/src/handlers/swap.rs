//! Swap request handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::ApiResponse;
use crate::swap::{
    CreateSwapRequest, OpenDisputeRequest, SkillSwapRequest, SwapBuckets, SwapService,
    UpdateSwapStatusRequest,
};

pub async fn create_swap_request(
    State(service): State<Arc<SwapService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(request): Json<CreateSwapRequest>,
) -> Result<Json<ApiResponse<SkillSwapRequest>>, ApiError> {
    let swap = service.create_request(&session, request).await?;
    Ok(Json(ApiResponse::ok(swap)))
}

pub async fn list_swap_requests(
    State(service): State<Arc<SwapService>>,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<SkillSwapRequest>>>, ApiError> {
    let requests = service.list_requests(&session).await?;
    Ok(Json(ApiResponse::ok(requests)))
}

pub async fn swap_buckets(
    State(service): State<Arc<SwapService>>,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<Json<ApiResponse<SwapBuckets>>, ApiError> {
    let buckets = service.buckets(&session).await?;
    Ok(Json(ApiResponse::ok(buckets)))
}

pub async fn get_swap_request(
    State(service): State<Arc<SwapService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SkillSwapRequest>>, ApiError> {
    let request = service.get_request(&session, id).await?;
    Ok(Json(ApiResponse::ok(request)))
}

pub async fn update_swap_status(
    State(service): State<Arc<SwapService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSwapStatusRequest>,
) -> Result<Json<ApiResponse<SkillSwapRequest>>, ApiError> {
    let updated = service.update_status(&session, id, request.status).await?;
    Ok(Json(ApiResponse::ok(updated)))
}

pub async fn open_dispute(
    State(service): State<Arc<SwapService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<OpenDisputeRequest>,
) -> Result<Json<ApiResponse<SkillSwapRequest>>, ApiError> {
    let disputed = service.open_dispute(&session, id, request).await?;
    Ok(Json(ApiResponse::ok(disputed)))
}
