//! Direct message handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::message::{ListMessagesQuery, Message, MessageService, SendMessageRequest};
use crate::middleware::AuthenticatedUser;
use crate::models::ApiResponse;

pub async fn send_message(
    State(service): State<Arc<MessageService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let message = service.send_message(&session, request).await?;
    Ok(Json(ApiResponse::ok(message)))
}

pub async fn list_messages(
    State(service): State<Arc<MessageService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<ApiResponse<Vec<Message>>>, ApiError> {
    let messages = service.list_messages(&session, query).await?;
    Ok(Json(ApiResponse::ok(messages)))
}

pub async fn flag_message(
    State(service): State<Arc<MessageService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let message = service.flag_message(&session, id).await?;
    Ok(Json(ApiResponse::ok(message)))
}
