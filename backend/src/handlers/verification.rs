//! Verification submission handlers

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::ApiResponse;
use crate::verification::{UploadedFile, VerificationDocument, VerificationService};

/// Collect every file part of the form; parts without a file name are ignored
async fn read_files(mut multipart: Multipart) -> Result<Vec<UploadedFile>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read '{}': {}", name, e)))?;

        files.push(UploadedFile {
            name,
            bytes: bytes.to_vec(),
        });
    }

    Ok(files)
}

pub async fn submit_identity_documents(
    State(service): State<Arc<VerificationService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Vec<VerificationDocument>>>, ApiError> {
    let files = read_files(multipart).await?;
    let documents = service.submit_identity(&session, files).await?;
    Ok(Json(ApiResponse::ok(documents)))
}

pub async fn submit_skill_documents(
    State(service): State<Arc<VerificationService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(skill_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Vec<VerificationDocument>>>, ApiError> {
    let files = read_files(multipart).await?;
    let documents = service.submit_skill(&session, skill_id, files).await?;
    Ok(Json(ApiResponse::ok(documents)))
}

pub async fn list_my_documents(
    State(service): State<Arc<VerificationService>>,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<VerificationDocument>>>, ApiError> {
    let documents = service.list_mine(&session).await?;
    Ok(Json(ApiResponse::ok(documents)))
}

pub async fn get_document_status(
    State(service): State<Arc<VerificationService>>,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VerificationDocument>>, ApiError> {
    let document = service.document_status(&session, id).await?;
    Ok(Json(ApiResponse::ok(document)))
}
