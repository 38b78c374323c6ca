//! Verification route definitions

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

/// Upload routes accept bodies up to `max_upload_bytes`
pub fn verification_routes(max_upload_bytes: usize) -> Router<AppState> {
    let uploads = Router::new()
        .route("/api/verification/identity", post(submit_identity_documents))
        .route(
            "/api/verification/skills/:skill_id",
            post(submit_skill_documents),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/api/verification/documents", get(list_my_documents))
        .route("/api/verification/documents/:id", get(get_document_status))
        .merge(uploads)
}
