//! Admin route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::admin::*;
use crate::state::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/dashboard", get(dashboard))
        .route("/api/admin/verifications", get(list_pending_verifications))
        .route("/api/admin/verifications/:id", post(decide_verification))
        .route("/api/admin/reviews", get(list_flagged_reviews))
        .route("/api/admin/reviews/:id", post(moderate_review))
        .route("/api/admin/disputes", get(list_active_disputes))
        .route("/api/admin/disputes/:id/resolve", post(resolve_dispute))
        .route("/api/admin/messages", get(list_flagged_messages))
        .route("/api/admin/messages/:id", post(review_message))
        .route("/api/admin/users/:id/promote", post(promote_user))
}
