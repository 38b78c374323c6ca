//! Review route definitions

use axum::{routing::post, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", post(create_review))
        .route("/api/reviews/:id/flag", post(flag_review))
}
