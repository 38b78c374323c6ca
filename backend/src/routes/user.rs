//! Profile route definitions

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", axum::routing::post(create_profile))
        .route("/api/users/me", get(get_me).put(update_me))
        .route("/api/users/:id", get(get_profile))
        .route("/api/users/:id/skills", get(list_user_skills))
}
