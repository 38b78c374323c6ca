//! Skill route definitions

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn skill_routes() -> Router<AppState> {
    Router::new()
        .route("/api/skills", get(list_skills).post(create_skill))
        .route("/api/skills/categories", get(list_categories))
        .route("/api/skills/:id", get(get_skill))
        .route("/api/skills/:id/reviews", get(list_skill_reviews))
}
