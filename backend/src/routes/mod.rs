//! Route definitions for the SkillSwap API

mod admin;
mod message;
mod review;
mod skill;
mod swap;
mod user;
mod verification;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::middleware;
use crate::state::AppState;
use crate::store::RecordStore;

pub use admin::admin_routes;
pub use message::message_routes;
pub use review::review_routes;
pub use skill::skill_routes;
pub use swap::swap_routes;
pub use user::user_routes;
pub use verification::verification_routes;

/// Every API route plus `/` and `/health`, with request tracing applied
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(user_routes())
        .merge(skill_routes())
        .merge(swap_routes())
        .merge(review_routes())
        .merge(message_routes())
        .merge(verification_routes(max_upload_bytes))
        .merge(admin_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::request_tracing))
}

async fn root() -> &'static str {
    "SkillSwap API Server"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    database: String,
    version: String,
}

async fn health_check(State(store): State<Arc<dyn RecordStore>>) -> Json<HealthResponse> {
    let database = match store.health_check().await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let status = if database == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        database,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
