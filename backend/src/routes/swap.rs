//! Swap request route definitions

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn swap_routes() -> Router<AppState> {
    Router::new()
        .route("/api/swaps", get(list_swap_requests).post(create_swap_request))
        .route("/api/swaps/buckets", get(swap_buckets))
        .route("/api/swaps/:id", get(get_swap_request))
        .route("/api/swaps/:id/status", put(update_swap_status))
        .route("/api/swaps/:id/dispute", post(open_dispute))
}
