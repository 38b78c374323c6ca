//! Message route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/api/messages", get(list_messages).post(send_message))
        .route("/api/messages/:id/flag", post(flag_message))
}
