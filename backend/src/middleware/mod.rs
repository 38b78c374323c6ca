//! Middleware for the SkillSwap API
//!
//! Request tracing and bearer-token authentication.

pub mod auth;
mod tracing;

pub use auth::{AdminUser, AuthenticatedUser};
pub use self::tracing::request_tracing;
