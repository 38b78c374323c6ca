//! Authentication for SkillSwap
//!
//! - Bearer JWT verification (HS256, shared secret with the identity provider)
//! - Explicit per-request sessions carrying the caller's admin flag

mod jwt;
mod session;

pub use jwt::{issue_access_token, verify_token, Claims, JwtError};
pub use session::{ResolveError, Session, SessionResolver};
