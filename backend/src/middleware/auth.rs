//! Authentication middleware
//!
//! Extractors that verify the bearer token and resolve the caller's session.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{JwtError, ResolveError, Session, SessionResolver};

/// Caller with a valid access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Session);

/// Error response for authentication failures
#[derive(Debug, Serialize)]
struct AuthError {
    #[serde(skip)]
    status: StatusCode,
    error: AuthErrorDetails,
}

#[derive(Debug, Serialize)]
struct AuthErrorDetails {
    code: String,
    message: String,
}

impl AuthError {
    fn new(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: AuthErrorDetails {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }

    fn forbidden(message: &str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            ..Self::new("FORBIDDEN", message)
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(AuthenticatedUser(session): AuthenticatedUser) -> impl IntoResponse {
///     format!("Hello, user {}", session.user_id)
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<SessionResolver>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AuthError::new(
                        "MISSING_TOKEN",
                        "Authorization header with Bearer token required",
                    )
                    .into_response()
                })?;

        let resolver = Arc::<SessionResolver>::from_ref(state);

        let session = resolver
            .resolve(bearer.token())
            .await
            .map_err(|e| match e {
                ResolveError::Token(JwtError::TokenExpired) => {
                    AuthError::new("TOKEN_EXPIRED", "Token has expired").into_response()
                }
                ResolveError::Token(_) => {
                    AuthError::new("INVALID_TOKEN", "Invalid token").into_response()
                }
                ResolveError::Store(err) => err.into_response(),
            })?;

        Ok(AuthenticatedUser(session))
    }
}

/// Caller whose profile row carries the admin flag
#[derive(Debug, Clone)]
pub struct AdminUser(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    Arc<SessionResolver>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(session) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !session.is_admin {
            return Err(AuthError::forbidden("Admin access required").into_response());
        }

        Ok(AdminUser(session))
    }
}
