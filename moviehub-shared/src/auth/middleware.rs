/// Request authentication for Axum
///
/// Session tokens arrive as `Authorization: Bearer <token>`. This module
/// turns that header into an [`AuthContext`] that the API's middleware
/// stores in request extensions; handlers then take it with
/// `Extension<AuthContext>`.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use moviehub_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User {} ({:?})", auth.user_id, auth.role)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, Claims, JwtError};
use crate::models::user::UserRole;

/// Identity of the caller for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Role carried by the session token
    pub role: UserRole,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header is not a bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token failed validation
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),
}

/// Extracts the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    Ok(token)
}

/// Authenticates a request from its headers
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if there is no usable token
/// - `AuthError::InvalidFormat` if the header is not a bearer credential
/// - `AuthError::InvalidToken` if the token is forged, malformed or expired
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validate_token(token, secret)?;

    Ok(AuthContext::from_claims(&claims))
}
