/// Session tokens
///
/// A session token is an HS256-signed JWT naming the user and their role.
/// Clients keep it across page loads and send it as a bearer credential;
/// the server holds no session state.
///
/// # Claims
///
/// - `sub`: User ID
/// - `role`: `user` or `admin` at the time of issue
/// - `iss`: Always `"moviehub"`
/// - `iat` / `nbf` / `exp`: Unix timestamps
///
/// Signature, issuer, `nbf` and `exp` are all checked on validation.
///
/// # Example
///
/// ```
/// use moviehub_shared::auth::jwt::{create_token, validate_token, Claims};
/// use moviehub_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::new(user_id, UserRole::Admin), "your-secret-key")?;
///
/// let claims = validate_token(&token, "your-secret-key")?;
/// assert_eq!(claims.sub, user_id);
/// assert_eq!(claims.role, UserRole::Admin);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Token issuer
pub const ISSUER: &str = "moviehub";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format, or claim check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// JWT claims for a MovieHub session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Role at time of issue
    pub role: UserRole,

    /// Issuer - Always "moviehub"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Default session lifetime
    pub fn default_lifetime() -> Duration {
        Duration::hours(24)
    }

    /// Creates claims with the default 24 hour lifetime
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self::with_expiration(user_id, role, Self::default_lifetime())
    }

    /// Creates claims that expire after `expires_in`
    ///
    /// A negative duration produces an already-expired token, which is
    /// useful in tests.
    pub fn with_expiration(user_id: Uuid, role: UserRole, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and returns its claims
///
/// # Errors
///
/// - `JwtError::Expired` if `exp` has passed
/// - `JwtError::InvalidIssuer` if `iss` is not `"moviehub"`
/// - `JwtError::ValidationError` for bad signatures or malformed tokens
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
