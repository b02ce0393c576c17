/// Error handling for the API server
///
/// All handlers return `Result<T, ApiError>`, which converts to an HTTP
/// status and a `{error, message, details?}` JSON body.
///
/// Internal errors are logged and answered with a generic message. The
/// underlying detail travels with the response as an [`InternalErrorDetail`]
/// extension so that development builds can surface it (see
/// [`crate::middleware::error_detail`]).
///
/// # Example
///
/// ```
/// use moviehub_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(found: bool) -> ApiResult<Json<serde_json::Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Movie not found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use moviehub_shared::{
    auth::{authorization::AuthzError, jwt::JwtError, middleware::AuthError, password::PasswordError},
    db::is_unique_violation,
    models::{comment::CommentError, user::EMAIL_UNIQUE_CONSTRAINT, vote::VoteError},
    tally::InvalidVoteType,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidationErrors;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - duplicate email, vote contention
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Validation errors, or internal detail in development
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Detail of an internal error, attached to 500 responses as an extension
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut internal_detail = None;

        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(serde_json::to_value(errors).unwrap_or_default()),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!(error = %msg, "Internal error");
                internal_detail = Some(InternalErrorDetail(msg));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        let mut response = (status, body).into_response();
        if let Some(detail) = internal_detail {
            response.extensions_mut().insert(detail);
        }
        response
    }
}

/// Converts `validator` failures into per-field details
impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    ValidationErrorDetail::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err, EMAIL_UNIQUE_CONSTRAINT) {
            return ApiError::Conflict("Email already registered".to_string());
        }

        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => ApiError::Unauthorized("Missing credentials".to_string()),
            AuthError::InvalidFormat(msg) => ApiError::Unauthorized(msg),
            AuthError::InvalidToken(jwt_err) => jwt_err.into(),
        }
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::InsufficientRole { .. } => {
                ApiError::Forbidden("Admin access required".to_string())
            }
            AuthzError::NotOwner => ApiError::Forbidden("Not authorized".to_string()),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::CreateError(_) => {
                ApiError::InternalError(format!("Token creation failed: {}", err))
            }
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

impl From<VoteError> for ApiError {
    fn from(err: VoteError) -> Self {
        match err {
            VoteError::MovieNotFound(_) => ApiError::NotFound("Movie not found".to_string()),
            VoteError::Contention { .. } => {
                ApiError::Conflict("Vote is being updated concurrently, please retry".to_string())
            }
            VoteError::Database(e) => e.into(),
        }
    }
}

impl From<CommentError> for ApiError {
    fn from(err: CommentError) -> Self {
        match err {
            CommentError::MovieNotFound(_) => ApiError::NotFound("Movie not found".to_string()),
            CommentError::Database(e) => e.into(),
        }
    }
}

impl From<InvalidVoteType> for ApiError {
    fn from(_: InvalidVoteType) -> Self {
        ApiError::BadRequest("Invalid vote type".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use validator::Validate;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Movie not found".to_string());
        assert_eq!(err.to_string(), "Not found: Movie not found");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (ApiError::BadRequest(String::new()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized(String::new()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden(String::new()), StatusCode::FORBIDDEN),
            (ApiError::NotFound(String::new()), StatusCode::NOT_FOUND),
            (ApiError::Conflict(String::new()), StatusCode::CONFLICT),
            (ApiError::ValidationError(vec![]), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::InternalError(String::new()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let response = ApiError::InternalError("connection reset by peer".to_string()).into_response();

        let detail = response.extensions().get::<InternalErrorDetail>().cloned();
        assert_eq!(detail.unwrap().0, "connection reset by peer");

        let json = body_json(response).await;
        assert_eq!(json["error"], "internal_error");
        assert_eq!(json["message"], "An internal error occurred");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        #[derive(Validate)]
        struct Form {
            #[validate(length(min = 1, message = "Title is required"))]
            title: String,
        }

        let err: ApiError = Form { title: String::new() }.validate().unwrap_err().into();
        let json = body_json(err.into_response()).await;

        assert_eq!(json["error"], "validation_error");
        assert_eq!(json["details"][0]["field"], "title");
        assert_eq!(json["details"][0]["message"], "Title is required");
    }

    #[test]
    fn test_domain_error_mapping() {
        assert!(matches!(
            ApiError::from(VoteError::MovieNotFound(Uuid::nil())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(VoteError::Contention { movie_id: Uuid::nil(), attempts: 3 }),
            ApiError::Conflict(_)
        ));
        assert!(matches!(ApiError::from(InvalidVoteType(0)), ApiError::BadRequest(_)));
        assert!(matches!(ApiError::from(AuthzError::NotOwner), ApiError::Forbidden(_)));
        assert!(matches!(ApiError::from(JwtError::Expired), ApiError::Unauthorized(_)));
        assert!(matches!(
            ApiError::from(AuthError::MissingCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(ApiError::from(sqlx::Error::RowNotFound), ApiError::NotFound(_)));
        assert!(matches!(ApiError::from(sqlx::Error::PoolTimedOut), ApiError::InternalError(_)));
    }
}
