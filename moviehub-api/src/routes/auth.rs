/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Create an account and get a session token
/// - `POST /api/auth/login` - Exchange credentials for a session token
/// - `GET /api/auth/me` - Current user's profile

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    validation::{not_blank, password_policy},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use moviehub_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{CreateUser, User, UserRole},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "not_blank", message = "Name is required")
    )]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password, checked against the password policy
    #[validate(custom(function = "password_policy"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register and login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Session token for the `Authorization: Bearer` header
    pub token: String,

    pub user: User,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Ana",
///   "email": "ana@example.com",
///   "password": "popcorn42"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{ "token": "eyJ...", "user": { ... } }`
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: UserRole::User,
        },
    )
    .await?;

    info!(user_id = %user.id, "User registered");

    let token = state.issue_token(&user)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// Login endpoint
///
/// Unknown email and wrong password get the same 401 response.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "ana@example.com",
///   "password": "popcorn42"
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let Some(user) = User::find_by_email(&state.db, &req.email).await? else {
        debug!("Login attempt for unknown email");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !password::verify_password(&req.password, &user.password_hash)? {
        debug!(user_id = %user.id, "Login attempt with wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.issue_token(&user)?;
    info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse { token, user }))
}

/// Current user's profile
///
/// The role returned here is the stored one, which may be newer than the
/// role in the caller's token.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
