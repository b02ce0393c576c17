/// Authentication gates for protected routes
///
/// Both layers validate the bearer token and insert an
/// [`AuthContext`] into request extensions. [`require_admin_layer`]
/// additionally rejects non-admins with 403 before the handler runs.
///
/// # Example
///
/// ```no_run
/// use axum::{routing::get, Extension, Router};
/// use moviehub_api::app::AppState;
/// use moviehub_api::middleware::auth::jwt_auth_layer;
/// use moviehub_shared::auth::middleware::AuthContext;
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     auth.user_id.to_string()
/// }
///
/// fn routes(state: AppState) -> Router<AppState> {
///     Router::new()
///         .route("/whoami", get(whoami))
///         .layer(axum::middleware::from_fn_with_state(state, jwt_auth_layer))
/// }
/// ```

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use moviehub_shared::auth::{authorization, middleware::authenticate};
use tracing::debug;

/// Requires a valid session token
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret()).inspect_err(|e| {
        debug!(error = %e, path = %req.uri().path(), "Rejected unauthenticated request")
    })?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

/// Requires a valid session token carrying the admin role
pub async fn require_admin_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret())?;

    authorization::require_admin(&auth).inspect_err(|_| {
        debug!(user_id = %auth.user_id, path = %req.uri().path(), "Rejected non-admin request")
    })?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
