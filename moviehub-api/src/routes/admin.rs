/// Admin endpoints
///
/// Every route here sits behind `require_admin_layer`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    routes::comments::MessageResponse,
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use moviehub_shared::{
    auth::middleware::AuthContext,
    models::{
        comment::Comment,
        movie::{clamp_limit, Movie, MovieQuery, MovieSort, MovieWithCreator, TOP_MOVIES_LIMIT},
        user::{User, UserRole},
        Stats,
    },
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Cascade delete response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMovieResponse {
    pub message: String,
    pub deleted_movie: String,
    pub deleted_comments: u64,
    pub deleted_votes: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    /// `"user"` or `"admin"`
    pub role: UserRole,
}

/// Entity counts
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<Stats>> {
    let stats = Stats::collect(&state.db).await?;
    Ok(Json(stats))
}

/// Highest-scoring movies
pub async fn top_movies(State(state): State<AppState>) -> ApiResult<Json<Vec<MovieWithCreator>>> {
    let query = MovieQuery {
        search: None,
        sort: MovieSort::Score,
        limit: TOP_MOVIES_LIMIT,
    };
    let movies = Movie::list(&state.db, &query).await?;
    Ok(Json(movies))
}

/// Delete a movie with its comments and votes
///
/// # Response
///
/// ```json
/// {
///   "message": "Movie deleted",
///   "deletedMovie": "Arrival",
///   "deletedComments": 3,
///   "deletedVotes": 5
/// }
/// ```
pub async fn delete_movie(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeleteMovieResponse>> {
    let deletion = Movie::delete_cascade(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

    info!(movie_id = %id, admin_id = %auth.user_id, "Admin deleted movie");

    Ok(Json(DeleteMovieResponse {
        message: "Movie deleted".to_string(),
        deleted_movie: deletion.deleted_movie,
        deleted_comments: deletion.deleted_comments,
        deleted_votes: deletion.deleted_votes,
    }))
}

/// Delete any comment
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if !Comment::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    info!(comment_id = %id, admin_id = %auth.user_id, "Admin deleted comment");

    Ok(Json(MessageResponse::new("Comment deleted")))
}

/// List users, newest first
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let users = User::list(&state.db, clamp_limit(query.limit)).await?;
    Ok(Json(users))
}

/// Change a user's role
///
/// Tokens issued before the change keep the old role until they expire.
pub async fn set_user_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<SetRoleRequest>,
) -> ApiResult<Json<User>> {
    let user = User::update_role(&state.db, id, req.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %id, role = ?req.role, admin_id = %auth.user_id, "User role changed");

    Ok(Json(user))
}
