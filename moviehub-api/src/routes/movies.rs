/// Movie catalog endpoints
///
/// # Endpoints
///
/// - `GET /api/movies` - List movies (`search`, `sort`, `limit` query params)
/// - `GET /api/movies/:id` - Movie with its comments
/// - `POST /api/movies` - Submit a movie (authenticated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    validation::not_blank,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use moviehub_shared::{
    auth::middleware::AuthContext,
    models::{
        comment::{Comment, CommentWithAuthor},
        movie::{
            clamp_limit, CreateMovie, Movie, MovieQuery, MovieSort, MovieWithCreator,
            MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH,
        },
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Query parameters for listing movies
#[derive(Debug, Default, Deserialize)]
pub struct ListMoviesQuery {
    /// Substring matched against title or description
    pub search: Option<String>,

    /// `score` (default), `newest` or `title`
    pub sort: Option<String>,

    /// Page size, clamped to 1..=100
    pub limit: Option<i64>,
}

impl From<ListMoviesQuery> for MovieQuery {
    fn from(query: ListMoviesQuery) -> Self {
        MovieQuery {
            search: query.search,
            sort: MovieSort::parse(query.sort.as_deref()),
            limit: clamp_limit(query.limit),
        }
    }
}

/// Movie submission
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMovieRequest {
    #[validate(
        length(max = MAX_TITLE_LENGTH, message = "Title must be at most 200 characters"),
        custom(function = "not_blank", message = "Title is required")
    )]
    pub title: String,

    #[validate(
        length(max = MAX_DESCRIPTION_LENGTH, message = "Description must be at most 5000 characters"),
        custom(function = "not_blank", message = "Description is required")
    )]
    pub description: String,
}

/// Movie detail response
#[derive(Debug, Serialize)]
pub struct MovieDetailResponse {
    pub movie: MovieWithCreator,

    /// Newest first
    pub comments: Vec<CommentWithAuthor>,
}

/// List movies
///
/// # Endpoint
///
/// ```text
/// GET /api/movies?search=space&sort=newest&limit=20
/// ```
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<ListMoviesQuery>,
) -> ApiResult<Json<Vec<MovieWithCreator>>> {
    let movies = Movie::list(&state.db, &query.into()).await?;
    Ok(Json(movies))
}

/// Get a movie and its comments
///
/// # Errors
///
/// - `400 Bad Request`: `id` is not a UUID
/// - `404 Not Found`: Movie doesn't exist
pub async fn get_movie(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MovieDetailResponse>> {
    let movie = Movie::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

    let comments = Comment::list_for_movie(&state.db, id).await?;

    Ok(Json(MovieDetailResponse { movie, comments }))
}

/// Submit a movie
///
/// # Endpoint
///
/// ```text
/// POST /api/movies
/// Authorization: Bearer <token>
///
/// { "title": "Arrival", "description": "Linguist meets heptapods." }
/// ```
///
/// Counters start at zero.
pub async fn create_movie(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateMovieRequest>,
) -> ApiResult<(StatusCode, Json<MovieWithCreator>)> {
    req.validate()?;

    let movie = Movie::create(
        &state.db,
        CreateMovie {
            title: req.title,
            description: req.description,
            added_by: auth.user_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(movie)))
}
