/// Voting endpoints
///
/// # Endpoints
///
/// - `POST /api/votes/:movie_id` - Cast, repeat or flip a vote
/// - `GET /api/votes/:movie_id/user-vote` - Caller's current vote

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, Extension, Json};
use moviehub_shared::{
    auth::middleware::AuthContext,
    models::vote::{CastOutcome, Vote},
    tally::{VoteTransition, VoteType},
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Vote request
///
/// `voteType` is kept as a raw integer so that values other than 1 and -1
/// answer with "Invalid vote type" rather than a JSON parse error.
#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    #[serde(rename = "voteType")]
    pub vote_type: i64,
}

/// Vote response with the movie's counters after the cast
#[derive(Debug, Serialize)]
pub struct CastVoteResponse {
    pub message: String,
    pub vote_type: VoteType,
    pub vote_score: i32,
    pub upvotes: i32,
    pub downvotes: i32,
}

impl CastVoteResponse {
    fn from_outcome(outcome: &CastOutcome) -> Self {
        Self {
            message: "Vote recorded".to_string(),
            vote_type: outcome.transition.resulting_vote(),
            vote_score: outcome.counters.vote_score,
            upvotes: outcome.counters.upvotes,
            downvotes: outcome.counters.downvotes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserVoteResponse {
    /// `1`, `-1` or `null`
    pub vote_type: Option<VoteType>,
}

/// Cast a vote
///
/// # Endpoint
///
/// ```text
/// POST /api/votes/:movie_id
/// Authorization: Bearer <token>
///
/// { "voteType": 1 }
/// ```
///
/// Repeating the same vote is a no-op; voting the other way flips it.
///
/// # Errors
///
/// - `400 Bad Request`: `voteType` is not 1 or -1, or the path is not a UUID
/// - `404 Not Found`: Movie doesn't exist
/// - `409 Conflict`: Lost every retry against concurrent casts
pub async fn cast_vote(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(movie_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CastVoteRequest>,
) -> ApiResult<Json<CastVoteResponse>> {
    let vote_type = VoteType::try_from(req.vote_type)?;

    let outcome = Vote::cast(&state.db, auth.user_id, movie_id, vote_type).await?;

    if matches!(outcome.transition, VoteTransition::Unchanged(_)) {
        debug!(user_id = %auth.user_id, %movie_id, "Repeated vote left unchanged");
    }

    Ok(Json(CastVoteResponse::from_outcome(&outcome)))
}

/// Get the caller's vote on a movie
///
/// Returns `{ "vote_type": null }` when there is no vote, including for
/// movies that don't exist.
pub async fn get_user_vote(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(movie_id): ApiPath<Uuid>,
) -> ApiResult<Json<UserVoteResponse>> {
    let vote_type = Vote::find_user_vote(&state.db, auth.user_id, movie_id).await?;
    Ok(Json(UserVoteResponse { vote_type }))
}
