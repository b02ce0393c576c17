/// Comment endpoints
///
/// # Endpoints
///
/// - `POST /api/comments/:movie_id` - Comment on a movie
/// - `DELETE /api/comments/:comment_id` - Delete a comment (author or admin)
///
/// Both routes share the `/:id` path segment; its meaning depends on the
/// method.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    validation::not_blank,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use moviehub_shared::{
    auth::{authorization::can_delete_comment, middleware::AuthContext},
    models::comment::{Comment, CommentWithAuthor, CreateComment, MAX_COMMENT_LENGTH},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    #[validate(
        length(max = MAX_COMMENT_LENGTH, message = "Comment must be at most 2000 characters"),
        custom(function = "not_blank", message = "Comment body is required")
    )]
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Add a comment
///
/// # Endpoint
///
/// ```text
/// POST /api/comments/:movie_id
/// Authorization: Bearer <token>
///
/// { "body": "Loved the ending." }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Empty or over-long body
/// - `404 Not Found`: Movie doesn't exist
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(movie_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentWithAuthor>)> {
    req.validate()?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            user_id: auth.user_id,
            movie_id,
            body: req.body,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Delete a comment
///
/// Allowed for the comment's author and for admins.
///
/// # Errors
///
/// - `404 Not Found`: Comment doesn't exist
/// - `403 Forbidden`: Caller is neither the author nor an admin
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(comment_id): ApiPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let comment = Comment::find_by_id(&state.db, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    can_delete_comment(&auth, comment.user_id)?;

    if !Comment::delete(&state.db, comment_id).await? {
        // Removed by someone else between the lookup and the delete
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    info!(%comment_id, user_id = %auth.user_id, "Comment deleted");

    Ok(Json(MessageResponse::new("Comment deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_comment_validation() {
        assert!(AddCommentRequest {
            body: "Loved it".to_string()
        }
        .validate()
        .is_ok());

        assert!(AddCommentRequest {
            body: " \n ".to_string()
        }
        .validate()
        .is_err());

        assert!(AddCommentRequest {
            body: "a".repeat(MAX_COMMENT_LENGTH as usize + 1)
        }
        .validate()
        .is_err());

        assert!(AddCommentRequest {
            body: "a".repeat(MAX_COMMENT_LENGTH as usize)
        }
        .validate()
        .is_ok());
    }
}
