/// Comment model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id),
///     movie_id UUID NOT NULL REFERENCES movies(id),
///     body TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Comments are read together with the author's display name
/// ([`CommentWithAuthor`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::is_foreign_key_violation;

/// Maximum comment body length, in characters
pub const MAX_COMMENT_LENGTH: u64 = 2000;

const COMMENT_COLUMNS: &str = "c.id, c.user_id, c.movie_id, c.body, c.created_at, c.updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,

    /// Author
    pub user_id: Uuid,

    pub movie_id: Uuid,

    pub body: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// A comment joined with its author's display name
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,

    pub user_name: String,
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub body: String,
}

/// Error type for comment creation
#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("Movie {0} not found")]
    MovieNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Comment {
    /// Adds a comment to a movie
    ///
    /// The body is trimmed before storage; length rules are checked at the
    /// request boundary.
    ///
    /// # Errors
    ///
    /// `CommentError::MovieNotFound` if the movie doesn't exist.
    pub async fn create(
        pool: &PgPool,
        data: CreateComment,
    ) -> Result<CommentWithAuthor, CommentError> {
        let created = sqlx::query_as::<_, CommentWithAuthor>(&format!(
            r#"
            WITH c AS (
                INSERT INTO comments (user_id, movie_id, body)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}, u.name AS user_name
            FROM c
            JOIN users u ON u.id = c.user_id
            "#
        ))
        .bind(data.user_id)
        .bind(data.movie_id)
        .bind(data.body.trim())
        .fetch_one(pool)
        .await;

        match created {
            Ok(comment) => {
                info!(
                    comment_id = %comment.comment.id,
                    movie_id = %data.movie_id,
                    user_id = %data.user_id,
                    "Comment added"
                );
                Ok(comment)
            }
            Err(e) if is_foreign_key_violation(&e) => Err(CommentError::MovieNotFound(data.movie_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Finds a comment by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists a movie's comments, newest first
    pub async fn list_for_movie(
        pool: &PgPool,
        movie_id: Uuid,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CommentWithAuthor>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}, u.name AS user_name
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.movie_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#
        ))
        .bind(movie_id)
        .fetch_all(pool)
        .await
    }

    /// Deletes a comment
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts all comments
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(pool)
            .await
    }
}
