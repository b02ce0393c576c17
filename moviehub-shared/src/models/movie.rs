/// Movie model and catalog operations
///
/// A movie carries denormalized vote counters (`upvotes`, `downvotes`,
/// `vote_score`) so the list page can sort by score without touching the
/// vote ledger. Nothing in this module writes those counters; they move
/// only through [`crate::models::vote::Vote::cast`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE movies (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL,
///     added_by UUID NOT NULL REFERENCES users(id),
///     upvotes INTEGER NOT NULL DEFAULT 0,
///     downvotes INTEGER NOT NULL DEFAULT 0,
///     vote_score INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CHECK (vote_score = upvotes - downvotes)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use moviehub_shared::models::movie::{Movie, MovieQuery, MovieSort};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let query = MovieQuery {
///     search: Some("knight".to_string()),
///     sort: MovieSort::Score,
///     limit: 10,
/// };
///
/// for entry in Movie::list(&pool, &query).await? {
///     println!("{} by {} ({})", entry.movie.title, entry.added_by_name, entry.movie.vote_score);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::tally::VoteCounters;

/// Default and maximum page size for listings
pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_LIST_LIMIT: i64 = 100;

/// Size of the admin leaderboard
pub const TOP_MOVIES_LIMIT: i64 = 20;

/// Field length limits, in characters
pub const MAX_TITLE_LENGTH: u64 = 200;
pub const MAX_DESCRIPTION_LENGTH: u64 = 5000;

const MOVIE_COLUMNS: &str = "m.id, m.title, m.description, m.added_by, m.upvotes, m.downvotes, \
     m.vote_score, m.created_at, m.updated_at";

/// A movie record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub id: Uuid,

    pub title: String,

    pub description: String,

    /// User who submitted the movie
    pub added_by: Uuid,

    pub upvotes: i32,

    pub downvotes: i32,

    /// Always `upvotes - downvotes`
    pub vote_score: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Movie {
    pub fn counters(&self) -> VoteCounters {
        VoteCounters {
            upvotes: self.upvotes,
            downvotes: self.downvotes,
            vote_score: self.vote_score,
        }
    }
}

/// A movie joined with its creator's display name
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MovieWithCreator {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub movie: Movie,

    pub added_by_name: String,
}

/// Input for creating a movie; fields are trimmed on insert
#[derive(Debug, Clone)]
pub struct CreateMovie {
    pub title: String,
    pub description: String,
    pub added_by: Uuid,
}

/// Listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MovieSort {
    /// Highest score first, older movies first on ties
    #[default]
    Score,

    /// Most recently submitted first
    Newest,

    /// Alphabetical, case-insensitive
    Title,
}

impl MovieSort {
    /// Parses a `sort` query value; anything unrecognised sorts by score
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("newest") => MovieSort::Newest,
            Some("title") => MovieSort::Title,
            _ => MovieSort::Score,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            MovieSort::Score => "m.vote_score DESC, m.created_at ASC, m.id ASC",
            MovieSort::Newest => "m.created_at DESC, m.id DESC",
            MovieSort::Title => "LOWER(m.title) ASC, m.created_at ASC, m.id ASC",
        }
    }
}

/// Catalog listing parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieQuery {
    /// Case-insensitive substring matched against title or description
    pub search: Option<String>,

    pub sort: MovieSort,

    pub limit: i64,
}

impl Default for MovieQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: MovieSort::Score,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl MovieQuery {
    /// ILIKE pattern for the search term, or `None` when there is nothing to filter
    fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| format!("%{}%", escape_like(term)))
    }
}

/// Clamps a requested page size into `1..=MAX_LIST_LIMIT`
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}

/// Escapes LIKE metacharacters so user input matches literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Result of a cascading movie delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeDeletion {
    pub deleted_movie: String,
    pub deleted_comments: u64,
    pub deleted_votes: u64,
}

impl Movie {
    /// Creates a movie with zeroed counters
    pub async fn create(pool: &PgPool, data: CreateMovie) -> Result<MovieWithCreator, sqlx::Error> {
        let movie = sqlx::query_as::<_, MovieWithCreator>(&format!(
            r#"
            WITH m AS (
                INSERT INTO movies (title, description, added_by)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT {MOVIE_COLUMNS}, u.name AS added_by_name
            FROM m
            JOIN users u ON u.id = m.added_by
            "#
        ))
        .bind(data.title.trim())
        .bind(data.description.trim())
        .bind(data.added_by)
        .fetch_one(pool)
        .await?;

        info!(movie_id = %movie.movie.id, added_by = %data.added_by, "Movie created");
        Ok(movie)
    }

    /// Finds a movie by ID
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<MovieWithCreator>, sqlx::Error> {
        let movie = sqlx::query_as::<_, MovieWithCreator>(&format!(
            r#"
            SELECT {MOVIE_COLUMNS}, u.name AS added_by_name
            FROM movies m
            JOIN users u ON u.id = m.added_by
            WHERE m.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(movie)
    }

    /// Lists movies with optional search, in the requested order
    pub async fn list(
        pool: &PgPool,
        query: &MovieQuery,
    ) -> Result<Vec<MovieWithCreator>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {MOVIE_COLUMNS}, u.name AS added_by_name
            FROM movies m
            JOIN users u ON u.id = m.added_by
            WHERE $1::text IS NULL
               OR m.title ILIKE $1
               OR m.description ILIKE $1
            ORDER BY {}
            LIMIT $2
            "#,
            query.sort.order_by()
        );

        let movies = sqlx::query_as::<_, MovieWithCreator>(&sql)
            .bind(query.search_pattern())
            .bind(query.limit.clamp(1, MAX_LIST_LIMIT))
            .fetch_all(pool)
            .await?;

        Ok(movies)
    }

    /// Deletes a movie together with its comments and votes
    ///
    /// All three deletes run in one transaction, dependents first. Returns
    /// `None` if the movie doesn't exist. Any failure rolls the whole
    /// transaction back and is returned to the caller.
    pub async fn delete_cascade(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<CascadeDeletion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Row lock blocks concurrent votes and comments until we finish
        let title: Option<String> =
            sqlx::query_scalar("SELECT title FROM movies WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(title) = title else {
            tx.rollback().await?;
            return Ok(None);
        };

        let deleted_comments = sqlx::query("DELETE FROM comments WHERE movie_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .inspect_err(|e| error!(movie_id = %id, step = "comments", error = %e, "Cascade delete failed"))?
            .rows_affected();

        let deleted_votes = sqlx::query("DELETE FROM votes WHERE movie_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .inspect_err(|e| error!(movie_id = %id, step = "votes", error = %e, "Cascade delete failed"))?
            .rows_affected();

        sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .inspect_err(|e| error!(movie_id = %id, step = "movie", error = %e, "Cascade delete failed"))?;

        tx.commit()
            .await
            .inspect_err(|e| error!(movie_id = %id, step = "commit", error = %e, "Cascade delete failed"))?;

        info!(
            movie_id = %id,
            title = %title,
            deleted_comments,
            deleted_votes,
            "Movie deleted with dependents"
        );

        Ok(Some(CascadeDeletion {
            deleted_movie: title,
            deleted_comments,
            deleted_votes,
        }))
    }

    /// Counts all movies
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(pool)
            .await
    }
}
