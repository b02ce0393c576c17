/// Vote ledger and counter reconciliation
///
/// The ledger holds at most one row per (user, movie), enforced by the
/// `votes_user_movie_key` unique constraint. [`Vote::cast`] is the only code
/// path that writes a movie's counters, and it does so in the same
/// transaction as the ledger write, so the two commit together or not at all.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE votes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id),
///     movie_id UUID NOT NULL REFERENCES movies(id),
///     vote_type SMALLINT NOT NULL CHECK (vote_type IN (1, -1)),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT votes_user_movie_key UNIQUE (user_id, movie_id)
/// );
/// ```
///
/// # Concurrency
///
/// Two casts for the same pair can both read "no vote" and both try to
/// insert. The unique constraint rejects the second insert; that attempt is
/// rolled back and retried, and the retry finds the committed row and takes
/// the same-sign or flip path. A flip is a compare-and-set on the old sign,
/// so a flip that loses a race is retried the same way. Counter updates are
/// relative (`upvotes = upvotes + $n`), so votes from different users never
/// overwrite each other.
///
/// # Example
///
/// ```no_run
/// use moviehub_shared::models::vote::Vote;
/// use moviehub_shared::tally::VoteType;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid, movie_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = Vote::cast(&pool, user_id, movie_id, VoteType::Up).await?;
/// println!("score is now {}", outcome.counters.vote_score);
///
/// assert_eq!(Vote::find_user_vote(&pool, user_id, movie_id).await?, Some(VoteType::Up));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::{is_foreign_key_violation, is_unique_violation};
use crate::tally::{VoteCounters, VoteTransition, VoteType};

/// Name of the unique constraint on `votes (user_id, movie_id)`
pub const VOTE_UNIQUE_CONSTRAINT: &str = "votes_user_movie_key";

/// How many times a cast is attempted before giving up on contention
pub const MAX_CAST_ATTEMPTS: u32 = 3;

/// A ledger row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vote {
    pub id: Uuid,

    pub user_id: Uuid,

    pub movie_id: Uuid,

    #[sqlx(try_from = "i16")]
    pub vote_type: VoteType,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Error type for vote casting
#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    #[error("Movie {0} not found")]
    MovieNotFound(Uuid),

    /// Every attempt lost a race with a concurrent cast for the same pair
    #[error("Vote on movie {movie_id} still conflicting after {attempts} attempts")]
    Contention { movie_id: Uuid, attempts: u32 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a successful cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastOutcome {
    /// Movie counters after the cast
    pub counters: VoteCounters,

    /// What happened to the ledger row
    pub transition: VoteTransition,
}

enum Attempt {
    Done(CastOutcome),
    Retry(&'static str),
}

impl Vote {
    /// Casts (or re-casts) a user's vote on a movie and reconciles the counters
    ///
    /// - No previous vote: a row is inserted and the matching counter goes up.
    /// - Same sign as before: nothing is written; current counters are returned.
    /// - Opposite sign: the row is flipped, one counter goes down and the other up.
    ///
    /// # Errors
    ///
    /// - `VoteError::MovieNotFound` if the movie doesn't exist (or is deleted mid-cast)
    /// - `VoteError::Contention` if every attempt lost a race
    /// - `VoteError::Database` for store failures; nothing is committed
    pub async fn cast(
        pool: &PgPool,
        user_id: Uuid,
        movie_id: Uuid,
        vote_type: VoteType,
    ) -> Result<CastOutcome, VoteError> {
        for attempt in 1..=MAX_CAST_ATTEMPTS {
            match Self::try_cast(pool, user_id, movie_id, vote_type).await? {
                Attempt::Done(outcome) => {
                    debug!(
                        %user_id,
                        %movie_id,
                        transition = ?outcome.transition,
                        upvotes = outcome.counters.upvotes,
                        downvotes = outcome.counters.downvotes,
                        "Vote reconciled"
                    );
                    return Ok(outcome);
                }
                Attempt::Retry(reason) => {
                    warn!(%user_id, %movie_id, attempt, reason, "Vote cast raced, retrying");
                }
            }
        }

        Err(VoteError::Contention {
            movie_id,
            attempts: MAX_CAST_ATTEMPTS,
        })
    }

    async fn try_cast(
        pool: &PgPool,
        user_id: Uuid,
        movie_id: Uuid,
        vote_type: VoteType,
    ) -> Result<Attempt, VoteError> {
        let mut tx = pool.begin().await?;

        let existing: Option<i16> =
            sqlx::query_scalar("SELECT vote_type FROM votes WHERE user_id = $1 AND movie_id = $2")
                .bind(user_id)
                .bind(movie_id)
                .fetch_optional(&mut *tx)
                .await?;
        let existing = existing
            .map(VoteType::try_from)
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        let transition = VoteTransition::between(existing, vote_type);

        match transition {
            VoteTransition::Unchanged(_) => {
                let counters = Self::read_counters(&mut tx, movie_id).await?;
                tx.commit().await?;
                return Ok(Attempt::Done(CastOutcome {
                    counters,
                    transition,
                }));
            }
            VoteTransition::Insert(new_vote) => {
                let inserted = sqlx::query(
                    "INSERT INTO votes (user_id, movie_id, vote_type) VALUES ($1, $2, $3)",
                )
                .bind(user_id)
                .bind(movie_id)
                .bind(new_vote.as_i16())
                .execute(&mut *tx)
                .await;

                match inserted {
                    Ok(_) => {}
                    Err(e) if is_unique_violation(&e, VOTE_UNIQUE_CONSTRAINT) => {
                        tx.rollback().await?;
                        return Ok(Attempt::Retry("duplicate ledger insert"));
                    }
                    Err(e) if is_foreign_key_violation(&e) => {
                        tx.rollback().await?;
                        return Err(VoteError::MovieNotFound(movie_id));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            VoteTransition::Flip { from, to } => {
                let flipped = sqlx::query(
                    r#"
                    UPDATE votes
                    SET vote_type = $3, updated_at = NOW()
                    WHERE user_id = $1 AND movie_id = $2 AND vote_type = $4
                    "#,
                )
                .bind(user_id)
                .bind(movie_id)
                .bind(to.as_i16())
                .bind(from.as_i16())
                .execute(&mut *tx)
                .await?;

                if flipped.rows_affected() == 0 {
                    tx.rollback().await?;
                    return Ok(Attempt::Retry("ledger row changed underneath flip"));
                }
            }
        }

        let delta = transition.delta();
        let counters: Option<VoteCounters> = sqlx::query_as(
            r#"
            UPDATE movies
            SET upvotes = upvotes + $2,
                downvotes = downvotes + $3,
                vote_score = (upvotes + $2) - (downvotes + $3),
                updated_at = NOW()
            WHERE id = $1
            RETURNING upvotes, downvotes, vote_score
            "#,
        )
        .bind(movie_id)
        .bind(delta.upvotes)
        .bind(delta.downvotes)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(counters) = counters else {
            tx.rollback().await?;
            return Err(VoteError::MovieNotFound(movie_id));
        };

        tx.commit().await?;

        Ok(Attempt::Done(CastOutcome {
            counters,
            transition,
        }))
    }

    async fn read_counters(
        tx: &mut Transaction<'_, Postgres>,
        movie_id: Uuid,
    ) -> Result<VoteCounters, VoteError> {
        sqlx::query_as("SELECT upvotes, downvotes, vote_score FROM movies WHERE id = $1")
            .bind(movie_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(VoteError::MovieNotFound(movie_id))
    }

    /// The user's current vote on a movie, if any
    pub async fn find_user_vote(
        pool: &PgPool,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> Result<Option<VoteType>, sqlx::Error> {
        let vote = sqlx::query_as::<_, Vote>(
            r#"
            SELECT id, user_id, movie_id, vote_type, created_at, updated_at
            FROM votes
            WHERE user_id = $1 AND movie_id = $2
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(pool)
        .await?;

        Ok(vote.map(|v| v.vote_type))
    }

    /// Counters re-derived from the ledger for one movie
    ///
    /// This is the value the stored counters must always equal.
    pub async fn ledger_counters(pool: &PgPool, movie_id: Uuid) -> Result<VoteCounters, sqlx::Error> {
        let (upvotes, downvotes): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE vote_type = 1),
                   COUNT(*) FILTER (WHERE vote_type = -1)
            FROM votes
            WHERE movie_id = $1
            "#,
        )
        .bind(movie_id)
        .fetch_one(pool)
        .await?;

        let to_i32 = |n: i64| i32::try_from(n).map_err(|e| sqlx::Error::Decode(Box::new(e)));
        Ok(VoteCounters::new(to_i32(upvotes)?, to_i32(downvotes)?))
    }

    /// Counts ledger rows for one user/movie pair
    pub async fn count_for_pair(
        pool: &PgPool,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id)
            .bind(movie_id)
            .fetch_one(pool)
            .await
    }

    /// Counts all votes
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM votes")
            .fetch_one(pool)
            .await
    }
}
