/// Database models for MovieHub
///
/// # Models
///
/// - `user`: Accounts, credentials and roles
/// - `movie`: The catalog, with denormalized vote counters
/// - `vote`: The vote ledger and counter reconciliation
/// - `comment`: Comments on movies
///
/// [`Stats`] aggregates entity counts for the admin dashboard.
///
/// # Example
///
/// ```no_run
/// use moviehub_shared::models::Stats;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let stats = Stats::collect(&pool).await?;
/// println!("{} movies, {} votes", stats.movies, stats.votes);
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod movie;
pub mod user;
pub mod vote;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use comment::Comment;
use movie::Movie;
use user::User;
use vote::Vote;

/// Entity counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub movies: i64,
    pub users: i64,
    pub votes: i64,
    pub comments: i64,
}

impl Stats {
    /// Counts every entity, running the four queries concurrently
    pub async fn collect(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let (movies, users, votes, comments) = tokio::try_join!(
            Movie::count(pool),
            User::count(pool),
            Vote::count(pool),
            Comment::count(pool),
        )?;

        Ok(Self {
            movies,
            users,
            votes,
            comments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_serialization() {
        let stats = Stats {
            movies: 10,
            users: 7,
            votes: 42,
            comments: 15,
        };

        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["movies"], 10);
        assert_eq!(json["comments"], 15);
    }
}
