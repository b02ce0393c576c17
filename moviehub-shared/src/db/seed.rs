/// Demo data for local development
///
/// [`seed`] wipes every table and loads a small fixed catalog: an admin, six
/// members, ten well-known films, a random spread of votes and fifteen
/// comments. Votes go through [`Vote::cast`] so the movie counters are
/// produced by the same reconciliation path the API uses.
///
/// Demo accounts:
///
/// | Email | Password | Role |
/// |---|---|---|
/// | admin@moviehub.com | admin123 | admin |
/// | user@moviehub.com | user1234 | user |
/// | alice@example.com (and bob, carol, david, emma) | password123 | user |

use chrono::{DateTime, TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::models::movie::{Movie, MovieQuery, MovieSort, MovieWithCreator};
use crate::models::user::{CreateUser, User, UserRole};
use crate::models::vote::Vote;
use crate::tally::VoteType;

/// Fewest voters drawn per movie
pub const MIN_VOTERS_PER_MOVIE: usize = 3;

/// Most voters drawn per movie
pub const MAX_VOTERS_PER_MOVIE: usize = 6;

/// Chance that a seeded vote is an upvote
pub const UPVOTE_PROBABILITY: f64 = 0.7;

/// Error type for seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Password hashing failed: {0}")]
    Password(#[from] crate::auth::password::PasswordError),

    #[error("Vote failed: {0}")]
    Vote(#[from] crate::models::vote::VoteError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What [`seed`] created
#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub users: usize,
    pub movies: usize,
    pub votes: usize,
    pub comments: usize,

    /// Highest-scoring movies after seeding, best first
    pub top_movies: Vec<MovieWithCreator>,
}

/// One planned vote: indexes into the seeded user and movie lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedVote {
    pub user: usize,
    pub movie: usize,
    pub vote_type: VoteType,
}

struct SeedUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: UserRole,
}

struct SeedMovie {
    title: &'static str,
    description: &'static str,
    added_by: usize,
    day: u32,
}

struct SeedComment {
    user: usize,
    movie: usize,
    body: &'static str,
    day: u32,
    hour: u32,
    minute: u32,
}

const USERS: &[SeedUser] = &[
    SeedUser { name: "Admin User", email: "admin@moviehub.com", password: "admin123", role: UserRole::Admin },
    SeedUser { name: "John Doe", email: "user@moviehub.com", password: "user1234", role: UserRole::User },
    SeedUser { name: "Alice Smith", email: "alice@example.com", password: "password123", role: UserRole::User },
    SeedUser { name: "Bob Johnson", email: "bob@example.com", password: "password123", role: UserRole::User },
    SeedUser { name: "Carol Williams", email: "carol@example.com", password: "password123", role: UserRole::User },
    SeedUser { name: "David Brown", email: "david@example.com", password: "password123", role: UserRole::User },
    SeedUser { name: "Emma Davis", email: "emma@example.com", password: "password123", role: UserRole::User },
];

const MOVIES: &[SeedMovie] = &[
    SeedMovie {
        title: "The Shawshank Redemption",
        description: "Two imprisoned men bond over a number of years, finding solace and eventual redemption through acts of common decency.",
        added_by: 1,
        day: 15,
    },
    SeedMovie {
        title: "Pulp Fiction",
        description: "The lives of two mob hitmen, a boxer, a gangster and his wife intertwine in four tales of violence and redemption.",
        added_by: 2,
        day: 16,
    },
    SeedMovie {
        title: "The Dark Knight",
        description: "When the Joker wreaks havoc on Gotham, Batman must face one of the greatest psychological tests of his ability to fight injustice.",
        added_by: 3,
        day: 17,
    },
    SeedMovie {
        title: "Forrest Gump",
        description: "Decades of American history unfold through the eyes of an Alabama man with a big heart.",
        added_by: 4,
        day: 18,
    },
    SeedMovie {
        title: "Inception",
        description: "A thief who steals secrets from dreams is given the inverse task of planting an idea into a CEO's mind.",
        added_by: 1,
        day: 19,
    },
    SeedMovie {
        title: "The Godfather",
        description: "The aging patriarch of a crime dynasty transfers control of his empire to his reluctant son.",
        added_by: 2,
        day: 20,
    },
    SeedMovie {
        title: "Interstellar",
        description: "A team of explorers travels through a wormhole in an attempt to ensure humanity's survival.",
        added_by: 3,
        day: 21,
    },
    SeedMovie {
        title: "Parasite",
        description: "A poor family schemes to become employed by a wealthy household by infiltrating it one member at a time.",
        added_by: 4,
        day: 22,
    },
    SeedMovie {
        title: "Avatar",
        description: "A paraplegic Marine on the moon Pandora is torn between his orders and the world he comes to call home.",
        added_by: 5,
        day: 23,
    },
    SeedMovie {
        title: "Avengers: Endgame",
        description: "After Infinity War, the Avengers assemble once more to reverse Thanos' actions and restore balance to the universe.",
        added_by: 6,
        day: 24,
    },
];

const COMMENTS: &[SeedComment] = &[
    SeedComment { user: 1, movie: 0, body: "This movie changed my perspective on life. Robbins and Freeman are stellar.", day: 16, hour: 10, minute: 30 },
    SeedComment { user: 2, movie: 0, body: "A timeless classic that gets better with each viewing.", day: 16, hour: 14, minute: 20 },
    SeedComment { user: 3, movie: 1, body: "Tarantino at his best! The dialogue is incredibly sharp.", day: 17, hour: 9, minute: 15 },
    SeedComment { user: 4, movie: 1, body: "Travolta and Jackson have amazing chemistry.", day: 17, hour: 16, minute: 45 },
    SeedComment { user: 1, movie: 2, body: "Heath Ledger's Joker is one of the greatest villains in cinema history.", day: 18, hour: 11, minute: 0 },
    SeedComment { user: 2, movie: 2, body: "The Dark Knight trilogy redefined superhero movies.", day: 18, hour: 13, minute: 30 },
    SeedComment { user: 3, movie: 3, body: "Tom Hanks makes you laugh and cry in equal measure.", day: 19, hour: 8, minute: 20 },
    SeedComment { user: 4, movie: 4, body: "Dreams within dreams, executed perfectly. The score is epic.", day: 20, hour: 15, minute: 10 },
    SeedComment { user: 1, movie: 5, body: "Brando set the standard for every crime drama that followed.", day: 21, hour: 12, minute: 40 },
    SeedComment { user: 2, movie: 6, body: "Hard science and emotional storytelling. Breathtaking visuals.", day: 22, hour: 10, minute: 55 },
    SeedComment { user: 3, movie: 7, body: "A brilliant look at social inequality. Deserved every award.", day: 23, hour: 14, minute: 15 },
    SeedComment { user: 5, movie: 8, body: "The world-building is incredible and the effects were revolutionary.", day: 24, hour: 9, minute: 30 },
    SeedComment { user: 6, movie: 9, body: "The perfect conclusion to an eleven-year saga.", day: 25, hour: 16, minute: 20 },
    SeedComment { user: 4, movie: 8, body: "Pandora is breathtakingly beautiful in 3D.", day: 24, hour: 13, minute: 45 },
    SeedComment { user: 5, movie: 9, body: "The final battle sequence is pure cinema magic!", day: 25, hour: 18, minute: 10 },
];

fn january_2024(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Draws the demo votes: 3 to 6 distinct voters per movie, mostly upvotes
///
/// Each (user, movie) pair appears at most once.
pub fn plan_votes<R: Rng + ?Sized>(rng: &mut R, user_count: usize, movie_count: usize) -> Vec<PlannedVote> {
    let mut planned = Vec::new();
    let mut voters: Vec<usize> = (0..user_count).collect();

    for movie in 0..movie_count {
        let wanted = rng.gen_range(MIN_VOTERS_PER_MOVIE..=MAX_VOTERS_PER_MOVIE);
        voters.shuffle(rng);

        for &user in voters.iter().take(wanted) {
            let vote_type = if rng.gen_bool(UPVOTE_PROBABILITY) {
                VoteType::Up
            } else {
                VoteType::Down
            };
            planned.push(PlannedVote { user, movie, vote_type });
        }
    }

    planned
}

/// Removes every row from every table, dependents first
pub async fn clear(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("TRUNCATE comments, votes, movies, users")
        .execute(pool)
        .await?;
    info!("Cleared existing data");
    Ok(())
}

/// Replaces the database contents with the demo data set
pub async fn seed<R: Rng + ?Sized>(pool: &PgPool, rng: &mut R) -> Result<SeedSummary, SeedError> {
    clear(pool).await?;

    let mut users = Vec::with_capacity(USERS.len());
    for seed_user in USERS {
        let user = User::create(
            pool,
            CreateUser {
                name: seed_user.name.to_string(),
                email: seed_user.email.to_string(),
                password_hash: hash_password(seed_user.password)?,
                role: seed_user.role,
            },
        )
        .await?;
        users.push(user.id);
    }
    info!(count = users.len(), "Created users");

    let mut movies: Vec<Uuid> = Vec::with_capacity(MOVIES.len());
    for seed_movie in MOVIES {
        let created_at = january_2024(seed_movie.day, 0, 0);
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO movies (title, description, added_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id
            "#,
        )
        .bind(seed_movie.title)
        .bind(seed_movie.description)
        .bind(users[seed_movie.added_by])
        .bind(created_at)
        .fetch_one(pool)
        .await?;
        movies.push(id);
    }
    info!(count = movies.len(), "Created movies");

    let planned = plan_votes(rng, users.len(), movies.len());
    for vote in &planned {
        Vote::cast(pool, users[vote.user], movies[vote.movie], vote.vote_type).await?;
    }
    info!(count = planned.len(), "Cast votes");

    for (index, &movie_id) in movies.iter().enumerate() {
        let ledger = Vote::ledger_counters(pool, movie_id).await?;
        if let Some(stored) = Movie::find_by_id(pool, movie_id).await? {
            if stored.movie.counters() != ledger {
                warn!(%movie_id, title = MOVIES[index].title, "Stored counters disagree with the vote ledger");
            }
        }
    }

    for seed_comment in COMMENTS {
        let created_at = january_2024(seed_comment.day, seed_comment.hour, seed_comment.minute);
        sqlx::query(
            r#"
            INSERT INTO comments (user_id, movie_id, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            "#,
        )
        .bind(users[seed_comment.user])
        .bind(movies[seed_comment.movie])
        .bind(seed_comment.body)
        .bind(created_at)
        .execute(pool)
        .await?;
    }
    info!(count = COMMENTS.len(), "Created comments");

    let top_movies = Movie::list(
        pool,
        &MovieQuery {
            search: None,
            sort: MovieSort::Score,
            limit: 5,
        },
    )
    .await?;

    Ok(SeedSummary {
        users: users.len(),
        movies: movies.len(),
        votes: planned.len(),
        comments: COMMENTS.len(),
        top_movies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::validate_password_policy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_plan_votes_respects_voter_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let planned = plan_votes(&mut rng, USERS.len(), MOVIES.len());

        for movie in 0..MOVIES.len() {
            let voters = planned.iter().filter(|v| v.movie == movie).count();
            assert!((MIN_VOTERS_PER_MOVIE..=MAX_VOTERS_PER_MOVIE).contains(&voters));
        }
    }

    #[test]
    fn test_plan_votes_has_one_vote_per_pair() {
        let mut rng = StdRng::seed_from_u64(42);
        let planned = plan_votes(&mut rng, USERS.len(), MOVIES.len());

        let pairs: HashSet<(usize, usize)> = planned.iter().map(|v| (v.user, v.movie)).collect();
        assert_eq!(pairs.len(), planned.len());
        assert!(planned.iter().all(|v| v.user < USERS.len()));
    }

    #[test]
    fn test_fixture_references_are_in_range() {
        assert!(MOVIES.iter().all(|m| m.added_by < USERS.len()));
        assert!(COMMENTS.iter().all(|c| c.user < USERS.len() && c.movie < MOVIES.len()));
        assert_eq!(COMMENTS.len(), 15);
    }

    #[test]
    fn test_demo_passwords_pass_policy() {
        for user in USERS {
            assert!(validate_password_policy(user.password).is_ok(), "{}", user.email);
        }
    }
}
