//! # MovieHub demo data loader
//!
//! Wipes the database and loads the demo catalog. Only `DATABASE_URL` is
//! required.
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/moviehub cargo run -p moviehub-api --bin moviehub-seed
//! ```

use anyhow::Context;
use moviehub_api::telemetry;
use moviehub_shared::db::{migrations, pool, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("moviehub_seed=info,moviehub_shared=info");

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

    migrations::ensure_database_exists(&url).await?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url,
        max_connections: 2,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    tracing::info!("Seeding database...");
    let summary = seed::seed(&db, &mut rand::thread_rng())
        .await
        .context("seeding failed")?;

    tracing::info!(
        users = summary.users,
        movies = summary.movies,
        votes = summary.votes,
        comments = summary.comments,
        "Database seeded"
    );

    for (rank, entry) in summary.top_movies.iter().enumerate() {
        tracing::info!(
            rank = rank + 1,
            title = %entry.movie.title,
            score = entry.movie.vote_score,
            upvotes = entry.movie.upvotes,
            downvotes = entry.movie.downvotes,
            "Top movie"
        );
    }

    tracing::info!("Demo accounts: admin@moviehub.com / admin123, user@moviehub.com / user1234, alice@example.com / password123");

    pool::close_pool(db).await;

    Ok(())
}
