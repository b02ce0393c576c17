/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and current profile
/// - `movies`: Catalog listing, detail and submission
/// - `votes`: Casting and reading votes
/// - `comments`: Adding and deleting comments
/// - `admin`: Moderation, statistics and user management

pub mod admin;
pub mod auth;
pub mod comments;
pub mod health;
pub mod movies;
pub mod votes;
