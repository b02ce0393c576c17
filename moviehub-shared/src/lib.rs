//! # MovieHub Shared Library
//!
//! This crate contains the domain model and persistence layer used by the
//! MovieHub API server and its tooling.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens, and authorization rules
//! - `db`: Connection pool, migrations, and demo data seeding
//! - `models`: Database models (users, movies, votes, comments)
//! - `tally`: Pure vote arithmetic shared by the ledger and its tests

pub mod auth;
pub mod db;
pub mod models;
pub mod tally;

/// Current version of the MovieHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
