/// Middleware for the API server
///
/// - `auth`: JWT and admin gates that populate `AuthContext`
/// - `error_detail`: Internal error detail in development responses

pub mod auth;
pub mod error_detail;
