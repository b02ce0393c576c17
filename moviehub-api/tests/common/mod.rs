//! Common test utilities for API tests
//!
//! Two ways to get a router:
//! - [`offline_app`]: a pool that never connects, for requests that are
//!   answered before touching the database
//! - [`TestContext::new`]: a real PostgreSQL database from `DATABASE_URL`

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use moviehub_api::app::{build_router, AppState};
use moviehub_api::config::Config;
use moviehub_shared::auth::jwt::{create_token, Claims};
use moviehub_shared::auth::password::hash_password;
use moviehub_shared::models::user::{CreateUser, User, UserRole};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Nothing listens on port 1
const UNREACHABLE_DATABASE_URL: &str = "postgresql://moviehub@127.0.0.1:1/moviehub";

/// Builds a test configuration
pub fn test_config(database_url: &str, app_env: &str) -> Config {
    let database_url = database_url.to_string();
    let app_env = app_env.to_string();

    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some(database_url.clone()),
        "JWT_SECRET" => Some(SECRET.to_string()),
        "APP_ENV" => Some(app_env.clone()),
        _ => None,
    })
    .expect("test configuration is valid")
}

/// Router whose database is unreachable; queries time out after a second
pub fn offline_app(app_env: &str) -> Router {
    let db = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(1))
        .connect_lazy(UNREACHABLE_DATABASE_URL)
        .expect("lazy pool accepts the URL");

    build_router(AppState::new(db, test_config(UNREACHABLE_DATABASE_URL, app_env)))
}

/// Signs a session token the way login does
pub fn token_for(user_id: Uuid, role: UserRole) -> String {
    create_token(&Claims::new(user_id, role), SECRET).expect("token signs")
}

/// Sends a request and returns the status and JSON body (`Null` if empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    send_request(app, request).await
}

/// Sends a prepared request and returns the status and JSON body
pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!("non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
        })
    };

    (status, json)
}

/// Test context backed by a real database
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    /// Connects to `DATABASE_URL`, migrates, and builds the router
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL")?;

        let db = PgPool::connect(&url).await?;

        // Path is relative to Cargo.toml, not this file
        sqlx::migrate!("../migrations").run(&db).await?;

        let app = build_router(AppState::new(db.clone(), test_config(&url, "production")));

        Ok(Self { db, app })
    }

    /// Registers a fresh user through the API and returns `(user_id, token)`
    pub async fn register(&self, name: &str) -> (Uuid, String) {
        let (status, body) = send(
            &self.app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "name": name,
                "email": unique_email(name),
                "password": "popcorn42",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        let user_id = body["user"]["id"].as_str().unwrap().parse().unwrap();
        let token = body["token"].as_str().unwrap().to_string();
        (user_id, token)
    }

    /// Creates an admin directly in the store and returns `(user_id, token)`
    pub async fn admin(&self) -> anyhow::Result<(Uuid, String)> {
        let admin = User::create(
            &self.db,
            CreateUser {
                name: "Test Admin".to_string(),
                email: unique_email("admin"),
                password_hash: hash_password("admin-password")?,
                role: UserRole::Admin,
            },
        )
        .await?;

        Ok((admin.id, token_for(admin.id, UserRole::Admin)))
    }
}

/// Email address no other test run will use
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix.to_lowercase().replace(' ', "-"), Uuid::new_v4())
}
