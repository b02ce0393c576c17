/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use moviehub_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = moviehub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        auth::{jwt_auth_layer, require_admin_layer},
        error_detail::ErrorDetailLayer,
    },
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use chrono::Duration;
use moviehub_shared::{
    auth::jwt::{self, Claims, JwtError},
    models::user::User,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Issues a session token for `user` with the configured lifetime
    pub fn issue_token(&self, user: &User) -> Result<String, JwtError> {
        let claims = Claims::with_expiration(
            user.id,
            user.role,
            Duration::hours(self.config.jwt.expiry_hours),
        );
        jwt::create_token(&claims, self.jwt_secret())
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── GET  /me                 # (user)
///     ├── /movies/
///     │   ├── GET  /                   # ?search=&sort=&limit=
///     │   ├── GET  /:id                # movie + comments
///     │   └── POST /                   # (user)
///     ├── /votes/                      # (user)
///     │   ├── POST /:movie_id
///     │   └── GET  /:movie_id/user-vote
///     ├── /comments/                   # (user)
///     │   ├── POST   /:movie_id
///     │   └── DELETE /:comment_id      # author or admin
///     └── /admin/                      # (admin)
///         ├── GET    /stats
///         ├── GET    /top-movies
///         ├── DELETE /movies/:id
///         ├── DELETE /comments/:id
///         ├── GET    /users
///         └── PUT    /users/:id/role
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Internal error detail (development only)
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let jwt = || axum::middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .merge(
            Router::new()
                .route("/me", get(routes::auth::me))
                .route_layer(jwt()),
        );

    let movie_routes = Router::new()
        .route("/", get(routes::movies::list_movies))
        .route("/:id", get(routes::movies::get_movie))
        .merge(
            Router::new()
                .route("/", post(routes::movies::create_movie))
                .route_layer(jwt()),
        );

    let vote_routes = Router::new()
        .route("/:movie_id", post(routes::votes::cast_vote))
        .route("/:movie_id/user-vote", get(routes::votes::get_user_vote))
        .route_layer(jwt());

    let comment_routes = Router::new()
        .route(
            "/:id",
            post(routes::comments::add_comment).delete(routes::comments::delete_comment),
        )
        .route_layer(jwt());

    let admin_routes = Router::new()
        .route("/stats", get(routes::admin::stats))
        .route("/top-movies", get(routes::admin::top_movies))
        .route("/movies/:id", delete(routes::admin::delete_movie))
        .route("/comments/:id", delete(routes::admin::delete_comment))
        .route("/users", get(routes::admin::list_users))
        .route("/users/:id/role", put(routes::admin::set_user_role))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/movies", movie_routes)
        .nest("/votes", vote_routes)
        .nest("/comments", comment_routes)
        .nest("/admin", admin_routes);

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(ErrorDetailLayer::new(state.config.is_development()))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse()
                .inspect_err(|_| warn!(%origin, "Ignoring unparseable CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
