/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use swamp_api::{app::AppState, config::Config};
/// use swamp_shared::auth::provider::HostedAuthClient;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let auth = HostedAuthClient::new(&config.auth.url, &config.auth.anon_key)?;
/// let state = AppState::new(pool, config, Arc::new(auth));
/// let app = swamp_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::jwt_auth_layer, security::SecurityHeadersLayer},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use swamp_shared::auth::provider::AuthProvider;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Hosted auth service client
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            auth,
        }
    }

    /// Secret that signs access tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api
/// ├── GET  /health, /levels                      (public)
/// ├── POST /auth/register, /auth/login, /auth/refresh (public)
/// ├── POST /auth/logout
/// ├── /user/profile                              GET, PUT
/// ├── /tasks, /tasks/:id, /tasks/:id/complete
/// ├── /xp, /achievements, /achievements/check
/// ├── /pomodoro/start, /pomodoro/:id/complete, /pomodoro/sessions
/// ├── /boards/...                                shared boards
/// ├── /invites/...                               board invites
/// └── /analytics/...                             completion stats
/// ```
///
/// Everything outside the public group requires a bearer token.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/levels", get(routes::xp::list_levels))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh));

    let protected_routes = Router::new()
        .route("/auth/logout", post(routes::auth::logout))
        .route(
            "/user/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        // Personal tasks
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/tasks/:id/complete", post(routes::tasks::complete_task))
        // Gamification
        .route("/xp", get(routes::xp::get_xp))
        .route("/achievements", get(routes::achievements::list_achievements))
        .route("/achievements/check", post(routes::achievements::check_achievements))
        .route("/pomodoro/start", post(routes::pomodoro::start_session))
        .route("/pomodoro/:id/complete", post(routes::pomodoro::complete_session))
        .route("/pomodoro/sessions", get(routes::pomodoro::list_sessions))
        // Shared boards
        .route(
            "/boards",
            get(routes::boards::list_boards).post(routes::boards::create_board),
        )
        .route(
            "/boards/:id",
            get(routes::boards::get_board).delete(routes::boards::delete_board),
        )
        .route(
            "/boards/:id/tasks",
            get(routes::boards::list_board_tasks).post(routes::boards::create_board_task),
        )
        .route(
            "/boards/:id/tasks/:task_id",
            axum::routing::put(routes::boards::update_board_task)
                .delete(routes::boards::delete_board_task),
        )
        .route("/boards/:id/members", get(routes::boards::list_members))
        .route(
            "/boards/:id/members/:user_id",
            delete(routes::boards::remove_member),
        )
        .route("/boards/:id/invite", post(routes::invites::invite_user))
        .route("/invites", get(routes::invites::list_invites))
        .route("/invites/:id/accept", post(routes::invites::accept_invite))
        .route("/invites/:id/decline", post(routes::invites::decline_invite))
        // Analytics
        .route("/analytics/tasks", get(routes::analytics::task_stats))
        .route(
            "/analytics/daily-completions",
            get(routes::analytics::daily_completions),
        )
        .route("/analytics/focus", get(routes::analytics::focus_stats))
        .route("/analytics/streak", get(routes::analytics::streak))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// CORS policy: permissive for `*`, otherwise an explicit origin list
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
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
