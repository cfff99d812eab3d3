/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use voxgate_api::{app::AppState, config::Config};
/// use voxgate_shared::provider::MockProvider;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let provider = Arc::new(MockProvider::new());
/// let state = AppState::new(pool, config, provider, reqwest::Client::new());
/// let app = voxgate_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use voxgate_shared::auth::{
    jwt,
    middleware::{AuthContext, AuthError},
};
use voxgate_shared::lifecycle::TaskLifecycle;
use voxgate_shared::models::user::User;
use voxgate_shared::provider::SpeechProvider;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning; nothing in here is mutated
/// after startup.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Speech provider gateway
    pub provider: Arc<dyn SpeechProvider>,

    /// Task lifecycle service built over the pool and the provider
    pub lifecycle: Arc<TaskLifecycle>,

    /// HTTP client used by the audio relay
    pub relay: reqwest::Client,
}

impl AppState {
    /// Creates new application state
    pub fn new(
        db: PgPool,
        config: Config,
        provider: Arc<dyn SpeechProvider>,
        relay: reqwest::Client,
    ) -> Self {
        let lifecycle = Arc::new(TaskLifecycle::new(db.clone(), provider.clone()));
        Self {
            db,
            config: Arc::new(config),
            provider,
            lifecycle,
            relay,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Gets the shared HMAC key for webhook signature checks
    pub fn webhook_secret(&self) -> &str {
        &self.config.webhook.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// ├── /auth/
/// │   ├── POST /register             # Create account (public)
/// │   └── POST /login                # Obtain token (public)
/// ├── GET  /user                     # Profile + provider balance
/// ├── GET  /voices                   # Provider voice catalog
/// ├── /tasks/
/// │   ├── POST   /                   # Submit synthesis job
/// │   ├── GET    /                   # Paginated task list
/// │   ├── GET    /:id                # Task detail (reconciles)
/// │   ├── DELETE /:id                # Remove task
/// │   └── POST   /:id/check-status   # Force reconciliation
/// ├── GET  /proxy/audio              # Audio relay (public)
/// ├── POST /webhook/callback         # Provider callback (HMAC signed)
/// └── /admin/                        # Admin-only management
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    // Import route handlers
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Profile and voice catalog (require JWT authentication)
    let user_routes = Router::new()
        .route("/user", get(routes::user::get_profile))
        .route("/voices", get(routes::voices::list_voices))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Task routes (require JWT authentication)
    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task).delete(routes::tasks::delete_task),
        )
        .route("/:id/check-status", post(routes::tasks::check_status))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Audio relay (public: browser audio elements cannot send headers)
    let proxy_routes = Router::new().route("/audio", get(routes::proxy::relay_audio));

    // Provider callback (public, HMAC signature checked in the handler)
    let webhook_routes = Router::new().route("/callback", post(routes::webhook::handle_callback));

    // Admin routes (require JWT authentication + admin flag)
    let admin_routes = Router::new()
        .route("/users", get(routes::admin::list_users))
        .route("/tasks", get(routes::admin::list_tasks))
        .route("/stats", get(routes::admin::get_stats))
        .route("/users/:id/status", patch(routes::admin::set_user_status))
        .route("/users/:id/balance", patch(routes::admin::set_user_balance))
        .layer(axum::middleware::from_fn(admin_layer))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.allow_any_origin() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .merge(user_routes)
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .nest("/proxy", proxy_routes)
        .nest("/webhook", webhook_routes)
        .nest("/admin", admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the JWT from the Authorization header, then
/// reloads the account so that deactivated users are rejected even when
/// their token is still within its lifetime. On success an `AuthContext`
/// is inserted into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = jwt::validate_token(token, state.jwt_secret())?;

    // The token alone is not enough: the account must still exist
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    if !user.is_active {
        return Err(AuthError::AccountDisabled.into());
    }

    // Insert into request extensions
    req.extensions_mut().insert(AuthContext::from_user(&user));

    Ok(next.run(req).await)
}

/// Admin gate, stacked after `jwt_auth_layer`
///
/// Rejects with 403 unless the authenticated account carries the admin
/// flag.
async fn admin_layer(req: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = req
        .extensions()
        .get::<AuthContext>()
        .map(|auth| auth.is_admin)
        .unwrap_or(false);

    if !is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(req).await)
}
