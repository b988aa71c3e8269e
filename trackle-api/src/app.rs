/// Application state and router assembly
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use trackle_shared::auth::middleware::authenticate;

use crate::avatar::AvatarHost;
use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::security::SecurityHeadersLayer;
use crate::routes;

/// Shared application state available to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
    pub avatars: Arc<dyn AvatarHost>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config, avatars: Arc<dyn AvatarHost>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            avatars,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Build the full application router.
///
/// Everything lives under `/api`. Signup, login, and the health probe
/// are public; every other route sits behind [`auth_guard`].
pub fn build_router(state: AppState) -> Router {
    let public_user_routes = Router::new()
        .route("/signup", post(routes::users::signup))
        .route("/login", post(routes::users::login));

    let protected_user_routes = Router::new()
        .route("/logout", post(routes::users::logout))
        .route("/:user_id/tasks", get(routes::users::user_tasks))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let project_routes = Router::new()
        .route(
            "/",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .route("/:project_id", delete(routes::projects::delete_project))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let task_routes = Router::new()
        .route(
            "/projects/:project_id/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_project_tasks),
        )
        .route(
            "/:task_id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/complete/:task_id", patch(routes::tasks::complete_task))
        .route("/reset/:task_id", patch(routes::tasks::reset_task))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let api_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/users", public_user_routes.merge(protected_user_routes))
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes);

    let cors = build_cors(&state.config);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn build_cors(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Middleware guarding protected routes: authenticates the bearer token
/// and attaches the caller's identity to the request.
pub async fn auth_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let context = authenticate(&state.db, state.jwt_secret(), auth_header).await?;

    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}
