pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod storage;
pub mod types;
pub mod uploads;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Builds the full HTTP application.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let api = Router::new()
        .route("/health", get(handlers::health::get))
        .merge(auth_routes())
        .merge(project_routes())
        .merge(skill_routes())
        .merge(profile_routes())
        .merge(message_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ));

    let mut router = Router::new().nest("/api", api);

    let prefix = config.uploads.public_prefix.trim_end_matches('/');
    if prefix.starts_with('/') && prefix.len() > 1 {
        router = router.nest_service(prefix, ServeDir::new(&config.uploads.dir));
    }

    router
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/change-password", put(auth::change_password))
}

fn project_routes() -> Router<AppState> {
    use handlers::projects;

    Router::new()
        .route("/projects", get(projects::list).post(projects::post))
        .route(
            "/projects/:id",
            get(projects::get)
                .put(projects::put)
                .delete(projects::delete),
        )
        .route(
            "/projects/:id/toggle-featured",
            patch(projects::toggle_featured),
        )
}

fn skill_routes() -> Router<AppState> {
    use handlers::skills;

    Router::new()
        .route("/skills", get(skills::list).post(skills::post))
        .route(
            "/skills/:id",
            get(skills::get).put(skills::put).delete(skills::delete),
        )
        .route("/skills/:id/toggle-active", patch(skills::toggle_active))
}

fn profile_routes() -> Router<AppState> {
    use handlers::profile;

    Router::new()
        .route("/profile", get(profile::get).put(profile::put))
        .route("/profile/experience", post(profile::add_experience))
        .route(
            "/profile/experience/:id",
            put(profile::update_experience).delete(profile::delete_experience),
        )
        .route("/profile/education", post(profile::add_education))
        .route(
            "/profile/education/:id",
            put(profile::update_education).delete(profile::delete_education),
        )
}

fn message_routes() -> Router<AppState> {
    use handlers::messages;

    Router::new()
        .route("/messages", get(messages::list).post(messages::submit))
        .route("/messages/bulk/delete", post(messages::bulk_delete))
        .route(
            "/messages/:id",
            get(messages::get).delete(messages::delete),
        )
        .route("/messages/:id/status", patch(messages::set_status))
        .route("/messages/:id/star", patch(messages::toggle_star))
        .route("/messages/:id/notes", put(messages::set_notes))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
