//! HTTP API server

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{session_bridge, CookieOptions};
use crate::config::Config;
use crate::content::ContentRepository;
use crate::error::Result;

use super::routes;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    /// Connection pool shared by every per-request auth client
    pub http: reqwest::Client,
    pub content: ContentRepository,
    pub cookie: CookieOptions,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        let content = ContentRepository::from_config(&config.content, http.clone());
        let cookie = CookieOptions::from(&config.auth);

        Ok(Self {
            config,
            http,
            content,
            cookie,
        })
    }
}

pub type SharedState = Arc<AppState>;

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::new(config)?);

    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let static_files = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/api/health", get(routes::health))
        // Content routes
        .route("/api/courses", get(routes::list_courses))
        .route("/api/courses/{id}", get(routes::get_course))
        .route("/api/lessons/{id}", get(routes::get_lesson))
        .route("/api/quizzes/{id}", get(routes::get_quiz))
        // Auth routes
        .route("/api/auth/me", get(routes::me))
        .route("/api/auth/login", post(routes::login))
        .route("/api/auth/register", post(routes::register))
        .route("/api/auth/logout", post(routes::logout))
        // Static site, including /data/*.json
        .fallback_service(static_files)
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), session_bridge))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
