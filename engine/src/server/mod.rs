//! Chat UI server
//!
//! Serves the single-page chat UI and the JSON API behind it.
//!
//! # Endpoints
//!
//! - GET    /                            - Chat page
//! - GET    /api/status                  - Server status and search backend
//! - GET    /api/models                  - Model picker contents and defaults
//! - POST   /api/sessions                - Start a session
//! - GET    /api/sessions/:id            - Transcript and exchange state
//! - POST   /api/sessions/:id/messages   - Submit a question
//! - POST   /api/sessions/:id/reset      - Clear chat history
//! - DELETE /api/sessions/:id            - Drop a session
//! - GET    /api/sessions/:id/events     - WebSocket stream of agent progress

use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::chat::ChatController;
use crate::config::Config;
use crate::session::SessionRegistry;

mod error;
mod handlers;
mod page;

pub use error::ApiError;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionRegistry>,
    pub chat: Arc<ChatController>,

    /// "google" or "placeholder"
    pub search_backend: &'static str,
}

impl AppState {
    pub fn new(config: Config, chat: ChatController, search_backend: &'static str) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::with_idle_ttl(config.server.session_ttl())),
            config: Arc::new(config),
            chat: Arc::new(chat),
            search_backend,
        }
    }
}

/// Build the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(page::index))
        .route("/api/status", get(handlers::status))
        .route("/api/models", get(handlers::models))
        .route("/api/sessions", post(handlers::create_session))
        .route(
            "/api/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/sessions/:id/messages", post(handlers::post_message))
        .route("/api/sessions/:id/reset", post(handlers::reset_session))
        .route("/api/sessions/:id/events", get(handlers::session_events))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!("Chat UI listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Chat UI shutting down gracefully");
        })
        .await
        .inspect_err(|e| error!("Chat UI server error: {}", e))
}
