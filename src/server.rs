//! # Server Module
//!
//! HTTP server setup and route configuration for the gateway.

use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::auth::jwt::SessionCodec;
use crate::auth::oauth::OAuthClient;
use crate::chat::client::GenerationClient;
use crate::chat::conversation::Conversation;
use crate::config::CONFIG;
use crate::routes::health::ping;
use crate::routes::{auth, chat};

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub oauth: Arc<OAuthClient>,
    pub backend: Arc<GenerationClient>,
    pub sessions: Arc<SessionCodec>,
    pub conversation: Arc<Mutex<Conversation>>,
}

/// Starts the gateway HTTP server.
///
/// Builds the shared state from the environment configuration, wires up the
/// routes, and serves until the process is terminated.
pub async fn start() {
    let app_state = AppState {
        oauth: Arc::new(OAuthClient::new(CONFIG.oauth.clone())),
        backend: Arc::new(GenerationClient::new(&CONFIG.backend)),
        sessions: Arc::new(SessionCodec::new(&CONFIG.session_secret)),
        conversation: Arc::new(Mutex::new(Conversation::new())),
    };

    use tower::ServiceBuilder;
    use tower_http::cors::CorsLayer;

    let app_origin = CONFIG
        .server
        .app_origin
        .parse::<axum::http::HeaderValue>()
        .expect("APP_ORIGIN is not a valid header value");

    // Main app router
    let app = Router::new()
        .route("/ping", get(ping)) // Health check endpoint
        .merge(auth::create_routes())
        .merge(chat::create_routes())
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(app_origin)
                    .allow_methods([
                        axum::http::Method::GET,
                        axum::http::Method::POST,
                        axum::http::Method::OPTIONS,
                    ])
                    .allow_headers([
                        axum::http::header::ORIGIN,
                        axum::http::header::CONTENT_TYPE,
                        axum::http::header::ACCEPT,
                        axum::http::header::AUTHORIZATION,
                    ])
                    .allow_credentials(true), // Session cookie rides on requests
            ),
        )
        .with_state(app_state);

    let addr = format!("{}:{}", CONFIG.server.host, CONFIG.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address - port may already be in use");

    tracing::info!("🚀 Deckgen gateway starting...");
    tracing::info!("📡 Listening on http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/ping", addr);
    tracing::info!("🔑 Auth endpoints available at http://{}/api/auth/*", addr);
    tracing::info!("💬 Chat endpoints available at http://{}/api/chat", addr);

    axum::serve(listener, app).await.unwrap();
}
