//! # Deckgen Gateway
//!
//! HTTP gateway that turns a signed-in user's topic into a generated
//! slide-deck link. Built with Rust, Axum, and Tokio.
//!
//! ## Features
//! - Google OAuth sign-in with silent access-token refresh
//! - Signed, opaque session cookie wrapping the credential lifecycle
//! - Chat-style submission flow against the presentation-generation backend
//! - Structured logging with tracing
//! - Health check endpoint for monitoring
//!
//! ## Architecture
//! The server is organized into modules:
//! - `server`: Core server initialization and configuration
//! - `config`: Environment variable configuration management
//! - `auth`: Credential lifecycle (session state machine, OAuth client,
//!   sealed session codec)
//! - `chat`: Conversation log, generation backend client, submit
//!   orchestration
//! - `routes`: HTTP route handlers organized by functionality
//!
//! ## Environment Setup
//! Copy `.env.example` to `.env` and configure:
//! ```bash
//! cp .env.example .env
//! # Edit .env with your OAuth client credentials
//! ```
//!
//! ## Running the Server
//! ```bash
//! cargo run
//! ```
//!
//! The server starts on `http://127.0.0.1:3000` by default; verify with
//! `curl http://localhost:3000/ping`.

mod auth;
mod chat;
mod config;
mod routes;
mod server;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point.
///
/// Initializes the tracing/logging system and starts the HTTP server.
/// Runs indefinitely until the process is terminated.
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize the tracing subscriber for structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false) // Don't show module targets for cleaner output
                .compact(), // Use compact formatting
        )
        .init();

    tracing::info!("🏁 Starting Deckgen Gateway...");
    tracing::info!(
        "📦 Package: {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        "🏗️  Build profile: {}",
        if cfg!(debug_assertions) { "debug" } else { "release" }
    );

    // Start the HTTP server - this will run indefinitely
    server::start().await;
}
