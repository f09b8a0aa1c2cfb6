//! Chat routes: topic submission and the conversation log

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json as AxumJson, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::auth::session;
use crate::chat::orchestrator::{self, SubmitOutcome};
use crate::routes::auth::{load_session, respond_with_session};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub message: String,
}

impl SubmitOutcome {
    fn as_str(self) -> &'static str {
        match self {
            SubmitOutcome::Rejected => "rejected",
            SubmitOutcome::Success => "success",
            SubmitOutcome::SoftFailure => "declined",
            SubmitOutcome::HardFailure => "failed",
        }
    }
}

/// POST /api/chat — submit a topic for generation.
///
/// Walks the credential lifecycle first, then hands the access token to the
/// orchestrator. A session stuck in the refresh-failed state gets a 401
/// carrying the error tag so the UI can force re-authentication.
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SubmitRequest>,
) -> Response {
    let Some(token) = load_session(&state, &jar) else {
        return (
            StatusCode::UNAUTHORIZED,
            AxumJson(json!({ "error": "Not authenticated" })),
        )
            .into_response();
    };

    let token = session::get_valid_token(token, &state.oauth, Utc::now().timestamp_millis()).await;
    let view = token.view();
    if let Some(tag) = view.error {
        return respond_with_session(
            &state,
            &token,
            StatusCode::UNAUTHORIZED,
            json!({ "error": tag }),
        );
    }

    let outcome = orchestrator::submit(
        &state.conversation,
        &state.backend,
        &payload.message,
        &view.access_token,
    )
    .await;

    let messages = state.conversation.lock().await.messages().to_vec();
    respond_with_session(
        &state,
        &token,
        StatusCode::OK,
        json!({ "outcome": outcome.as_str(), "messages": messages }),
    )
}

/// GET /api/chat/messages — the full conversation log for this session.
pub async fn messages(State(state): State<AppState>, jar: CookieJar) -> Response {
    if load_session(&state, &jar).is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            AxumJson(json!({ "error": "Not authenticated" })),
        )
            .into_response();
    }

    let messages = state.conversation.lock().await.messages().to_vec();
    (StatusCode::OK, AxumJson(json!({ "messages": messages }))).into_response()
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/chat", post(submit))
        .route("/api/chat/messages", get(messages))
}
