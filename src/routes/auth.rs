//! Auth routes for sign-in, the OAuth callback, and the session read surface

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json as AxumJson, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::session::{self, SessionToken};
use crate::config::CONFIG;
use crate::server::AppState;

/// Name of the cookie carrying the sealed session token.
pub const SESSION_COOKIE: &str = "session";

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

/// Build the session cookie carrying a sealed token.
pub fn session_cookie(sealed: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, sealed);
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie
}

/// Unseal the session token from the request's cookie jar.
///
/// Any unseal failure (missing cookie, bad signature, stale format) reads
/// as unauthenticated.
pub fn load_session(state: &AppState, jar: &CookieJar) -> Option<SessionToken> {
    let sealed = jar.get(SESSION_COOKIE)?.value().to_string();
    match state.sessions.unseal(&sealed) {
        Ok(token) => Some(token),
        Err(e) => {
            tracing::warn!("rejecting session cookie: {e:#}");
            None
        }
    }
}

/// GET /api/auth/signin — authorization URL for the browser to navigate to.
pub async fn signin(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "url": state.oauth.signin_url() }))
}

/// GET /api/auth/callback — completes the identity-provider handshake.
///
/// Exchanges the authorization code, fetches the signed-in profile, seals
/// the fresh session token into the cookie, and sends the browser back to
/// the app origin.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, StatusCode> {
    let grant = state.oauth.exchange_code(&query.code).await.map_err(|e| {
        tracing::error!("authorization code exchange failed: {e}");
        StatusCode::BAD_GATEWAY
    })?;

    if grant.refresh_token.is_none() {
        // Consent is forced at sign-in, so this points at a provider or
        // configuration problem worth surfacing in the logs.
        tracing::warn!("provider issued no refresh token; session will not survive expiry");
    }

    let user = state
        .oauth
        .fetch_user(&grant.access_token)
        .await
        .map_err(|e| {
            tracing::error!("userinfo request failed: {e}");
            StatusCode::BAD_GATEWAY
        })?;

    let token = SessionToken::established(grant, user.into(), Utc::now().timestamp_millis());
    let sealed = state.sessions.seal(&token).map_err(|e| {
        tracing::error!("failed to seal session token: {e:#}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!(user = %token.user.id, "session established");

    let response = Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, CONFIG.server.app_origin.as_str())
        .header(header::SET_COOKIE, session_cookie(sealed).to_string())
        .body(axum::body::Body::empty())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(response)
}

/// GET /api/auth/session — the read surface exposed to the UI.
///
/// Runs the credential lifecycle first, so a valid read is free and an
/// expired one triggers exactly one silent refresh; the (possibly replaced)
/// token is re-sealed into the cookie.
pub async fn read_session(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(token) = load_session(&state, &jar) else {
        return (
            StatusCode::UNAUTHORIZED,
            AxumJson(json!({ "accessToken": null, "error": null, "user": null })),
        )
            .into_response();
    };

    let token = session::get_valid_token(token, &state.oauth, Utc::now().timestamp_millis()).await;
    respond_with_session(&state, &token, StatusCode::OK, json!(token.view()))
}

/// Serialize a JSON body alongside a re-sealed session cookie.
pub fn respond_with_session(
    state: &AppState,
    token: &SessionToken,
    status: StatusCode,
    body: Value,
) -> Response {
    let sealed = match state.sessions.seal(token) {
        Ok(sealed) => sealed,
        Err(e) => {
            tracing::error!("failed to seal session token: {e:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match Response::builder()
        .status(status)
        .header(header::SET_COOKIE, session_cookie(sealed).to_string())
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
    {
        Ok(response) => response,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signin", get(signin))
        .route("/api/auth/callback", get(callback))
        .route("/api/auth/session", get(read_session))
}
