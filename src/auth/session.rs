//! Session token state machine
//!
//! The session token wraps the provider credentials for one browser session.
//! All transitions are pure functions over a passed-in token value with an
//! explicit `now`; expiry is detected lazily on read, never via a timer.
//! Tokens are replaced as a whole unit, so a concurrent reader can never
//! observe a half-updated refresh.

use serde::{Deserialize, Serialize};

use crate::auth::oauth::{OAuthClient, TokenGrant};

/// Wire tag surfaced to the UI when a silent refresh has failed.
pub const REFRESH_ERROR_TAG: &str = "RefreshAccessTokenError";

/// Lifetime assumed when the provider omits `expires_in`.
const DEFAULT_LIFETIME_SECS: u64 = 3600;

/// Authenticated principal, filled from the provider's userinfo endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// Terminal error state of a session; sticky until re-authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SessionError {
    #[error("access token refresh failed")]
    #[serde(rename = "RefreshAccessTokenError")]
    RefreshFailed,
}

/// Credentials for one browser session.
///
/// The refresh token never leaves this module in the clear; outside callers
/// see only the [`SessionView`] projection or the sealed JWT form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    /// Milliseconds since epoch; the access token must not be used at or
    /// after this instant.
    pub expires_at: i64,
    pub(in crate::auth) refresh_token: String,
    pub user: SessionUser,
    pub error: Option<SessionError>,
}

/// Lazily-computed lifecycle state of a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Valid,
    Expired,
    RefreshFailed,
}

/// Read-only projection exposed to the UI layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub access_token: String,
    pub error: Option<&'static str>,
    pub user: SessionUser,
}

impl SessionToken {
    /// Build a fresh token from a successful identity-provider handshake.
    ///
    /// Expiry is `now + expires_in`; when the provider omits a lifetime the
    /// configured default (3600 s) is assumed.
    pub fn established(grant: TokenGrant, user: SessionUser, now_ms: i64) -> Self {
        let lifetime_secs = grant.expires_in.unwrap_or(DEFAULT_LIFETIME_SECS);

        Self {
            access_token: grant.access_token,
            expires_at: now_ms + (lifetime_secs as i64) * 1000,
            refresh_token: grant.refresh_token.unwrap_or_default(),
            user,
            error: None,
        }
    }

    /// Lifecycle state at the given instant.
    pub fn status(&self, now_ms: i64) -> SessionStatus {
        if self.error.is_some() {
            SessionStatus::RefreshFailed
        } else if now_ms < self.expires_at {
            SessionStatus::Valid
        } else {
            SessionStatus::Expired
        }
    }

    /// Apply a successful refresh, replacing the token as a whole unit.
    ///
    /// The refresh token only rotates when the provider returned a new one.
    /// Expiry is clamped so it never moves backwards within a session.
    pub fn applied_refresh(self, grant: TokenGrant, now_ms: i64) -> Self {
        let lifetime_secs = grant.expires_in.unwrap_or(DEFAULT_LIFETIME_SECS);
        let expires_at = (now_ms + (lifetime_secs as i64) * 1000).max(self.expires_at);

        Self {
            access_token: grant.access_token,
            expires_at,
            refresh_token: grant.refresh_token.unwrap_or(self.refresh_token),
            user: self.user,
            error: None,
        }
    }

    /// Mark the session as failed after an unsuccessful refresh attempt.
    ///
    /// The prior credentials are preserved so the caller can decide whether
    /// to retry or force a full re-authentication.
    pub fn refresh_failed(self) -> Self {
        Self {
            error: Some(SessionError::RefreshFailed),
            ..self
        }
    }

    /// Read surface for the UI: access token and error tag, never the
    /// refresh token.
    pub fn view(&self) -> SessionView {
        SessionView {
            access_token: self.access_token.clone(),
            error: self.error.map(|_| REFRESH_ERROR_TAG),
            user: self.user.clone(),
        }
    }
}

/// Return a token that is usable right now, refreshing at most once.
///
/// While the token is valid this is a pure read with zero network calls. An
/// expired token triggers exactly one refresh attempt; on failure the prior
/// credentials come back carrying the sticky error tag. A token already in
/// the failed state is returned unchanged, since that state only exits via a
/// full new handshake.
pub async fn get_valid_token(
    token: SessionToken,
    oauth: &OAuthClient,
    now_ms: i64,
) -> SessionToken {
    match token.status(now_ms) {
        SessionStatus::Valid | SessionStatus::RefreshFailed => token,
        SessionStatus::Expired => match oauth.refresh(&token.refresh_token).await {
            Ok(grant) => {
                tracing::debug!(user = %token.user.id, "access token refreshed");
                token.applied_refresh(grant, now_ms)
            }
            Err(e) => {
                tracing::warn!(user = %token.user.id, "access token refresh failed: {e}");
                token.refresh_failed()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> SessionUser {
        SessionUser {
            id: "usr_1".into(),
            name: Some("Test User".into()),
            email: Some("test@example.com".into()),
            image: None,
        }
    }

    fn grant(access: &str, expires_in: Option<u64>, refresh: Option<&str>) -> TokenGrant {
        TokenGrant {
            access_token: access.into(),
            expires_in,
            refresh_token: refresh.map(Into::into),
        }
    }

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_established_uses_declared_lifetime() {
        let token = SessionToken::established(grant("at", Some(120), Some("rt")), test_user(), NOW);

        assert_eq!(token.access_token, "at");
        assert_eq!(token.expires_at, NOW + 120_000);
        assert_eq!(token.refresh_token, "rt");
        assert!(token.error.is_none());
    }

    #[test]
    fn test_established_defaults_to_one_hour() {
        let token = SessionToken::established(grant("at", None, Some("rt")), test_user(), NOW);

        assert_eq!(token.expires_at, NOW + 3_600_000);
    }

    #[test]
    fn test_status_is_lazy_and_time_based() {
        let token = SessionToken::established(grant("at", Some(60), Some("rt")), test_user(), NOW);

        assert_eq!(token.status(NOW), SessionStatus::Valid);
        assert_eq!(token.status(NOW + 59_999), SessionStatus::Valid);
        assert_eq!(token.status(NOW + 60_000), SessionStatus::Expired);
    }

    #[test]
    fn test_applied_refresh_rotates_and_replaces_atomically() {
        let token = SessionToken::established(grant("old", Some(60), Some("rt1")), test_user(), NOW);
        let refreshed =
            token.applied_refresh(grant("new", Some(60), Some("rt2")), NOW + 60_000);

        assert_eq!(refreshed.access_token, "new");
        assert_eq!(refreshed.refresh_token, "rt2");
        assert_eq!(refreshed.expires_at, NOW + 120_000);
        assert!(refreshed.error.is_none());
    }

    #[test]
    fn test_applied_refresh_keeps_refresh_token_when_not_rotated() {
        let token = SessionToken::established(grant("old", Some(60), Some("rt1")), test_user(), NOW);
        let refreshed = token.applied_refresh(grant("new", Some(60), None), NOW + 60_000);

        assert_eq!(refreshed.refresh_token, "rt1");
    }

    #[test]
    fn test_expiry_never_moves_backwards() {
        let token =
            SessionToken::established(grant("old", Some(600), Some("rt")), test_user(), NOW);
        let before = token.expires_at;
        // Provider answers with a shorter lifetime than remains on the clock.
        let refreshed = token.applied_refresh(grant("new", Some(1), None), NOW);

        assert_eq!(refreshed.expires_at, before);
    }

    #[test]
    fn test_refresh_failed_preserves_credentials() {
        let token = SessionToken::established(grant("at", Some(60), Some("rt")), test_user(), NOW);
        let failed = token.refresh_failed();

        assert_eq!(failed.access_token, "at");
        assert_eq!(failed.refresh_token, "rt");
        assert_eq!(failed.error, Some(SessionError::RefreshFailed));
        assert_eq!(failed.status(NOW), SessionStatus::RefreshFailed);
        // Failed state is sticky regardless of the clock.
        assert_eq!(failed.status(NOW + 1_000_000), SessionStatus::RefreshFailed);
    }

    mod refresh_flow {
        use super::*;
        use crate::config::OAuthSettings;
        use wiremock::matchers::{body_string_contains, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn oauth_against(server: &MockServer) -> OAuthClient {
            OAuthClient::new(OAuthSettings {
                client_id: "test-client".into(),
                client_secret: "test-secret".into(),
                auth_url: "https://accounts.google.com/o/oauth2/v2/auth".into(),
                token_url: format!("{}/token", server.uri()),
                userinfo_url: format!("{}/userinfo", server.uri()),
                redirect_uri: "http://localhost:3000/api/auth/callback".into(),
            })
        }

        #[tokio::test]
        async fn test_valid_read_makes_zero_network_calls() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/token"))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server)
                .await;

            let token =
                SessionToken::established(grant("at", Some(60), Some("rt")), test_user(), NOW);
            let result = get_valid_token(token, &oauth_against(&server), NOW + 1).await;

            assert_eq!(result.access_token, "at");
            assert!(result.error.is_none());
        }

        #[tokio::test]
        async fn test_expired_read_refreshes_exactly_once() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/token"))
                .and(body_string_contains("grant_type=refresh_token"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "access_token": "at2",
                    "expires_in": 3600
                })))
                .expect(1)
                .mount(&server)
                .await;

            let token =
                SessionToken::established(grant("at1", Some(60), Some("rt")), test_user(), NOW);
            let expired_at = NOW + 60_000;
            let result = get_valid_token(token, &oauth_against(&server), expired_at).await;

            assert_eq!(result.access_token, "at2");
            assert_eq!(result.expires_at, expired_at + 3_600_000);
            assert!(result.error.is_none());
            assert_eq!(result.status(expired_at), SessionStatus::Valid);
        }

        #[tokio::test]
        async fn test_failed_refresh_tags_session_and_preserves_credentials() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/token"))
                .respond_with(
                    ResponseTemplate::new(400)
                        .set_body_json(serde_json::json!({"error": "invalid_grant"})),
                )
                .expect(1)
                .mount(&server)
                .await;

            let oauth = oauth_against(&server);
            let token =
                SessionToken::established(grant("at", Some(60), Some("rt")), test_user(), NOW);
            let failed = get_valid_token(token, &oauth, NOW + 60_000).await;

            assert_eq!(failed.access_token, "at");
            assert_eq!(failed.refresh_token, "rt");
            assert_eq!(failed.error, Some(SessionError::RefreshFailed));

            // Failed state is terminal: a later read does not retry the
            // refresh (the mock's expect(1) would trip otherwise).
            let still_failed = get_valid_token(failed, &oauth, NOW + 120_000).await;
            assert_eq!(still_failed.error, Some(SessionError::RefreshFailed));
        }
    }

    #[test]
    fn test_view_exposes_error_tag_but_not_refresh_token() {
        let token = SessionToken::established(grant("at", Some(60), Some("rt")), test_user(), NOW)
            .refresh_failed();
        let view = token.view();

        assert_eq!(view.access_token, "at");
        assert_eq!(view.error, Some("RefreshAccessTokenError"));

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("refreshToken").is_none());
        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["error"], "RefreshAccessTokenError");
    }
}
