//! Identity-provider client
//!
//! Builds the sign-in URL, exchanges the authorization code for the initial
//! token grant, fetches the signed-in profile, and performs the silent
//! refresh grant. Every call is a single request with no automatic retry;
//! the caller maps failures into session state.

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::auth::session::SessionUser;
use crate::config::OAuthSettings;

/// Scopes requested at sign-in: identity plus presentation creation and
/// file-scoped storage access.
const SIGNIN_SCOPES: &str = "openid email profile \
    https://www.googleapis.com/auth/presentations \
    https://www.googleapis.com/auth/drive.file";

/// Errors from the identity provider's endpoints.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} failed with status {status}: {detail}")]
    Provider {
        operation: &'static str,
        status: u16,
        detail: String,
    },
}

/// Token grant from the provider's token endpoint, for both the initial
/// code exchange and the refresh grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Declared lifetime in seconds; some providers omit it.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Present on initial consent, only sometimes rotated on refresh.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Profile from the provider's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl From<UserInfo> for SessionUser {
    fn from(info: UserInfo) -> Self {
        SessionUser {
            id: info.sub,
            name: info.name,
            email: info.email,
            image: info.picture,
        }
    }
}

/// OAuth client for the identity provider.
pub struct OAuthClient {
    settings: OAuthSettings,
    http: Client,
}

impl OAuthClient {
    pub fn new(settings: OAuthSettings) -> Self {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { settings, http }
    }

    /// Authorization URL the user is sent to at sign-in.
    ///
    /// `access_type=offline` plus `prompt=consent` guarantees the provider
    /// issues a refresh token on every initial consent, not just the first.
    pub fn signin_url(&self) -> String {
        let mut url: Url = self
            .settings
            .auth_url
            .parse()
            .expect("invalid OAuth authorization URL in configuration");

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("scope", SIGNIN_SCOPES)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");

        url.into()
    }

    /// Exchange an authorization code for the initial token grant.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthError> {
        let params = [
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&params)
            .send()
            .await?;

        let response = Self::ensure_success(response, "code exchange").await?;
        response.json::<TokenGrant>().await.map_err(Into::into)
    }

    /// Mint a new access token from a refresh token.
    ///
    /// A non-2xx response or transport error is a refresh failure; the
    /// session layer decides what that means for the stored token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        let params = [
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&params)
            .send()
            .await?;

        let response = Self::ensure_success(response, "token refresh").await?;
        response.json::<TokenGrant>().await.map_err(Into::into)
    }

    /// Fetch the signed-in user's profile with a bearer access token.
    pub async fn fetch_user(&self, access_token: &str) -> Result<UserInfo, AuthError> {
        let response = self
            .http
            .get(&self.settings.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = Self::ensure_success(response, "userinfo request").await?;
        response.json::<UserInfo>().await.map_err(Into::into)
    }

    /// Checks HTTP response status; returns the response on success or an
    /// error carrying the body for diagnostics.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, AuthError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        Err(AuthError::Provider {
            operation,
            status,
            detail,
        })
    }
}
