//! Configuration module for environment variables and application settings

use std::env;
use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;

/// Global application configuration loaded from environment variables
pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client settings for the identity provider
    pub oauth: OAuthSettings,

    /// Generation backend settings
    pub backend: BackendConfig,

    /// Server configuration
    pub server: ServerConfig,

    /// Secret used to sign the sealed session token
    pub session_secret: String,
}

#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    /// Authorization endpoint the user is sent to at sign-in
    pub auth_url: String,
    /// Token endpoint for code exchange and refresh
    pub token_url: String,
    /// Userinfo endpoint for the signed-in profile
    pub userinfo_url: String,
    /// Where the provider redirects back to after consent
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the presentation-generation backend
    pub url: String,
    /// Request timeout in seconds for generation calls
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origin allowed by CORS and used as the post-signin redirect
    pub app_origin: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            oauth: OAuthSettings {
                client_id: env::var("GOOGLE_CLIENT_ID")
                    .map_err(|_| anyhow!("GOOGLE_CLIENT_ID environment variable is required"))?,

                client_secret: env::var("GOOGLE_CLIENT_SECRET")
                    .map_err(|_| anyhow!("GOOGLE_CLIENT_SECRET environment variable is required"))?,

                auth_url: env::var("OAUTH_AUTH_URL")
                    .unwrap_or_else(|_| "https://accounts.google.com/o/oauth2/v2/auth".to_string()),

                token_url: env::var("OAUTH_TOKEN_URL")
                    .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string()),

                userinfo_url: env::var("OAUTH_USERINFO_URL")
                    .unwrap_or_else(|_| "https://www.googleapis.com/oauth2/v3/userinfo".to_string()),

                redirect_uri: env::var("OAUTH_REDIRECT_URI")
                    .unwrap_or_else(|_| "http://localhost:3000/api/auth/callback".to_string()),
            },

            backend: BackendConfig {
                url: env::var("GENERATION_BACKEND_URL")
                    .unwrap_or_else(|_| "http://localhost:8000".to_string()),
                request_timeout_secs: env::var("GENERATION_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "120".to_string())
                    .parse()
                    .unwrap_or(120),
            },

            server: ServerConfig {
                host: env::var("SERVER_HOST")
                    .unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
                app_origin: env::var("APP_ORIGIN")
                    .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            },

            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| "dev_secret".to_string()),
        })
    }
}
