//! Generation backend client

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::BackendConfig;

/// Errors from the generation backend call. All of these land on the
/// conversation's "try again" path; none reach the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned status {status}: {detail}")]
    Backend { status: u16, detail: String },
}

/// Response body of `POST /generate-presentation`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(default)]
    pub url: Option<String>,
}

/// HTTP client for the presentation-generation backend.
pub struct GenerationClient {
    client: Client,
    base_url: String,
}

impl GenerationClient {
    pub fn new(config: &BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        }
    }

    /// Issue one generation request carrying the user's access token both in
    /// the body (the backend builds the user's deck with it) and as a bearer
    /// header.
    pub async fn generate(
        &self,
        topic: &str,
        access_token: &str,
    ) -> Result<GenerateResponse, GenerationError> {
        let payload = json!({
            "topic": topic,
            "access_token": access_token,
        });

        let response = self
            .client
            .post(format!("{}/generate-presentation", self.base_url))
            .header("Authorization", format!("Bearer {}", access_token))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::Backend { status, detail });
        }

        response.json::<GenerateResponse>().await.map_err(Into::into)
    }
}
