use super::{UpstreamResult, UpstreamService};
use crate::models::{Credential, DEFAULT_BASE_URL};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Lightweight Gemini REST client for the `generateContent` endpoint.
///
/// The API key is supplied per call so the client itself holds no secret.
/// Failures are returned, not logged; the adapter logs them once.
pub struct GeminiHttpClient {
    client: Client,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` may be given with or without the `models/` prefix.
    pub fn new(model: String, timeout: Duration) -> Self {
        Self::new_with_client(model, timeout, Client::new())
    }

    pub fn new_with_client(model: String, timeout: Duration, client: Client) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_content_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl UpstreamService for GeminiHttpClient {
    async fn generate_content(
        &self,
        credential: &Credential,
        payload: &serde_json::Value,
    ) -> Result<UpstreamResult> {
        let response = self
            .client
            .post(self.generate_content_url())
            .timeout(self.timeout)
            .header("x-goog-api-key", credential.expose())
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Ok(UpstreamResult::Failure {
                status: status.as_u16(),
                body,
            });
        }

        if let Err(e) = serde_json::from_str::<serde_json::Value>(&body) {
            return Err(Error::UpstreamParse(e.to_string()));
        }

        Ok(UpstreamResult::Success { body })
    }
}
