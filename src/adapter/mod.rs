//! The request adapter: validate, reshape, relay, normalize.
//!
//! [`RequestAdapter::handle`] is the single invocation boundary. Each step
//! below it returns a named [`Error`]; the boundary logs the error and turns
//! it into an [`OutboundResponse`], so no failure escapes unhandled.

pub mod normalize;
pub mod payload;

use crate::models::{AdapterMode, Credential, IncomingRequest, OutboundResponse, RelayConfig};
use crate::upstream::{GeminiHttpClient, UpstreamService};
use crate::{Error, Result};
use tracing::{error, info_span, warn, Instrument};
use uuid::Uuid;

/// The only method the relay accepts.
pub const ALLOWED_METHOD: &str = "POST";

pub struct RequestAdapter {
    config: RelayConfig,
    upstream: Box<dyn UpstreamService>,
}

impl RequestAdapter {
    /// Build an adapter from an explicit upstream service.
    ///
    /// Tests and local harnesses use this to inject mocks.
    pub fn new(config: RelayConfig, upstream: Box<dyn UpstreamService>) -> Self {
        Self { config, upstream }
    }

    /// Build an adapter talking to the Gemini REST API described by `config`.
    pub fn from_config(config: RelayConfig) -> Self {
        let client = GeminiHttpClient::new(config.model.clone(), config.timeout)
            .with_base_url(config.base_url.clone());
        Self::new(config, Box::new(client))
    }

    pub fn mode(&self) -> AdapterMode {
        self.config.mode
    }

    /// Handle one invocation. Always produces exactly one response.
    pub async fn handle(&self, request: IncomingRequest) -> OutboundResponse {
        let span = info_span!(
            "relay",
            request_id = %Uuid::new_v4(),
            mode = ?self.config.mode
        );

        async move {
            match self.relay(&request).await {
                Ok(response) => response,
                Err(err) => self.reject(err),
            }
        }
        .instrument(span)
        .await
    }

    async fn relay(&self, request: &IncomingRequest) -> Result<OutboundResponse> {
        if !request.http_method.eq_ignore_ascii_case(ALLOWED_METHOD) {
            return Err(Error::MethodNotAllowed);
        }

        let credential = self.credential()?;
        let body = payload::parse_body(request.body.as_deref())?;
        let upstream_payload = payload::build(self.config.mode, &body)?;

        let result = tokio::time::timeout(
            self.config.timeout,
            self.upstream.generate_content(credential, &upstream_payload),
        )
        .await
        .map_err(|_| Error::Timeout(self.config.timeout))??;

        normalize::normalize(self.config.mode, result)
    }

    fn credential(&self) -> Result<&Credential> {
        self.config.api_key.as_ref().ok_or(Error::MissingCredential)
    }

    fn secret(&self) -> Option<&str> {
        self.config.api_key.as_ref().map(Credential::expose)
    }

    fn reject(&self, err: Error) -> OutboundResponse {
        let secret = self.secret();
        match &err {
            Error::Upstream { status, body } => {
                error!(
                    "Gemini API error (status {}): {}",
                    status,
                    crate::error::redact(body, secret)
                );
            }
            Error::MissingCredential => error!("Relay is missing its API key"),
            e if e.status_code() < 500 => warn!("Rejected request: {}", e),
            e => error!("Relay failure: {}", crate::error::redact(&e.to_string(), secret)),
        }
        err.into_response(secret)
    }
}
