//! Upstream generative-language API integration
//!
//! The adapter only sees [`UpstreamService`]; the Gemini REST client and the
//! test mock both implement it.

pub mod client;
pub mod mock;
pub mod types;

pub use client::GeminiHttpClient;
pub use mock::{MockReply, MockUpstreamClient};
pub use types::{Candidate, Content, GenerateContentRequest, GenerateContentResponse, Part};

use crate::models::Credential;
use crate::Result;
use async_trait::async_trait;

/// Outcome of a call that reached the upstream API.
///
/// Transport failures are reported as `Err` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamResult {
    /// 2xx with a body that parsed as JSON, kept as received.
    Success { body: String },
    /// Non-2xx status with the raw response body.
    Failure { status: u16, body: String },
}

#[async_trait]
pub trait UpstreamService: Send + Sync {
    async fn generate_content(
        &self,
        credential: &Credential,
        payload: &serde_json::Value,
    ) -> Result<UpstreamResult>;
}
