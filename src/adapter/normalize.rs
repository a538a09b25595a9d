//! Upstream result to outbound response.

use crate::models::{AdapterMode, OutboundResponse};
use crate::upstream::{GenerateContentResponse, UpstreamResult};
use crate::{Error, Result};

/// Turn an upstream result into the caller's response.
///
/// Upstream failures become [`Error::Upstream`] so the boundary passes their
/// status and body through unchanged.
pub fn normalize(mode: AdapterMode, result: UpstreamResult) -> Result<OutboundResponse> {
    match result {
        UpstreamResult::Failure { status, body } => Err(Error::Upstream { status, body }),
        UpstreamResult::Success { body } => match mode {
            AdapterMode::Passthrough => Ok(OutboundResponse::ok(body)),
            AdapterMode::Session | AdapterMode::Prompt => generated_text_only(&body),
        },
    }
}

fn generated_text_only(body: &str) -> Result<OutboundResponse> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| Error::UpstreamParse(e.to_string()))?;
    let text = response.first_text().ok_or(Error::EmptyResponse)?;

    let normalized = serde_json::to_string(&GenerateContentResponse::from_text(text))?;
    Ok(OutboundResponse::ok(normalized))
}
