//! Error handling and custom error types
//!
//! Every step of an invocation returns one of these kinds; the adapter turns
//! the kind into a structured JSON response at a single boundary.

use crate::models::OutboundResponse;
use serde_json::json;
use thiserror::Error;

/// Prefix for every transport-class failure message returned to the caller.
pub const TRANSPORT_CONTEXT: &str = "Failed to fetch from Google API via proxy.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("API key not configured.")]
    MissingCredential,

    #[error("Missing request body.")]
    MissingBody,

    #[error("Request body is not valid UTF-8: {0}")]
    InvalidEncoding(#[source] std::str::Utf8Error),

    #[error("Invalid JSON in request body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("Request body must be a JSON object.")]
    BodyNotObject,

    #[error("Missing {0} in request body.")]
    MissingField(&'static str),

    #[error("Invalid chat history: {0}")]
    InvalidHistory(String),

    #[error("Upstream API error (status {status})")]
    Upstream { status: u16, body: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Failed to parse upstream response: {0}")]
    UpstreamParse(String),

    #[error("No text in upstream response")]
    EmptyResponse,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status the caller sees for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MethodNotAllowed => 405,
            Error::MissingBody
            | Error::InvalidEncoding(_)
            | Error::InvalidBody(_)
            | Error::BodyNotObject
            | Error::MissingField(_)
            | Error::InvalidHistory(_) => 400,
            Error::Upstream { status, .. } => *status,
            Error::MissingCredential
            | Error::Http(_)
            | Error::Network(_)
            | Error::Timeout(_)
            | Error::UpstreamParse(_)
            | Error::EmptyResponse
            | Error::Serialization(_)
            | Error::Config(_) => 500,
        }
    }

    /// Whether the failure happened while talking to the upstream API.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::Network(_)
                | Error::Timeout(_)
                | Error::UpstreamParse(_)
                | Error::EmptyResponse
        )
    }

    /// Convert into the response returned to the caller.
    ///
    /// `secret` is scrubbed from any message text before it leaves the process.
    pub fn into_response(self, secret: Option<&str>) -> OutboundResponse {
        let status = self.status_code();
        match self {
            Error::Upstream { body, .. } => {
                let body = if serde_json::from_str::<serde_json::Value>(&body).is_ok() {
                    body
                } else {
                    error_body(&redact(&body, secret))
                };
                OutboundResponse::new(status, body)
            }
            err if err.is_transport() => {
                let message = format!("{} {}", TRANSPORT_CONTEXT, err);
                OutboundResponse::new(status, error_body(&redact(&message, secret)))
            }
            err => OutboundResponse::new(status, error_body(&redact(&err.to_string(), secret))),
        }
    }
}

/// `{ "error": { "message": ... } }`
pub fn error_body(message: &str) -> String {
    json!({ "error": { "message": message } }).to_string()
}

/// Replace every occurrence of `secret` in `text`.
pub fn redact(text: &str, secret: Option<&str>) -> String {
    match secret {
        Some(secret) if !secret.is_empty() => text.replace(secret, "[REDACTED]"),
        _ => text.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn message(response: &OutboundResponse) -> String {
        let value: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        value["error"]["message"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::MethodNotAllowed.status_code(), 405);
        assert_eq!(Error::MissingCredential.status_code(), 500);
        assert_eq!(Error::MissingField("prompt").status_code(), 400);
        assert_eq!(Error::Timeout(Duration::from_secs(30)).status_code(), 500);
        assert_eq!(
            Error::Upstream {
                status: 429,
                body: "{}".to_string()
            }
            .status_code(),
            429
        );
    }

    #[test]
    fn test_missing_field_message_names_field() {
        let response = Error::MissingField("chatHistory").into_response(None);
        assert_eq!(response.status_code, 400);
        assert_eq!(message(&response), "Missing chatHistory in request body.");
    }

    #[test]
    fn test_upstream_json_body_is_verbatim() {
        let body = r#"{"error":{"message":"rate limited"}}"#.to_string();
        let response = Error::Upstream {
            status: 429,
            body: body.clone(),
        }
        .into_response(None);
        assert_eq!(response.status_code, 429);
        assert_eq!(response.body, body);
    }

    #[test]
    fn test_upstream_text_body_is_wrapped() {
        let response = Error::Upstream {
            status: 502,
            body: "bad gateway".to_string(),
        }
        .into_response(None);
        assert_eq!(response.status_code, 502);
        assert_eq!(message(&response), "bad gateway");
    }

    #[test]
    fn test_upstream_text_body_is_scrubbed() {
        let response = Error::Upstream {
            status: 400,
            body: "API key sk-secret is malformed".to_string(),
        }
        .into_response(Some("sk-secret"));
        assert_eq!(response.status_code, 400);
        assert_eq!(message(&response), "API key [REDACTED] is malformed");
    }

    #[test]
    fn test_timeout_message_keeps_sub_second_precision() {
        let response = Error::Timeout(Duration::from_millis(20)).into_response(None);
        assert!(message(&response).ends_with("timed out after 20ms"));
    }

    #[test]
    fn test_transport_message_has_context_and_no_secret() {
        let response = Error::UpstreamParse("unexpected token near sk-secret".to_string())
            .into_response(Some("sk-secret"));
        let text = message(&response);
        assert_eq!(response.status_code, 500);
        assert!(text.starts_with(TRANSPORT_CONTEXT));
        assert!(text.contains("unexpected token"));
        assert!(!text.contains("sk-secret"));
    }

    #[test]
    fn test_redact_ignores_empty_secret() {
        assert_eq!(redact("abc", Some("")), "abc");
        assert_eq!(redact("abc", None), "abc");
        assert_eq!(redact("xabcx", Some("abc")), "x[REDACTED]x");
    }
}
