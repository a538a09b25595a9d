//! Data models and structures
//!
//! Inbound/outbound invocation shapes, chat turns, and the relay
//! configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One invocation as handed over by the hosting platform.
///
/// The body is kept as received; it is only decoded while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingRequest {
    pub http_method: String,
    pub body: Option<Vec<u8>>,
}

impl IncomingRequest {
    pub fn new(http_method: impl Into<String>, body: Option<String>) -> Self {
        Self::from_bytes(http_method, body.map(String::into_bytes))
    }

    pub fn from_bytes(http_method: impl Into<String>, body: Option<Vec<u8>>) -> Self {
        Self {
            http_method: http_method.into(),
            body,
        }
    }

    pub fn post(body: impl Into<String>) -> Self {
        Self::new("POST", Some(body.into()))
    }
}

/// The single response produced for an invocation. `body` is JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    pub status_code: u16,
    pub body: String,
}

impl OutboundResponse {
    pub fn new(status_code: u16, body: String) -> Self {
        Self { status_code, body }
    }

    pub fn ok(body: String) -> Self {
        Self::new(200, body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
}

/// One utterance in the caller's conversation.
///
/// Non-text parts are accepted and ignored when the turn is deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "text_parts")]
    pub parts: Vec<TextPart>,
}

fn text_parts<'de, D>(deserializer: D) -> std::result::Result<Vec<TextPart>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Vec<serde_json::Value> = Deserialize::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|part| serde_json::from_value(part).ok())
        .collect())
}

impl ChatTurn {
    pub fn first_text(&self) -> Option<&str> {
        self.parts.first().map(|p| p.text.as_str())
    }
}

/// Secret API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank input so an empty variable counts as unset.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// How the inbound body is reshaped for the upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AdapterMode {
    /// Forward `chatHistory` and `generationConfig` untouched.
    #[default]
    Passthrough,
    /// Split `chatHistory` into prior turns and a new message.
    Session,
    /// Wrap a single `prompt` string.
    Prompt,
}

impl AdapterMode {
    /// Name of the body field this mode requires.
    pub fn required_field(self) -> &'static str {
        match self {
            AdapterMode::Passthrough | AdapterMode::Session => "chatHistory",
            AdapterMode::Prompt => "prompt",
        }
    }
}

impl FromStr for AdapterMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passthrough" | "pass-through" => Ok(AdapterMode::Passthrough),
            "session" => Ok(AdapterMode::Session),
            "prompt" => Ok(AdapterMode::Prompt),
            other => Err(Error::Config(format!("unknown relay mode '{}'", other))),
        }
    }
}

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub api_key: Option<Credential>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub mode: AdapterMode,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            mode: AdapterMode::default(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// A missing API key is not an error here; each invocation reports it.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("GOOGLE_API_KEY")
            .and_then(Credential::new)
            .or_else(|| lookup("GEMINI_API_KEY").and_then(Credential::new));

        let timeout = match lookup("RELAY_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                Error::Config(format!("RELAY_TIMEOUT_SECS must be an integer, got '{}'", raw))
            })?),
            None => defaults.timeout,
        };

        let mode = match lookup("RELAY_MODE") {
            Some(raw) => raw.parse()?,
            None => defaults.mode,
        };

        Ok(Self {
            api_key,
            model: lookup("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            timeout,
            mode,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Credential::new(api_key);
        self
    }

    pub fn with_mode(mut self, mode: AdapterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
