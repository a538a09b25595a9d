//! Inbound body parsing and upstream payload construction.

use crate::models::{AdapterMode, ChatTurn};
use crate::upstream::{Content, GenerateContentRequest};
use crate::{Error, Result};
use serde_json::{Map, Value};

pub type Body = Map<String, Value>;

const GENERATION_CONFIG: &str = "generationConfig";

/// Parse the raw request body. It must be UTF-8 encoding a JSON object.
pub fn parse_body(raw: Option<&[u8]>) -> Result<Body> {
    let raw = match raw {
        Some(raw) if !raw.iter().all(u8::is_ascii_whitespace) => raw,
        _ => return Err(Error::MissingBody),
    };
    let raw = std::str::from_utf8(raw).map_err(Error::InvalidEncoding)?;

    match serde_json::from_str(raw).map_err(Error::InvalidBody)? {
        Value::Object(body) => Ok(body),
        _ => Err(Error::BodyNotObject),
    }
}

/// Build the `generateContent` request body for `mode`.
pub fn build(mode: AdapterMode, body: &Body) -> Result<Value> {
    match mode {
        AdapterMode::Passthrough => passthrough(chat_history(mode, body)?, body),
        AdapterMode::Session => session(mode, chat_history(mode, body)?, body),
        AdapterMode::Prompt => prompt(mode, body),
    }
}

fn passthrough(history: &[Value], body: &Body) -> Result<Value> {
    Ok(request_body(history.to_vec(), generation_config(body)))
}

/// Prior turns go upstream exactly as received; only the last turn is read.
fn session(mode: AdapterMode, history: &[Value], body: &Body) -> Result<Value> {
    let (last, prior) = history
        .split_last()
        .ok_or(Error::MissingField(mode.required_field()))?;

    let last: ChatTurn = serde_json::from_value(last.clone())
        .map_err(|e| Error::InvalidHistory(format!("last turn: {}", e)))?;
    let message = last
        .first_text()
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| Error::InvalidHistory("last turn has no text part".to_string()))?;

    let mut contents = prior.to_vec();
    contents.push(serde_json::to_value(Content::text(Some("user"), message))?);

    Ok(request_body(contents, generation_config(body)))
}

fn prompt(mode: AdapterMode, body: &Body) -> Result<Value> {
    let field = mode.required_field();
    let prompt = body
        .get(field)
        .and_then(Value::as_str)
        .filter(|p| !p.trim().is_empty())
        .ok_or(Error::MissingField(field))?;

    Ok(serde_json::to_value(GenerateContentRequest {
        contents: vec![Content::text(None, prompt)],
        generation_config: None,
    })?)
}

fn chat_history(mode: AdapterMode, body: &Body) -> Result<&[Value]> {
    let field = mode.required_field();
    match body.get(field) {
        None | Some(Value::Null) => Err(Error::MissingField(field)),
        Some(Value::Array(turns)) if turns.is_empty() => Err(Error::MissingField(field)),
        Some(Value::Array(turns)) => Ok(turns.as_slice()),
        Some(_) => Err(Error::InvalidHistory(format!(
            "{} must be an array of turns",
            field
        ))),
    }
}

fn generation_config(body: &Body) -> Option<Value> {
    body.get(GENERATION_CONFIG)
        .filter(|config| !config.is_null())
        .cloned()
}

/// `{ contents, generationConfig? }`
fn request_body(contents: Vec<Value>, generation_config: Option<Value>) -> Value {
    let mut payload = Map::new();
    payload.insert("contents".to_string(), Value::Array(contents));
    if let Some(config) = generation_config {
        payload.insert(GENERATION_CONFIG.to_string(), config);
    }
    Value::Object(payload)
}
