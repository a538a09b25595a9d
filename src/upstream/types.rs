//! Gemini `generateContent` payload types shared by the session and prompt
//! adaptations.

use serde::{Deserialize, Serialize};

/// Gemini content container used in both requests and responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part::Text { text: text.into() }],
        }
    }
}

/// Untagged union of text and any other part kind Gemini may return.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    Other(serde_json::Value),
}

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<serde_json::Value>,
}

/// Top-level `generateContent` response envelope.
///
/// Also serialized as the normalized success body returned to callers.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Candidate completion item returned by Gemini.
#[derive(Debug, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Single-candidate envelope carrying only `text`.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content::text(None, text)),
            }],
        }
    }

    /// First text part of the first candidate.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| {
                content.parts.iter().find_map(|p| match p {
                    Part::Text { text } => Some(text.as_str()),
                    Part::Other(_) => None,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_first_text_skips_non_text_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "" } },
                        { "text": "4" }
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 3 }
        }))
        .unwrap();

        assert_eq!(response.first_text(), Some("4"));
    }

    #[test]
    fn test_first_text_handles_missing_content() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();
        assert_eq!(response.first_text(), None);

        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": {} })).unwrap();
        assert_eq!(response.first_text(), None);
    }

    #[test]
    fn test_from_text_shape() {
        let value = serde_json::to_value(GenerateContentResponse::from_text("hello")).unwrap();
        assert_eq!(
            value,
            json!({ "candidates": [{ "content": { "parts": [{ "text": "hello" }] } }] })
        );
    }

    #[test]
    fn test_request_omits_missing_generation_config() {
        let request = GenerateContentRequest {
            contents: vec![Content::text(None, "2+2=")],
            generation_config: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "contents": [{ "parts": [{ "text": "2+2=" }] }] })
        );
    }
}
