use super::{UpstreamResult, UpstreamService};
use crate::models::Credential;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned reply for [`MockUpstreamClient`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Success(serde_json::Value),
    Failure(u16, serde_json::Value),
    NetworkError(String),
}

pub struct MockUpstreamClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    payloads: Arc<Mutex<Vec<serde_json::Value>>>,
    call_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl MockUpstreamClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            payloads: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            delay: None,
        }
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Payloads received so far, in call order.
    pub fn payloads(&self) -> Vec<serde_json::Value> {
        self.payloads.lock().unwrap().clone()
    }

    /// A second handle observing the same call log.
    pub fn handle(&self) -> Self {
        Self {
            replies: Arc::clone(&self.replies),
            payloads: Arc::clone(&self.payloads),
            call_count: Arc::clone(&self.call_count),
            delay: self.delay,
        }
    }
}

impl Default for MockUpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamService for MockUpstreamClient {
    async fn generate_content(
        &self,
        _credential: &Credential,
        payload: &serde_json::Value,
    ) -> Result<UpstreamResult> {
        let reply = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            self.payloads.lock().unwrap().push(payload.clone());

            let replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                None
            } else {
                Some(replies[(*count - 1) % replies.len()].clone())
            }
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            // Default mock response
            None => Ok(UpstreamResult::Success {
                body: serde_json::json!({
                    "candidates": [{ "content": { "role": "model", "parts": [{ "text": "mock response" }] } }]
                })
                .to_string(),
            }),
            Some(MockReply::Success(body)) => Ok(UpstreamResult::Success {
                body: body.to_string(),
            }),
            Some(MockReply::Failure(status, body)) => Ok(UpstreamResult::Failure {
                status,
                body: body.to_string(),
            }),
            Some(MockReply::NetworkError(message)) => Err(Error::Network(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> Credential {
        Credential::new("k").unwrap()
    }

    #[tokio::test]
    async fn test_mock_default_reply() {
        let client = MockUpstreamClient::new();
        let result = client.generate_content(&key(), &json!({})).await.unwrap();
        match result {
            UpstreamResult::Success { body } => assert!(body.contains("mock response")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mock_cycles_replies_and_records_payloads() {
        let client = MockUpstreamClient::new()
            .with_reply(MockReply::Failure(500, json!({ "error": {} })))
            .with_reply(MockReply::NetworkError("reset".to_string()));
        let observer = client.handle();

        assert!(matches!(
            client.generate_content(&key(), &json!({ "n": 1 })).await,
            Ok(UpstreamResult::Failure { status: 500, .. })
        ));
        assert!(matches!(
            client.generate_content(&key(), &json!({ "n": 2 })).await,
            Err(Error::Network(_))
        ));
        assert!(matches!(
            client.generate_content(&key(), &json!({ "n": 3 })).await,
            Ok(UpstreamResult::Failure { .. })
        ));

        assert_eq!(observer.get_call_count(), 3);
        assert_eq!(observer.payloads()[1], json!({ "n": 2 }));
    }
}
