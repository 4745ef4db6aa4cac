#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bannergen::{
    models::GenerateContentRequest, BannerError, GenerationEndpoint, RawReply, Result,
    RetryPolicy, RetryingTransport,
};
use serde_json::json;
use tokio::time::Instant;

/// Replays a fixed list of replies and records when each call arrived.
pub struct ScriptedEndpoint {
    replies: Mutex<VecDeque<Result<RawReply>>>,
    calls: Mutex<Vec<Instant>>,
    payloads: Mutex<Vec<GenerateContentRequest>>,
}

impl ScriptedEndpoint {
    pub fn new(replies: Vec<RawReply>) -> Self {
        Self::with_results(replies.into_iter().map(Ok).collect())
    }

    pub fn with_results(replies: Vec<Result<RawReply>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Gaps between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    pub fn payloads(&self) -> Vec<GenerateContentRequest> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationEndpoint for ScriptedEndpoint {
    async fn post(&self, payload: &GenerateContentRequest) -> Result<RawReply> {
        self.calls.lock().unwrap().push(Instant::now());
        self.payloads.lock().unwrap().push(payload.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BannerError::RequestError("script exhausted".into())))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Never answers.
pub struct StalledEndpoint;

#[async_trait]
impl GenerationEndpoint for StalledEndpoint {
    async fn post(&self, _payload: &GenerateContentRequest) -> Result<RawReply> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(RawReply::new(200, "{}"))
    }

    fn describe(&self) -> String {
        "stalled".to_string()
    }
}

pub fn image_json(image: &[u8], mime_type: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"inlineData": {"mimeType": mime_type, "data": STANDARD.encode(image)}}]
            },
            "finishReason": "STOP"
        }]
    })
}

pub fn image_reply(image: &[u8]) -> RawReply {
    RawReply::new(200, image_json(image, "image/png").to_string())
}

pub fn text_reply(text: &str) -> RawReply {
    RawReply::new(
        200,
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string(),
    )
}

pub fn error_reply(status: u16, message: &str) -> RawReply {
    RawReply::new(
        status,
        json!({"error": {"code": status, "message": message}}).to_string(),
    )
}

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R'];

pub fn default_transport() -> RetryingTransport {
    RetryingTransport::new(RetryPolicy::default())
}
