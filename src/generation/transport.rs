use std::time::Duration;

use crate::{
    config::RetryConfig,
    error::{BannerError, Result},
    models::{ErrorEnvelope, FailureKind, GenerateContentRequest, GenerationOutcome, GenerationRequest},
};

use super::{
    endpoint::{GenerationEndpoint, RawReply},
    extractor::extract_body,
};

/// How one attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Image { image: Vec<u8>, mime_type: String },
    Retryable(String),
    Terminal(String),
}

/// States of a single `send` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    Attempting(u32),
    Succeeded { image: Vec<u8>, mime_type: String },
    FailedTerminal(String),
    FailedExhausted { attempts: u32, last_error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay,
            attempt_timeout: config.attempt_timeout,
        }
    }
}

impl RetryPolicy {
    /// Transition out of `Attempting(attempt)`.
    pub fn advance(&self, attempt: u32, verdict: Verdict) -> AttemptState {
        match verdict {
            Verdict::Image { image, mime_type } => AttemptState::Succeeded { image, mime_type },
            Verdict::Terminal(reason) => AttemptState::FailedTerminal(reason),
            Verdict::Retryable(last_error) if attempt >= self.max_attempts => {
                AttemptState::FailedExhausted {
                    attempts: attempt,
                    last_error,
                }
            }
            Verdict::Retryable(_) => AttemptState::Attempting(attempt + 1),
        }
    }

    /// Wait after failed attempt `attempt` (1-based): `base_delay * 2^(attempt-1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

/// Message for a non-2xx reply: the provider's `error.message`, else the bare status.
pub fn error_message(status: u16, body: &str) -> String {
    ErrorEnvelope::message_from(body).unwrap_or_else(|| format!("API error: {}", status))
}

pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

pub fn classify(reply: Result<RawReply>) -> Verdict {
    let RawReply { status, body } = match reply {
        Ok(reply) => reply,
        Err(e) => return Verdict::Retryable(e.to_string()),
    };

    if is_retryable_status(status) {
        return Verdict::Retryable(format!("Server error {}: {}", status, error_message(status, &body)));
    }
    if !(200..300).contains(&status) {
        return Verdict::Terminal(error_message(status, &body));
    }

    match extract_body(&body) {
        GenerationOutcome::Success { image, mime_type } => Verdict::Image { image, mime_type },
        GenerationOutcome::Failure { reason, .. } => Verdict::Terminal(reason),
    }
}

/// Sends a request with bounded exponential backoff. Holds no per-call state, so one
/// transport can serve any number of concurrent sessions.
#[derive(Debug, Clone, Default)]
pub struct RetryingTransport {
    policy: RetryPolicy,
}

impl RetryingTransport {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(RetryPolicy::from(config))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn send(
        &self,
        request: &GenerationRequest,
        endpoint: &dyn GenerationEndpoint,
    ) -> GenerationOutcome {
        let payload = request.to_wire();
        log::debug!("Generation payload: {}", request.summary());

        let mut attempt = 1;
        loop {
            log::info!(
                "🔄 Attempt {}/{} via {}",
                attempt,
                self.policy.max_attempts,
                endpoint.describe()
            );
            let verdict = classify(self.attempt(&payload, endpoint).await);

            match self.policy.advance(attempt, verdict) {
                AttemptState::Attempting(next) => {
                    let delay = self.policy.backoff(attempt);
                    log::warn!(
                        "⚠️  Attempt {} failed with a retryable error, retrying in {}ms",
                        attempt,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt = next;
                }
                AttemptState::Succeeded { image, mime_type } => {
                    log::info!("✅ Image received on attempt {} ({} bytes)", attempt, image.len());
                    return GenerationOutcome::success(image, mime_type);
                }
                AttemptState::FailedTerminal(reason) => {
                    log::error!("❌ Attempt {} failed terminally: {}", attempt, reason);
                    return GenerationOutcome::failure(FailureKind::TerminalApplication, reason);
                }
                AttemptState::FailedExhausted { attempts, last_error } => {
                    log::error!("❌ Giving up after {} attempts: {}", attempts, last_error);
                    return GenerationOutcome::failure(
                        FailureKind::Exhaustion,
                        format!("failed after {} attempts: {}", attempts, last_error),
                    );
                }
            }
        }
    }

    async fn attempt(
        &self,
        payload: &GenerateContentRequest,
        endpoint: &dyn GenerationEndpoint,
    ) -> Result<RawReply> {
        match self.policy.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, endpoint.post(payload))
                .await
                .map_err(|_| {
                    BannerError::RequestError(format!(
                        "attempt timed out after {}ms",
                        limit.as_millis()
                    ))
                })?,
            None => endpoint.post(payload).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::default()
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = policy();
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff(3), Duration::from_millis(4000));
        assert_eq!(policy.backoff(100), Duration::from_millis(1000).saturating_mul(1 << 31));
    }

    #[test]
    fn test_advance() {
        let policy = policy();
        assert_eq!(
            policy.advance(1, Verdict::Retryable("busy".into())),
            AttemptState::Attempting(2)
        );
        assert_eq!(
            policy.advance(3, Verdict::Retryable("busy".into())),
            AttemptState::FailedExhausted {
                attempts: 3,
                last_error: "busy".into()
            }
        );
        assert_eq!(
            policy.advance(1, Verdict::Terminal("bad key".into())),
            AttemptState::FailedTerminal("bad key".into())
        );
        assert_eq!(
            policy.advance(
                2,
                Verdict::Image {
                    image: vec![1],
                    mime_type: "image/png".into()
                }
            ),
            AttemptState::Succeeded {
                image: vec![1],
                mime_type: "image/png".into()
            }
        );
    }

    #[test]
    fn test_classify_statuses() {
        for status in [429, 500, 502, 503, 599] {
            assert!(matches!(
                classify(Ok(RawReply::new(status, ""))),
                Verdict::Retryable(_)
            ));
        }
        for status in [400, 401, 403, 404, 428, 430, 499] {
            assert!(matches!(
                classify(Ok(RawReply::new(status, ""))),
                Verdict::Terminal(_)
            ));
        }
        assert!(matches!(
            classify(Err(BannerError::RequestError("connection reset".into()))),
            Verdict::Retryable(msg) if msg.contains("connection reset")
        ));
    }

    #[test]
    fn test_classify_messages() {
        assert_eq!(
            classify(Ok(RawReply::new(400, r#"{"error":{"message":"API key not valid"}}"#))),
            Verdict::Terminal("API key not valid".into())
        );
        assert_eq!(
            classify(Ok(RawReply::new(404, "not found"))),
            Verdict::Terminal("API error: 404".into())
        );
        assert_eq!(
            classify(Ok(RawReply::new(503, ""))),
            Verdict::Retryable("Server error 503: API error: 503".into())
        );
    }

    #[test]
    fn test_classify_ok_without_image_is_terminal() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"blocked"}]}}]}"#;
        assert_eq!(
            classify(Ok(RawReply::new(200, body))),
            Verdict::Terminal("blocked".into())
        );
    }
}
