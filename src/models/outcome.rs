use serde::{Deserialize, Serialize};

use super::image::to_data_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 429, 5xx, network error or attempt timeout.
    RetryableTransport,
    /// Non-429 4xx, or a 200 without an image.
    TerminalApplication,
    /// The reference image could not be decoded. No request was sent.
    MalformedInput,
    /// Every attempt failed with a retryable error.
    Exhaustion,
}

impl FailureKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::RetryableTransport | FailureKind::Exhaustion)
    }
}

/// Terminal value of one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Success {
        image: Vec<u8>,
        mime_type: String,
    },
    Failure {
        reason: String,
        retryable: bool,
        kind: FailureKind,
    },
}

impl GenerationOutcome {
    pub fn success(image: Vec<u8>, mime_type: impl Into<String>) -> Self {
        GenerationOutcome::Success {
            image,
            mime_type: mime_type.into(),
        }
    }

    pub fn failure(kind: FailureKind, reason: impl Into<String>) -> Self {
        GenerationOutcome::Failure {
            reason: reason.into(),
            retryable: kind.is_retryable(),
            kind,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success { .. })
    }

    pub fn image(&self) -> Option<&[u8]> {
        match self {
            GenerationOutcome::Success { image, .. } => Some(image),
            GenerationOutcome::Failure { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Failure { reason, .. } => Some(reason),
            GenerationOutcome::Success { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            GenerationOutcome::Failure { kind, .. } => Some(*kind),
            GenerationOutcome::Success { .. } => None,
        }
    }

    pub fn to_data_url(&self) -> Option<String> {
        match self {
            GenerationOutcome::Success { image, mime_type } => Some(to_data_url(image, mime_type)),
            GenerationOutcome::Failure { .. } => None,
        }
    }

    /// What a session shows: nothing on success, otherwise the prefixed reason.
    pub fn display_error(&self) -> Option<String> {
        self.reason()
            .map(|reason| format!("Generation failed: {}", reason))
    }
}
