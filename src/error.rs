use thiserror::Error;

#[derive(Debug, Error)]
pub enum BannerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Malformed reference image: {0}")]
    MalformedReferenceImage(String),
    #[error("Prompt must not be empty")]
    EmptyPrompt,
    #[error("Unknown layout: {0}")]
    UnknownLayout(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for BannerError {
    fn from(e: serde_json::Error) -> Self {
        BannerError::SerializationError(e.to_string())
    }
}

impl From<reqwest::Error> for BannerError {
    fn from(e: reqwest::Error) -> Self {
        BannerError::RequestError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BannerError>;
