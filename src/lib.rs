//! Layout-aware banner generation against Gemini image models.
//!
//! [`generation::request_builder::build`] turns a layout, prompt and optional reference
//! image into a request, [`RetryingTransport`] sends it with bounded exponential backoff,
//! and [`generation::extractor::extract`] pulls the image (or the refusal text) out of the
//! reply. With the `server` feature, [`gateway`] provides a relay that keeps the API key
//! on the server.

pub mod config;
pub mod error;
pub mod generation;
pub mod logger;
pub mod models;

#[cfg(feature = "server")]
pub mod gateway;

pub use config::{Config, GatewayConfig, ProviderConfig, RetryConfig};
pub use error::{BannerError, Result};
pub use generation::{
    save_all, BannerClient, DirectEndpoint, FilenameStyle, GatewayEndpoint, GenerationEndpoint,
    LayoutSession, RawReply, RetryPolicy, RetryingTransport, SaveReport,
};
pub use models::{
    find_layout, FailureKind, GenerationOutcome, GenerationRequest, Layout, LayoutFormat, Part,
    ReferenceImage,
};
