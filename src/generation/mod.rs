pub mod download;
pub mod endpoint;
pub mod extractor;
pub mod request_builder;
pub mod session;
pub mod transport;

use crate::{
    config::Config,
    error::Result,
    models::{FailureKind, GenerationOutcome, Layout, ReferenceImage},
};
use std::sync::Arc;
use std::time::Duration;

pub use download::FilenameStyle;
pub use endpoint::{DirectEndpoint, GatewayEndpoint, GenerationEndpoint, RawReply};
pub use session::{save_all, LayoutSession, SaveReport};
pub use transport::{AttemptState, RetryPolicy, RetryingTransport, Verdict};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build + send + extract over one endpoint. Cheap to clone; clones share the HTTP pool
/// but no per-call state.
#[derive(Clone)]
pub struct BannerClient {
    endpoint: Arc<dyn GenerationEndpoint>,
    transport: RetryingTransport,
}

impl BannerClient {
    /// Direct mode unless `gateway_url` is set.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        let endpoint: Arc<dyn GenerationEndpoint> = match &config.gateway_url {
            Some(url) => Arc::new(GatewayEndpoint::new(http, url.clone())),
            None => Arc::new(DirectEndpoint::new(http, &config.provider)?),
        };

        Ok(Self::with_endpoint(
            endpoint,
            RetryingTransport::from_config(&config.retry),
        ))
    }

    pub fn with_endpoint(endpoint: Arc<dyn GenerationEndpoint>, transport: RetryingTransport) -> Self {
        Self { endpoint, transport }
    }

    pub fn endpoint(&self) -> &dyn GenerationEndpoint {
        self.endpoint.as_ref()
    }

    pub fn transport(&self) -> &RetryingTransport {
        &self.transport
    }

    /// Never fails: every error ends up as a displayable `Failure`.
    pub async fn generate(
        &self,
        layout: &Layout,
        prompt: &str,
        reference: Option<&ReferenceImage>,
    ) -> GenerationOutcome {
        let request = match request_builder::build(layout, prompt, reference) {
            Ok(request) => request,
            Err(e) => {
                log::error!("❌ Could not build request for '{}': {}", layout.id, e);
                return GenerationOutcome::failure(FailureKind::MalformedInput, e.to_string());
            }
        };

        log::info!(
            "🎨 Generating '{}' ({}){}",
            layout.id,
            layout.dimensions(),
            if reference.is_some() { " from reference image" } else { "" }
        );
        let _timer = crate::logger::timer(&format!("generate {}", layout.id));
        self.transport.send(&request, self.endpoint.as_ref()).await
    }
}
