use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::{generate_content_url, ProviderConfig},
    error::{BannerError, Result},
    models::GenerateContentRequest,
};

/// Status and body of one HTTP round trip, before any classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

impl RawReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Where a generation payload is posted. `Err` means the round trip itself failed
/// (connection refused, reset, unreadable body); any HTTP status is an `Ok` reply.
#[async_trait]
pub trait GenerationEndpoint: Send + Sync {
    async fn post(&self, payload: &GenerateContentRequest) -> Result<RawReply>;

    fn describe(&self) -> String;
}

/// Calls the provider directly with the API key attached.
#[derive(Clone)]
pub struct DirectEndpoint {
    client: Client,
    url: String,
    api_key: String,
}

impl DirectEndpoint {
    pub fn new(client: Client, config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| BannerError::ConfigError("GEMINI_API_KEY is required".into()))?;

        Ok(Self {
            client,
            url: generate_content_url(&config.base_url, &config.model),
            api_key,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GenerationEndpoint for DirectEndpoint {
    async fn post(&self, payload: &GenerateContentRequest) -> Result<RawReply> {
        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| BannerError::RequestError(format!("Provider request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawReply { status, body })
    }

    fn describe(&self) -> String {
        format!("direct {}", self.url)
    }
}

/// Posts to a key-holding gateway; the browser-side of the deployment never sees the key.
#[derive(Clone)]
pub struct GatewayEndpoint {
    client: Client,
    url: String,
}

impl GatewayEndpoint {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl GenerationEndpoint for GatewayEndpoint {
    async fn post(&self, payload: &GenerateContentRequest) -> Result<RawReply> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| BannerError::RequestError(format!("Gateway request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawReply { status, body })
    }

    fn describe(&self) -> String {
        format!("gateway {}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_requires_key() {
        let result = DirectEndpoint::new(Client::new(), &ProviderConfig::new());
        assert!(matches!(result, Err(BannerError::ConfigError(_))));

        let endpoint = DirectEndpoint::new(
            Client::new(),
            &ProviderConfig::new()
                .with_api_key("k")
                .with_base_url("http://127.0.0.1:9/v1beta")
                .with_model("img"),
        )
        .unwrap();
        assert_eq!(endpoint.url(), "http://127.0.0.1:9/v1beta/models/img:generateContent");
        assert_eq!(endpoint.describe(), "direct http://127.0.0.1:9/v1beta/models/img:generateContent");
    }
}
