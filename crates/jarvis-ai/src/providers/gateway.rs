//! HTTP client for the JARVIS chat and image gateway functions

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{ChatProvider, ImageProvider};
use crate::{
    error::{Error, Result},
    stream::{DeltaStream, decode_stream},
    types::{ChatRequest, ImageRequest, ImageResponse},
};

/// Environment variable holding the chat endpoint URL
pub const CHAT_URL_ENV: &str = "JARVIS_CHAT_URL";
/// Environment variable holding the image endpoint URL
pub const IMAGE_URL_ENV: &str = "JARVIS_IMAGE_URL";
/// Environment variable holding the gateway key
pub const API_KEY_ENV: &str = "JARVIS_API_KEY";

/// Gateway client
#[derive(Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    chat_url: String,
    image_url: String,
    api_key: Option<String>,
}

impl GatewayClient {
    /// Create a client for the given endpoints
    pub fn new(chat_url: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            chat_url: chat_url.into(),
            image_url: image_url.into(),
            api_key: None,
        }
    }

    /// Send `Authorization: Bearer <key>` with every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let env = |name: &str| {
            std::env::var(name).map_err(|_| Error::InvalidConfig(format!("{} is not set", name)))
        };
        let client = Self::new(env(CHAT_URL_ENV)?, env(IMAGE_URL_ENV)?);
        Ok(match super::get_api_key(None, API_KEY_ENV) {
            Ok(key) => client.with_api_key(key),
            Err(_) => client,
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .post(url)
            .header("content-type", "application/json");
        match self.api_key {
            Some(ref key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[async_trait]
impl ChatProvider for GatewayClient {
    async fn stream_chat(
        &self,
        request: &ChatRequest,
        cancel: CancellationToken,
    ) -> Result<DeltaStream> {
        tracing::debug!(
            "Opening chat stream with {} messages (image: {})",
            request.messages.len(),
            request.image_data.is_some()
        );

        let send = self.post(&self.chat_url).json(request).send();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Aborted),
            response = send => response?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Chat gateway error {}: {}", status, body);
            return Err(Error::from_status(status.as_u16(), body));
        }

        Ok(decode_stream(response.bytes_stream(), cancel))
    }
}

#[async_trait]
impl ImageProvider for GatewayClient {
    async fn generate_image(&self, request: &ImageRequest) -> Result<String> {
        tracing::debug!(
            "Requesting image (style: {:?}): {}",
            request.style,
            request.prompt
        );

        let response = self.post(&self.image_url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Image gateway error {}: {}", status, body);
            return Err(Error::ImageGenerationFailed(format!("status {}", status)));
        }

        let body: ImageResponse = response.json().await?;
        body.into_image()
            .ok_or_else(|| Error::ImageGenerationFailed("response carried no image".into()))
    }
}
