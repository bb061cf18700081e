//! Gateway abstractions: streamed chat and image generation

pub mod gateway;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{ChatRequest, DeltaStream, Error, ImageRequest, Result};

/// Something that can stream a chat reply
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Open the reply stream. Non-success statuses are classified with
    /// [`Error::from_status`] before any delta is produced.
    async fn stream_chat(
        &self,
        request: &ChatRequest,
        cancel: CancellationToken,
    ) -> Result<DeltaStream>;
}

/// Something that can turn a prompt into an image reference
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate_image(&self, request: &ImageRequest) -> Result<String>;
}

/// Get an API key from a provided value or the environment
pub fn get_api_key(provided: Option<&str>, env_var: &str) -> Result<String> {
    if let Some(key) = provided {
        return Ok(key.to_string());
    }

    std::env::var(env_var)
        .map_err(|_| Error::InvalidConfig(format!("{} is not set", env_var)))
}
