//! jarvis-ai: wire layer for the JARVIS chat gateway
//!
//! Request/response types for the streamed chat and image generation
//! endpoints, the incremental `data:` line decoder, and an HTTP client.

pub mod error;
pub mod providers;
pub mod sse;
pub mod stream;
pub mod types;

pub use error::{Error, Result};
pub use providers::{ChatProvider, ImageProvider, gateway::GatewayClient};
pub use sse::{Feed, SseDecoder};
pub use stream::{DeltaStream, decode_stream};
pub use types::*;
