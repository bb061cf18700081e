//! Request and response types for the chat and image gateways

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One prior turn as sent to the chat gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Body of a streaming chat request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Full history, oldest first, ending with the current user turn
    pub messages: Vec<ChatMessage>,
    pub system_prompt: String,
    /// Base64 data URL of an image attached to the current user turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

/// Art styles understood by the image gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageStyle {
    #[default]
    Photorealistic,
    Anime,
    OilPainting,
    Cyberpunk,
    Watercolor,
    #[serde(rename = "3d-render")]
    Render3d,
    Sketch,
    Fantasy,
    PopArt,
    Vintage,
}

impl ImageStyle {
    pub const ALL: [ImageStyle; 10] = [
        ImageStyle::Photorealistic,
        ImageStyle::Anime,
        ImageStyle::OilPainting,
        ImageStyle::Cyberpunk,
        ImageStyle::Watercolor,
        ImageStyle::Render3d,
        ImageStyle::Sketch,
        ImageStyle::Fantasy,
        ImageStyle::PopArt,
        ImageStyle::Vintage,
    ];

    /// Wire identifier
    pub fn id(&self) -> &'static str {
        match self {
            ImageStyle::Photorealistic => "photorealistic",
            ImageStyle::Anime => "anime",
            ImageStyle::OilPainting => "oil-painting",
            ImageStyle::Cyberpunk => "cyberpunk",
            ImageStyle::Watercolor => "watercolor",
            ImageStyle::Render3d => "3d-render",
            ImageStyle::Sketch => "sketch",
            ImageStyle::Fantasy => "fantasy",
            ImageStyle::PopArt => "pop-art",
            ImageStyle::Vintage => "vintage",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            ImageStyle::Photorealistic => "Photo Real",
            ImageStyle::Anime => "Anime",
            ImageStyle::OilPainting => "Oil Paint",
            ImageStyle::Cyberpunk => "Cyberpunk",
            ImageStyle::Watercolor => "Watercolor",
            ImageStyle::Render3d => "3D Render",
            ImageStyle::Sketch => "Sketch",
            ImageStyle::Fantasy => "Fantasy",
            ImageStyle::PopArt => "Pop Art",
            ImageStyle::Vintage => "Vintage",
        }
    }
}

impl fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ImageStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '_'], "-");
        ImageStyle::ALL
            .into_iter()
            .find(|style| style.id() == wanted)
            .ok_or_else(|| format!("unknown image style: {}", s))
    }
}

/// Body of an image generation request
#[derive(Debug, Clone, Serialize)]
pub struct ImageRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ImageStyle>,
}

/// Image gateway answer; `output` is either one reference or a list of them
#[derive(Debug, Clone, Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub output: Option<ImageOutput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageOutput {
    One(String),
    Many(Vec<String>),
}

impl ImageResponse {
    /// The image reference to attach (first element of a list).
    pub fn into_image(self) -> Option<String> {
        let image = match self.output? {
            ImageOutput::One(s) => Some(s),
            ImageOutput::Many(v) => v.into_iter().next(),
        };
        image.filter(|s| !s.is_empty())
    }
}

// Streaming response types

/// Content of the first choice's delta in one `data:` payload.
///
/// Any other shape (null or missing `choices`/`delta`, non-string content,
/// a scalar payload) carries no content.
pub fn delta_content(payload: &serde_json::Value) -> Option<&str> {
    payload
        .pointer("/choices/0/delta/content")
        .and_then(serde_json::Value::as_str)
}
