//! Configuration file support

use jarvis_agent::context::{DEFAULT_USER_NAME, system_prompt};
use jarvis_ai::ImageStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for jarvis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Streaming chat endpoint
    pub chat_endpoint: Option<String>,
    /// Image generation endpoint
    pub image_endpoint: Option<String>,
    /// Gateway key (alternative to JARVIS_API_KEY)
    pub api_key: Option<String>,
    /// Default image style id
    pub image_style: Option<String>,
    /// Custom system prompt file path
    pub system_prompt_file: Option<String>,
    /// How JARVIS addresses you
    pub user_name: Option<String>,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Spoken reply configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub enabled: Option<bool>,
    /// Speech rate multiplier (0.5 - 2.0)
    pub rate: Option<f32>,
    /// Pitch multiplier (0.5 - 2.0)
    pub pitch: Option<f32>,
    /// Text-to-speech program
    pub command: Option<String>,
}

/// Conversation storage configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub enabled: Option<bool>,
    pub dir: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jarvis")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("JARVIS_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Write the commented example config to the default location if no
    /// file exists yet
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, example_config())?;
        Ok(path)
    }

    /// Gateway key, checking config then env
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(jarvis_ai::providers::gateway::API_KEY_ENV).ok())
    }

    pub fn chat_endpoint(&self) -> Option<String> {
        self.chat_endpoint
            .clone()
            .or_else(|| std::env::var(jarvis_ai::providers::gateway::CHAT_URL_ENV).ok())
    }

    pub fn image_endpoint(&self) -> Option<String> {
        self.image_endpoint
            .clone()
            .or_else(|| std::env::var(jarvis_ai::providers::gateway::IMAGE_URL_ENV).ok())
    }

    /// Configured image style, or the default when unset or unknown
    pub fn image_style(&self) -> ImageStyle {
        match self.image_style.as_deref().map(str::parse::<ImageStyle>) {
            Some(Ok(style)) => style,
            Some(Err(e)) => {
                tracing::warn!("Ignoring configured image style: {}", e);
                ImageStyle::default()
            }
            None => ImageStyle::default(),
        }
    }

    pub fn user_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or(DEFAULT_USER_NAME)
    }

    /// System prompt from the configured file, or the persona prompt
    pub fn system_prompt(&self) -> String {
        if let Some(ref file) = self.system_prompt_file {
            let path = expand_home(file);
            match fs::read_to_string(&path) {
                Ok(prompt) => return prompt,
                Err(e) => tracing::warn!(
                    "Failed to read system prompt file {}: {}",
                    path.display(),
                    e
                ),
            }
        }
        system_prompt(self.user_name())
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice.enabled.unwrap_or(false)
    }

    pub fn store_enabled(&self) -> bool {
        self.store.enabled.unwrap_or(true)
    }

    /// Directory for stored conversations
    pub fn store_dir(&self) -> PathBuf {
        match self.store.dir {
            Some(ref dir) => expand_home(dir),
            None => crate::session::JsonlStore::default_dir(),
        }
    }
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# jarvis configuration file
# Place at ~/.config/jarvis/config.toml (Linux), ~/Library/Application Support/jarvis/config.toml (macOS)
# or %APPDATA%\jarvis\config.toml (Windows). JARVIS_CONFIG_PATH overrides the location.

# Gateway endpoints (or set JARVIS_CHAT_URL / JARVIS_IMAGE_URL)
# chat_endpoint = "https://example.supabase.co/functions/v1/jarvis-chat"
# image_endpoint = "https://example.supabase.co/functions/v1/generate-image"

# Gateway key (optional - JARVIS_API_KEY is preferred)
# api_key = "..."

# Image style: photorealistic, anime, oil-painting, cyberpunk, watercolor,
# 3d-render, sketch, fantasy, pop-art, vintage
image_style = "photorealistic"

# How JARVIS addresses you
user_name = "Sir"

# Custom system prompt file (optional, replaces the persona prompt)
# system_prompt_file = "~/.config/jarvis/system_prompt.txt"

[voice]
enabled = false
rate = 1.0
pitch = 1.0
command = "espeak"

[store]
enabled = true
# dir = "~/.local/share/jarvis/conversations"
"#
}
