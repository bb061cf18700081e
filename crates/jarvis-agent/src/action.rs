//! Action execution: hand URLs to the platform and phrase the confirmation.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::intent::{ActionDescriptor, ActionKind};

/// Spoken when neither opener succeeds
pub const OPEN_FAILED_MESSAGE: &str =
    "I apologize, Sir. I encountered an issue trying to open that. Please try again.";

/// Something that can open a URL outside the assistant
#[async_trait]
pub trait UrlOpener: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &str;

    async fn open(&self, url: &str) -> Result<()>;
}

/// Executes classified actions with a primary opener and a fallback.
pub struct ActionExecutor {
    primary: Arc<dyn UrlOpener>,
    fallback: Arc<dyn UrlOpener>,
}

impl ActionExecutor {
    pub fn new(primary: Arc<dyn UrlOpener>, fallback: Arc<dyn UrlOpener>) -> Self {
        Self { primary, fallback }
    }

    /// Execute `action` and return the confirmation text.
    ///
    /// Returns an empty string for [`ActionKind::None`]. Never fails: opener
    /// errors are logged and turned into an apology.
    pub async fn execute(&self, action: &ActionDescriptor) -> String {
        match action.kind {
            ActionKind::None => String::new(),
            ActionKind::OpenApp => {
                let target = action.target.as_deref().unwrap_or("that app");
                format!(
                    "Sir, I'd love to open {target} for you, but that requires the native app. \
                     From here I can only open websites. Would you like me to open {target}'s website instead?"
                )
            }
            ActionKind::OpenUrl | ActionKind::Search => {
                let Some(url) = action.url.as_deref() else {
                    tracing::warn!("Action {:?} carries no URL", action.kind);
                    return OPEN_FAILED_MESSAGE.to_string();
                };
                if !self.open_with_fallback(url).await {
                    return OPEN_FAILED_MESSAGE.to_string();
                }
                confirmation(action, url)
            }
        }
    }

    async fn open_with_fallback(&self, url: &str) -> bool {
        match self.primary.open(url).await {
            Ok(()) => {
                tracing::debug!("Opened {} via {}", url, self.primary.name());
                return true;
            }
            Err(e) => tracing::warn!("{} failed to open {}: {}", self.primary.name(), url, e),
        }

        match self.fallback.open(url).await {
            Ok(()) => {
                tracing::debug!("Opened {} via {}", url, self.fallback.name());
                true
            }
            Err(e) => {
                tracing::warn!("{} failed to open {}: {}", self.fallback.name(), url, e);
                false
            }
        }
    }
}

fn confirmation(action: &ActionDescriptor, url: &str) -> String {
    match (action.kind, action.search_query.as_deref()) {
        (ActionKind::Search, Some(query)) => {
            format!("Sir, I've opened a Google search for \"{}\".", query)
        }
        _ => format!(
            "Sir, I've opened {} for you.",
            action.target.as_deref().unwrap_or(url)
        ),
    }
}
