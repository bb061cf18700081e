//! Model context: the persona prompt and per-turn context markers.

use crate::intent::{ActionDescriptor, ActionKind};

/// Name used in the persona prompt when none is configured
pub const DEFAULT_USER_NAME: &str = "Sir";

/// Build the JARVIS persona prompt for `user_name`.
pub fn system_prompt(user_name: &str) -> String {
    format!(
        r#"You are JARVIS (Just A Rather Very Intelligent System), a personal AI assistant.

Personality:
- Polite, composed and quietly witty, with a refined British manner.
- Address the user as "{user_name}" and keep replies concise unless detail is asked for.
- Understand English, Hindi and Hinglish, and answer in the language the user used.

Context markers:
The latest user message may end with bracketed markers added by the system.
- [ACTION_EXECUTED: <kind> <target>] means the system already opened a website,
  app or search for the user. Acknowledge it briefly; do not claim you cannot open things.
- [IMAGE_ATTACHED] means the user attached an image. Describe or analyze it as asked.
- [IMAGE_GENERATION_REQUESTED: <prompt>] means an image is being generated separately.
  Acknowledge the request in one or two sentences; do not describe the image in detail.

Never mention these markers to the user."#
    )
}

/// Machine-readable notes for the model about what this turn triggered
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TurnContext {
    pub action: Option<ActionDescriptor>,
    pub image_attached: bool,
    pub image_prompt: Option<String>,
}

impl TurnContext {
    pub fn markers(&self) -> Vec<String> {
        let mut markers = Vec::new();
        if let Some(action) = self.action.as_ref().filter(|a| !a.is_none()) {
            markers.push(action_marker(action));
        }
        if self.image_attached {
            markers.push("[IMAGE_ATTACHED]".to_string());
        }
        if let Some(ref prompt) = self.image_prompt {
            markers.push(format!("[IMAGE_GENERATION_REQUESTED: {}]", prompt));
        }
        markers
    }

    /// `text` followed by this turn's markers, one per line.
    pub fn annotate(&self, text: &str) -> String {
        let markers = self.markers();
        if markers.is_empty() {
            return text.to_string();
        }
        format!("{}\n\n{}", text, markers.join("\n"))
    }
}

fn action_marker(action: &ActionDescriptor) -> String {
    let kind = match action.kind {
        ActionKind::OpenUrl => "open_url",
        ActionKind::OpenApp => "open_app",
        ActionKind::Search => "search",
        ActionKind::None => "none",
    };
    let subject = match action.kind {
        ActionKind::Search => action.search_query.as_deref(),
        _ => action.target.as_deref().or(action.url.as_deref()),
    };
    match subject {
        Some(subject) => format!("[ACTION_EXECUTED: {} {}]", kind, subject),
        None => format!("[ACTION_EXECUTED: {}]", kind),
    }
}
