//! jarvis-agent: conversation runtime for the JARVIS assistant
//!
//! This crate turns user utterances into streamed assistant replies,
//! classifies them into browser actions, executes those actions, and
//! attaches generated images to replies.

pub mod action;
pub mod context;
pub mod conversation;
pub mod error;
pub mod events;
pub mod handle;
pub mod image_trigger;
pub mod intent;
pub mod orchestrator;
pub mod store;

pub use action::{ActionExecutor, UrlOpener};
pub use conversation::{Conversation, Message, MessageId};
pub use error::{Error, Result};
pub use events::JarvisEvent;
pub use handle::TurnHandle;
pub use intent::{ActionDescriptor, ActionKind, classify};
pub use orchestrator::{Orchestrator, OrchestratorConfig, TurnOutcome, TurnStatus};
pub use store::{ConversationStore, MemoryStore};
