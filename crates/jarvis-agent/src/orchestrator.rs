//! Conversation orchestration
//!
//! One call to [`Orchestrator::send`] runs a whole turn:
//!
//! ```text
//! Idle -> UserAppended -> Streaming -> StreamClosed -> [ImagePending -> ImageResolved] -> Idle
//! ```
//!
//! The classified action runs on its own task and reports through a
//! [`JarvisEvent::Notification`]; it never holds up the reply. Aborting
//! the turn stops the text stream only.

use futures::StreamExt;
use jarvis_ai::{ChatMessage, ChatProvider, ChatRequest, ImageProvider, ImageRequest, ImageStyle, Role};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    action::ActionExecutor,
    context::{DEFAULT_USER_NAME, TurnContext, system_prompt},
    conversation::{Conversation, Message, MessageId},
    error::{Error, Result},
    events::JarvisEvent,
    handle::TurnHandle,
    image_trigger,
    intent::{self, ActionDescriptor},
    store::ConversationStore,
};

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// System prompt sent with every request
    pub system_prompt: String,
    /// Style requested for generated images
    pub image_style: ImageStyle,
    /// Classify and execute actions
    pub execute_actions: bool,
    /// Detect image requests and generate images
    pub generate_images: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            system_prompt: system_prompt(DEFAULT_USER_NAME),
            image_style: ImageStyle::default(),
            execute_actions: true,
            generate_images: true,
        }
    }
}

/// How the reply stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnStatus {
    Completed,
    /// The gateway failed; `message` is the apology shown as the reply
    Failed { message: String },
    Aborted,
}

/// Result of one turn
#[derive(Debug)]
pub struct TurnOutcome {
    pub user_message_id: MessageId,
    pub reply_id: MessageId,
    pub action: ActionDescriptor,
    pub image_prompt: Option<String>,
    pub image_attached: bool,
    pub status: TurnStatus,
    /// Resolves to the action's confirmation text
    pub action_task: Option<JoinHandle<String>>,
}

/// Marks the handle idle when the turn future completes or is dropped.
struct RunningGuard<'a>(&'a TurnHandle);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Drives conversation turns against the chat and image gateways
pub struct Orchestrator {
    config: OrchestratorConfig,
    conversation: Mutex<Conversation>,
    conversation_id: Mutex<Option<String>>,
    chat: Arc<dyn ChatProvider>,
    images: Arc<dyn ImageProvider>,
    executor: Arc<ActionExecutor>,
    store: Option<Arc<dyn ConversationStore>>,
    event_tx: broadcast::Sender<JarvisEvent>,
    handle: TurnHandle,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        chat: Arc<dyn ChatProvider>,
        images: Arc<dyn ImageProvider>,
        executor: Arc<ActionExecutor>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            config,
            conversation: Mutex::new(Conversation::new()),
            conversation_id: Mutex::new(None),
            chat,
            images,
            executor,
            store: None,
            event_tx,
            handle: TurnHandle::new(),
        }
    }

    /// Persist messages to `store`
    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Subscribe to conversation events
    pub fn subscribe(&self) -> broadcast::Receiver<JarvisEvent> {
        self.event_tx.subscribe()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.config.system_prompt = prompt.into();
    }

    pub fn set_image_style(&mut self, style: ImageStyle) {
        self.config.image_style = style;
    }

    /// Snapshot of the transcript
    pub fn messages(&self) -> Vec<Message> {
        self.conversation.lock().messages().to_vec()
    }

    /// Id of the stored conversation, once one exists
    pub fn conversation_id(&self) -> Option<String> {
        self.conversation_id.lock().clone()
    }

    /// Get a cloneable handle for aborting from another task
    pub fn handle(&self) -> TurnHandle {
        self.handle.clone()
    }

    /// Abort the current turn's text stream
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Load the latest stored conversation, or start a new one.
    ///
    /// Returns the number of restored messages.
    pub async fn restore(&self) -> Result<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };

        match store.load_latest().await? {
            Some((id, messages)) => {
                let count = messages.len();
                tracing::info!("Restored conversation {} ({} messages)", id, count);
                *self.conversation.lock() = Conversation::from_messages(messages);
                *self.conversation_id.lock() = Some(id);
                Ok(count)
            }
            None => {
                let id = store.create_new().await?;
                *self.conversation_id.lock() = Some(id);
                Ok(0)
            }
        }
    }

    /// Empty the transcript and the stored conversation.
    pub async fn clear(&self) {
        self.conversation.lock().clear();
        self.emit(JarvisEvent::Cleared);

        let id = self.conversation_id();
        if let (Some(store), Some(id)) = (&self.store, id) {
            if let Err(e) = store.clear(&id).await {
                tracing::warn!("Failed to clear stored conversation {}: {}", id, e);
            }
        }
    }

    /// Empty the transcript and continue in a fresh stored conversation.
    pub async fn new_conversation(&self) {
        self.conversation.lock().clear();
        *self.conversation_id.lock() = None;
        self.emit(JarvisEvent::Cleared);

        if let Some(store) = &self.store {
            match store.create_new().await {
                Ok(id) => *self.conversation_id.lock() = Some(id),
                Err(e) => tracing::warn!("Failed to create conversation: {}", e),
            }
        }
    }

    /// Run one turn for `text` and an optional attached image (data URL).
    ///
    /// Gateway failures do not surface here: they become the reply's
    /// content. Errors are returned only when the turn cannot start.
    pub async fn send(&self, text: &str, input_image: Option<String>) -> Result<TurnOutcome> {
        let text = text.trim();
        if text.is_empty() && input_image.is_none() {
            return Err(Error::EmptyInput);
        }

        let Some(cancel) = self.handle.begin() else {
            return Err(Error::Busy);
        };
        let _running = RunningGuard(&self.handle);

        Ok(self.run_turn(text, input_image, cancel).await)
    }

    async fn run_turn(
        &self,
        text: &str,
        input_image: Option<String>,
        cancel: CancellationToken,
    ) -> TurnOutcome {
        self.emit(JarvisEvent::TurnStart);

        let user = Message::user(text, input_image);
        self.conversation.lock().push(user.clone());
        self.emit(JarvisEvent::UserMessage {
            message: user.clone(),
        });
        self.persist(&user).await;

        let action = if self.config.execute_actions {
            intent::classify(text)
        } else {
            ActionDescriptor::none()
        };
        let action_task = if action.is_none() {
            None
        } else {
            tracing::info!("Executing action {:?}", action);
            Some(self.spawn_action(action.clone()))
        };

        let image_prompt = if self.config.generate_images {
            image_trigger::detect_prompt(text)
        } else {
            None
        };

        let context = TurnContext {
            action: Some(action.clone()),
            image_attached: user.input_image.is_some(),
            image_prompt: image_prompt.clone(),
        };
        let request = self.build_request(&user, &context);

        let reply_id = self.conversation.lock().begin_reply();
        self.emit(JarvisEvent::AssistantStart {
            message_id: reply_id.clone(),
        });

        let status = self.stream_reply(&reply_id, &request, cancel).await;

        let content = {
            let mut conversation = self.conversation.lock();
            conversation.end_reply(&reply_id);
            conversation.get(&reply_id).map(|m| m.content.clone())
        };
        self.emit(JarvisEvent::AssistantEnd {
            message_id: reply_id.clone(),
            content: content.unwrap_or_default(),
        });

        let image_attached = match image_prompt {
            Some(ref prompt) => self.generate_image(&reply_id, prompt).await,
            None => false,
        };

        self.persist_reply(&reply_id).await;
        self.emit(JarvisEvent::TurnEnd);

        TurnOutcome {
            user_message_id: user.id,
            reply_id,
            action,
            image_prompt,
            image_attached,
            status,
            action_task,
        }
    }

    /// History plus the annotated current user message. The transcript
    /// keeps the plain text.
    fn build_request(&self, user: &Message, context: &TurnContext) -> ChatRequest {
        let mut messages: Vec<ChatMessage> = self
            .conversation
            .lock()
            .messages()
            .iter()
            .filter(|m| m.id != user.id && !m.content.is_empty())
            .map(|m| ChatMessage::new(m.role, m.content.clone()))
            .collect();
        messages.push(ChatMessage::new(Role::User, context.annotate(&user.content)));

        ChatRequest {
            messages,
            system_prompt: self.config.system_prompt.clone(),
            image_data: user.input_image.clone(),
        }
    }

    fn spawn_action(&self, action: ActionDescriptor) -> JoinHandle<String> {
        let executor = Arc::clone(&self.executor);
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let text = executor.execute(&action).await;
            if !text.is_empty() {
                let _ = event_tx.send(JarvisEvent::Notification { text: text.clone() });
            }
            text
        })
    }

    async fn stream_reply(
        &self,
        reply_id: &str,
        request: &ChatRequest,
        cancel: CancellationToken,
    ) -> TurnStatus {
        let mut deltas = match self.chat.stream_chat(request, cancel).await {
            Ok(deltas) => deltas,
            Err(e) => return self.settle_error(reply_id, e),
        };

        while let Some(item) = deltas.next().await {
            match item {
                Ok(delta) => {
                    let applied = self.conversation.lock().append_content(reply_id, &delta);
                    if applied {
                        self.emit(JarvisEvent::Delta {
                            message_id: reply_id.to_string(),
                            delta,
                        });
                    }
                }
                Err(e) => return self.settle_error(reply_id, e),
            }
        }

        tracing::debug!("Reply {} complete", reply_id);
        TurnStatus::Completed
    }

    /// Aborts end quietly; anything else becomes an apology in the reply,
    /// after whatever content already arrived.
    fn settle_error(&self, reply_id: &str, error: jarvis_ai::Error) -> TurnStatus {
        if error.is_abort() {
            tracing::info!("Reply {} aborted", reply_id);
            self.emit(JarvisEvent::Aborted {
                message_id: reply_id.to_string(),
            });
            return TurnStatus::Aborted;
        }

        tracing::warn!("Chat stream failed: {}", error);
        let message = error.user_message();
        {
            let mut conversation = self.conversation.lock();
            let partial = conversation
                .get(reply_id)
                .is_some_and(|m| !m.content.is_empty());
            if partial {
                conversation.append_content(reply_id, &format!("\n\n{}", message));
            } else {
                conversation.set_content(reply_id, message.clone());
            }
        }
        self.emit(JarvisEvent::Error {
            message: message.clone(),
        });
        TurnStatus::Failed { message }
    }

    /// Request an image and attach it to the reply if the reply still
    /// exists. Failures are logged and otherwise silent.
    async fn generate_image(&self, reply_id: &str, prompt: &str) -> bool {
        self.emit(JarvisEvent::ImageRequested {
            message_id: reply_id.to_string(),
            prompt: prompt.to_string(),
        });

        let request = ImageRequest {
            prompt: prompt.to_string(),
            style: Some(self.config.image_style),
        };
        let image = match self.images.generate_image(&request).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Image generation failed: {}", e);
                return false;
            }
        };

        let attached = self.conversation.lock().attach_image(reply_id, image.clone());
        if attached {
            self.emit(JarvisEvent::ImageAttached {
                message_id: reply_id.to_string(),
                image,
            });
        } else {
            tracing::debug!("Reply {} is gone, dropping generated image", reply_id);
        }
        attached
    }

    async fn persist_reply(&self, reply_id: &str) {
        let reply = self.conversation.lock().get(reply_id).cloned();
        match reply {
            Some(reply) if !reply.content.is_empty() || reply.generated_image.is_some() => {
                self.persist(&reply).await
            }
            _ => {}
        }
    }

    /// Save a message, creating the stored conversation on first use.
    /// Store failures never fail the turn.
    async fn persist(&self, message: &Message) {
        let Some(store) = &self.store else {
            return;
        };

        let existing = self.conversation_id();
        let id = match existing {
            Some(id) => id,
            None => match store.create_new().await {
                Ok(id) => {
                    *self.conversation_id.lock() = Some(id.clone());
                    id
                }
                Err(e) => {
                    tracing::warn!("Failed to create conversation: {}", e);
                    return;
                }
            },
        };

        if let Err(e) = store.save(&id, message).await {
            tracing::warn!("Failed to save message {}: {}", message.id, e);
        }
    }

    fn emit(&self, event: JarvisEvent) {
        let _ = self.event_tx.send(event);
    }
}
