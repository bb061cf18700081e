//! Conversation persistence seam.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::conversation::Message;
use crate::error::Result;

/// Stores conversations as ordered message lists.
///
/// Saving a message whose id is already stored replaces it, so a reply can
/// be saved again once its generated image arrives.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Start a new, empty conversation and return its id.
    async fn create_new(&self) -> Result<String>;

    /// The most recently created or updated conversation.
    async fn load_latest(&self) -> Result<Option<(String, Vec<Message>)>>;

    async fn save(&self, conversation_id: &str, message: &Message) -> Result<()>;

    /// Delete all messages of a conversation.
    async fn clear(&self, conversation_id: &str) -> Result<()>;
}

/// In-process store, lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    /// Conversations, least recently touched first
    conversations: Mutex<Vec<(String, Vec<Message>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(conversations: &mut Vec<(String, Vec<Message>)>, id: &str) -> usize {
        match conversations.iter().position(|(cid, _)| cid == id) {
            Some(pos) => {
                let entry = conversations.remove(pos);
                conversations.push(entry);
            }
            None => conversations.push((id.to_string(), Vec::new())),
        }
        conversations.len() - 1
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn create_new(&self) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.conversations.lock().push((id.clone(), Vec::new()));
        Ok(id)
    }

    async fn load_latest(&self) -> Result<Option<(String, Vec<Message>)>> {
        Ok(self.conversations.lock().last().cloned())
    }

    async fn save(&self, conversation_id: &str, message: &Message) -> Result<()> {
        let mut conversations = self.conversations.lock();
        let index = Self::touch(&mut conversations, conversation_id);
        let messages = &mut conversations[index].1;
        match messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => *existing = message.clone(),
            None => messages.push(message.clone()),
        }
        Ok(())
    }

    async fn clear(&self, conversation_id: &str) -> Result<()> {
        let mut conversations = self.conversations.lock();
        if let Some((_, messages)) = conversations
            .iter_mut()
            .find(|(cid, _)| cid == conversation_id)
        {
            messages.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_has_no_latest() {
        let store = MemoryStore::new();
        assert!(store.load_latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_latest() {
        let store = MemoryStore::new();
        let first = store.create_new().await.unwrap();
        let second = store.create_new().await.unwrap();

        store.save(&first, &Message::user("old", None)).await.unwrap();
        let (id, messages) = store.load_latest().await.unwrap().unwrap();
        assert_eq!(id, first);
        assert_eq!(messages.len(), 1);

        store.save(&second, &Message::user("new", None)).await.unwrap();
        let (id, _) = store.load_latest().await.unwrap().unwrap();
        assert_eq!(id, second);
    }

    #[tokio::test]
    async fn test_save_replaces_same_id() {
        let store = MemoryStore::new();
        let id = store.create_new().await.unwrap();
        let mut reply = Message::assistant("Here you go, Sir.");
        store.save(&id, &reply).await.unwrap();
        reply.generated_image = Some("data:image/png;base64,AA".into());
        store.save(&id, &reply).await.unwrap();

        let (_, messages) = store.load_latest().await.unwrap().unwrap();
        assert_eq!(messages, vec![reply]);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryStore::new();
        let id = store.create_new().await.unwrap();
        store.save(&id, &Message::user("hi", None)).await.unwrap();
        store.clear(&id).await.unwrap();
        let (latest, messages) = store.load_latest().await.unwrap().unwrap();
        assert_eq!(latest, id);
        assert!(messages.is_empty());
    }
}
