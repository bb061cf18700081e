//! JSONL conversation storage
//!
//! One file per conversation. The first line is a metadata entry; every
//! save appends a message entry and a clear appends a marker, so a file is
//! replayed rather than rewritten. A `latest` file in the same directory
//! names the conversation touched last.

use async_trait::async_trait;
use jarvis_agent::{ConversationStore, Message};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

const LATEST_FILE: &str = "latest";

/// Conversation entry types for JSONL format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEntry {
    /// Conversation metadata
    Metadata { id: String, created_at: i64 },
    /// A message, or a newer version of one saved earlier
    Message { message: Message, timestamp: i64 },
    /// Everything before this line was cleared
    Cleared { timestamp: i64 },
}

/// File-backed conversation store
pub struct JsonlStore {
    dir: PathBuf,
}

impl JsonlStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default conversations directory
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jarvis")
            .join("conversations")
    }

    fn path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", id))
    }

    fn append(&self, id: &str, entry: &ConversationEntry) -> std::io::Result<()> {
        let mut file = File::options()
            .create(true)
            .append(true)
            .open(self.path(id))?;
        writeln!(file, "{}", serde_json::to_string(entry)?)?;
        self.mark_latest(id)
    }

    fn mark_latest(&self, id: &str) -> std::io::Result<()> {
        fs::write(self.dir.join(LATEST_FILE), id)
    }

    /// The conversation named by the `latest` file, else the most recently
    /// modified one.
    fn latest_id(&self) -> std::io::Result<Option<String>> {
        if let Ok(id) = fs::read_to_string(self.dir.join(LATEST_FILE)) {
            let id = id.trim();
            if !id.is_empty() && self.path(id).exists() {
                return Ok(Some(id.to_string()));
            }
        }

        Ok(self
            .list()?
            .into_iter()
            .max_by_key(|info| info.modified)
            .map(|info| info.id))
    }

    /// Replay a conversation file into its current message list
    fn replay(path: &Path) -> std::io::Result<Vec<Message>> {
        let reader = BufReader::new(File::open(path)?);
        let mut messages: Vec<Message> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<ConversationEntry>(&line) {
                Ok(ConversationEntry::Message { message, .. }) => {
                    match messages.iter_mut().find(|m| m.id == message.id) {
                        Some(existing) => *existing = message,
                        None => messages.push(message),
                    }
                }
                Ok(ConversationEntry::Cleared { .. }) => messages.clear(),
                Ok(ConversationEntry::Metadata { .. }) => {}
                Err(e) => tracing::warn!("Skipping bad line in {}: {}", path.display(), e),
            }
        }

        Ok(messages)
    }

    /// List stored conversations, newest first
    pub fn list(&self) -> std::io::Result<Vec<ConversationInfo>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }

        let mut conversations = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("jsonl") {
                continue;
            }
            if let Some(info) = Self::read_info(&path) {
                conversations.push(info);
            }
        }

        conversations.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(conversations)
    }

    fn read_info(path: &Path) -> Option<ConversationInfo> {
        let file = File::open(path).ok()?;
        let first_line = BufReader::new(file).lines().next()?.ok()?;
        let Ok(ConversationEntry::Metadata { id, created_at }) =
            serde_json::from_str::<ConversationEntry>(&first_line)
        else {
            return None;
        };

        let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
        let message_count = Self::replay(path).map(|m| m.len()).unwrap_or(0);

        Some(ConversationInfo {
            id,
            created_at,
            modified,
            message_count,
        })
    }
}

#[async_trait]
impl ConversationStore for JsonlStore {
    async fn create_new(&self) -> jarvis_agent::Result<String> {
        fs::create_dir_all(&self.dir)?;
        let id = uuid::Uuid::new_v4().to_string();
        let metadata = ConversationEntry::Metadata {
            id: id.clone(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.append(&id, &metadata)?;
        tracing::debug!("Created conversation {}", id);
        Ok(id)
    }

    async fn load_latest(&self) -> jarvis_agent::Result<Option<(String, Vec<Message>)>> {
        if !self.dir.exists() {
            return Ok(None);
        }
        let Some(id) = self.latest_id()? else {
            return Ok(None);
        };
        let messages = Self::replay(&self.path(&id))?;
        Ok(Some((id, messages)))
    }

    async fn save(&self, conversation_id: &str, message: &Message) -> jarvis_agent::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let entry = ConversationEntry::Message {
            message: message.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.append(conversation_id, &entry)?;
        Ok(())
    }

    async fn clear(&self, conversation_id: &str) -> jarvis_agent::Result<()> {
        if !self.path(conversation_id).exists() {
            return Ok(());
        }
        let entry = ConversationEntry::Cleared {
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.append(conversation_id, &entry)?;
        Ok(())
    }
}

/// Information about a stored conversation
#[derive(Debug, Clone)]
pub struct ConversationInfo {
    pub id: String,
    pub created_at: i64,
    pub modified: std::time::SystemTime,
    pub message_count: usize,
}

impl ConversationInfo {
    /// Format the created_at timestamp for display
    pub fn created_at_display(&self) -> String {
        use chrono::{TimeZone, Utc};
        Utc.timestamp_millis_opt(self.created_at)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_dir_has_no_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path().join("missing"));
        assert!(store.load_latest().await.unwrap().is_none());
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path());
        let id = store.create_new().await.unwrap();

        let user = Message::user("draw a castle", None);
        let mut reply = Message::assistant("Right away, Sir.");
        store.save(&id, &user).await.unwrap();
        store.save(&id, &reply).await.unwrap();
        reply.generated_image = Some("data:image/png;base64,AA".into());
        store.save(&id, &reply).await.unwrap();

        let reopened = JsonlStore::new(dir.path());
        let (latest, messages) = reopened.load_latest().await.unwrap().unwrap();
        assert_eq!(latest, id);
        assert_eq!(messages, vec![user, reply]);
    }

    #[tokio::test]
    async fn test_latest_follows_last_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path());
        let first = store.create_new().await.unwrap();
        let second = store.create_new().await.unwrap();
        assert_eq!(store.load_latest().await.unwrap().unwrap().0, second);

        store.save(&first, &Message::user("back again", None)).await.unwrap();
        assert_eq!(store.load_latest().await.unwrap().unwrap().0, first);
    }

    #[tokio::test]
    async fn test_clear_hides_earlier_messages() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path());
        let id = store.create_new().await.unwrap();
        store.save(&id, &Message::user("old", None)).await.unwrap();
        store.clear(&id).await.unwrap();
        let fresh = Message::user("new", None);
        store.save(&id, &fresh).await.unwrap();

        let (_, messages) = store.load_latest().await.unwrap().unwrap();
        assert_eq!(messages, vec![fresh]);
    }

    #[tokio::test]
    async fn test_bad_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path());
        let id = store.create_new().await.unwrap();
        let kept = Message::user("kept", None);
        store.save(&id, &kept).await.unwrap();

        let mut file = File::options().append(true).open(store.path(&id)).unwrap();
        writeln!(file, "{{not json").unwrap();

        let (_, messages) = store.load_latest().await.unwrap().unwrap();
        assert_eq!(messages, vec![kept]);
    }

    #[tokio::test]
    async fn test_list_counts_messages() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path());
        let id = store.create_new().await.unwrap();
        store.save(&id, &Message::user("one", None)).await.unwrap();
        store.save(&id, &Message::assistant("two")).await.unwrap();

        let list = store.list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);
        assert_eq!(list[0].message_count, 2);
        assert_ne!(list[0].created_at_display(), "unknown");
    }
}
