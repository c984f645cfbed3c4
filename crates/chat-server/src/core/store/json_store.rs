//! JSON file document store
//!
//! Each collection lives in its own file under the store directory and is
//! rewritten on every mutation using atomic writes (temp file + rename).
//! The in-memory copy is only replaced after the write lands, so a failed
//! write leaves both disk and memory at the previous state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{
    insert_unique, remove_idle, remove_message, touch, ChatStore, StoreError, StoreResult,
};
use crate::core::models::{Message, Participant};

const PARTICIPANTS_FILE: &str = "participants.json";
const MESSAGES_FILE: &str = "messages.json";

pub struct JsonStore {
    dir: PathBuf,
    participants: RwLock<Vec<Participant>>,
    messages: RwLock<Vec<Message>>,
}

impl JsonStore {
    /// Opens (or creates) a store rooted at `dir`, loading any existing
    /// collections.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        let participants: Vec<Participant> = load_collection(&dir.join(PARTICIPANTS_FILE)).await?;
        let messages: Vec<Message> = load_collection(&dir.join(MESSAGES_FILE)).await?;

        info!(
            "JSON store opened at {:?} ({} participants, {} messages)",
            dir,
            participants.len(),
            messages.len()
        );

        Ok(Self {
            dir,
            participants: RwLock::new(participants),
            messages: RwLock::new(messages),
        })
    }

    async fn save<T: Serialize>(&self, file: &str, items: &[T]) -> StoreResult<()> {
        let path = self.dir.join(file);
        let temp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(items)?;
        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, &path).await?;

        debug!("Saved {} entries to {:?}", items.len(), path);
        Ok(())
    }
}

async fn load_collection<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    if !fs::try_exists(path).await? {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).await?;
    serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait]
impl ChatStore for JsonStore {
    async fn insert_participant(&self, participant: Participant) -> StoreResult<()> {
        let mut participants = self.participants.write().await;
        let mut next = participants.clone();
        insert_unique(&mut next, participant)?;
        self.save(PARTICIPANTS_FILE, &next).await?;
        *participants = next;
        Ok(())
    }

    async fn touch_participant(&self, name: &str, at: DateTime<Utc>) -> StoreResult<bool> {
        let mut participants = self.participants.write().await;
        let mut next = participants.clone();
        if !touch(&mut next, name, at) {
            return Ok(false);
        }
        self.save(PARTICIPANTS_FILE, &next).await?;
        *participants = next;
        Ok(true)
    }

    async fn get_participant(&self, name: &str) -> StoreResult<Option<Participant>> {
        let participants = self.participants.read().await;
        Ok(participants.iter().find(|p| p.name == name).cloned())
    }

    async fn list_participants(&self) -> StoreResult<Vec<Participant>> {
        Ok(self.participants.read().await.clone())
    }

    async fn remove_participant(
        &self,
        name: &str,
        seen_before: DateTime<Utc>,
    ) -> StoreResult<Option<Participant>> {
        let mut participants = self.participants.write().await;
        let mut next = participants.clone();
        let removed = remove_idle(&mut next, name, seen_before);
        if removed.is_some() {
            self.save(PARTICIPANTS_FILE, &next).await?;
            *participants = next;
        }
        Ok(removed)
    }

    async fn insert_message(&self, message: Message) -> StoreResult<()> {
        let mut messages = self.messages.write().await;
        let mut next = messages.clone();
        next.push(message);
        self.save(MESSAGES_FILE, &next).await?;
        *messages = next;
        Ok(())
    }

    async fn get_message(&self, id: &str) -> StoreResult<Option<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.iter().find(|m| m.id == id).cloned())
    }

    async fn list_messages(&self) -> StoreResult<Vec<Message>> {
        Ok(self.messages.read().await.clone())
    }

    async fn delete_message(&self, id: &str) -> StoreResult<bool> {
        let mut messages = self.messages.write().await;
        let mut next = messages.clone();
        if !remove_message(&mut next, id) {
            return Ok(false);
        }
        self.save(MESSAGES_FILE, &next).await?;
        *messages = next;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_participants_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let at = Utc.timestamp_millis_opt(1_000).unwrap();

        {
            let store = JsonStore::open(temp_dir.path()).await.unwrap();
            store
                .insert_participant(Participant::new("alice", at))
                .await
                .unwrap();
        }

        assert!(temp_dir.path().join(PARTICIPANTS_FILE).exists());
        assert!(!temp_dir.path().join("participants.tmp").exists());

        let store = JsonStore::open(temp_dir.path()).await.unwrap();
        let participants = store.list_participants().await.unwrap();
        assert_eq!(participants, vec![Participant::new("alice", at)]);
    }

    #[tokio::test]
    async fn test_duplicate_does_not_touch_disk() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStore::open(temp_dir.path()).await.unwrap();
        let first = Utc.timestamp_opt(1, 0).unwrap();
        store
            .insert_participant(Participant::new("alice", first))
            .await
            .unwrap();

        let err = store
            .insert_participant(Participant::new("alice", Utc.timestamp_opt(2, 0).unwrap()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)));

        let reopened = JsonStore::open(temp_dir.path()).await.unwrap();
        let participants = reopened.list_participants().await.unwrap();
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].last_seen, first);
    }

    #[tokio::test]
    async fn test_corrupt_collection_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(MESSAGES_FILE), "{ malformed json ...").unwrap();

        let result = JsonStore::open(temp_dir.path()).await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }
}
