//! In-process store, used by `memory://` and by tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{insert_unique, remove_idle, remove_message, touch, ChatStore, StoreResult};
use crate::core::models::{Message, Participant};

#[derive(Default)]
pub struct MemoryStore {
    participants: RwLock<Vec<Participant>>,
    messages: RwLock<Vec<Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn insert_participant(&self, participant: Participant) -> StoreResult<()> {
        insert_unique(&mut *self.participants.write().await, participant)
    }

    async fn touch_participant(&self, name: &str, at: DateTime<Utc>) -> StoreResult<bool> {
        Ok(touch(&mut self.participants.write().await, name, at))
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
        Ok(remove_idle(
            &mut *self.participants.write().await,
            name,
            seen_before,
        ))
    }

    async fn insert_message(&self, message: Message) -> StoreResult<()> {
        self.messages.write().await.push(message);
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
        Ok(remove_message(&mut *self.messages.write().await, id))
    }
}
