//! Chat storage module
//!
//! Two collections, participants and messages, behind the [`ChatStore`]
//! trait. Every call is async and fallible so that file-backed and
//! in-memory backends are interchangeable.

pub mod json_store;
pub mod memory;

pub use json_store::JsonStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::models::{Message, Participant};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique key already present in the collection.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A collection file exists but could not be parsed.
    #[error("corrupt collection {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store holding the participant and message collections.
///
/// Each method is atomic with respect to the other methods on the same
/// collection. Message order is insertion order.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Inserts `participant`, failing with [`StoreError::DuplicateKey`] if
    /// the name is taken. The check and the insert happen under one lock.
    async fn insert_participant(&self, participant: Participant) -> StoreResult<()>;

    /// Sets `last_seen` for `name`. Returns false if `name` is unknown.
    async fn touch_participant(&self, name: &str, at: DateTime<Utc>) -> StoreResult<bool>;

    async fn get_participant(&self, name: &str) -> StoreResult<Option<Participant>>;

    async fn list_participants(&self) -> StoreResult<Vec<Participant>>;

    /// Removes `name` only if it was last seen before `seen_before`.
    async fn remove_participant(
        &self,
        name: &str,
        seen_before: DateTime<Utc>,
    ) -> StoreResult<Option<Participant>>;

    async fn insert_message(&self, message: Message) -> StoreResult<()>;

    async fn get_message(&self, id: &str) -> StoreResult<Option<Message>>;

    async fn list_messages(&self) -> StoreResult<Vec<Message>>;

    /// Returns false if no message has that id.
    async fn delete_message(&self, id: &str) -> StoreResult<bool>;
}

pub type SharedStore = Arc<dyn ChatStore>;

// Collection mutations shared by both backends.

pub(crate) fn insert_unique(
    participants: &mut Vec<Participant>,
    participant: Participant,
) -> StoreResult<()> {
    if participants.iter().any(|p| p.name == participant.name) {
        return Err(StoreError::DuplicateKey(participant.name));
    }
    participants.push(participant);
    Ok(())
}

pub(crate) fn touch(participants: &mut [Participant], name: &str, at: DateTime<Utc>) -> bool {
    match participants.iter_mut().find(|p| p.name == name) {
        Some(p) => {
            p.last_seen = at;
            true
        }
        None => false,
    }
}

pub(crate) fn remove_idle(
    participants: &mut Vec<Participant>,
    name: &str,
    seen_before: DateTime<Utc>,
) -> Option<Participant> {
    let idx = participants
        .iter()
        .position(|p| p.name == name && p.last_seen < seen_before)?;
    Some(participants.remove(idx))
}

pub(crate) fn remove_message(messages: &mut Vec<Message>, id: &str) -> bool {
    match messages.iter().position(|m| m.id == id) {
        Some(idx) => {
            messages.remove(idx);
            true
        }
        None => false,
    }
}
