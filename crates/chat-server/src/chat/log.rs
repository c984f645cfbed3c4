//! Message log
//!
//! Append-only from the handlers' point of view: messages are added at the
//! tail and can be deleted by their sender, never edited. Insertion order is
//! chronological order.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::visibility::is_visible;
use crate::core::clock::Clock;
use crate::core::error::{Error, Result};
use crate::core::models::{Message, MessageDraft};
use crate::core::store::SharedStore;

pub struct MessageLog {
    store: SharedStore,
    clock: Arc<dyn Clock>,
}

impl MessageLog {
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Appends `draft` at the tail, assigning an id and stamping `sent_at`
    /// with the current time unless the draft already carries one.
    pub async fn append(&self, draft: MessageDraft) -> Result<Message> {
        let sent_at = draft.sent_at.unwrap_or_else(|| self.clock.now());
        let message = Message {
            id: Uuid::new_v4().to_string(),
            from: draft.from,
            to: draft.to,
            text: draft.text,
            kind: draft.kind,
            time: sent_at.format("%H:%M:%S").to_string(),
            sent_at,
        };

        self.store.insert_message(message.clone()).await?;

        debug!(
            "Appended message {} ({:?}) {} -> {}",
            message.id, message.kind, message.from, message.to
        );
        Ok(message)
    }

    /// Messages `viewer` may see, oldest first. A positive `limit` keeps only
    /// the most recent `limit` of them; anything else returns them all.
    pub async fn list_for(&self, viewer: &str, limit: Option<i64>) -> Result<Vec<Message>> {
        let mut visible: Vec<Message> = self
            .store
            .list_messages()
            .await?
            .into_iter()
            .filter(|m| is_visible(m, viewer))
            .collect();

        if let Some(limit) = limit.filter(|n| *n > 0) {
            let limit = usize::try_from(limit).unwrap_or(usize::MAX);
            if visible.len() > limit {
                let start = visible.len() - limit;
                visible = visible.split_off(start);
            }
        }

        Ok(visible)
    }

    /// Deletes message `id` on behalf of `requester`, who must be its sender.
    pub async fn delete(&self, id: &str, requester: &str) -> Result<()> {
        let message = self
            .store
            .get_message(id)
            .await?
            .ok_or_else(|| Error::MessageNotFound(id.to_string()))?;

        if message.from != requester {
            return Err(Error::Forbidden);
        }

        if !self.store.delete_message(id).await? {
            // Lost a race with another delete of the same message
            return Err(Error::MessageNotFound(id.to_string()));
        }

        info!("Deleted message {} from {}", id, requester);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::models::{MessageKind, BROADCAST};
    use crate::core::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use tokio_test::{assert_err, assert_ok};

    fn log_with_clock() -> (MessageLog, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_epoch());
        let log = MessageLog::new(Arc::new(MemoryStore::new()), clock.clone());
        (log, clock)
    }

    #[tokio::test]
    async fn test_append_stamps_id_and_time() {
        let (log, clock) = log_with_clock();
        clock.advance(Duration::seconds(3_725));

        let a = log
            .append(MessageDraft::new("alice", BROADCAST, "hi", MessageKind::Chat))
            .await
            .unwrap();
        let b = log
            .append(MessageDraft::new("alice", BROADCAST, "again", MessageKind::Chat))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.sent_at, clock.now());
        assert_eq!(a.time, "01:02:05");
    }

    #[tokio::test]
    async fn test_append_keeps_preset_time() {
        let (log, _clock) = log_with_clock();
        let at = Utc.timestamp_opt(42, 0).unwrap();
        let m = log
            .append(MessageDraft::status("alice", "left").sent_at(at))
            .await
            .unwrap();
        assert_eq!(m.sent_at, at);
    }

    #[tokio::test]
    async fn test_list_for_limits_to_most_recent() {
        let (log, _clock) = log_with_clock();
        for i in 0..5 {
            log.append(MessageDraft::new("alice", BROADCAST, i.to_string(), MessageKind::Chat))
                .await
                .unwrap();
        }

        let texts = |ms: Vec<Message>| ms.into_iter().map(|m| m.text).collect::<Vec<_>>();

        assert_eq!(texts(log.list_for("bob", Some(2)).await.unwrap()), vec!["3", "4"]);
        assert_eq!(log.list_for("bob", Some(10)).await.unwrap().len(), 5);
        assert_eq!(log.list_for("bob", None).await.unwrap().len(), 5);
        assert_eq!(log.list_for("bob", Some(0)).await.unwrap().len(), 5);
        assert_eq!(log.list_for("bob", Some(-3)).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_limit_applies_after_visibility() {
        let (log, _clock) = log_with_clock();
        log.append(MessageDraft::new("alice", BROADCAST, "public", MessageKind::Chat))
            .await
            .unwrap();
        log.append(MessageDraft::new("alice", "bob", "secret", MessageKind::Direct))
            .await
            .unwrap();

        let seen = log.list_for("carol", Some(1)).await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].text, "public");
    }

    #[tokio::test]
    async fn test_delete_requires_sender() {
        let (log, _clock) = log_with_clock();
        let m = log
            .append(MessageDraft::new("alice", BROADCAST, "hi", MessageKind::Chat))
            .await
            .unwrap();

        let err = assert_err!(log.delete(&m.id, "bob").await);
        assert!(matches!(err, Error::Forbidden));
        assert_eq!(log.list_for("alice", None).await.unwrap().len(), 1);

        assert_ok!(log.delete(&m.id, "alice").await);
        assert!(log.list_for("alice", None).await.unwrap().is_empty());

        let err = assert_err!(log.delete(&m.id, "alice").await);
        assert!(matches!(err, Error::MessageNotFound(_)));
    }
}
