//! Participant directory
//!
//! Live set of registered participants keyed by name, each with the time it
//! was last seen.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::chat::log::MessageLog;
use crate::core::clock::Clock;
use crate::core::error::{Error, Result};
use crate::core::models::{MessageDraft, Participant, JOINED_TEXT};
use crate::core::store::{SharedStore, StoreError};

pub struct Directory {
    store: SharedStore,
    log: Arc<MessageLog>,
    clock: Arc<dyn Clock>,
}

impl Directory {
    pub fn new(store: SharedStore, log: Arc<MessageLog>, clock: Arc<dyn Clock>) -> Self {
        Self { store, log, clock }
    }

    /// Registers `name` and announces the arrival to everyone.
    ///
    /// The insert and the announcement are separate steps. If the
    /// announcement fails the participant stays registered and the error is
    /// returned.
    pub async fn register(&self, name: &str) -> Result<Participant> {
        let participant = Participant::new(name, self.clock.now());

        match self.store.insert_participant(participant.clone()).await {
            Ok(()) => {}
            Err(StoreError::DuplicateKey(name)) => return Err(Error::DuplicateName(name)),
            Err(e) => return Err(e.into()),
        }
        info!("Participant {} joined", name);

        if let Err(e) = self
            .log
            .append(MessageDraft::status(name, JOINED_TEXT).sent_at(participant.last_seen))
            .await
        {
            error!("Registered {} but failed to announce arrival: {}", name, e);
            return Err(e);
        }

        Ok(participant)
    }

    /// Refreshes `last_seen` for `name`.
    pub async fn touch(&self, name: &str) -> Result<()> {
        if self.store.touch_participant(name, self.clock.now()).await? {
            Ok(())
        } else {
            Err(Error::ParticipantNotFound(name.to_string()))
        }
    }

    pub async fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.store.get_participant(name).await?.is_some())
    }

    pub async fn list(&self) -> Result<Vec<Participant>> {
        Ok(self.store.list_participants().await?)
    }

    /// Removes `name` if it has not been seen since `stale_before`. Returns
    /// the removed entry, or `None` if it was refreshed, re-registered or
    /// already gone.
    pub async fn remove(
        &self,
        name: &str,
        stale_before: DateTime<Utc>,
    ) -> Result<Option<Participant>> {
        Ok(self.store.remove_participant(name, stale_before).await?)
    }
}
