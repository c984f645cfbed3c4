//! Presence sweeper
//!
//! Periodically evicts participants that have been idle longer than the
//! threshold and announces each departure in the log.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::chat::directory::Directory;
use crate::chat::log::MessageLog;
use crate::core::clock::Clock;
use crate::core::config::AppState;
use crate::core::error::Result;
use crate::core::models::{MessageDraft, LEFT_TEXT};

pub struct Sweeper {
    directory: Arc<Directory>,
    log: Arc<MessageLog>,
    clock: Arc<dyn Clock>,
    threshold: chrono::Duration,
    interval: Duration,
}

impl Sweeper {
    pub fn new(
        directory: Arc<Directory>,
        log: Arc<MessageLog>,
        clock: Arc<dyn Clock>,
        threshold: chrono::Duration,
        interval: Duration,
    ) -> Self {
        Self {
            directory,
            log,
            clock,
            threshold,
            interval,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.directory.clone(),
            state.log.clone(),
            state.clock.clone(),
            state.config.idle_threshold(),
            state.config.sweep_interval,
        )
    }

    /// Runs one sweep at the clock's current time.
    pub async fn sweep(&self) -> Result<Vec<String>> {
        self.sweep_at(self.clock.now()).await
    }

    /// Evicts everyone idle for more than the threshold as of `now` and
    /// returns their names. Removal is keyed by name and re-checks the
    /// staleness in the store, so a participant that pinged or re-registered
    /// after the scan is kept. A departure that cannot be announced is logged
    /// and the sweep moves on to the next participant.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        // A threshold reaching before the earliest representable time means
        // nobody can be stale yet
        let Some(cutoff) = now.checked_sub_signed(self.threshold) else {
            return Ok(Vec::new());
        };
        let mut evicted = Vec::new();
        let mut unannounced = 0;

        for participant in self.directory.list().await? {
            if !participant.is_idle(now, self.threshold) {
                continue;
            }

            let Some(removed) = self.directory.remove(&participant.name, cutoff).await? else {
                debug!("{} came back before eviction", participant.name);
                continue;
            };

            info!("Participant {} left (idle since {})", removed.name, removed.last_seen);

            if let Err(e) = self
                .log
                .append(MessageDraft::status(removed.name.as_str(), LEFT_TEXT).sent_at(now))
                .await
            {
                error!("Evicted {} but failed to announce departure: {}", removed.name, e);
                unannounced += 1;
            }

            evicted.push(removed.name);
        }

        if unannounced > 0 {
            warn!(
                "Sweep evicted {} participant(s), {} without a departure message",
                evicted.len(),
                unannounced
            );
        }

        Ok(evicted)
    }

    /// Spawns the periodic task. The first sweep happens one full interval
    /// after spawning. A failed sweep is logged and the next tick retries.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match self.sweep().await {
                    Ok(evicted) if !evicted.is_empty() => {
                        info!("Sweep evicted {} participant(s)", evicted.len());
                    }
                    Ok(_) => {}
                    Err(e) => error!("Presence sweep failed: {}", e),
                }
            }
        })
    }
}
