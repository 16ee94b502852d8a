//! Participant liveness sweep
//!
//! On every tick, participants idle for longer than the staleness threshold
//! are removed and a "left" notice is broadcast on their behalf. Messages they
//! sent earlier stay in the feed.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::core::config::ChatServerConfig;
use crate::core::error::{Error, Result};
use crate::core::models::Message;
use crate::core::store::ChatStore;

pub struct Sweeper {
    store: Arc<dyn ChatStore>,
    interval: Duration,
    stale_after: TimeDelta,
}

impl Sweeper {
    pub fn new(store: Arc<dyn ChatStore>, interval: Duration, stale_after: Duration) -> Self {
        Self {
            store,
            interval,
            stale_after: TimeDelta::from_std(stale_after).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn from_config(store: Arc<dyn ChatStore>, config: &ChatServerConfig) -> Self {
        Self::new(store, config.sweep_interval, config.stale_after)
    }

    /// Run one pass at time `now`, returning the names evicted.
    ///
    /// A failure on one participant is logged and the pass moves on.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        let cutoff = now
            .checked_sub_signed(self.stale_after)
            .ok_or(Error::StaleWindowOutOfRange)?;
        let mut evicted = Vec::new();

        for participant in self.store.list_participants().await? {
            if !participant.is_stale(now, self.stale_after) {
                continue;
            }

            // A heartbeat landing after the listing keeps the participant
            match self
                .store
                .remove_participant_if_stale(&participant.name, cutoff)
                .await
            {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!("Failed to evict {}: {}", participant.name, e);
                    continue;
                }
            }

            if let Err(e) = self.store.insert_message(&Message::left(&participant.name)).await {
                warn!("Failed to announce departure of {}: {}", participant.name, e);
            }

            info!("Evicted idle participant {}", participant.name);
            evicted.push(participant.name);
        }

        Ok(evicted)
    }

    /// Start sweeping on a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        info!(
            "Liveness sweep every {:?}, evicting after {}s idle",
            self.interval,
            self.stale_after.num_seconds()
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match self.sweep(Utc::now()).await {
                Ok(evicted) if !evicted.is_empty() => {
                    debug!("Sweep evicted {} participant(s)", evicted.len())
                }
                Ok(_) => {}
                Err(e) => error!("Liveness sweep failed: {}", e),
            }
        }
    }
}
