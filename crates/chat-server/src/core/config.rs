//! Chat server configuration

use anyhow::{bail, Result};
use chrono::{TimeDelta, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::store::{ChatStore, MemoryStore, SqliteStore};

/// Which storage backend to open at startup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

/// Configuration for the chat server
#[derive(Clone, Debug)]
pub struct ChatServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,
    /// Storage backend
    pub store: StoreBackend,
    /// Database URL for the SQLite backend
    pub database_url: String,
    /// How often the liveness sweep runs
    pub sweep_interval: Duration,
    /// Idle time after which a participant is evicted
    pub stale_after: Duration,
}

impl Default for ChatServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            store: StoreBackend::Sqlite,
            database_url: "sqlite://chat.sqlite".to_string(),
            sweep_interval: Duration::from_secs(15),
            stale_after: Duration::from_secs(10),
        }
    }
}

impl ChatServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval.is_zero() {
            bail!("sweep interval must be greater than zero");
        }
        if self.stale_after.is_zero() {
            bail!("staleness threshold must be greater than zero");
        }
        if Instant::now().checked_add(self.sweep_interval).is_none() {
            bail!("sweep interval is too large");
        }
        let in_range = TimeDelta::from_std(self.stale_after)
            .ok()
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .is_some();
        if !in_range {
            bail!("staleness threshold is too large");
        }
        Ok(())
    }

    /// Open the configured store.
    pub async fn open_store(&self) -> Result<Arc<dyn ChatStore>> {
        let store: Arc<dyn ChatStore> = match self.store {
            StoreBackend::Sqlite => Arc::new(SqliteStore::connect(&self.database_url).await?),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ChatServerConfig,
    pub store: Arc<dyn ChatStore>,
}

impl AppState {
    pub fn new(config: ChatServerConfig, store: Arc<dyn ChatStore>) -> Self {
        Self { config, store }
    }
}
