//! Chat server configuration

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::chat::directory::Directory;
use crate::chat::log::MessageLog;
use crate::core::clock::{Clock, SystemClock};
use crate::core::store::{JsonStore, MemoryStore, SharedStore};

/// Longest accepted idle timeout (100 years)
pub const MAX_IDLE_TIMEOUT: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Where participants and messages are kept
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreConfig {
    /// Lost on restart
    Memory,
    /// JSON collection files under this directory
    Json(PathBuf),
}

impl StoreConfig {
    /// Parses a `memory://` or `json://<dir>` connection string.
    pub fn parse(uri: &str) -> anyhow::Result<Self> {
        if uri == "memory://" || uri == "memory" {
            return Ok(Self::Memory);
        }
        match uri.strip_prefix("json://") {
            Some(dir) if !dir.is_empty() => Ok(Self::Json(PathBuf::from(dir))),
            _ => anyhow::bail!("unsupported STORE_URI {:?}", uri),
        }
    }

    /// Opens the configured backend.
    pub async fn open(&self) -> anyhow::Result<SharedStore> {
        let store: SharedStore = match self {
            Self::Memory => Arc::new(MemoryStore::new()),
            Self::Json(dir) => Arc::new(JsonStore::open(dir.clone()).await?),
        };
        Ok(store)
    }
}

/// Configuration for the chat server
#[derive(Clone, Debug)]
pub struct ChatServerConfig {
    /// Port to listen on (all interfaces)
    pub port: u16,
    /// Persistence backend
    pub store: StoreConfig,
    /// How often the presence sweeper runs
    pub sweep_interval: Duration,
    /// Participants idle longer than this are evicted
    pub idle_timeout: Duration,
}

impl Default for ChatServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            store: StoreConfig::Json(PathBuf::from("chat_data")),
            sweep_interval: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(10),
        }
    }
}

impl ChatServerConfig {
    /// Reads `PORT`, `STORE_URI`, `SWEEP_INTERVAL_SECS` and
    /// `IDLE_TIMEOUT_SECS`, loading a `.env` file first if one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let store = match lookup("STORE_URI") {
            Some(uri) => StoreConfig::parse(&uri)?,
            None => defaults.store,
        };

        let sweep_interval = Duration::from_secs(parse_or(
            "SWEEP_INTERVAL_SECS",
            &lookup,
            defaults.sweep_interval.as_secs(),
        ));
        if sweep_interval.is_zero() {
            anyhow::bail!("SWEEP_INTERVAL_SECS must be greater than zero");
        }

        let idle_timeout = Duration::from_secs(parse_or(
            "IDLE_TIMEOUT_SECS",
            &lookup,
            defaults.idle_timeout.as_secs(),
        ));
        if idle_timeout > MAX_IDLE_TIMEOUT {
            anyhow::bail!(
                "IDLE_TIMEOUT_SECS must be at most {}",
                MAX_IDLE_TIMEOUT.as_secs()
            );
        }

        Ok(Self {
            port: parse_or("PORT", &lookup, defaults.port),
            store,
            sweep_interval,
            idle_timeout,
        })
    }

    pub fn idle_threshold(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.idle_timeout).unwrap_or(chrono::Duration::MAX)
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

/// App state shared across all handlers and the sweeper
#[derive(Clone)]
pub struct AppState {
    pub config: ChatServerConfig,
    pub directory: Arc<Directory>,
    pub log: Arc<MessageLog>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: ChatServerConfig, store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        let log = Arc::new(MessageLog::new(store.clone(), clock.clone()));
        let directory = Arc::new(Directory::new(store, log.clone(), clock.clone()));
        Self {
            config,
            directory,
            log,
            clock,
        }
    }

    /// State backed by the wall clock.
    pub fn with_system_clock(config: ChatServerConfig, store: SharedStore) -> Self {
        Self::new(config, store, Arc::new(SystemClock))
    }
}
