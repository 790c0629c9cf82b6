//! Cache invalidation contract for the layer above the client
//!
//! The client holds no cache of its own. Bot commands tell an optional
//! invalidator which cached queries are stale once they succeed.

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Cached query families the dashboard keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    BotStatus,
    Portfolio,
    Trades,
}

impl QueryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::BotStatus => "bot-status",
            QueryKey::Portfolio => "portfolio",
            QueryKey::Trades => "trades",
        }
    }
}

/// Bot control commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Stop,
    EmergencyStop,
}

impl BotCommand {
    pub fn path(&self) -> &'static str {
        match self {
            BotCommand::Start => "/bot/start",
            BotCommand::Stop => "/bot/stop",
            BotCommand::EmergencyStop => "/bot/emergency-stop",
        }
    }

    /// Queries made stale by a successful command
    pub fn invalidates(&self) -> &'static [QueryKey] {
        match self {
            BotCommand::Start | BotCommand::Stop => &[QueryKey::BotStatus],
            BotCommand::EmergencyStop => {
                &[QueryKey::BotStatus, QueryKey::Portfolio, QueryKey::Trades]
            }
        }
    }
}

/// Receiver of invalidation notices
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, key: QueryKey);
}

/// In-memory invalidator that counts notices per key
#[derive(Debug, Default)]
pub struct InvalidationLog {
    counts: Mutex<HashMap<QueryKey, u64>>,
}

impl InvalidationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, key: QueryKey) -> u64 {
        let counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        counts.get(&key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        let counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        counts.values().sum()
    }
}

impl CacheInvalidator for InvalidationLog {
    fn invalidate(&self, key: QueryKey) {
        debug!("Invalidating cached {}", key.as_str());
        let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        *counts.entry(key).or_insert(0) += 1;
    }
}
