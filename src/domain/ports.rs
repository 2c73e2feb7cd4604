use crate::domain::model::Account;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Where accounts live. Merge semantics belong to the store.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Snapshot of every account, in the store's natural order.
    async fn list_all(&self) -> Result<Vec<Account>>;

    /// Attribute everything owned by `source_id` to `target_id`, then remove
    /// `source_id`. Either both happen or neither does.
    async fn merge_and_delete(&self, target_id: &str, source_id: &str) -> Result<()>;
}

/// Flat key/value settings, looked up by name.
pub trait ConfigurationSource: Send + Sync {
    fn get_setting(&self, name: &str) -> Result<Option<String>>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// A job driven by [`crate::core::timer::TimerEngine`].
#[async_trait]
pub trait TimerJob: Send + Sync {
    fn name(&self) -> &str;

    fn interval(&self) -> Duration;

    /// Returns `true` when the run completed cleanly.
    async fn run(&self) -> bool;

    /// Called once after the engine stops scheduling runs.
    async fn shutdown(&self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
