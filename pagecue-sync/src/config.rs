//! Synchronizer timings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timings and limits for [`PageSynchronizer`](crate::PageSynchronizer).
///
/// Every field has a default, so a partial TOML file is enough:
///
/// ```toml
/// debounce_ms = 250
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet period after the last mutation before a cycle runs (ms).
    pub debounce_ms: u64,
    /// Interval between address checks (ms).
    pub address_poll_ms: u64,
    /// Interval between readiness checks (ms).
    pub ready_poll_ms: u64,
    /// Readiness checks before proceeding anyway.
    pub ready_max_attempts: u32,
    /// Capacity of the signal channel behind [`SyncHandle`](crate::SyncHandle).
    pub signal_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            address_poll_ms: 1000,
            ready_poll_ms: 500,
            ready_max_attempts: 20,
            signal_capacity: 64,
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn address_poll(&self) -> Duration {
        Duration::from_millis(self.address_poll_ms.max(1))
    }

    pub fn ready_poll(&self) -> Duration {
        Duration::from_millis(self.ready_poll_ms.max(1))
    }
}
