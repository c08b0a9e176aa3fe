//! Configuration store adapters.
//!
//! The store hands out the rule set and feature toggles as one
//! [`StoreSnapshot`]. It is read at startup and again whenever the host
//! signals that the data changed.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use pagecue_types::StoreSnapshot;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Read-only source of rules and settings.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self) -> SyncResult<StoreSnapshot>;
}

/// A store held in memory.
#[derive(Debug, Default)]
pub struct StaticStore {
    snapshot: RwLock<StoreSnapshot>,
}

impl StaticStore {
    pub fn new(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    /// Replaces the stored snapshot. Callers still have to signal the
    /// change to the synchronizer.
    pub async fn set(&self, snapshot: StoreSnapshot) {
        *self.snapshot.write().await = snapshot;
    }
}

#[async_trait]
impl ConfigStore for StaticStore {
    async fn load(&self) -> SyncResult<StoreSnapshot> {
        Ok(self.snapshot.read().await.clone())
    }
}

/// A store backed by a JSON file, re-read on every load.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self) -> SyncResult<StoreSnapshot> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        let snapshot: StoreSnapshot = serde_json::from_str(&json)?;
        debug!(
            "Loaded {} rules from {}",
            snapshot.rules.len(),
            self.path.display()
        );
        Ok(snapshot)
    }
}

/// Settings for [`HttpConfigStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpStoreConfig {
    /// Base URL of the store service (e.g. `https://store.example.com`).
    pub base_url: String,
    /// Path of the snapshot resource.
    pub snapshot_path: String,
    /// Sent as `Authorization: Bearer ...` when set.
    pub bearer_token: Option<String>,
    /// Request timeout (ms).
    pub timeout_ms: u64,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            snapshot_path: "/v1/snapshot".to_string(),
            bearer_token: None,
            timeout_ms: 10_000,
        }
    }
}

/// A store served over HTTP as a JSON [`StoreSnapshot`].
pub struct HttpConfigStore {
    config: HttpStoreConfig,
    client: Client,
}

impl HttpConfigStore {
    pub fn new(config: HttpStoreConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| SyncError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn snapshot_url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.snapshot_path
        )
    }
}

#[async_trait]
impl ConfigStore for HttpConfigStore {
    async fn load(&self) -> SyncResult<StoreSnapshot> {
        let mut request = self.client.get(self.snapshot_url());
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let snapshot: StoreSnapshot = serde_json::from_str(&body)?;
        debug!("Fetched {} rules from store", snapshot.rules.len());
        Ok(snapshot)
    }
}
