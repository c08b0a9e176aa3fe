//! Optional remote record data.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use pagecue_types::{PropertyMap, RecordKey};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Fetches a record's properties directly from the CRM.
///
/// Results are merged under the same normalization as scraped keys.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    async fn fetch(&self, key: &RecordKey) -> SyncResult<PropertyMap>;
}

/// Settings for [`HttpRemoteFetcher`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpRemoteConfig {
    /// Base URL of the record API.
    pub base_url: String,
    /// Sent as `Authorization: Bearer ...` when set.
    pub bearer_token: Option<String>,
    /// Request timeout (ms).
    pub timeout_ms: u64,
}

impl Default for HttpRemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            bearer_token: None,
            timeout_ms: 5_000,
        }
    }
}

/// Fetches `GET {base}/records/{tenant}/{objectType}/{recordId}`.
///
/// The body is either a flat JSON object or one with a `properties`
/// object; scalars are stringified, nested values dropped.
pub struct HttpRemoteFetcher {
    config: HttpRemoteConfig,
    client: Client,
}

impl HttpRemoteFetcher {
    pub fn new(config: HttpRemoteConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| SyncError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn record_url(&self, key: &RecordKey) -> String {
        format!(
            "{}/records/{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            key.tenant_id,
            key.object_type,
            key.record_id
        )
    }
}

#[async_trait]
impl RemoteFetcher for HttpRemoteFetcher {
    async fn fetch(&self, key: &RecordKey) -> SyncResult<PropertyMap> {
        let mut request = self.client.get(self.record_url(key));
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
        let mut value: serde_json::Value = serde_json::from_str(&body)?;
        if let Some(inner) = value.get_mut("properties").filter(|p| p.is_object()) {
            let properties = inner.take();
            value = properties;
        }
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_value(value)?;

        let properties = PropertyMap::from_flat_json(&object);
        debug!("Fetched {} remote properties for {}", properties.len(), key);
        Ok(properties)
    }
}
