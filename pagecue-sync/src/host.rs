//! The host page seam.

use crate::error::SyncResult;
use async_trait::async_trait;
use pagecue_extract::is_html_ready;
use tokio::sync::RwLock;

/// Read access to the page the overlays are injected into.
///
/// Only the address and the current markup are relied on.
#[async_trait]
pub trait HostPage: Send + Sync {
    /// The current page address.
    async fn address(&self) -> SyncResult<String>;

    /// The current serialized document.
    async fn document(&self) -> SyncResult<String>;

    /// Whether the host app has rendered enough to scrape.
    async fn is_ready(&self) -> bool {
        match self.document().await {
            Ok(html) => is_html_ready(&html),
            Err(_) => false,
        }
    }
}

/// An in-memory page whose address and markup can be swapped at runtime.
#[derive(Debug, Default)]
pub struct StaticPage {
    address: RwLock<String>,
    html: RwLock<String>,
}

impl StaticPage {
    pub fn new(address: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            address: RwLock::new(address.into()),
            html: RwLock::new(html.into()),
        }
    }

    /// Simulates an in-app navigation.
    pub async fn set_address(&self, address: impl Into<String>) {
        *self.address.write().await = address.into();
    }

    /// Replaces the document, e.g. after the host re-rendered.
    pub async fn set_html(&self, html: impl Into<String>) {
        *self.html.write().await = html.into();
    }
}

#[async_trait]
impl HostPage for StaticPage {
    async fn address(&self) -> SyncResult<String> {
        Ok(self.address.read().await.clone())
    }

    async fn document(&self) -> SyncResult<String> {
        Ok(self.html.read().await.clone())
    }
}
