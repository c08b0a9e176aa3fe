//! Page synchronization and rendering for pagecue.
//!
//! The host app is a single-page application: it navigates without
//! reloading and re-renders record pages piecemeal. This crate keeps the
//! injected overlays consistent with whatever record is currently shown.
//!
//! ## Components
//!
//! - **Synchronizer**: [`PageSynchronizer`] owns the page lifecycle state
//!   machine and the current [`PageSession`]
//! - **Render**: [`RenderOrchestrator`] groups matched rules by category and
//!   delegates to [`FeatureRenderer`]s, publishing side content through a
//!   [`PanelNotifier`]
//! - **Timers**: [`Debounce`] and [`RetryBudget`]
//! - **Collaborators**: [`HostPage`], [`ConfigStore`] and [`RemoteFetcher`],
//!   with file and HTTP adapters
//!
//! # Example
//!
//! ```no_run
//! use pagecue_sync::{PageSynchronizer, RenderOrchestrator, StaticPage, StaticStore, SyncConfig};
//! use pagecue_types::StoreSnapshot;
//! use std::sync::Arc;
//!
//! # async fn demo() -> pagecue_sync::SyncResult<()> {
//! let page = Arc::new(StaticPage::new(
//!     "https://app.example.com/contacts/1/record/0-3/42",
//!     "<html><body><div data-record-ready></div></body></html>",
//! ));
//! let store = Arc::new(StaticStore::new(StoreSnapshot::default()));
//! let (sync, handle, _events) =
//!     PageSynchronizer::new(SyncConfig::default(), page, store, RenderOrchestrator::new());
//!
//! let task = tokio::spawn(sync.run());
//! handle.notify_mutation();
//! handle.shutdown().await?;
//! let _ = task.await;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod host;
pub mod remote;
pub mod render;
mod session;
pub mod store;
mod synchronizer;
pub mod timer;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use host::{HostPage, StaticPage};
pub use remote::{HttpRemoteConfig, HttpRemoteFetcher, RemoteFetcher};
pub use render::{
    interpolate, ChannelNotifier, FeatureRenderer, PanelMessage, PanelNotifier,
    RecordingRenderer, RenderItem, RenderOrchestrator, RenderReport,
};
pub use session::PageSession;
pub use store::{ConfigStore, FileConfigStore, HttpConfigStore, HttpStoreConfig, StaticStore};
pub use synchronizer::{
    CycleReport, CycleTrigger, PageSignal, PageSynchronizer, SyncEvent, SyncHandle, SyncPhase,
};
pub use timer::{Debounce, RetryBudget};
