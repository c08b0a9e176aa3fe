//! Error types for the synchronizer and its collaborators.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while talking to the host page, the store, the
/// remote source or a renderer.
///
/// None of these stop the synchronizer; they are logged and the affected
/// step degrades to "nothing found" or "nothing shown".
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status.
    #[error("http status {status}")]
    Http { status: u16 },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local file error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration store could not produce a snapshot.
    #[error("store error: {0}")]
    Store(String),

    /// A renderer rejected its items.
    #[error("render error: {0}")]
    Render(String),

    /// Channel closed.
    #[error("channel closed")]
    ChannelClosed,

    /// Timeout.
    #[error("operation timed out")]
    Timeout,
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SyncError::Timeout
        } else if let Some(status) = e.status() {
            SyncError::Http {
                status: status.as_u16(),
            }
        } else {
            SyncError::Network(e.to_string())
        }
    }
}
