//! Core type definitions for pagecue.
//!
//! This crate defines the plain data shared by every other crate:
//! - [`Rule`] and [`Condition`], as handed out by the configuration store
//! - [`PropertyMap`], the scraped record data, and [`normalize_key`]
//! - [`PageContext`], the structured view of the current page address
//! - [`Settings`] and [`StoreSnapshot`]
//! - [`SessionId`] for tagging per-page asynchronous work
//!
//! Evaluation, extraction and scheduling live in their own crates.

mod context;
mod ids;
mod property;
mod rule;
mod settings;

pub use context::{PageContext, PageKind, RecordKey};
pub use ids::SessionId;
pub use property::{normalize_key, PropertyMap};
pub use rule::{AlertLevel, Condition, FeatureCategory, Logic, Rule, RuleContent};
pub use settings::{Settings, StoreSnapshot};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
