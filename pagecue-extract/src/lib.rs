//! Reading the host page for pagecue.
//!
//! The host is a third-party single-page app whose markup changes without
//! notice, so everything here is best-effort and never fails: a missing
//! marker simply contributes nothing.
//!
//! ## Components
//!
//! - **Extractor**: [`PropertyExtractor`] runs an ordered chain of
//!   [`heuristics`] (structured markers first, free-text scans last) and
//!   reduces them first-writer-wins into a [`PropertyMap`]
//! - **Aliases**: [`AliasTable`] fills label/internal-name synonyms
//! - **Context**: [`ContextDetector`] parses the page address
//! - **Page signals**: [`is_document_ready`] and [`lookup_stage`]
//!
//! [`PropertyMap`]: pagecue_types::PropertyMap

mod alias;
mod context;
mod extractor;
pub mod heuristics;
mod page;
pub mod text;

pub use alias::{AliasTable, DEFAULT_ALIASES};
pub use context::{ContextDetector, OBJECT_TYPES};
pub use extractor::{Heuristic, PropertyExtractor};
pub use page::{is_document_ready, is_html_ready, lookup_stage, StageHint, PIPELINE_KEYS, STAGE_KEYS};

/// Re-exported so callers can parse a document once for several passes.
pub use scraper::Html;
