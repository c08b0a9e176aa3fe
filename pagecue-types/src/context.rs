//! Structured description of the page currently shown by the host app.

use serde::{Deserialize, Serialize};

/// Which address pattern the page matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// A single record page.
    Record,
    /// A collection/list view.
    Index,
    /// Anything else; nothing is shown here.
    #[default]
    Unsupported,
}

/// Identifiers derived from the page address plus the stage lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub kind: PageKind,
    pub object_type: Option<String>,
    pub record_id: Option<String>,
    pub tenant_id: Option<String>,
    pub pipeline: Option<String>,
    pub stage: Option<String>,
}

impl PageContext {
    /// Context of a page that matched no pattern.
    pub fn unsupported() -> Self {
        Self::default()
    }

    /// Returns true for record and index pages.
    pub fn is_supported(&self) -> bool {
        self.kind != PageKind::Unsupported
    }

    /// Returns true for record pages.
    pub fn is_record(&self) -> bool {
        self.kind == PageKind::Record
    }

    /// Returns a copy with the pipeline and stage filled in.
    pub fn with_stage(mut self, pipeline: Option<String>, stage: Option<String>) -> Self {
        self.pipeline = pipeline;
        self.stage = stage;
        self
    }

    /// The remote-fetch key, if this is a record page with full identifiers.
    pub fn record_key(&self) -> Option<RecordKey> {
        if !self.is_record() {
            return None;
        }
        Some(RecordKey {
            tenant_id: self.tenant_id.clone()?,
            object_type: self.object_type.clone()?,
            record_id: self.record_id.clone()?,
        })
    }
}

/// Key for fetching a record's properties from the CRM directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordKey {
    pub tenant_id: String,
    pub object_type: String,
    pub record_id: String,
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.tenant_id, self.object_type, self.record_id)
    }
}
