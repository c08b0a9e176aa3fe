//! Page-address parsing.

use pagecue_types::{PageContext, PageKind};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

/// Built-in object-type identifiers and their canonical names.
pub const OBJECT_TYPES: &[(&str, &str)] = &[
    ("0-1", "contact"),
    ("0-2", "company"),
    ("0-3", "deal"),
    ("0-5", "ticket"),
    ("0-7", "product"),
    ("0-8", "line_item"),
    ("0-136", "lead"),
];

static RECORD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^/contacts/(?P<tenant>\d+)/record/(?P<type>\d+-\d+)/(?P<id>\d+)(?:/|$)",
        r"^/contacts/(?P<tenant>\d+)/(?P<type>contact|company|deal|ticket)/(?P<id>\d+)(?:/|$)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

static INDEX_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^/contacts/(?P<tenant>\d+)/objects/\d+-\d+(?:/|$)",
        r"^/contacts/(?P<tenant>\d+)/(?:contacts|companies|deals|tickets)(?:/|$)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

/// Turns a page address into a [`PageContext`].
///
/// Record pages yield tenant, object type and record id. Index pages only
/// yield the tenant. Anything else is [`PageKind::Unsupported`].
#[derive(Debug, Clone)]
pub struct ContextDetector {
    object_types: HashMap<String, String>,
}

impl Default for ContextDetector {
    fn default() -> Self {
        Self {
            object_types: OBJECT_TYPES
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
        }
    }
}

impl ContextDetector {
    /// A detector with the built-in object-type table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an object-type mapping.
    pub fn with_object_type(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.object_types.insert(id.into(), name.into());
        self
    }

    /// Maps an object-type identifier to its canonical name. Unknown
    /// identifiers pass through unchanged.
    pub fn canonical_object_type(&self, id: &str) -> String {
        self.object_types
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Parses `address` (absolute URL or bare path). Pipeline and stage are
    /// left empty; they come from the document.
    pub fn detect(&self, address: &str) -> PageContext {
        let path = address_path(address);

        for pattern in RECORD_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(&path) {
                return PageContext {
                    kind: PageKind::Record,
                    object_type: Some(self.canonical_object_type(&caps["type"])),
                    record_id: Some(caps["id"].to_string()),
                    tenant_id: Some(caps["tenant"].to_string()),
                    pipeline: None,
                    stage: None,
                };
            }
        }

        for pattern in INDEX_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(&path) {
                return PageContext {
                    kind: PageKind::Index,
                    tenant_id: Some(caps["tenant"].to_string()),
                    ..PageContext::default()
                };
            }
        }

        PageContext::unsupported()
    }
}

fn address_path(address: &str) -> String {
    match Url::parse(address.trim()) {
        Ok(url) => url.path().to_string(),
        Err(_) => address
            .trim()
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}
