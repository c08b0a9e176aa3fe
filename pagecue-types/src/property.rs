//! Record property maps and key normalization.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Normalizes a property label or key.
///
/// Lowercases ASCII letters, collapses every run of characters outside
/// `[a-z0-9]` into a single `_`, and trims leading/trailing underscores:
/// `"Deal Stage"`, `"deal-stage"` and `" DEAL__STAGE: "` all become
/// `"deal_stage"`. Normalizing an already-normalized key returns it unchanged.
pub fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    out
}

/// The scraped key/value data of the record on the active page.
///
/// Keys are always stored normalized. Writes are first-writer-wins: once a
/// key holds a value, later sources cannot replace it. The map is rebuilt
/// from scratch for every synchronization cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertyMap {
    entries: BTreeMap<String, String>,
}

impl PropertyMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under the normalized `key` unless that key is already
    /// set or the key normalizes to nothing. Returns whether the map changed.
    pub fn insert_if_absent(&mut self, key: &str, value: impl Into<String>) -> bool {
        let key = normalize_key(key);
        if key.is_empty() || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value.into());
        true
    }

    /// Builds a map from a flat JSON object such as a remote API response.
    ///
    /// Strings, numbers and booleans become their text form; nulls, nested
    /// objects and arrays are skipped.
    pub fn from_flat_json(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        use serde_json::Value;

        let mut map = PropertyMap::new();
        for (key, value) in object {
            let text = match value {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => continue,
            };
            if !text.is_empty() {
                map.insert_if_absent(key, text);
            }
        }
        map
    }

    /// Looks up a value; the lookup key is normalized first.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&normalize_key(key)).map(String::as_str)
    }

    /// Returns true if the normalized key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    /// Copies every entry of `other` whose key is still absent here.
    /// Returns the number of keys added.
    pub fn merge_absent(&mut self, other: PropertyMap) -> usize {
        let mut added = 0;
        for (key, value) in other.entries {
            if let std::collections::btree_map::Entry::Vacant(slot) = self.entries.entry(key) {
                slot.insert(value);
                added += 1;
            }
        }
        added
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no property was found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    /// Builds a map with first-writer-wins semantics.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (key, value) in iter {
            map.insert_if_absent(key.as_ref(), value);
        }
        map
    }
}

impl<'a> IntoIterator for &'a PropertyMap {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<'de> Deserialize<'de> for PropertyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}
