//! Human-label / machine-key synonyms.

use pagecue_types::{normalize_key, PropertyMap};

/// Built-in pairs of `(visible label, internal property name)`.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("deal_stage", "dealstage"),
    ("deal_name", "dealname"),
    ("close_date", "closedate"),
    ("deal_amount", "amount"),
    ("deal_type", "dealtype"),
    ("deal_owner", "hubspot_owner_id"),
    ("contact_owner", "hubspot_owner_id"),
    ("lifecycle_stage", "lifecyclestage"),
    ("lead_status", "hs_lead_status"),
    ("first_name", "firstname"),
    ("last_name", "lastname"),
    ("job_title", "jobtitle"),
    ("phone_number", "phone"),
    ("email_address", "email"),
    ("company_name", "company"),
    ("annual_revenue", "annualrevenue"),
    ("number_of_employees", "numberofemployees"),
    ("create_date", "createdate"),
    ("ticket_status", "hs_pipeline_stage"),
    ("ticket_priority", "hs_ticket_priority"),
];

/// A bidirectional synonym table applied after extraction.
///
/// Aliases only fill keys that are absent, and only from keys that were
/// present before the pass started, so one pass is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    pairs: Vec<(String, String)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new(DEFAULT_ALIASES.iter().copied())
    }
}

impl AliasTable {
    /// Builds a table; both sides of every pair are normalized.
    pub fn new<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(a, b)| (normalize_key(a.as_ref()), normalize_key(b.as_ref())))
                .filter(|(a, b)| !a.is_empty() && !b.is_empty() && a != b)
                .collect(),
        }
    }

    /// A table with no synonyms.
    pub fn empty() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if the table has no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Fills absent synonyms in `map`. Returns the number of keys added.
    pub fn apply(&self, map: &mut PropertyMap) -> usize {
        let before = map.clone();
        let mut added = 0;
        for (label, key) in &self.pairs {
            if let Some(value) = before.get(label) {
                added += usize::from(map.insert_if_absent(key, value));
            }
            if let Some(value) = before.get(key) {
                added += usize::from(map.insert_if_absent(label, value));
            }
        }
        added
    }
}
