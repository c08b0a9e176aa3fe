//! The heuristic chain.

use crate::alias::AliasTable;
use crate::heuristics;
use pagecue_types::PropertyMap;
use scraper::Html;
use tracing::debug;

/// A pure property scraper over a parsed document.
pub type Heuristic = fn(&Html) -> PropertyMap;

/// Runs an ordered list of heuristics, first writer wins per key, then
/// applies the alias pass.
///
/// Earlier heuristics are structurally more reliable; later ones only fill
/// the gaps. New heuristics are appended without touching existing ones.
#[derive(Debug, Clone)]
pub struct PropertyExtractor {
    heuristics: Vec<(&'static str, Heuristic)>,
    aliases: AliasTable,
}

impl Default for PropertyExtractor {
    fn default() -> Self {
        Self {
            heuristics: vec![
                ("form_fields", heuristics::form_fields as Heuristic),
                ("list_rows", heuristics::list_rows as Heuristic),
                ("sidebar_values", heuristics::sidebar_values as Heuristic),
                ("labeled_attributes", heuristics::labeled_attributes as Heuristic),
                ("free_text_same_line", heuristics::free_text_same_line as Heuristic),
                ("free_text_next_line", heuristics::free_text_next_line as Heuristic),
            ],
            aliases: AliasTable::default(),
        }
    }
}

impl PropertyExtractor {
    /// The standard chain with the built-in alias table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain with no heuristics; build it up with [`Self::with_heuristic`].
    pub fn empty() -> Self {
        Self {
            heuristics: Vec::new(),
            aliases: AliasTable::default(),
        }
    }

    /// Appends a heuristic at the lowest precedence.
    pub fn with_heuristic(mut self, name: &'static str, heuristic: Heuristic) -> Self {
        self.heuristics.push((name, heuristic));
        self
    }

    /// Replaces the alias table.
    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    /// Heuristic names in precedence order.
    pub fn heuristic_names(&self) -> Vec<&'static str> {
        self.heuristics.iter().map(|(name, _)| *name).collect()
    }

    /// Scrapes a fresh property map from `document`.
    pub fn extract(&self, document: &Html) -> PropertyMap {
        self.extract_seeded(document, PropertyMap::new())
    }

    /// Like [`Self::extract`], but starts from `seed` (e.g. remote record
    /// data), whose keys take precedence over every heuristic.
    pub fn extract_seeded(&self, document: &Html, seed: PropertyMap) -> PropertyMap {
        let mut map = seed;
        for (name, heuristic) in &self.heuristics {
            let found = heuristic(document);
            let found_count = found.len();
            let added = map.merge_absent(found);
            debug!("Heuristic {} found {} properties, {} new", name, found_count, added);
        }
        let aliased = self.aliases.apply(&mut map);
        debug!("Alias pass added {} keys, {} properties total", aliased, map.len());
        map
    }

    /// Parses `html` and extracts from it.
    pub fn extract_html(&self, html: &str) -> PropertyMap {
        self.extract(&Html::parse_document(html))
    }
}
