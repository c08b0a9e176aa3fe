//! Document-level signals: readiness and pipeline/stage lookup.

use crate::text::{clean_value, css, element_text};
use pagecue_types::PropertyMap;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static READY_MARKERS: LazyLock<Selector> = LazyLock::new(|| {
    css("[data-record-ready], [data-property-name], [data-sidebar-property], \
         table.property-list, dl.property-list, [data-index-table]")
});
static PIPELINE_MARKER: LazyLock<Selector> = LazyLock::new(|| css("[data-pipeline]"));
static STAGE_MARKER: LazyLock<Selector> = LazyLock::new(|| css("[data-stage]"));

/// Property keys consulted when the document has no pipeline marker.
pub const PIPELINE_KEYS: &[&str] = &["pipeline", "hs_pipeline"];

/// Property keys consulted when the document has no stage marker.
pub const STAGE_KEYS: &[&str] = &[
    "dealstage",
    "deal_stage",
    "hs_pipeline_stage",
    "ticket_status",
    "stage",
];

/// Pipeline and stage of the record, when they could be found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageHint {
    pub pipeline: Option<String>,
    pub stage: Option<String>,
}

/// Returns true once the host app has rendered enough structure to scrape.
pub fn is_document_ready(document: &Html) -> bool {
    document.select(&READY_MARKERS).next().is_some()
}

/// Parses `html` and checks [`is_document_ready`].
pub fn is_html_ready(html: &str) -> bool {
    is_document_ready(&Html::parse_document(html))
}

/// Finds pipeline and stage: DOM markers first, then the property map.
pub fn lookup_stage(document: &Html, properties: &PropertyMap) -> StageHint {
    StageHint {
        pipeline: marker_value(document, &PIPELINE_MARKER, "data-pipeline")
            .or_else(|| first_property(properties, PIPELINE_KEYS)),
        stage: marker_value(document, &STAGE_MARKER, "data-stage")
            .or_else(|| first_property(properties, STAGE_KEYS)),
    }
}

fn marker_value(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document.select(selector).find_map(|element| {
        element
            .value()
            .attr(attr)
            .and_then(clean_value)
            .or_else(|| clean_value(&element_text(element)))
    })
}

fn first_property(properties: &PropertyMap, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| properties.get(key))
        .map(str::to_string)
}
