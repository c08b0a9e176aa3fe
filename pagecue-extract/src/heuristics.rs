//! Independent property-scraping heuristics.
//!
//! Each heuristic is a pure `fn(&Html) -> PropertyMap` keyed on one
//! structural signal of the host page. They know nothing about each other;
//! [`PropertyExtractor`](crate::PropertyExtractor) decides precedence.

use crate::text::{clean_value, css, element_text, rendered_lines};
use pagecue_types::{normalize_key, PropertyMap};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static FORM_FIELD: LazyLock<Selector> = LazyLock::new(|| css("[data-property-name]"));
static FIELD_INPUT: LazyLock<Selector> = LazyLock::new(|| css("input[value]"));
static FIELD_TEXTAREA: LazyLock<Selector> = LazyLock::new(|| css("textarea"));
static FIELD_SELECTED: LazyLock<Selector> = LazyLock::new(|| css("select option[selected]"));
static FIELD_VALUE: LazyLock<Selector> = LazyLock::new(|| css("[data-property-value]"));
static FIELD_LABEL: LazyLock<Selector> = LazyLock::new(|| css("label"));

static LIST_ROW: LazyLock<Selector> = LazyLock::new(|| css("table.property-list tr"));
static DEFINITION_LIST: LazyLock<Selector> = LazyLock::new(|| css("dl.property-list"));

static SIDEBAR_ITEM: LazyLock<Selector> = LazyLock::new(|| css("[data-sidebar-property]"));
static SIDEBAR_LABEL: LazyLock<Selector> = LazyLock::new(|| css(".property-label"));
static SIDEBAR_VALUE: LazyLock<Selector> = LazyLock::new(|| css(".property-value"));

static LABELED: LazyLock<Selector> = LazyLock::new(|| css("[data-label], [aria-label]"));

static LABEL_AND_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9 &/()'_.\-]{0,48}?)\s*:\s*(\S.*)$").expect("static regex")
});
static LABEL_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9 &/()'_.\-]{0,48}?)\s*:$").expect("static regex")
});

/// Elements whose `aria-label` names an action, not a field.
const INTERACTIVE_ELEMENTS: &[&str] = &["a", "button", "input", "select", "textarea", "svg"];

/// Dedicated form-field containers (`[data-property-name]`).
///
/// The value comes from the first of: a valued `input`, a `textarea`, the
/// selected `option`, or a `[data-property-value]` element. The internal
/// name is written first, then the visible `label` text.
pub fn form_fields(document: &Html) -> PropertyMap {
    let mut map = PropertyMap::new();
    for field in document.select(&FORM_FIELD) {
        let Some(value) = field_value(field) else {
            continue;
        };
        if let Some(name) = field.value().attr("data-property-name") {
            map.insert_if_absent(name, value.clone());
        }
        if let Some(label) = field.select(&FIELD_LABEL).next() {
            map.insert_if_absent(&element_text(label), value);
        }
    }
    map
}

fn field_value(field: ElementRef<'_>) -> Option<String> {
    field
        .select(&FIELD_INPUT)
        .find_map(|input| input.value().attr("value").and_then(clean_value))
        .or_else(|| {
            field
                .select(&FIELD_TEXTAREA)
                .find_map(|area| clean_value(&element_text(area)))
        })
        .or_else(|| {
            field
                .select(&FIELD_SELECTED)
                .find_map(|option| clean_value(&element_text(option)))
        })
        .or_else(|| {
            field
                .select(&FIELD_VALUE)
                .find_map(|value| clean_value(&element_text(value)))
        })
}

/// Legacy property lists: `table.property-list` rows (first cell label,
/// second cell value) and `dl.property-list` term/definition pairs.
pub fn list_rows(document: &Html) -> PropertyMap {
    let mut map = PropertyMap::new();

    for row in document.select(&LIST_ROW) {
        let cells: Vec<ElementRef<'_>> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| matches!(cell.value().name(), "th" | "td"))
            .collect();
        if let [label, value, ..] = cells.as_slice() {
            if let Some(value) = clean_value(&element_text(*value)) {
                map.insert_if_absent(&element_text(*label), value);
            }
        }
    }

    for list in document.select(&DEFINITION_LIST) {
        let mut label: Option<String> = None;
        for child in list.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "dt" => label = Some(element_text(child)),
                "dd" => {
                    let value = clean_value(&element_text(child));
                    if let (Some(label), Some(value)) = (label.take(), value) {
                        map.insert_if_absent(&label, value);
                    }
                }
                _ => {}
            }
        }
    }

    map
}

/// Sidebar summary items (`[data-sidebar-property]`) with a
/// `.property-label` and a `.property-value` span.
pub fn sidebar_values(document: &Html) -> PropertyMap {
    let mut map = PropertyMap::new();
    for item in document.select(&SIDEBAR_ITEM) {
        let Some(value) = item
            .select(&SIDEBAR_VALUE)
            .next()
            .and_then(|v| clean_value(&element_text(v)))
        else {
            continue;
        };
        if let Some(key) = item.value().attr("data-sidebar-property") {
            map.insert_if_absent(key, value.clone());
        }
        if let Some(label) = item.select(&SIDEBAR_LABEL).next() {
            map.insert_if_absent(&element_text(label), value);
        }
    }
    map
}

/// Any element labeled through `data-label`, or through `aria-label` on a
/// non-interactive element, whose text differs from its label.
pub fn labeled_attributes(document: &Html) -> PropertyMap {
    let mut map = PropertyMap::new();
    for element in document.select(&LABELED) {
        let attrs = element.value();
        let label = match attrs.attr("data-label") {
            Some(label) => label,
            None if INTERACTIVE_ELEMENTS.contains(&attrs.name()) => continue,
            None => match attrs.attr("aria-label") {
                Some(label) => label,
                None => continue,
            },
        };
        let Some(value) = clean_value(&element_text(element)) else {
            continue;
        };
        if normalize_key(&value) == normalize_key(label) {
            continue;
        }
        map.insert_if_absent(label, value);
    }
    map
}

/// Free-text fallback: `Label: value` on one rendered line.
///
/// Deliberately loose; it can read unrelated prose as a property, which is
/// why it runs after every structural heuristic.
pub fn free_text_same_line(document: &Html) -> PropertyMap {
    let mut map = PropertyMap::new();
    for line in rendered_lines(document) {
        let Some(caps) = LABEL_AND_VALUE.captures(&line) else {
            continue;
        };
        let value = &caps[2];
        if value.starts_with("//") {
            continue;
        }
        if let Some(value) = clean_value(value) {
            map.insert_if_absent(&caps[1], value);
        }
    }
    map
}

/// Free-text fallback: a `Label:` line followed by its value on the next
/// line, unless that next line is itself a bare label.
pub fn free_text_next_line(document: &Html) -> PropertyMap {
    let mut map = PropertyMap::new();
    let lines = rendered_lines(document);
    for pair in lines.windows(2) {
        let Some(caps) = LABEL_ONLY.captures(&pair[0]) else {
            continue;
        };
        if LABEL_ONLY.is_match(&pair[1]) {
            continue;
        }
        if let Some(value) = clean_value(&pair[1]) {
            map.insert_if_absent(&caps[1], value);
        }
    }
    map
}
