use pagecue_extract::{AliasTable, Html, PropertyExtractor, DEFAULT_ALIASES};
use pagecue_types::PropertyMap;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn doc(body: &str) -> Html {
    Html::parse_document(&format!("<html><body>{body}</body></html>"))
}

fn map(pairs: &[(&str, &str)]) -> PropertyMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

// ── Chain precedence ─────────────────────────────────────────────

#[test]
fn default_chain_order() {
    assert_eq!(
        PropertyExtractor::new().heuristic_names(),
        vec![
            "form_fields",
            "list_rows",
            "sidebar_values",
            "labeled_attributes",
            "free_text_same_line",
            "free_text_next_line",
        ]
    );
}

#[test]
fn structured_markers_beat_free_text() {
    let document = doc(r#"
        <div data-property-name="amount"><input value="100"></div>
        <p>Amount: 200</p>
        <p>Priority: High</p>
    "#);

    let props = PropertyExtractor::new().extract(&document);
    assert_eq!(props.get("amount"), Some("100"));
    assert_eq!(props.get("priority"), Some("High"));
}

#[test]
fn table_beats_sidebar() {
    let document = doc(r#"
        <table class="property-list"><tr><td>Lead status</td><td>Open</td></tr></table>
        <div data-sidebar-property="lead_status"><span class="property-value">Closed</span></div>
    "#);
    let props = PropertyExtractor::new().extract(&document);
    assert_eq!(props.get("lead_status"), Some("Open"));
}

#[test]
fn seed_wins_over_every_heuristic() {
    let document = doc(r#"<div data-property-name="amount"><input value="100"></div>"#);
    let seed = map(&[("amount", "999")]);

    let props = PropertyExtractor::new().extract_seeded(&document, seed);
    assert_eq!(props.get("amount"), Some("999"));
    assert_eq!(props.get("deal_amount"), Some("999"));
}

#[test]
fn custom_heuristic_fills_gaps_only() {
    fn constant(_: &Html) -> PropertyMap {
        [("amount", "1"), ("region", "EMEA")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    let extractor = PropertyExtractor::empty()
        .with_heuristic("form_fields", pagecue_extract::heuristics::form_fields)
        .with_heuristic("constant", constant)
        .with_aliases(AliasTable::empty());
    let document = doc(r#"<div data-property-name="amount"><input value="100"></div>"#);

    let props = extractor.extract(&document);
    assert_eq!(props.get("amount"), Some("100"));
    assert_eq!(props.get("region"), Some("EMEA"));
    assert_eq!(props.len(), 2);
}

#[test]
fn empty_document_yields_empty_map() {
    let props = PropertyExtractor::new().extract_html("<html><body></body></html>");
    assert!(props.is_empty());
}

// ── Aliases ──────────────────────────────────────────────────────

#[test]
fn alias_fills_internal_name_from_label() {
    let document = doc("<p>Deal Stage: Demo Scheduled</p>");
    let props = PropertyExtractor::new().extract(&document);
    assert_eq!(props.get("deal_stage"), Some("Demo Scheduled"));
    assert_eq!(props.get("dealstage"), Some("Demo Scheduled"));
}

#[test]
fn alias_fills_label_from_internal_name() {
    let mut props = map(&[("closedate", "2025-03-01")]);
    let added = AliasTable::default().apply(&mut props);
    assert_eq!(added, 1);
    assert_eq!(props.get("close_date"), Some("2025-03-01"));
}

#[test]
fn alias_leaves_both_sides_when_present() {
    let mut props = map(&[("deal_stage", "Demo"), ("dealstage", "appointmentscheduled")]);
    let added = AliasTable::default().apply(&mut props);
    assert_eq!(added, 0);
    assert_eq!(props.get("deal_stage"), Some("Demo"));
    assert_eq!(props.get("dealstage"), Some("appointmentscheduled"));
}

#[test]
fn alias_pass_is_single_step() {
    // a -> b -> c must not chain within one pass.
    let table = AliasTable::new([("a", "b"), ("b", "c")]);
    let mut props = map(&[("a", "1")]);
    table.apply(&mut props);
    assert_eq!(props.get("b"), Some("1"));
    assert!(!props.contains_key("c"));
}

#[test]
fn alias_table_normalizes_and_drops_degenerate_pairs() {
    let table = AliasTable::new([("Deal Stage", "dealstage"), ("same", "SAME"), ("", "x")]);
    assert_eq!(table.len(), 1);
    assert!(AliasTable::empty().is_empty());
    assert_eq!(AliasTable::default().len(), DEFAULT_ALIASES.len());
}

// ── Properties ───────────────────────────────────────────────────

fn alias_keys() -> impl Strategy<Value = String> {
    let keys: Vec<String> = DEFAULT_ALIASES
        .iter()
        .flat_map(|(a, b)| [a.to_string(), b.to_string()])
        .collect();
    prop::sample::select(keys)
}

proptest! {
    #[test]
    fn aliases_never_overwrite(
        entries in prop::collection::vec((alias_keys(), "[a-z0-9]{1,8}"), 0..12)
    ) {
        let mut props: PropertyMap = entries.into_iter().collect();
        let before = props.clone();
        AliasTable::default().apply(&mut props);
        for (key, value) in before.iter() {
            prop_assert_eq!(props.get(key), Some(value));
        }
    }

    #[test]
    fn extraction_is_deterministic(value in "[A-Za-z][A-Za-z ]{0,20}") {
        let html = format!("<html><body><p>Owner: {value}</p></body></html>");
        let extractor = PropertyExtractor::new();
        prop_assert_eq!(extractor.extract_html(&html), extractor.extract_html(&html));
    }
}
