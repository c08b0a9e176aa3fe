use pagecue_types::{normalize_key, PropertyMap};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

// ── normalize_key ────────────────────────────────────────────────

#[test]
fn normalize_lowercases_and_joins_words() {
    assert_eq!(normalize_key("Deal Stage"), "deal_stage");
    assert_eq!(normalize_key("deal-stage"), "deal_stage");
    assert_eq!(normalize_key(" DEAL__STAGE: "), "deal_stage");
    assert_eq!(normalize_key("Amount ($)"), "amount");
    assert_eq!(normalize_key("hs_lead_status"), "hs_lead_status");
}

#[test]
fn normalize_drops_non_ascii_runs() {
    assert_eq!(normalize_key("Étape"), "tape");
    assert_eq!(normalize_key("Close → Date"), "close_date");
}

#[test]
fn normalize_of_punctuation_only_is_empty() {
    assert_eq!(normalize_key(""), "");
    assert_eq!(normalize_key("  --  "), "");
    assert_eq!(normalize_key(":"), "");
}

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in ".{0,64}") {
        let once = normalize_key(&raw);
        prop_assert_eq!(normalize_key(&once), once.clone());
    }

    #[test]
    fn normalized_keys_use_only_lowercase_digits_and_single_underscores(raw in ".{0,64}") {
        let key = normalize_key(&raw);
        prop_assert!(key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        prop_assert!(!key.contains("__"));
        prop_assert!(!key.starts_with('_') && !key.ends_with('_'));
    }
}

// ── PropertyMap ──────────────────────────────────────────────────

#[test]
fn first_writer_wins() {
    let mut map = PropertyMap::new();
    assert!(map.insert_if_absent("Deal Stage", "Demo"));
    assert!(!map.insert_if_absent("deal_stage", "Closed Won"));
    assert_eq!(map.get("deal stage"), Some("Demo"));
    assert_eq!(map.len(), 1);
}

#[test]
fn empty_key_is_rejected() {
    let mut map = PropertyMap::new();
    assert!(!map.insert_if_absent("---", "value"));
    assert!(map.is_empty());
}

#[test]
fn lookups_normalize_the_key() {
    let map: PropertyMap = [("amount", "$50,000")].into_iter().collect();
    assert!(map.contains_key("Amount"));
    assert_eq!(map.get("AMOUNT:"), Some("$50,000"));
    assert_eq!(map.get("missing"), None);
}

#[test]
fn merge_absent_keeps_existing_values() {
    let mut base: PropertyMap = [("amount", "100"), ("owner", "Ana")].into_iter().collect();
    let other: PropertyMap = [("amount", "999"), ("stage", "Demo")].into_iter().collect();

    let added = base.merge_absent(other);
    assert_eq!(added, 1);
    assert_eq!(base.get("amount"), Some("100"));
    assert_eq!(base.get("stage"), Some("Demo"));
}

#[test]
fn iteration_is_in_key_order() {
    let map: PropertyMap = [("zeta", "1"), ("alpha", "2"), ("mid", "3")].into_iter().collect();
    let keys: Vec<&str> = map.keys().collect();
    assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn from_flat_json_stringifies_scalars() {
    let object = json!({
        "Deal Name": "  Acme renewal ",
        "amount": 50000,
        "is_closed": false,
        "notes": null,
        "tags": ["a", "b"],
        "owner": {"id": 7},
        "blank": "   "
    });
    let map = PropertyMap::from_flat_json(object.as_object().unwrap());

    assert_eq!(map.get("deal_name"), Some("Acme renewal"));
    assert_eq!(map.get("amount"), Some("50000"));
    assert_eq!(map.get("is_closed"), Some("false"));
    assert!(!map.contains_key("notes"));
    assert!(!map.contains_key("tags"));
    assert!(!map.contains_key("owner"));
    assert!(!map.contains_key("blank"));
}

#[test]
fn deserialization_normalizes_keys() {
    let map: PropertyMap = serde_json::from_str(r#"{"Deal Stage": "Demo"}"#).unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["deal_stage"]);

    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"deal_stage":"Demo"}"#);
}
