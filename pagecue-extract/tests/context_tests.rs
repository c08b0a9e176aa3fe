use pagecue_extract::ContextDetector;
use pagecue_types::{PageContext, PageKind};
use pretty_assertions::assert_eq;

fn detect(address: &str) -> PageContext {
    ContextDetector::new().detect(address)
}

#[test]
fn record_page_with_numeric_object_type() {
    let ctx = detect("https://app.example.com/contacts/123/record/0-3/456");
    assert_eq!(ctx.kind, PageKind::Record);
    assert_eq!(ctx.tenant_id.as_deref(), Some("123"));
    assert_eq!(ctx.object_type.as_deref(), Some("deal"));
    assert_eq!(ctx.record_id.as_deref(), Some("456"));
    assert_eq!(ctx.pipeline, None);
    assert_eq!(ctx.stage, None);
}

#[test]
fn record_page_ignores_query_fragment_and_trailing_segments() {
    let ctx = detect("https://app.example.com/contacts/9/record/0-1/77/view/1?tab=notes#top");
    assert_eq!(ctx.object_type.as_deref(), Some("contact"));
    assert_eq!(ctx.record_id.as_deref(), Some("77"));
}

#[test]
fn unknown_object_type_passes_through() {
    let ctx = detect("/contacts/1/record/2-9999/42");
    assert_eq!(ctx.kind, PageKind::Record);
    assert_eq!(ctx.object_type.as_deref(), Some("2-9999"));
}

#[test]
fn custom_object_type_mapping() {
    let ctx = ContextDetector::new()
        .with_object_type("2-9999", "subscription")
        .detect("/contacts/1/record/2-9999/42");
    assert_eq!(ctx.object_type.as_deref(), Some("subscription"));
}

#[test]
fn legacy_record_page() {
    let ctx = detect("/contacts/55/company/808");
    assert_eq!(ctx.kind, PageKind::Record);
    assert_eq!(ctx.object_type.as_deref(), Some("company"));
    assert_eq!(ctx.record_id.as_deref(), Some("808"));
    assert!(ctx.record_key().is_some());
}

#[test]
fn index_pages_only_carry_tenant() {
    for address in [
        "https://app.example.com/contacts/123/objects/0-3/views/all/list",
        "https://app.example.com/contacts/123/deals",
    ] {
        let ctx = detect(address);
        assert_eq!(ctx.kind, PageKind::Index, "{address}");
        assert_eq!(ctx.tenant_id.as_deref(), Some("123"));
        assert_eq!(ctx.object_type, None);
        assert_eq!(ctx.record_id, None);
        assert!(ctx.record_key().is_none());
    }
}

#[test]
fn other_pages_are_unsupported() {
    for address in [
        "https://app.example.com/settings/123/users",
        "https://app.example.com/",
        "",
        "not a url at all",
        "/contacts/abc/record/0-3/456",
    ] {
        let ctx = detect(address);
        assert_eq!(ctx.kind, PageKind::Unsupported, "{address}");
        assert!(!ctx.is_supported());
    }
}

#[test]
fn canonical_object_type_lookup() {
    let detector = ContextDetector::new();
    assert_eq!(detector.canonical_object_type("0-5"), "ticket");
    assert_eq!(detector.canonical_object_type("0-136"), "lead");
    assert_eq!(detector.canonical_object_type("x"), "x");
}
