use pagecue_sync::PageSession;
use pagecue_types::{PageContext, PageKind};
use pretty_assertions::assert_eq;

fn deal_context() -> PageContext {
    PageContext {
        kind: PageKind::Record,
        object_type: Some("deal".into()),
        record_id: Some("7".into()),
        tenant_id: Some("1".into()),
        ..PageContext::default()
    }
}

#[test]
fn new_session_starts_empty() {
    let session = PageSession::new("https://app.example.com/contacts/1/record/0-3/7", deal_context());

    assert_eq!(session.address(), "https://app.example.com/contacts/1/record/0-3/7");
    assert_eq!(session.base_context(), &deal_context());
    assert_eq!(session.context(), session.base_context());
    assert!(session.properties().is_empty());
    assert!(session.remote_properties().is_empty());
    assert_eq!(session.cycles(), 0);
    assert!(!session.is_fetching());
}

#[test]
fn every_session_gets_its_own_id() {
    let a = PageSession::new("a", deal_context());
    let b = PageSession::new("a", deal_context());
    assert_ne!(a.id(), b.id());
}
