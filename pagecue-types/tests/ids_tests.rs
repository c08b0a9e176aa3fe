use pagecue_types::SessionId;
use std::collections::HashSet;

#[test]
fn session_id_new_is_unique() {
    let a = SessionId::new();
    let b = SessionId::new();
    assert_ne!(a, b);
}

#[test]
fn session_ids_sort_by_creation() {
    let first = SessionId::new().to_string();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = SessionId::new().to_string();
    assert!(first < second);
}

#[test]
fn session_id_hash_and_eq() {
    let id = SessionId::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}

#[test]
fn session_id_serializes_as_plain_string() {
    let id = SessionId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
    let parsed: SessionId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, parsed);
}
