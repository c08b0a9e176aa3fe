use pagecue_types::{
    AlertLevel, Condition, FeatureCategory, Logic, PageContext, PageKind, RecordKey, Rule,
    RuleContent, Settings, StoreSnapshot,
};
use pretty_assertions::assert_eq;

// ── Rule JSON ────────────────────────────────────────────────────

#[test]
fn minimal_rule_gets_defaults() {
    let rule: Rule = serde_json::from_str(
        r#"{"id": "r1", "content": {"kind": "banner", "title": "Heads up"}}"#,
    )
    .unwrap();

    assert_eq!(rule.id, "r1");
    assert!(rule.enabled);
    assert!(!rule.display_on_all);
    assert_eq!(rule.priority, 0);
    assert_eq!(rule.logic, Logic::And);
    assert!(rule.conditions.is_empty());
    assert_eq!(
        rule.content,
        RuleContent::Banner {
            title: "Heads up".into(),
            message: String::new(),
            level: AlertLevel::Info,
            dismissible: false,
        }
    );
}

#[test]
fn full_rule_uses_camel_case_fields() {
    let rule: Rule = serde_json::from_str(
        r#"{
            "id": "big-deal",
            "name": "Big deal",
            "conditions": [{"property": "amount", "operator": "greater_than", "value": "25000"}],
            "logic": "or",
            "objectTypes": ["deal"],
            "pipelines": ["default"],
            "stages": ["Demo"],
            "priority": 20,
            "enabled": false,
            "displayOnAll": true,
            "content": {"kind": "side_panel", "title": "Playbook", "body": "Call {{owner}}"}
        }"#,
    )
    .unwrap();

    assert_eq!(rule.logic, Logic::Or);
    assert_eq!(rule.object_types, vec!["deal"]);
    assert_eq!(rule.pipelines, vec!["default"]);
    assert_eq!(rule.stages, vec!["Demo"]);
    assert_eq!(rule.priority, 20);
    assert!(!rule.enabled);
    assert!(rule.display_on_all);
    assert_eq!(
        rule.conditions,
        vec![Condition::new("amount", "greater_than", "25000")]
    );
    assert_eq!(rule.category(), FeatureCategory::SidePanel);
}

#[test]
fn unknown_logic_is_rejected() {
    let err = serde_json::from_str::<Rule>(
        r#"{"id": "r", "logic": "XOR", "content": {"kind": "media", "title": "t", "url": "u"}}"#,
    );
    assert!(err.is_err());
}

#[test]
fn unknown_operator_still_parses() {
    let condition: Condition =
        serde_json::from_str(r#"{"property": "amount", "operator": "roughly"}"#).unwrap();
    assert_eq!(condition.operator, "roughly");
    assert_eq!(condition.value, "");
}

#[test]
fn condition_values_accept_json_scalars() {
    let conditions: Vec<Condition> = serde_json::from_str(
        r#"[
            {"property": "amount", "operator": "greater_than", "value": 25000},
            {"property": "ratio", "operator": "less_than", "value": 0.5},
            {"property": "vip", "operator": "equals", "value": true},
            {"property": "owner", "operator": "is_empty", "value": null},
            {"property": "stage", "operator": "in_list", "value": ["Demo", "Won", 3]}
        ]"#,
    )
    .unwrap();

    let values: Vec<&str> = conditions.iter().map(|c| c.value.as_str()).collect();
    assert_eq!(values, vec!["25000", "0.5", "true", "", "Demo,Won,3"]);
}

#[test]
fn condition_value_rejects_objects() {
    let result = serde_json::from_str::<Condition>(
        r#"{"property": "amount", "operator": "equals", "value": {"n": 1}}"#,
    );
    assert!(result.is_err());
}

#[test]
fn non_integer_priority_reads_as_zero() {
    for priority in ["null", "2.5", "\"high\""] {
        let rule: Rule = serde_json::from_str(&format!(
            r#"{{"id": "r", "priority": {priority}, "content": {{"kind": "banner", "title": "t"}}}}"#
        ))
        .unwrap();
        assert_eq!(rule.priority, 0, "priority {priority}");
    }
}

#[test]
fn builder_sets_scope_and_priority() {
    let rule = Rule::new("r", "Rule", RuleContent::tooltip("amount", "Net of tax"))
        .with_condition(Condition::new("amount", "is_not_empty", ""))
        .with_logic(Logic::Or)
        .with_priority(5)
        .with_object_types(["deal"])
        .with_pipelines(["sales"])
        .with_stages(["demo"])
        .display_on_all(true)
        .enabled(false);

    assert_eq!(rule.conditions.len(), 1);
    assert_eq!(rule.logic, Logic::Or);
    assert_eq!(rule.priority, 5);
    assert_eq!(rule.object_types, vec!["deal"]);
    assert_eq!(rule.pipelines, vec!["sales"]);
    assert_eq!(rule.stages, vec!["demo"]);
    assert!(rule.display_on_all);
    assert!(!rule.enabled);
    assert_eq!(rule.category(), FeatureCategory::Tooltip);
}

// ── Categories & settings ────────────────────────────────────────

#[test]
fn side_content_categories() {
    assert!(FeatureCategory::SidePanel.is_side_content());
    assert!(FeatureCategory::Media.is_side_content());
    assert!(!FeatureCategory::Banner.is_side_content());
    assert!(!FeatureCategory::Tooltip.is_side_content());
    assert_eq!(FeatureCategory::SidePanel.to_string(), "side_panel");
}

#[test]
fn settings_default_to_everything_enabled() {
    let settings: Settings = serde_json::from_str("{}").unwrap();
    assert_eq!(settings, Settings::default());
    for category in FeatureCategory::ALL {
        assert!(settings.allows(category));
    }
}

#[test]
fn settings_toggle_single_category() {
    let settings: Settings = serde_json::from_str(r#"{"tooltipsEnabled": false}"#).unwrap();
    assert!(!settings.allows(FeatureCategory::Tooltip));
    assert!(settings.allows(FeatureCategory::Banner));
    assert!(settings.remote_fetch_enabled);
}

#[test]
fn store_snapshot_from_json() {
    let snapshot = StoreSnapshot::from_json(
        r#"{"rules": [{"id": "a", "content": {"kind": "media", "title": "Demo", "url": "https://v.example/1"}}],
            "settings": {"mediaEnabled": false}}"#,
    )
    .unwrap();
    assert_eq!(snapshot.rules.len(), 1);
    assert!(!snapshot.settings.media_enabled);

    assert!(StoreSnapshot::from_json("not json").is_err());
    assert_eq!(StoreSnapshot::from_json("{}").unwrap(), StoreSnapshot::default());
}

#[test]
fn store_snapshot_skips_malformed_rules() {
    let snapshot = StoreSnapshot::from_json(
        r#"{"rules": [
            {"id": "good", "content": {"kind": "banner", "title": "Kept"}},
            {"id": "no-content"},
            {"id": "bad-logic", "logic": "XOR", "content": {"kind": "banner", "title": "t"}},
            "not a rule",
            {"id": "numeric", "priority": null,
             "conditions": [{"property": "amount", "operator": "greater_than", "value": 25000}],
             "content": {"kind": "banner", "title": "Also kept"}}
        ]}"#,
    )
    .unwrap();

    let ids: Vec<&str> = snapshot.rules.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["good", "numeric"]);
    assert_eq!(snapshot.rules[1].conditions[0].value, "25000");
}

#[test]
fn store_snapshot_null_rules_is_empty() {
    let snapshot = StoreSnapshot::from_json(r#"{"rules": null}"#).unwrap();
    assert!(snapshot.rules.is_empty());
}

// ── PageContext ──────────────────────────────────────────────────

#[test]
fn record_key_requires_full_record_context() {
    let context = PageContext {
        kind: PageKind::Record,
        object_type: Some("deal".into()),
        record_id: Some("42".into()),
        tenant_id: Some("9001".into()),
        ..Default::default()
    };
    let key = context.record_key().unwrap();
    assert_eq!(
        key,
        RecordKey {
            tenant_id: "9001".into(),
            object_type: "deal".into(),
            record_id: "42".into(),
        }
    );
    assert_eq!(key.to_string(), "9001/deal/42");

    let index = PageContext {
        kind: PageKind::Index,
        ..context.clone()
    };
    assert!(index.record_key().is_none());

    let missing_tenant = PageContext {
        tenant_id: None,
        ..context
    };
    assert!(missing_tenant.record_key().is_none());
}

#[test]
fn unsupported_context_is_not_actionable() {
    let context = PageContext::unsupported();
    assert!(!context.is_supported());
    assert!(!context.is_record());
    let staged = context.with_stage(Some("sales".into()), Some("Demo".into()));
    assert_eq!(staged.pipeline.as_deref(), Some("sales"));
    assert_eq!(staged.stage.as_deref(), Some("Demo"));
}
