//! Rule matching.
//!
//! [`match_rules`] is a pure function of its inputs: the same rules,
//! properties and context always give the same ordered result.

use crate::operator::evaluate;
use pagecue_types::{Condition, FeatureCategory, Logic, PageContext, PropertyMap, Rule};
use serde::Serialize;
use tracing::debug;

/// Rules that passed filtering, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchResult {
    rules: Vec<Rule>,
}

impl MatchResult {
    /// The matched rules in display order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Iterates matched rules in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Number of matched rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Ids of the matched rules, in order.
    pub fn ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id.as_str()).collect()
    }

    /// Matched rules feeding one renderer category, in order.
    pub fn in_category(&self, category: FeatureCategory) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.category() == category)
    }

    /// Consumes the result, returning the ordered rules.
    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }
}

impl<'a> IntoIterator for &'a MatchResult {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Selects and orders the rules that apply to the current record.
///
/// 1. Disabled rules are dropped.
/// 2. Rules scoped to object types, pipelines or stages are dropped unless
///    the context matches every non-empty scope.
/// 3. A rule matches if `display_on_all` is set or its conditions hold.
/// 4. Survivors are stable-sorted by descending priority.
pub fn match_rules(rules: &[Rule], properties: &PropertyMap, context: &PageContext) -> MatchResult {
    let mut matched: Vec<Rule> = rules
        .iter()
        .filter(|rule| rule.enabled)
        .filter(|rule| in_scope(rule, context))
        .filter(|rule| rule.display_on_all || conditions_hold(rule, properties))
        .cloned()
        .collect();

    // `sort_by` is stable, so equal priorities keep collection order.
    matched.sort_by(|a, b| b.priority.cmp(&a.priority));

    debug!("{} of {} rules matched", matched.len(), rules.len());
    MatchResult { rules: matched }
}

/// Returns true if the rule's object-type, pipeline and stage scopes all
/// admit the context. An empty scope admits everything; a non-empty scope
/// never admits a context value that is missing.
pub fn in_scope(rule: &Rule, context: &PageContext) -> bool {
    scope_admits(&rule.object_types, context.object_type.as_deref())
        && scope_admits(&rule.pipelines, context.pipeline.as_deref())
        && scope_admits(&rule.stages, context.stage.as_deref())
}

/// Evaluates the rule's conditions under its logic. No conditions is true.
pub fn conditions_hold(rule: &Rule, properties: &PropertyMap) -> bool {
    if rule.conditions.is_empty() {
        return true;
    }
    match rule.logic {
        Logic::And => rule.conditions.iter().all(|c| condition_holds(c, properties)),
        Logic::Or => rule.conditions.iter().any(|c| condition_holds(c, properties)),
    }
}

/// Evaluates one condition. A property missing from the map reads as empty.
pub fn condition_holds(condition: &Condition, properties: &PropertyMap) -> bool {
    let actual = properties.get(&condition.property).unwrap_or("");
    evaluate(&condition.operator, actual, &condition.value)
}

fn scope_admits(scope: &[String], actual: Option<&str>) -> bool {
    if scope.is_empty() {
        return true;
    }
    let Some(actual) = actual.map(str::trim) else {
        return false;
    };
    scope
        .iter()
        .any(|allowed| allowed.trim().eq_ignore_ascii_case(actual))
}
