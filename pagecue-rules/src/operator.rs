//! Condition operators.
//!
//! String operators compare case-insensitively on trimmed text. Numeric
//! operators first reduce both sides to a number (see [`parse_number`]); if
//! either side has no number the comparison is false.

use crate::error::RuleError;
use pagecue_types::normalize_key;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// A supported comparison between a property value and a rule value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    IsEmpty,
    IsNotEmpty,
    InList,
    NotInList,
}

impl Operator {
    /// Every operator, in documentation order.
    pub const ALL: [Operator; 14] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::GreaterEqual,
        Operator::LessEqual,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::InList,
        Operator::NotInList,
    ];

    /// The identifier used in rule definitions.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::GreaterEqual => "greater_equal",
            Operator::LessEqual => "less_equal",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::InList => "in_list",
            Operator::NotInList => "not_in_list",
        }
    }

    /// Unary operators ignore the comparison value.
    pub fn is_unary(self) -> bool {
        matches!(self, Operator::IsEmpty | Operator::IsNotEmpty)
    }

    /// Numeric operators compare parsed numbers, never text.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Operator::GreaterThan | Operator::LessThan | Operator::GreaterEqual | Operator::LessEqual
        )
    }

    /// Applies the operator to a property value and a comparison value.
    pub fn apply(self, actual: &str, expected: &str) -> bool {
        match self {
            Operator::Equals => fold(actual) == fold(expected),
            Operator::NotEquals => fold(actual) != fold(expected),
            Operator::Contains => fold(actual).contains(&fold(expected)),
            Operator::NotContains => !fold(actual).contains(&fold(expected)),
            Operator::StartsWith => fold(actual).starts_with(&fold(expected)),
            Operator::EndsWith => fold(actual).ends_with(&fold(expected)),
            Operator::GreaterThan => compare(actual, expected, |a, b| a > b),
            Operator::LessThan => compare(actual, expected, |a, b| a < b),
            Operator::GreaterEqual => compare(actual, expected, |a, b| a >= b),
            Operator::LessEqual => compare(actual, expected, |a, b| a <= b),
            Operator::IsEmpty => actual.trim().is_empty(),
            Operator::IsNotEmpty => !actual.trim().is_empty(),
            Operator::InList => in_list(actual, expected),
            Operator::NotInList => !in_list(actual, expected),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = RuleError;

    /// Parses an operator id. Spelling variants that normalize to the same
    /// key (`"Greater Than"`, `"greater-than"`) are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == key)
            .ok_or_else(|| RuleError::UnknownOperator(s.to_string()))
    }
}

/// Evaluates `actual <operator> expected`.
///
/// An unknown operator fails closed: the result is `false` and a warning is
/// emitted, so one malformed condition never aborts evaluation of the page.
pub fn evaluate(operator: &str, actual: &str, expected: &str) -> bool {
    match operator.parse::<Operator>() {
        Ok(op) => op.apply(actual, expected),
        Err(e) => {
            warn!("Condition evaluated as false: {}", e);
            false
        }
    }
}

/// Reduces a formatted value to a number.
///
/// Every character other than ASCII digits, `.` and a leading `-` is
/// discarded (`"$1,200.50"` -> `1200.5`, `"-$30"` -> `-30`), then the longest
/// numeric prefix is parsed (`"1.2.3"` -> `1.2`). Returns `None` when no
/// digit survives, which makes every numeric comparison false.
pub fn parse_number(raw: &str) -> Option<f64> {
    let mut filtered = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_digit() || ch == '.' || (ch == '-' && filtered.is_empty()) {
            filtered.push(ch);
        }
    }

    let bytes = filtered.as_bytes();
    let mut end = usize::from(bytes.first() == Some(&b'-'));
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - end - 1;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }
    filtered[..end].parse::<f64>().ok()
}

fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

fn compare(actual: &str, expected: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (parse_number(actual), parse_number(expected)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn in_list(actual: &str, list: &str) -> bool {
    let needle = fold(actual);
    list.split(',')
        .map(fold)
        .filter(|item| !item.is_empty())
        .any(|item| item == needle)
}
