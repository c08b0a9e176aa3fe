//! Declarative display rules.
//!
//! Rules are authored and persisted elsewhere; the JSON shape here mirrors
//! what the configuration store hands out (camelCase field names).

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One `property operator value` test inside a rule.
///
/// The operator is kept as its raw identifier so that an unknown operator
/// only fails its own condition instead of the whole rule set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub property: String,
    pub operator: String,
    /// Comparison value. Numbers and booleans are kept as their JSON text,
    /// arrays become a comma-separated list.
    #[serde(default, deserialize_with = "lenient_value")]
    pub value: String,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let invalid = || -> D::Error {
        de::Error::invalid_type(
            Unexpected::Other("object or nested list"),
            &"a string, number, boolean or list",
        )
    };
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| scalar_text(item).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()
            .map(|items| items.join(",")),
        other => scalar_text(other).ok_or_else(invalid),
    }
}

/// Anything but a JSON integer reads as priority 0.
fn lenient_priority<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_i64().unwrap_or_default())
}

impl Condition {
    /// Creates a condition.
    pub fn new(
        property: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// How a rule's conditions combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    /// Every condition must hold.
    #[default]
    And,
    /// At least one condition must hold.
    Or,
}

impl<'de> Deserialize<'de> for Logic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_uppercase().as_str() {
            "AND" | "" => Ok(Logic::And),
            "OR" => Ok(Logic::Or),
            other => Err(serde::de::Error::unknown_variant(other, &["AND", "OR"])),
        }
    }
}

/// Severity of a banner alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// The renderer family a piece of content belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    /// Alert banners at the top of the record.
    Banner,
    /// Hints attached to a property label.
    Tooltip,
    /// Cards in the side panel.
    SidePanel,
    /// Embedded media in the side panel.
    Media,
}

impl FeatureCategory {
    /// All categories, in render order.
    pub const ALL: [FeatureCategory; 4] = [
        FeatureCategory::Banner,
        FeatureCategory::Tooltip,
        FeatureCategory::SidePanel,
        FeatureCategory::Media,
    ];

    /// Side content is what the external panel surface displays.
    pub fn is_side_content(self) -> bool {
        matches!(self, FeatureCategory::SidePanel | FeatureCategory::Media)
    }

    /// Stable lowercase name, used in logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureCategory::Banner => "banner",
            FeatureCategory::Tooltip => "tooltip",
            FeatureCategory::SidePanel => "side_panel",
            FeatureCategory::Media => "media",
        }
    }
}

impl std::fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a rule shows when it matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleContent {
    Banner {
        title: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        level: AlertLevel,
        #[serde(default)]
        dismissible: bool,
    },
    Tooltip {
        /// Property whose label the tooltip is anchored to.
        property: String,
        text: String,
    },
    SidePanel {
        title: String,
        #[serde(default)]
        body: String,
    },
    Media {
        title: String,
        url: String,
    },
}

impl RuleContent {
    /// The category of renderer that displays this content.
    pub fn category(&self) -> FeatureCategory {
        match self {
            RuleContent::Banner { .. } => FeatureCategory::Banner,
            RuleContent::Tooltip { .. } => FeatureCategory::Tooltip,
            RuleContent::SidePanel { .. } => FeatureCategory::SidePanel,
            RuleContent::Media { .. } => FeatureCategory::Media,
        }
    }

    /// Shorthand for an info banner.
    pub fn banner(title: impl Into<String>, message: impl Into<String>) -> Self {
        RuleContent::Banner {
            title: title.into(),
            message: message.into(),
            level: AlertLevel::Info,
            dismissible: false,
        }
    }

    /// Shorthand for a tooltip on `property`.
    pub fn tooltip(property: impl Into<String>, text: impl Into<String>) -> Self {
        RuleContent::Tooltip {
            property: property.into(),
            text: text.into(),
        }
    }

    /// Shorthand for a side-panel card.
    pub fn side_panel(title: impl Into<String>, body: impl Into<String>) -> Self {
        RuleContent::SidePanel {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Shorthand for an embedded media card.
    pub fn media(title: impl Into<String>, url: impl Into<String>) -> Self {
        RuleContent::Media {
            title: title.into(),
            url: url.into(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// A named, prioritized predicate over record properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub logic: Logic,
    /// Canonical object types the rule applies to; empty means all.
    #[serde(default)]
    pub object_types: Vec<String>,
    /// Pipelines the rule applies to; empty means all.
    #[serde(default)]
    pub pipelines: Vec<String>,
    /// Stages the rule applies to; empty means all.
    #[serde(default)]
    pub stages: Vec<String>,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Skip condition evaluation once the scope filters pass.
    #[serde(default)]
    pub display_on_all: bool,
    pub content: RuleContent,
}

impl Rule {
    /// Creates an enabled, unconditional rule with priority 0.
    pub fn new(id: impl Into<String>, name: impl Into<String>, content: RuleContent) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            conditions: Vec::new(),
            logic: Logic::And,
            object_types: Vec::new(),
            pipelines: Vec::new(),
            stages: Vec::new(),
            priority: 0,
            enabled: true,
            display_on_all: false,
            content,
        }
    }

    /// Adds a condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Sets the condition logic.
    pub fn with_logic(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Restricts the rule to the given object types.
    pub fn with_object_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.object_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts the rule to the given pipelines.
    pub fn with_pipelines<I, S>(mut self, pipelines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pipelines = pipelines.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts the rule to the given stages.
    pub fn with_stages<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stages = stages.into_iter().map(Into::into).collect();
        self
    }

    /// Sets `display_on_all`.
    pub fn display_on_all(mut self, on: bool) -> Self {
        self.display_on_all = on;
        self
    }

    /// Sets `enabled`.
    pub fn enabled(mut self, on: bool) -> Self {
        self.enabled = on;
        self
    }

    /// The category of renderer this rule feeds.
    pub fn category(&self) -> FeatureCategory {
        self.content.category()
    }
}
