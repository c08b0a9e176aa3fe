//! Feature toggles and the store snapshot.

use crate::rule::{FeatureCategory, Rule};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

fn enabled() -> bool {
    true
}

/// Feature toggles read from the configuration store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "enabled")]
    pub banners_enabled: bool,
    #[serde(default = "enabled")]
    pub tooltips_enabled: bool,
    #[serde(default = "enabled")]
    pub side_panel_enabled: bool,
    #[serde(default = "enabled")]
    pub media_enabled: bool,
    #[serde(default = "enabled")]
    pub remote_fetch_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            banners_enabled: true,
            tooltips_enabled: true,
            side_panel_enabled: true,
            media_enabled: true,
            remote_fetch_enabled: true,
        }
    }
}

impl Settings {
    /// Whether content of `category` may be shown.
    pub fn allows(&self, category: FeatureCategory) -> bool {
        match category {
            FeatureCategory::Banner => self.banners_enabled,
            FeatureCategory::Tooltip => self.tooltips_enabled,
            FeatureCategory::SidePanel => self.side_panel_enabled,
            FeatureCategory::Media => self.media_enabled,
        }
    }
}

/// Everything the configuration store hands out in one read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Rules that failed to parse are left out; the rest still load.
    #[serde(default, deserialize_with = "skip_malformed_rules")]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub settings: Settings,
}

fn skip_malformed_rules<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Rule>, D::Error> {
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let total = raw.len();
    let rules: Vec<Rule> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let id = value
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{index}"));
            match serde_json::from_value::<Rule>(value) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    warn!("Skipping malformed rule {}: {}", id, e);
                    None
                }
            }
        })
        .collect();
    if rules.len() < total {
        warn!("Loaded {} of {} rules", rules.len(), total);
    }
    Ok(rules)
}

impl StoreSnapshot {
    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Creates a snapshot with default settings.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            settings: Settings::default(),
        }
    }
}
