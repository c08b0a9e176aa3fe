//! Render orchestration.
//!
//! The orchestrator owns one optional [`FeatureRenderer`] per
//! [`FeatureCategory`]. Each render first tears down everything the previous
//! render injected, then hands each renderer only the items of its own
//! category. A renderer that is missing or fails is reported and skipped;
//! the others still run.

use crate::error::{SyncError, SyncResult};
use pagecue_rules::MatchResult;
use pagecue_types::{FeatureCategory, PageContext, PropertyMap, Rule, RuleContent, Settings};
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, LazyLock, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, warn};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^}]+?)\s*\}\}").expect("static regex"));

/// One matched rule, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderItem {
    pub rule_id: String,
    pub rule_name: String,
    pub priority: i64,
    pub content: RuleContent,
}

impl RenderItem {
    /// Builds an item from `rule`, filling `{{ key }}` placeholders from
    /// `properties`.
    pub fn from_rule(rule: &Rule, properties: &PropertyMap) -> Self {
        Self {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            priority: rule.priority,
            content: interpolate_content(&rule.content, properties),
        }
    }

    pub fn category(&self) -> FeatureCategory {
        self.content.category()
    }
}

/// Replaces `{{ key }}` with the property value; unknown keys become empty.
pub fn interpolate(template: &str, properties: &PropertyMap) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            properties.get(&caps[1]).unwrap_or_default().to_string()
        })
        .into_owned()
}

fn interpolate_content(content: &RuleContent, properties: &PropertyMap) -> RuleContent {
    match content {
        RuleContent::Banner {
            title,
            message,
            level,
            dismissible,
        } => RuleContent::Banner {
            title: title.clone(),
            message: interpolate(message, properties),
            level: *level,
            dismissible: *dismissible,
        },
        RuleContent::Tooltip { property, text } => RuleContent::Tooltip {
            property: property.clone(),
            text: interpolate(text, properties),
        },
        RuleContent::SidePanel { title, body } => RuleContent::SidePanel {
            title: title.clone(),
            body: interpolate(body, properties),
        },
        RuleContent::Media { .. } => content.clone(),
    }
}

/// Displays one category of content inside the host page.
///
/// A panic inside `render` or `cleanup` is caught and treated like an error
/// return when panics unwind. Builds with `panic = "abort"` cannot recover,
/// so implementations should report failures through the `Result`.
pub trait FeatureRenderer: Send + Sync {
    /// Shows `items`, highest priority first.
    fn render(&self, items: &[RenderItem]) -> SyncResult<()>;

    /// Removes everything this renderer injected. Must be idempotent.
    fn cleanup(&self);
}

/// Payload of the side-content notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelMessage {
    pub context: PageContext,
    pub items: Vec<RenderItem>,
}

/// Outbound surface for side-panel and media items.
pub trait PanelNotifier: Send + Sync {
    fn notify(&self, message: PanelMessage) -> SyncResult<()>;
}

/// A [`PanelNotifier`] that forwards messages over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<PanelMessage>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PanelMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PanelNotifier for ChannelNotifier {
    fn notify(&self, message: PanelMessage) -> SyncResult<()> {
        self.tx.send(message).map_err(|_| SyncError::ChannelClosed)
    }
}

/// What happened to each category during one render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    /// Categories whose renderer accepted its items.
    pub rendered: Vec<FeatureCategory>,
    /// Categories whose renderer returned an error.
    pub failed: Vec<FeatureCategory>,
    /// Categories with items but no registered renderer.
    pub unavailable: Vec<FeatureCategory>,
}

impl RenderReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.unavailable.is_empty()
    }
}

/// Groups matched rules by category and delegates them to the renderers.
#[derive(Default)]
pub struct RenderOrchestrator {
    renderers: HashMap<FeatureCategory, Arc<dyn FeatureRenderer>>,
    notifier: Option<Arc<dyn PanelNotifier>>,
    live: bool,
}

impl RenderOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the renderer for `category`, replacing any previous one.
    pub fn with_renderer(
        mut self,
        category: FeatureCategory,
        renderer: Arc<dyn FeatureRenderer>,
    ) -> Self {
        self.renderers.insert(category, renderer);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn PanelNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn has_renderer(&self, category: FeatureCategory) -> bool {
        self.renderers.contains_key(&category)
    }

    /// Whether anything is currently injected.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Builds the items for `category`, in match order.
    ///
    /// Tooltips are only produced for properties present in the map, since
    /// there is no label to anchor them to otherwise.
    pub fn items_for(
        category: FeatureCategory,
        matched: &MatchResult,
        properties: &PropertyMap,
    ) -> Vec<RenderItem> {
        matched
            .in_category(category)
            .filter(|rule| match &rule.content {
                RuleContent::Tooltip { property, .. } => properties.contains_key(property),
                _ => true,
            })
            .map(|rule| RenderItem::from_rule(rule, properties))
            .collect()
    }

    /// Tears down the previous render, then renders `matched`.
    pub fn render(
        &mut self,
        matched: &MatchResult,
        properties: &PropertyMap,
        context: &PageContext,
        settings: &Settings,
    ) -> RenderReport {
        self.teardown();

        let mut report = RenderReport::default();
        let mut side_items = Vec::new();

        for category in FeatureCategory::ALL {
            if !settings.allows(category) {
                debug!("Category {} disabled by settings", category);
                continue;
            }
            let items = Self::items_for(category, matched, properties);
            if items.is_empty() {
                continue;
            }
            if category.is_side_content() {
                side_items.extend(items.iter().cloned());
            }

            let Some(renderer) = self.renderers.get(&category) else {
                debug!("No renderer for {}, skipping {} items", category, items.len());
                report.unavailable.push(category);
                continue;
            };
            self.live = true;
            match panic::catch_unwind(AssertUnwindSafe(|| renderer.render(&items))) {
                Ok(Ok(())) => report.rendered.push(category),
                Ok(Err(e)) => {
                    warn!("Renderer for {} failed: {}", category, e);
                    report.failed.push(category);
                }
                Err(_) => {
                    warn!("Renderer for {} panicked", category);
                    report.failed.push(category);
                }
            }
        }

        if let Some(notifier) = &self.notifier {
            let message = PanelMessage {
                context: context.clone(),
                items: side_items,
            };
            if let Err(e) = notifier.notify(message) {
                warn!("Panel notification failed: {}", e);
            }
        }

        report
    }

    /// Removes everything injected by the last render. A second call without
    /// a render in between does nothing. Returns true if anything was live.
    pub fn teardown(&mut self) -> bool {
        if !self.live {
            return false;
        }
        for (category, renderer) in &self.renderers {
            if panic::catch_unwind(AssertUnwindSafe(|| renderer.cleanup())).is_err() {
                warn!("Cleanup for {} panicked", category);
            }
        }
        self.live = false;
        true
    }
}

/// A renderer that records what it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    state: Mutex<Recorded>,
    fail: bool,
}

#[derive(Debug, Default)]
struct Recorded {
    renders: Vec<Vec<RenderItem>>,
    showing: Vec<RenderItem>,
    cleanups: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A renderer whose every render fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Every item list passed to `render`, in call order.
    pub fn renders(&self) -> Vec<Vec<RenderItem>> {
        self.state().renders.clone()
    }

    pub fn render_count(&self) -> usize {
        self.state().renders.len()
    }

    /// What is on screen now (empty after cleanup).
    pub fn showing(&self) -> Vec<RenderItem> {
        self.state().showing.clone()
    }

    pub fn cleanup_count(&self) -> usize {
        self.state().cleanups
    }
}

impl FeatureRenderer for RecordingRenderer {
    fn render(&self, items: &[RenderItem]) -> SyncResult<()> {
        let mut state = self.state();
        state.renders.push(items.to_vec());
        if self.fail {
            return Err(SyncError::Render("renderer unavailable".to_string()));
        }
        state.showing = items.to_vec();
        Ok(())
    }

    fn cleanup(&self) {
        let mut state = self.state();
        state.showing.clear();
        state.cleanups += 1;
    }
}
