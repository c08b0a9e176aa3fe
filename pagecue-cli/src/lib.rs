//! Shared pieces of the `pagecue` binary: file-backed collaborators and the
//! one-shot evaluation used by `pagecue evaluate`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use pagecue_extract::{lookup_stage, ContextDetector, Html, PropertyExtractor};
use pagecue_rules::match_rules;
use pagecue_sync::{
    FeatureRenderer, HostPage, RecordingRenderer, RenderItem, RenderOrchestrator, RenderReport,
    SyncConfig, SyncHandle, SyncResult,
};
use pagecue_types::{FeatureCategory, PageContext, PropertyMap, StoreSnapshot};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

/// Result of evaluating one saved page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub context: PageContext,
    pub properties: PropertyMap,
    /// Matched rule ids, highest priority first.
    pub matched: Vec<String>,
    /// What each renderer was handed.
    pub items: BTreeMap<FeatureCategory, Vec<RenderItem>>,
    pub render: RenderReport,
}

/// Runs one extract, match and render pass over `html` as if it were shown
/// at `address`. Unsupported addresses yield an empty report.
///
/// `remote` plays the part of remote record data and wins over scraped keys.
pub fn evaluate_page(
    snapshot: &StoreSnapshot,
    html: &str,
    address: &str,
    remote: Option<PropertyMap>,
) -> EvaluationReport {
    let context = ContextDetector::new().detect(address);
    if !context.is_supported() {
        info!("{} is not a record or index page", address);
        return EvaluationReport {
            context,
            properties: PropertyMap::new(),
            matched: Vec::new(),
            items: BTreeMap::new(),
            render: RenderReport::default(),
        };
    }

    let document = Html::parse_document(html);
    let properties =
        PropertyExtractor::new().extract_seeded(&document, remote.unwrap_or_default());
    let hint = lookup_stage(&document, &properties);
    let context = context.with_stage(hint.pipeline, hint.stage);
    let matched = match_rules(&snapshot.rules, &properties, &context);

    let recorders: Vec<(FeatureCategory, Arc<RecordingRenderer>)> = FeatureCategory::ALL
        .into_iter()
        .map(|category| (category, Arc::new(RecordingRenderer::new())))
        .collect();
    let mut orchestrator = RenderOrchestrator::new();
    for (category, recorder) in &recorders {
        orchestrator = orchestrator.with_renderer(*category, recorder.clone());
    }
    let render = orchestrator.render(&matched, &properties, &context, &snapshot.settings);

    let items = recorders
        .iter()
        .map(|(category, recorder)| (*category, recorder.showing()))
        .filter(|(_, items)| !items.is_empty())
        .collect();

    EvaluationReport {
        context,
        matched: matched.ids().into_iter().map(str::to_string).collect(),
        properties,
        items,
        render,
    }
}

/// Reads a store snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<StoreSnapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;
    StoreSnapshot::from_json(&json)
        .with_context(|| format!("Failed to parse rules file {}", path.display()))
}

/// Reads a flat JSON object of remote record properties.
pub fn load_remote(path: &Path) -> Result<PropertyMap> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read remote data {}", path.display()))?;
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&json)
        .with_context(|| format!("Remote data {} is not a JSON object", path.display()))?;
    Ok(PropertyMap::from_flat_json(&object))
}

/// Loads synchronizer timings from TOML. No path, or a path that does not
/// exist, gives the defaults.
pub fn load_sync_config(path: Option<&Path>) -> Result<SyncConfig> {
    let Some(path) = path else {
        return Ok(SyncConfig::default());
    };
    if !path.exists() {
        info!("No config at {}, using defaults", path.display());
        return Ok(SyncConfig::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
}

/// A host page backed by two files: one holding the address, one the HTML.
#[derive(Debug, Clone)]
pub struct FileHostPage {
    address_file: PathBuf,
    html_file: PathBuf,
}

impl FileHostPage {
    pub fn new(address_file: impl Into<PathBuf>, html_file: impl Into<PathBuf>) -> Self {
        Self {
            address_file: address_file.into(),
            html_file: html_file.into(),
        }
    }
}

#[async_trait]
impl HostPage for FileHostPage {
    async fn address(&self) -> SyncResult<String> {
        let address = tokio::fs::read_to_string(&self.address_file).await?;
        Ok(address.trim().to_string())
    }

    async fn document(&self) -> SyncResult<String> {
        Ok(tokio::fs::read_to_string(&self.html_file).await?)
    }
}

/// A renderer that logs what it would show.
#[derive(Debug, Clone, Copy)]
pub struct LogRenderer {
    category: FeatureCategory,
}

impl LogRenderer {
    pub fn new(category: FeatureCategory) -> Self {
        Self { category }
    }

    /// An orchestrator with a log renderer for every category.
    pub fn orchestrator() -> RenderOrchestrator {
        FeatureCategory::ALL
            .into_iter()
            .fold(RenderOrchestrator::new(), |orchestrator, category| {
                orchestrator.with_renderer(category, Arc::new(LogRenderer::new(category)))
            })
    }
}

impl FeatureRenderer for LogRenderer {
    fn render(&self, items: &[RenderItem]) -> SyncResult<()> {
        for item in items {
            info!(
                "[{}] {} (priority {}): {:?}",
                self.category, item.rule_name, item.priority, item.content
            );
        }
        Ok(())
    }

    fn cleanup(&self) {
        debug!("[{}] cleared", self.category);
    }
}

/// What a file modification means to the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    /// The page markup changed.
    Document,
    /// The rules file changed.
    Config,
}

/// Polls `path`'s modification time and turns changes into signals until
/// the synchronizer stops.
pub async fn watch_file(path: PathBuf, period: Duration, change: FileChange, handle: SyncHandle) {
    let mut last = modified(&path).await;
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    while !handle.is_closed() {
        ticker.tick().await;
        let current = modified(&path).await;
        if current == last {
            continue;
        }
        last = current;
        debug!("{} changed", path.display());
        let delivered = match change {
            FileChange::Document => handle.notify_mutation() || !handle.is_closed(),
            FileChange::Config => handle.config_changed().await.is_ok(),
        };
        if !delivered {
            break;
        }
    }
}

async fn modified(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}
