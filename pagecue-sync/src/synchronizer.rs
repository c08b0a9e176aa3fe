//! The page synchronizer.
//!
//! A single task that keeps the overlays in step with the host page:
//!
//! ```text
//! Idle -> WaitingForReady -> Ready -> Watching -> Reinitializing -> WaitingForReady ...
//!                                                              \-> Idle (unsupported page)
//! Disabled (no readable page address, terminal)
//! ```
//!
//! All inputs arrive through one `select!` loop (signals, the address poll,
//! the debounce deadline and remote results), so cycles never overlap and a
//! navigation always cancels whatever the old page had pending.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::host::HostPage;
use crate::remote::RemoteFetcher;
use crate::render::{RenderOrchestrator, RenderReport};
use crate::session::PageSession;
use crate::store::ConfigStore;
use crate::timer::{Debounce, RetryBudget};
use pagecue_extract::{lookup_stage, ContextDetector, Html, PropertyExtractor};
use pagecue_rules::match_rules;
use pagecue_types::{PageContext, PropertyMap, SessionId, StoreSnapshot};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Where the synchronizer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    WaitingForReady,
    Ready,
    Watching,
    Reinitializing,
    Disabled,
}

/// Inputs from the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSignal {
    /// The document changed.
    Mutation,
    /// Back/forward navigation.
    PopState,
    /// The configuration store reported new data.
    ConfigChanged,
    /// Tear down and stop.
    Shutdown,
}

/// Why a cycle ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleTrigger {
    /// First cycle after the page became ready.
    Initial,
    /// Debounced document mutations.
    Mutation,
    /// The store changed while watching.
    ConfigChanged,
    /// Remote record data arrived.
    RemoteData,
}

/// Outcome of one extract, match and render cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub session: SessionId,
    pub trigger: CycleTrigger,
    pub context: PageContext,
    pub property_count: usize,
    /// Matched rule ids, highest priority first.
    pub matched: Vec<String>,
    pub render: RenderReport,
}

/// Observable progress of the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    PhaseChanged(SyncPhase),
    CycleCompleted(CycleReport),
    ReadinessTimedOut { attempts: u32 },
    TornDown { session: SessionId },
    Disabled { reason: String },
    RemoteDataMerged { session: SessionId, keys: usize },
}

/// Sends [`PageSignal`]s to a running [`PageSynchronizer`].
///
/// The synchronizer stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    tx: mpsc::Sender<PageSignal>,
}

impl SyncHandle {
    /// Reports a document mutation without waiting. Returns false if the
    /// signal was dropped because the channel is full or closed.
    pub fn notify_mutation(&self) -> bool {
        self.tx.try_send(PageSignal::Mutation).is_ok()
    }

    /// Reports back/forward navigation.
    pub async fn pop_state(&self) -> SyncResult<()> {
        self.send(PageSignal::PopState).await
    }

    /// Reports that the configuration store changed.
    pub async fn config_changed(&self) -> SyncResult<()> {
        self.send(PageSignal::ConfigChanged).await
    }

    /// Asks the synchronizer to tear down and stop.
    pub async fn shutdown(&self) -> SyncResult<()> {
        self.send(PageSignal::Shutdown).await
    }

    /// Returns true once the synchronizer has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Completes once the synchronizer has stopped.
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    async fn send(&self, signal: PageSignal) -> SyncResult<()> {
        self.tx
            .send(signal)
            .await
            .map_err(|_| SyncError::ChannelClosed)
    }
}

struct RemoteResult {
    session: SessionId,
    result: SyncResult<PropertyMap>,
}

enum Flow {
    Navigate(String),
    Park(String),
    Shutdown,
}

/// Drives detection, extraction, matching and rendering for one page.
pub struct PageSynchronizer {
    config: SyncConfig,
    host: Arc<dyn HostPage>,
    store: Arc<dyn ConfigStore>,
    remote: Option<Arc<dyn RemoteFetcher>>,
    orchestrator: RenderOrchestrator,
    extractor: PropertyExtractor,
    detector: ContextDetector,
    snapshot: StoreSnapshot,
    phase: SyncPhase,
    session: Option<PageSession>,
    debounce: Debounce,
    signals: mpsc::Receiver<PageSignal>,
    events: mpsc::UnboundedSender<SyncEvent>,
    remote_tx: mpsc::UnboundedSender<RemoteResult>,
    remote_rx: mpsc::UnboundedReceiver<RemoteResult>,
}

impl PageSynchronizer {
    /// Creates a synchronizer together with its signal handle and event
    /// stream. Nothing happens until [`Self::run`] is awaited.
    pub fn new(
        config: SyncConfig,
        host: Arc<dyn HostPage>,
        store: Arc<dyn ConfigStore>,
        orchestrator: RenderOrchestrator,
    ) -> (Self, SyncHandle, mpsc::UnboundedReceiver<SyncEvent>) {
        let (signal_tx, signals) = mpsc::channel(config.signal_capacity.max(1));
        let (events, event_rx) = mpsc::unbounded_channel();
        let (remote_tx, remote_rx) = mpsc::unbounded_channel();

        let sync = Self {
            config,
            host,
            store,
            remote: None,
            orchestrator,
            extractor: PropertyExtractor::default(),
            detector: ContextDetector::default(),
            snapshot: StoreSnapshot::default(),
            phase: SyncPhase::Idle,
            session: None,
            debounce: Debounce::new(),
            signals,
            events,
            remote_tx,
            remote_rx,
        };
        (sync, SyncHandle { tx: signal_tx }, event_rx)
    }

    /// Attaches a remote source for record pages.
    pub fn with_remote(mut self, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        self.remote = Some(fetcher);
        self
    }

    pub fn with_extractor(mut self, extractor: PropertyExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_detector(mut self, detector: ContextDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&PageSession> {
        self.session.as_ref()
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    /// Runs until shutdown.
    ///
    /// An unsupported first page parks in [`SyncPhase::Idle`] until the host
    /// navigates somewhere recognized. Only a host whose address cannot be
    /// read at all ends in [`SyncPhase::Disabled`].
    pub async fn run(mut self) -> SyncResult<()> {
        self.reload_store().await;

        let address = match self.host.address().await {
            Ok(address) => address,
            Err(e) => {
                warn!("Page address unavailable, disabling: {}", e);
                self.set_phase(SyncPhase::Disabled);
                self.emit(SyncEvent::Disabled {
                    reason: e.to_string(),
                });
                return Ok(());
            }
        };

        let mut flow = Flow::Navigate(address);
        loop {
            flow = match flow {
                Flow::Navigate(address) => self.enter(address).await,
                Flow::Park(address) => self.park(address).await,
                Flow::Shutdown => break,
            };
        }

        self.teardown();
        info!("Page synchronizer stopped");
        Ok(())
    }

    // ── Lifecycle ────────────────────────────────────────────────

    async fn enter(&mut self, address: String) -> Flow {
        let context = self.detector.detect(&address);
        if !context.is_supported() {
            debug!("{} is not supported, waiting for navigation", address);
            return Flow::Park(address);
        }

        let mut session = PageSession::new(address.clone(), context);
        self.start_remote_fetch(&mut session);
        info!("Session {} started for {}", session.id(), address);
        self.session = Some(session);

        self.set_phase(SyncPhase::WaitingForReady);
        if let Some(flow) = self.wait_for_ready(&address).await {
            return flow;
        }

        self.set_phase(SyncPhase::Ready);
        self.run_cycle(CycleTrigger::Initial).await;
        self.set_phase(SyncPhase::Watching);
        self.watch(&address).await
    }

    /// Polls readiness on a fixed interval with a capped budget. Returns a
    /// flow if the wait was interrupted, `None` to proceed.
    async fn wait_for_ready(&mut self, address: &str) -> Option<Flow> {
        let mut poll = time::interval(self.config.ready_poll());
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut budget = RetryBudget::new(self.config.ready_max_attempts);

        loop {
            tokio::select! {
                biased;

                signal = self.signals.recv() => match signal {
                    None | Some(PageSignal::Shutdown) => return Some(Flow::Shutdown),
                    Some(PageSignal::PopState) => return Some(self.pop_state(address).await),
                    Some(PageSignal::ConfigChanged) => self.reload_store().await,
                    Some(PageSignal::Mutation) => {}
                },
                _ = poll.tick() => {
                    if let Some(next) = self.poll_address(address).await {
                        return Some(self.reinitialize(next));
                    }
                    if !budget.try_consume() {
                        warn!("Page not ready after {} checks, proceeding", budget.attempts());
                        self.emit(SyncEvent::ReadinessTimedOut {
                            attempts: budget.attempts(),
                        });
                        return None;
                    }
                    if self.host.is_ready().await {
                        debug!("Page ready after {} checks", budget.attempts());
                        return None;
                    }
                }
            }
        }
    }

    async fn watch(&mut self, address: &str) -> Flow {
        let mut address_poll = self.address_interval();

        loop {
            tokio::select! {
                biased;

                signal = self.signals.recv() => match signal {
                    None | Some(PageSignal::Shutdown) => return Flow::Shutdown,
                    Some(PageSignal::PopState) => return self.pop_state(address).await,
                    Some(PageSignal::Mutation) => self.debounce.schedule(self.config.debounce()),
                    Some(PageSignal::ConfigChanged) => {
                        self.reload_store().await;
                        self.debounce.cancel();
                        self.run_cycle(CycleTrigger::ConfigChanged).await;
                    }
                },
                _ = address_poll.tick() => {
                    if let Some(next) = self.poll_address(address).await {
                        return self.reinitialize(next);
                    }
                }
                Some(remote) = self.remote_rx.recv() => self.accept_remote(remote).await,
                _ = self.debounce.elapsed() => {
                    self.debounce.cancel();
                    self.run_cycle(CycleTrigger::Mutation).await;
                }
            }
        }
    }

    /// Waits on an unsupported page until the address changes.
    async fn park(&mut self, address: String) -> Flow {
        self.set_phase(SyncPhase::Idle);
        let mut address_poll = self.address_interval();

        loop {
            tokio::select! {
                biased;

                signal = self.signals.recv() => match signal {
                    None | Some(PageSignal::Shutdown) => return Flow::Shutdown,
                    Some(PageSignal::PopState) => {
                        if let Some(next) = self.poll_address(&address).await {
                            return Flow::Navigate(next);
                        }
                    }
                    Some(PageSignal::ConfigChanged) => self.reload_store().await,
                    Some(PageSignal::Mutation) => {}
                },
                _ = address_poll.tick() => {
                    if let Some(next) = self.poll_address(&address).await {
                        return Flow::Navigate(next);
                    }
                }
                Some(remote) = self.remote_rx.recv() => self.accept_remote(remote).await,
            }
        }
    }

    async fn pop_state(&mut self, current: &str) -> Flow {
        let next = match self.host.address().await {
            Ok(address) => address,
            Err(e) => {
                warn!("Failed to read address after history navigation: {}", e);
                current.to_string()
            }
        };
        debug!("History navigation to {}", next);
        self.reinitialize(next)
    }

    fn reinitialize(&mut self, next: String) -> Flow {
        self.set_phase(SyncPhase::Reinitializing);
        self.teardown();
        Flow::Navigate(next)
    }

    /// Cancels pending work, removes all injected UI and drops the session.
    /// Safe to call repeatedly.
    fn teardown(&mut self) {
        if self.debounce.cancel() {
            debug!("Canceled pending cycle");
        }
        self.orchestrator.teardown();
        if let Some(session) = self.session.take() {
            debug!(
                "Session {} torn down after {} cycles",
                session.id(),
                session.cycles()
            );
            self.emit(SyncEvent::TornDown {
                session: session.id(),
            });
        }
    }

    // ── Cycle ────────────────────────────────────────────────────

    async fn run_cycle(&mut self, trigger: CycleTrigger) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let session_id = session.id();
        let seed = session.remote_properties().clone();
        let base = session.base_context().clone();

        let html = match self.host.document().await {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to read document: {}", e);
                String::new()
            }
        };

        let (properties, context, matched) = {
            let document = Html::parse_document(&html);
            let properties = self.extractor.extract_seeded(&document, seed);
            let hint = lookup_stage(&document, &properties);
            let context = base.with_stage(hint.pipeline, hint.stage);
            let matched = match_rules(&self.snapshot.rules, &properties, &context);
            (properties, context, matched)
        };

        let render = self.orchestrator.render(
            &matched,
            &properties,
            &context,
            &self.snapshot.settings,
        );
        let report = CycleReport {
            session: session_id,
            trigger,
            context: context.clone(),
            property_count: properties.len(),
            matched: matched.ids().into_iter().map(str::to_string).collect(),
            render,
        };
        info!(
            "Cycle {:?} for session {}: {} properties, {} rules matched",
            trigger,
            session_id,
            report.property_count,
            report.matched.len()
        );

        if let Some(session) = self.session.as_mut() {
            session.complete_cycle(context, properties);
        }
        self.emit(SyncEvent::CycleCompleted(report));
    }

    // ── Collaborators ────────────────────────────────────────────

    async fn reload_store(&mut self) {
        match self.store.load().await {
            Ok(snapshot) => {
                debug!("Loaded {} rules", snapshot.rules.len());
                self.snapshot = snapshot;
            }
            Err(e) => warn!("Failed to load configuration, keeping previous rules: {}", e),
        }
    }

    async fn poll_address(&self, current: &str) -> Option<String> {
        match self.host.address().await {
            Ok(address) if address != current => {
                debug!("Address changed: {} -> {}", current, address);
                Some(address)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read page address: {}", e);
                None
            }
        }
    }

    fn start_remote_fetch(&self, session: &mut PageSession) {
        let Some(fetcher) = &self.remote else {
            return;
        };
        if !self.snapshot.settings.remote_fetch_enabled {
            debug!("Remote fetch disabled by settings");
            return;
        }
        let Some(key) = session.base_context().record_key() else {
            return;
        };

        let fetcher = Arc::clone(fetcher);
        let tx = self.remote_tx.clone();
        let session_id = session.id();
        let task = tokio::spawn(async move {
            let result = fetcher.fetch(&key).await;
            let _ = tx.send(RemoteResult {
                session: session_id,
                result,
            });
        });
        session.attach_fetch(task.abort_handle());
    }

    async fn accept_remote(&mut self, remote: RemoteResult) {
        let current = self.session.as_ref().map(PageSession::id);
        if current != Some(remote.session) {
            warn!("Discarding remote data for stale session {}", remote.session);
            return;
        }

        match remote.result {
            Ok(properties) => {
                let keys = properties.len();
                if let Some(session) = self.session.as_mut() {
                    session.set_remote_properties(properties);
                }
                self.emit(SyncEvent::RemoteDataMerged {
                    session: remote.session,
                    keys,
                });
                if self.phase == SyncPhase::Watching {
                    self.run_cycle(CycleTrigger::RemoteData).await;
                }
            }
            Err(e) => warn!("Remote fetch for session {} failed: {}", remote.session, e),
        }
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn address_interval(&self) -> Interval {
        let period = self.config.address_poll();
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    fn set_phase(&mut self, phase: SyncPhase) {
        if self.phase == phase {
            return;
        }
        debug!("Phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.emit(SyncEvent::PhaseChanged(phase));
    }

    fn emit(&self, event: SyncEvent) {
        let _ = self.events.send(event);
    }
}
