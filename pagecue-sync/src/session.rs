//! Per-page state owned by the synchronizer.

use pagecue_types::{PageContext, PropertyMap, SessionId};
use tokio::task::AbortHandle;

/// Everything tied to one visit of one page.
///
/// A session is created when a supported address is entered and dropped on
/// teardown. Dropping it aborts its pending remote fetch, and any result
/// that still arrives carries a stale [`SessionId`] and is discarded.
#[derive(Debug)]
pub struct PageSession {
    id: SessionId,
    address: String,
    base_context: PageContext,
    context: PageContext,
    properties: PropertyMap,
    remote_properties: PropertyMap,
    fetch: Option<AbortHandle>,
    cycles: u64,
}

impl PageSession {
    /// Starts a session for `address`, whose address-derived context is
    /// `context`.
    pub fn new(address: impl Into<String>, context: PageContext) -> Self {
        Self {
            id: SessionId::new(),
            address: address.into(),
            base_context: context.clone(),
            context,
            properties: PropertyMap::new(),
            remote_properties: PropertyMap::new(),
            fetch: None,
            cycles: 0,
        }
    }

    /// Tags work started for this session.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The address the session was started for.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Context from the address alone, before the stage lookup.
    pub fn base_context(&self) -> &PageContext {
        &self.base_context
    }

    /// Context of the last completed cycle.
    pub fn context(&self) -> &PageContext {
        &self.context
    }

    /// Properties of the last completed cycle.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Remote properties received so far; they seed every later cycle.
    pub fn remote_properties(&self) -> &PropertyMap {
        &self.remote_properties
    }

    /// Completed extract, match and render cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Whether a remote fetch was started and has not delivered yet.
    pub fn is_fetching(&self) -> bool {
        self.fetch.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub(crate) fn attach_fetch(&mut self, handle: AbortHandle) {
        if let Some(previous) = self.fetch.replace(handle) {
            previous.abort();
        }
    }

    pub(crate) fn set_remote_properties(&mut self, properties: PropertyMap) {
        self.remote_properties = properties;
        self.fetch = None;
    }

    pub(crate) fn complete_cycle(&mut self, context: PageContext, properties: PropertyMap) {
        self.context = context;
        self.properties = properties;
        self.cycles += 1;
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
    }
}
