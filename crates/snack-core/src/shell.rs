//! Main shell state container
//!
//! Ties the session manager, the navigation allow-list and the mounted
//! rendering hosts together. The presentation layer drives it with user
//! actions and host events and re-renders from `snapshot()`.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use snack_policy::AllowList;
use snack_session::{
    AppLifecycle, LastLocation, LifecycleEvents, LifecycleSubscription, Phase, SessionManager,
};
use snack_storage::{Database, KeyValueStore};
use snack_tabs::{CloseOutcome, Tab};
use snack_watchdog::{HostMessage, InjectedScript};

use crate::config::Config;
use crate::host::{HostRegistry, RenderingHost};
use crate::Result;

/// Blank document a webview starts from before its first load
const BLANK_PAGE: &str = "about:blank";

/// One entry of the tab strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabView {
    pub id: String,
    pub label: String,
    pub url: String,
    pub render_key: String,
    pub connected: bool,
    pub is_active: bool,
}

/// Everything the presentation needs to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellSnapshot {
    pub phase: Phase,
    pub tabs: Vec<TabView>,
    pub active_tab_id: Option<String>,
    pub show_reconnect: bool,
}

pub struct Shell {
    /// Configuration
    config: Config,
    /// Session manager (owns the tabs and the active pointer)
    session_manager: SessionManager,
    /// Navigation allow-list
    allow_list: Arc<AllowList>,
    /// Mounted rendering hosts
    hosts: HostRegistry,
    /// Lifecycle subscription, released on detach
    lifecycle: Arc<Mutex<Option<LifecycleSubscription>>>,
}

impl Shell {
    /// Open the settings database at `config.database_path`; location writes
    /// happen inline
    pub fn open(config: Config) -> Result<Self> {
        let db = Database::open(&config.database_path)?;
        Ok(Self::with_last_location(config, LastLocation::new(Arc::new(db))))
    }

    /// Like `open`, with location writes queued on `runtime`
    pub fn open_with_runtime(config: Config, runtime: &tokio::runtime::Handle) -> Result<Self> {
        let db = Database::open(&config.database_path)?;
        let last_location = LastLocation::spawn_writer(Arc::new(db), runtime);
        Ok(Self::with_last_location(config, last_location))
    }

    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_last_location(config, LastLocation::new(store))
    }

    fn with_last_location(config: Config, last_location: LastLocation) -> Self {
        let session_manager = SessionManager::new(last_location, config.default_url.clone());
        let allow_list = Arc::new(config.allow_list());

        Self {
            config,
            session_manager,
            allow_list,
            hosts: HostRegistry::new(),
            lifecycle: Arc::new(Mutex::new(None)),
        }
    }

    /// Load the last location and create the first tab
    pub fn initialize(&self) -> Result<Tab> {
        let tab = self.session_manager.initialize()?;
        tracing::info!(
            allowed_domains = self.allow_list.len(),
            "Shell initialized"
        );
        Ok(tab)
    }

    pub fn phase(&self) -> Phase {
        self.session_manager.phase()
    }

    // === Tab operations ===

    pub fn open_new_session(&self) -> Result<Tab> {
        Ok(self.session_manager.open_new_session()?)
    }

    pub fn activate(&self, tab_id: &str) -> Result<Tab> {
        Ok(self.session_manager.activate(tab_id)?)
    }

    /// Close a tab and drop its rendering host
    pub fn close_session(&self, tab_id: &str) -> Result<CloseOutcome> {
        let outcome = self.session_manager.close_session(tab_id)?;
        self.hosts.unregister(&outcome.closed.id);
        Ok(outcome)
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.session_manager.tabs()
    }

    pub fn active_tab(&self) -> Option<Tab> {
        self.session_manager.active_tab()
    }

    // === Rendering host events ===

    /// Interception point consulted before a tab commits a navigation
    pub fn should_allow_navigation(&self, url: &str) -> bool {
        if is_internal_url(url) {
            return true;
        }

        let allowed = self.allow_list.is_allowed(url);
        if !allowed {
            tracing::warn!(url = %url, "Blocked navigation outside the allow-list");
        }
        allowed
    }

    /// Record a committed navigation. Locations outside the allow-list (the
    /// blank start page included) are never recorded or persisted.
    pub fn on_navigated(&self, tab_id: &str, url: &str) -> Result<Tab> {
        if !self.allow_list.is_allowed(url) {
            tracing::debug!(tab_id = %tab_id, url = %url, "Not recording location");
            return Ok(self.session_manager.get_tab(tab_id)?);
        }

        Ok(self.session_manager.on_navigated(tab_id, url.to_string())?)
    }

    /// Feed a message-channel payload from a tab. Returns true when the
    /// reconnect affordance should now be shown.
    pub fn on_host_message(&self, tab_id: &str, payload: &str) -> bool {
        match self.session_manager.on_host_message(tab_id, payload) {
            Ok(Some(HostMessage::Disconnected)) => self.session_manager.needs_reconnect(),
            Ok(None) => false,
            Err(e) => {
                // Late delivery from a host whose tab is already closed
                tracing::debug!(tab_id = %tab_id, error = %e, "Dropped host message");
                false
            }
        }
    }

    pub fn needs_reconnect(&self) -> bool {
        self.session_manager.needs_reconnect()
    }

    /// Manual recovery: reload the active tab's host and optimistically mark
    /// it connected. Returns false when no host is mounted for the active tab.
    pub fn reconnect(&self) -> Result<bool> {
        let Some(tab_id) = self.session_manager.active_tab_id() else {
            return Ok(false);
        };

        let Some(host) = self.hosts.get(&tab_id) else {
            tracing::warn!(tab_id = %tab_id, "No rendering host mounted for reconnect");
            return Ok(false);
        };

        host.reload()?;
        self.session_manager.mark_reconnected(&tab_id)?;

        tracing::info!(tab_id = %tab_id, "Reloaded tab to reconnect");

        Ok(true)
    }

    // === Rendering hosts ===

    pub fn mount_host(&self, tab_id: &str, host: Arc<dyn RenderingHost>) {
        self.hosts.register(tab_id.to_string(), host);
    }

    pub fn unmount_host(&self, tab_id: &str) {
        self.hosts.unregister(tab_id);
    }

    pub fn hosts(&self) -> &HostRegistry {
        &self.hosts
    }

    /// Initialization script for every tab, posting through `bridge`
    pub fn injected_script(&self, bridge: &str) -> String {
        InjectedScript::new(self.config.watchdog.clone())
            .with_bridge(bridge)
            .build()
    }

    // === Lifecycle ===

    /// Subscribe to host lifecycle changes, replacing any earlier subscription
    pub fn attach_lifecycle(&self, events: &LifecycleEvents, initial: AppLifecycle) {
        let subscription = self.session_manager.attach_lifecycle(events, initial);
        *self.lifecycle.lock() = Some(subscription);
    }

    pub fn detach_lifecycle(&self) {
        if self.lifecycle.lock().take().is_some() {
            tracing::debug!("Detached lifecycle subscription");
        }
    }

    pub fn on_backgrounded(&self) {
        self.session_manager.on_backgrounded();
    }

    // === Presentation ===

    pub fn snapshot(&self) -> ShellSnapshot {
        let active_tab_id = self.session_manager.active_tab_id();
        let tabs = self
            .session_manager
            .tabs()
            .into_iter()
            .map(|tab| TabView {
                label: tab.label(),
                connected: tab.is_connected(),
                is_active: active_tab_id.as_deref() == Some(tab.id.as_str()),
                id: tab.id,
                url: tab.url,
                render_key: tab.render_key,
            })
            .collect();

        ShellSnapshot {
            phase: self.session_manager.phase(),
            tabs,
            active_tab_id,
            show_reconnect: self.session_manager.needs_reconnect(),
        }
    }

    // === Config ===

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.session_manager
    }
}

impl Clone for Shell {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            session_manager: self.session_manager.clone(),
            allow_list: Arc::clone(&self.allow_list),
            hosts: self.hosts.clone(),
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }
}

/// The shell's own pages and the blank start page; `data:` and `blob:` are
/// ordinary navigation targets and go through the allow-list
fn is_internal_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.scheme() == "tauri" || parsed.as_str() == BLANK_PAGE,
        Err(_) => false,
    }
}
