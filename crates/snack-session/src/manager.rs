//! Session Manager
//!
//! Single owner of the tab collection and the active pointer. Each operation
//! runs under one write lock, so no observer ever sees an empty collection or
//! a dangling pointer once the manager is ready.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use snack_tabs::{CloseOutcome, Connectivity, Tab, TabManager};
use snack_watchdog::HostMessage;

use crate::error::SessionError;
use crate::lifecycle::{AppLifecycle, LifecycleEvents, LifecycleSubscription, LifecycleTracker};
use crate::persistence::LastLocation;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting for the last location to load; no surfaces are rendered
    Loading,
    /// At least one tab exists and the active pointer is valid
    Ready,
}

struct ManagerState {
    tabs: TabManager,
    phase: Phase,
}

pub struct SessionManager {
    state: Arc<RwLock<ManagerState>>,
    last_location: LastLocation,
    default_url: Arc<str>,
}

impl SessionManager {
    pub fn new(last_location: LastLocation, default_url: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ManagerState {
                tabs: TabManager::new(),
                phase: Phase::Loading,
            })),
            last_location,
            default_url: Arc::from(default_url.into()),
        }
    }

    /// Seed the first tab from the last visited location (or the default url)
    /// and leave the loading phase. Calling it again returns the active tab.
    pub fn initialize(&self) -> Result<Tab> {
        if let Some(tab) = self.ready_active_tab() {
            return Ok(tab);
        }

        let url = self
            .last_location
            .load()
            .unwrap_or_else(|| self.default_url.to_string());

        let mut state = self.state.write();
        if state.phase == Phase::Ready {
            if let Some(tab) = state.tabs.active_tab() {
                return Ok(tab.clone());
            }
        }

        let tab = state.tabs.open_tab(url)?;
        state.phase = Phase::Ready;

        tracing::info!(tab_id = %tab.id, url = %tab.url, "Initialized session manager");

        Ok(tab)
    }

    fn ready_active_tab(&self) -> Option<Tab> {
        let state = self.state.read();
        match state.phase {
            Phase::Ready => state.tabs.active_tab().cloned(),
            Phase::Loading => None,
        }
    }

    /// Open a tab on the default url at the end of the strip and focus it
    pub fn open_new_session(&self) -> Result<Tab> {
        let mut state = self.state.write();
        ensure_ready(&state)?;
        Ok(state.tabs.open_tab(self.default_url.to_string())?)
    }

    pub fn activate(&self, tab_id: &str) -> Result<Tab> {
        let mut state = self.state.write();
        ensure_ready(&state)?;
        Ok(state.tabs.activate(tab_id)?)
    }

    /// Close a tab; see `TabManager::close_tab` for the pointer rules. Never
    /// leaves the collection empty.
    pub fn close_session(&self, tab_id: &str) -> Result<CloseOutcome> {
        let mut state = self.state.write();
        ensure_ready(&state)?;
        Ok(state.tabs.close_tab(tab_id, &self.default_url)?)
    }

    /// The rendering host committed a navigation. The active tab's location is
    /// written through to persistence.
    pub fn on_navigated(&self, tab_id: &str, url: String) -> Result<Tab> {
        let (tab, is_active) = {
            let mut state = self.state.write();
            let tab = state.tabs.navigate(tab_id, url)?;
            (tab, state.tabs.is_active(tab_id))
        };

        if is_active {
            self.last_location.save(&tab.url);
        }

        Ok(tab)
    }

    /// The host went from foreground to background: persist the active tab's
    /// location. No-op without an active tab.
    pub fn on_backgrounded(&self) {
        let url = self.state.read().tabs.active_tab().map(|t| t.url.clone());

        match url {
            Some(url) => {
                tracing::debug!(url = %url, "Saving active location on background");
                self.last_location.save(&url);
            }
            None => tracing::debug!("Backgrounded without an active tab"),
        }
    }

    /// Handle a payload from a tab's message channel. Unknown payloads are
    /// ignored and return `None`.
    pub fn on_host_message(&self, tab_id: &str, payload: &str) -> Result<Option<HostMessage>> {
        let Some(message) = HostMessage::parse(payload) else {
            return Ok(None);
        };

        match message {
            HostMessage::Disconnected => {
                let changed = self
                    .state
                    .write()
                    .tabs
                    .set_connectivity(tab_id, Connectivity::Disconnected)?;
                if changed {
                    tracing::warn!(tab_id = %tab_id, "Hosted runtime disconnected");
                }
            }
        }

        Ok(Some(message))
    }

    /// Optimistically mark a tab connected after its host was told to reload
    pub fn mark_reconnected(&self, tab_id: &str) -> Result<()> {
        self.state
            .write()
            .tabs
            .set_connectivity(tab_id, Connectivity::Connected)?;
        Ok(())
    }

    /// True when the reconnect affordance should be shown
    pub fn needs_reconnect(&self) -> bool {
        self.state
            .read()
            .tabs
            .active_tab()
            .map(|t| !t.is_connected())
            .unwrap_or(false)
    }

    /// Subscribe `on_backgrounded` to `events`, firing only on the
    /// `Active -> Background` edge. Dropping the returned guard unsubscribes.
    pub fn attach_lifecycle(
        &self,
        events: &LifecycleEvents,
        initial: AppLifecycle,
    ) -> LifecycleSubscription {
        let manager = self.clone();
        let tracker = Mutex::new(LifecycleTracker::new(initial));

        events.subscribe(move |next| {
            let fired = tracker.lock().transition(next);
            if fired {
                manager.on_backgrounded();
            }
        })
    }

    pub fn phase(&self) -> Phase {
        self.state.read().phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == Phase::Ready
    }

    /// Tabs in strip order
    pub fn tabs(&self) -> Vec<Tab> {
        self.state.read().tabs.tabs().to_vec()
    }

    pub fn get_tab(&self, tab_id: &str) -> Result<Tab> {
        Ok(self.state.read().tabs.get(tab_id)?.clone())
    }

    pub fn active_tab(&self) -> Option<Tab> {
        self.state.read().tabs.active_tab().cloned()
    }

    pub fn active_tab_id(&self) -> Option<String> {
        self.state.read().tabs.active_tab_id().map(str::to_string)
    }

    pub fn default_url(&self) -> &str {
        &self.default_url
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            last_location: self.last_location.clone(),
            default_url: Arc::clone(&self.default_url),
        }
    }
}

fn ensure_ready(state: &ManagerState) -> Result<()> {
    match state.phase {
        Phase::Ready => Ok(()),
        Phase::Loading => Err(SessionError::NotReady),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::LAST_LOCATION_KEY;
    use snack_storage::{Database, KeyValueStore, StorageError};

    const DEFAULT_URL: &str = "https://expo.dev/accounts/flylegion/snacks";

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> snack_storage::Result<Option<String>> {
            Err(StorageError::Unavailable("offline".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> snack_storage::Result<()> {
            Err(StorageError::Unavailable("offline".to_string()))
        }
    }

    fn manager() -> (SessionManager, Database) {
        let db = Database::open_in_memory().unwrap();
        let manager = SessionManager::new(LastLocation::new(Arc::new(db.clone())), DEFAULT_URL);
        (manager, db)
    }

    fn saved(db: &Database) -> Option<String> {
        db.get_setting(LAST_LOCATION_KEY).unwrap()
    }

    #[test]
    fn test_initialize_with_default_url() {
        let (manager, _db) = manager();
        assert_eq!(manager.phase(), Phase::Loading);

        let tab = manager.initialize().unwrap();

        assert!(manager.is_ready());
        assert_eq!(tab.url, DEFAULT_URL);
        assert_eq!(manager.tabs().len(), 1);
        assert_eq!(manager.active_tab_id().as_deref(), Some(tab.id.as_str()));
    }

    #[test]
    fn test_initialize_restores_last_location() {
        let (manager, db) = manager();
        db.set_setting(LAST_LOCATION_KEY, "https://expo.dev/accounts/me/snacks/abc")
            .unwrap();

        let tab = manager.initialize().unwrap();

        assert_eq!(tab.url, "https://expo.dev/accounts/me/snacks/abc");
        assert_eq!(manager.tabs().len(), 1);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (manager, _db) = manager();
        let first = manager.initialize().unwrap();
        let second = manager.initialize().unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(manager.tabs().len(), 1);
    }

    #[test]
    fn test_operations_wait_for_initialize() {
        let (manager, _db) = manager();

        assert!(matches!(
            manager.open_new_session(),
            Err(SessionError::NotReady)
        ));
        assert!(matches!(
            manager.close_session("anything"),
            Err(SessionError::NotReady)
        ));
        assert!(manager.tabs().is_empty());
    }

    #[test]
    fn test_open_new_session_uses_default_url() {
        let (manager, db) = manager();
        db.set_setting(LAST_LOCATION_KEY, "https://snack.expo.dev/@me/x")
            .unwrap();
        manager.initialize().unwrap();

        let tab = manager.open_new_session().unwrap();

        assert_eq!(tab.url, DEFAULT_URL);
        assert_eq!(manager.tabs().last().unwrap().id, tab.id);
        assert_eq!(manager.active_tab_id().as_deref(), Some(tab.id.as_str()));
    }

    #[test]
    fn test_close_active_middle_tab_selects_last() {
        let (manager, _db) = manager();
        let a = manager.initialize().unwrap();
        let b = manager.open_new_session().unwrap();
        let c = manager.open_new_session().unwrap();
        manager.activate(&b.id).unwrap();

        manager.close_session(&b.id).unwrap();

        assert_eq!(manager.active_tab_id().as_deref(), Some(c.id.as_str()));
        let ids: Vec<String> = manager.tabs().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[test]
    fn test_close_sole_tab_reopens_fresh_default() {
        let (manager, db) = manager();
        db.set_setting(LAST_LOCATION_KEY, "https://snack.expo.dev/@me/x")
            .unwrap();
        let only = manager.initialize().unwrap();

        let outcome = manager.close_session(&only.id).unwrap();
        let tabs = manager.tabs();

        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].url, DEFAULT_URL);
        assert_ne!(tabs[0].id, only.id);
        assert_eq!(outcome.reopened.map(|t| t.id), Some(tabs[0].id.clone()));
    }

    #[test]
    fn test_navigation_of_active_tab_is_persisted() {
        let (manager, db) = manager();
        let tab = manager.initialize().unwrap();

        manager
            .on_navigated(&tab.id, "https://expo.dev/foo".to_string())
            .unwrap();

        assert_eq!(saved(&db).as_deref(), Some("https://expo.dev/foo"));
        assert_eq!(manager.get_tab(&tab.id).unwrap().url, "https://expo.dev/foo");
    }

    #[test]
    fn test_navigation_of_background_tab_is_not_persisted() {
        let (manager, db) = manager();
        let first = manager.initialize().unwrap();
        manager.open_new_session().unwrap();

        manager
            .on_navigated(&first.id, "https://expo.dev/background".to_string())
            .unwrap();

        assert_eq!(saved(&db), None);
        assert_eq!(
            manager.get_tab(&first.id).unwrap().url,
            "https://expo.dev/background"
        );
    }

    #[test]
    fn test_navigation_for_closed_tab_is_rejected() {
        let (manager, db) = manager();
        manager.initialize().unwrap();

        assert!(manager
            .on_navigated("gone", "https://expo.dev/x".to_string())
            .is_err());
        assert_eq!(saved(&db), None);
    }

    #[test]
    fn test_backgrounded_saves_active_location() {
        let (manager, db) = manager();
        manager.on_backgrounded();
        assert_eq!(saved(&db), None);

        let first = manager.initialize().unwrap();
        let second = manager.open_new_session().unwrap();
        manager
            .on_navigated(&first.id, "https://expo.dev/first".to_string())
            .unwrap();
        manager
            .on_navigated(&second.id, "https://expo.dev/second".to_string())
            .unwrap();
        manager.activate(&first.id).unwrap();

        manager.on_backgrounded();

        assert_eq!(saved(&db).as_deref(), Some("https://expo.dev/first"));
    }

    #[test]
    fn test_persistence_failures_are_not_fatal() {
        let manager = SessionManager::new(LastLocation::new(Arc::new(FailingStore)), DEFAULT_URL);

        let tab = manager.initialize().unwrap();
        assert_eq!(tab.url, DEFAULT_URL);

        manager
            .on_navigated(&tab.id, "https://expo.dev/foo".to_string())
            .unwrap();
        manager.on_backgrounded();

        assert_eq!(manager.active_tab().unwrap().url, "https://expo.dev/foo");
    }

    #[test]
    fn test_disconnect_signal_marks_tab() {
        let (manager, _db) = manager();
        let first = manager.initialize().unwrap();
        let second = manager.open_new_session().unwrap();

        let message = manager
            .on_host_message(&first.id, "SNACK_DISCONNECTED")
            .unwrap();
        assert_eq!(message, Some(HostMessage::Disconnected));
        assert!(!manager.get_tab(&first.id).unwrap().is_connected());
        // Inactive tab disconnected: no affordance yet
        assert!(!manager.needs_reconnect());

        manager.activate(&first.id).unwrap();
        assert!(manager.needs_reconnect());

        manager.mark_reconnected(&first.id).unwrap();
        assert!(!manager.needs_reconnect());
        assert!(manager.get_tab(&second.id).unwrap().is_connected());
    }

    #[test]
    fn test_unknown_host_message_is_ignored() {
        let (manager, _db) = manager();
        let tab = manager.initialize().unwrap();

        assert_eq!(manager.on_host_message(&tab.id, "HELLO").unwrap(), None);
        assert_eq!(manager.on_host_message("gone", "HELLO").unwrap(), None);
        assert!(manager.get_tab(&tab.id).unwrap().is_connected());
    }

    #[test]
    fn test_lifecycle_subscription_saves_on_background_edge() {
        let (manager, db) = manager();
        let events = LifecycleEvents::new();
        let subscription = manager.attach_lifecycle(&events, AppLifecycle::Active);
        let tab = manager.initialize().unwrap();
        db.set_setting(LAST_LOCATION_KEY, "stale").unwrap();

        events.emit(AppLifecycle::Inactive);
        events.emit(AppLifecycle::Background);
        assert_eq!(saved(&db).as_deref(), Some("stale"));

        events.emit(AppLifecycle::Active);
        events.emit(AppLifecycle::Background);
        assert_eq!(saved(&db).as_deref(), Some(tab.url.as_str()));

        drop(subscription);
        assert_eq!(events.listener_count(), 0);
    }
}
