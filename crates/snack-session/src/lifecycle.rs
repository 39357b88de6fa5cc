//! Host application lifecycle
//!
//! The platform reports foreground/background changes through an injected
//! `LifecycleEvents` source. Subscribers hold a `LifecycleSubscription`;
//! dropping it unsubscribes.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLifecycle {
    /// Foregrounded and receiving input
    Active,
    /// Visible but not receiving input
    Inactive,
    /// Hidden or about to exit
    Background,
}

impl AppLifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppLifecycle::Active => "active",
            AppLifecycle::Inactive => "inactive",
            AppLifecycle::Background => "background",
        }
    }
}

impl std::fmt::Display for AppLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Edge detector for the foreground -> background transition
#[derive(Debug, Clone)]
pub struct LifecycleTracker {
    current: AppLifecycle,
}

impl LifecycleTracker {
    pub fn new(initial: AppLifecycle) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> AppLifecycle {
        self.current
    }

    /// Record the next state. Returns true only for `Active -> Background`.
    pub fn transition(&mut self, next: AppLifecycle) -> bool {
        let fired = self.current == AppLifecycle::Active && next == AppLifecycle::Background;
        self.current = next;
        fired
    }
}

type Listener = Arc<dyn Fn(AppLifecycle) + Send + Sync>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
}

#[derive(Clone, Default)]
pub struct LifecycleEvents {
    table: Arc<RwLock<ListenerTable>>,
}

impl LifecycleEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> LifecycleSubscription
    where
        F: Fn(AppLifecycle) + Send + Sync + 'static,
    {
        let mut table = self.table.write();
        let id = table.next_id;
        table.next_id += 1;
        table.listeners.insert(id, Arc::new(listener));

        LifecycleSubscription {
            id,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Deliver `state` to every current subscriber, in subscription order
    pub fn emit(&self, state: AppLifecycle) {
        // Listeners run outside the lock so they may subscribe or unsubscribe
        let listeners: Vec<Listener> = self.table.read().listeners.values().cloned().collect();

        tracing::debug!(state = %state, listeners = listeners.len(), "Lifecycle change");

        for listener in listeners {
            listener(state);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.table.read().listeners.len()
    }
}

/// Scoped subscription; unsubscribes on drop
pub struct LifecycleSubscription {
    id: u64,
    table: Weak<RwLock<ListenerTable>>,
}

impl Drop for LifecycleSubscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table.write().listeners.remove(&self.id);
        }
    }
}
