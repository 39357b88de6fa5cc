//! Rendering host seam
//!
//! Each tab is shown by a rendering host (a webview) owned by the
//! presentation layer. The presentation registers a host when it mounts a
//! tab's surface and removes it on unmount; the core only ever asks a host
//! to load or reload.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::HostError;

pub trait RenderingHost: Send + Sync {
    fn load(&self, url: &str) -> Result<(), HostError>;

    /// Full reload of the current document
    fn reload(&self) -> Result<(), HostError>;
}

/// Map of tab id -> mounted rendering host
#[derive(Default)]
pub struct HostRegistry {
    hosts: Arc<RwLock<HashMap<String, Arc<dyn RenderingHost>>>>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tab_id: String, host: Arc<dyn RenderingHost>) {
        tracing::debug!(tab_id = %tab_id, "Registered rendering host");
        self.hosts.write().insert(tab_id, host);
    }

    pub fn unregister(&self, tab_id: &str) -> Option<Arc<dyn RenderingHost>> {
        let removed = self.hosts.write().remove(tab_id);
        if removed.is_some() {
            tracing::debug!(tab_id = %tab_id, "Unregistered rendering host");
        }
        removed
    }

    pub fn get(&self, tab_id: &str) -> Option<Arc<dyn RenderingHost>> {
        self.hosts.read().get(tab_id).cloned()
    }

    pub fn contains(&self, tab_id: &str) -> bool {
        self.hosts.read().contains_key(tab_id)
    }

    pub fn len(&self) -> usize {
        self.hosts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.read().is_empty()
    }
}

impl Clone for HostRegistry {
    fn clone(&self) -> Self {
        Self {
            hosts: Arc::clone(&self.hosts),
        }
    }
}
