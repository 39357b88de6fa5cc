//! Tab Manager
//!
//! Owns the ordered tab collection and the active pointer. Every operation
//! leaves the pointer referencing a member of the collection (or `None` only
//! before the first tab is opened).

use crate::error::TabError;
use crate::state::Connectivity;
use crate::tab::Tab;
use crate::Result;

/// What `close_tab` did, so callers can tear down and mount surfaces
#[derive(Debug, Clone)]
pub struct CloseOutcome {
    /// The tab that was removed
    pub closed: Tab,
    /// A replacement opened because the collection would have been empty
    pub reopened: Option<Tab>,
    /// Active pointer after the close
    pub active_tab_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct TabManager {
    /// Tabs in creation order
    tabs: Vec<Tab>,
    /// Currently foregrounded tab
    active_tab_id: Option<String>,
}

impl TabManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new tab and make it active
    pub fn open_tab(&mut self, url: String) -> Result<Tab> {
        let tab = Tab::new(url)?;

        self.tabs.push(tab.clone());
        self.active_tab_id = Some(tab.id.clone());

        tracing::info!(tab_id = %tab.id, url = %tab.url, "Opened tab");

        Ok(tab)
    }

    pub fn activate(&mut self, tab_id: &str) -> Result<Tab> {
        let tab = self.get(tab_id)?.clone();
        self.active_tab_id = Some(tab.id.clone());

        tracing::debug!(tab_id = %tab_id, "Activated tab");

        Ok(tab)
    }

    /// Remove a tab. If it was active, the last remaining tab in order becomes
    /// active. If nothing remains, a fresh tab on `fallback_url` is opened in
    /// the same call.
    pub fn close_tab(&mut self, tab_id: &str, fallback_url: &str) -> Result<CloseOutcome> {
        let index = self
            .position(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;

        // Validate the replacement before mutating anything
        let replacement = if self.tabs.len() == 1 {
            Some(Tab::new(fallback_url.to_string())?)
        } else {
            None
        };

        let closed = self.tabs.remove(index);
        let was_active = self.active_tab_id.as_deref() == Some(tab_id);

        tracing::info!(tab_id = %tab_id, was_active, "Closed tab");

        let reopened = match replacement {
            Some(tab) => {
                self.tabs.push(tab.clone());
                self.active_tab_id = Some(tab.id.clone());
                tracing::info!(tab_id = %tab.id, url = %tab.url, "Opened replacement tab");
                Some(tab)
            }
            None => {
                if was_active {
                    self.active_tab_id = self.tabs.last().map(|t| t.id.clone());
                }
                None
            }
        };

        Ok(CloseOutcome {
            closed,
            reopened,
            active_tab_id: self.active_tab_id.clone(),
        })
    }

    /// Record a navigation the rendering host has committed
    pub fn navigate(&mut self, tab_id: &str, url: String) -> Result<Tab> {
        let tab = self.get_mut(tab_id)?;
        tab.navigate(url)?;
        Ok(tab.clone())
    }

    /// Returns true if the tab's connectivity changed
    pub fn set_connectivity(&mut self, tab_id: &str, connectivity: Connectivity) -> Result<bool> {
        Ok(self.get_mut(tab_id)?.set_connectivity(connectivity))
    }

    pub fn get(&self, tab_id: &str) -> Result<&Tab> {
        self.tabs
            .iter()
            .find(|t| t.id == tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))
    }

    fn get_mut(&mut self, tab_id: &str) -> Result<&mut Tab> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))
    }

    fn position(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    pub fn contains(&self, tab_id: &str) -> bool {
        self.position(tab_id).is_some()
    }

    /// Tabs in display order
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_tab_id(&self) -> Option<&str> {
        self.active_tab_id.as_deref()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id
            .as_deref()
            .and_then(|id| self.tabs.iter().find(|t| t.id == id))
    }

    pub fn is_active(&self, tab_id: &str) -> bool {
        self.active_tab_id.as_deref() == Some(tab_id)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}
