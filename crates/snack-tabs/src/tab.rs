//! Tab data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TabError;
use crate::state::Connectivity;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    /// Unique identifier, stable for the tab's lifetime
    pub id: String,
    /// Current location, as last confirmed by the rendering host
    pub url: String,
    /// Mount key for the rendering host, distinct from `id`
    pub render_key: String,
    /// Liveness of the hosted runtime, maintained by the watchdog
    pub connectivity: Connectivity,
    /// When the tab was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Tab {
    pub fn new(url: String) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(TabError::InvalidUrl("URL cannot be empty".to_string()));
        }

        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            url,
            render_key: format!("webview-{}", Uuid::new_v4()),
            connectivity: Connectivity::Connected,
            created_at: now,
            updated_at: now,
        })
    }

    /// Record a navigation confirmed by the rendering host
    pub fn navigate(&mut self, url: String) -> Result<()> {
        if url.trim().is_empty() {
            return Err(TabError::InvalidUrl("URL cannot be empty".to_string()));
        }

        self.url = url;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Returns true if the state actually changed
    pub fn set_connectivity(&mut self, connectivity: Connectivity) -> bool {
        if self.connectivity == connectivity {
            return false;
        }

        tracing::debug!(
            tab_id = %self.id,
            from = %self.connectivity,
            to = %connectivity,
            "Tab connectivity transition"
        );

        self.connectivity = connectivity;
        self.updated_at = Utc::now();
        true
    }

    pub fn is_connected(&self) -> bool {
        self.connectivity.is_connected()
    }

    /// Short tab-strip label: "Tab " followed by the last four id characters
    pub fn label(&self) -> String {
        let tail: String = {
            let chars: Vec<char> = self.id.chars().collect();
            chars[chars.len().saturating_sub(4)..].iter().collect()
        };
        format!("Tab {}", tail)
    }
}
