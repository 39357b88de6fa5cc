//! Tab connectivity
//!
//! ```text
//! Connected
//!   ↓ DISCONNECTED signal from the in-page watchdog
//! Disconnected
//!   ↓ manual reconnect (reload issued, optimistic)
//! Connected
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Healthy, or not yet known to be unhealthy
    #[default]
    Connected,
    /// The hosted runtime stopped answering the liveness poll
    Disconnected,
}

impl Connectivity {
    pub fn is_connected(&self) -> bool {
        matches!(self, Connectivity::Connected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Connectivity::Connected => "connected",
            Connectivity::Disconnected => "disconnected",
        }
    }
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Connectivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "connected" => Ok(Connectivity::Connected),
            "disconnected" => Ok(Connectivity::Disconnected),
            _ => Err(format!("Unknown connectivity: {}", s)),
        }
    }
}
