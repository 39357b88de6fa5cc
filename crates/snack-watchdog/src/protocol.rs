//! Host side of the watchdog message channel

use serde::{Deserialize, Serialize};

/// Literal payload the in-page poll posts when the liveness marker is missing
pub const DISCONNECTED_SIGNAL: &str = "SNACK_DISCONNECTED";

/// Fixed liveness poll period
pub const POLL_INTERVAL_MS: u64 = 4000;

/// Messages the host understands on a tab's message channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostMessage {
    Disconnected,
}

impl HostMessage {
    /// Parse a raw payload. Signals are literals and match exactly; anything
    /// else is `None` and must be ignored by the caller.
    pub fn parse(payload: &str) -> Option<Self> {
        match payload {
            DISCONNECTED_SIGNAL => Some(HostMessage::Disconnected),
            other => {
                tracing::trace!(payload = %other, "Ignoring unknown host message");
                None
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HostMessage::Disconnected => DISCONNECTED_SIGNAL,
        }
    }
}

impl std::fmt::Display for HostMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_disconnected() {
        assert_eq!(
            HostMessage::parse("SNACK_DISCONNECTED"),
            Some(HostMessage::Disconnected)
        );
    }

    #[test]
    fn test_padded_signal_is_not_the_literal() {
        assert_eq!(HostMessage::parse(" SNACK_DISCONNECTED\n"), None);
        assert_eq!(HostMessage::parse("SNACK_DISCONNECTED "), None);
        assert_eq!(HostMessage::parse("\"SNACK_DISCONNECTED\""), None);
    }

    #[test]
    fn test_unknown_payloads_are_ignored() {
        assert_eq!(HostMessage::parse(""), None);
        assert_eq!(HostMessage::parse("snack_disconnected"), None);
        assert_eq!(HostMessage::parse("SNACK_CONNECTED"), None);
        assert_eq!(HostMessage::parse(r#"{"kind":"ready"}"#), None);
    }

    #[test]
    fn test_signal_round_trips_through_display() {
        let text = HostMessage::Disconnected.to_string();
        assert_eq!(HostMessage::parse(&text), Some(HostMessage::Disconnected));
    }
}
