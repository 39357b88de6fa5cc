//! In-page side of the watchdog
//!
//! The injected script does two jobs:
//! - polls the liveness marker every `poll_interval_ms` and posts the
//!   disconnect signal through the host bridge on every failed poll
//! - keeps navigation inside the tab: `window.open` and `target="_blank"`
//!   link clicks become in-place navigations the host can intercept

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::protocol::{DISCONNECTED_SIGNAL, POLL_INTERVAL_MS};

/// Bridge for a plain wry webview (`with_ipc_handler`)
pub const WRY_IPC_BRIDGE: &str = "function (payload) { window.ipc.postMessage(payload); }";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Liveness poll period in milliseconds
    pub poll_interval_ms: u64,
    /// Global object the hosted runtime publishes (`window[marker_object]`)
    pub marker_object: String,
    /// Boolean property on that object that must be truthy
    pub marker_flag: String,
}

impl WatchdogConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: POLL_INTERVAL_MS,
            marker_object: "SnackRuntime".to_string(),
            marker_flag: "connected".to_string(),
        }
    }
}

/// Builder for the initialization script injected into every tab
#[derive(Debug, Clone)]
pub struct InjectedScript {
    config: WatchdogConfig,
    bridge: String,
}

impl InjectedScript {
    pub fn new(config: WatchdogConfig) -> Self {
        Self {
            config,
            bridge: WRY_IPC_BRIDGE.to_string(),
        }
    }

    /// Replace the JS function expression used to post a payload to the host.
    /// It is called with a single string argument.
    pub fn with_bridge(mut self, bridge: impl Into<String>) -> Self {
        self.bridge = bridge.into();
        self
    }

    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    pub fn build(&self) -> String {
        let object = js_string(&self.config.marker_object);
        let flag = js_string(&self.config.marker_flag);
        let signal = js_string(DISCONNECTED_SIGNAL);

        format!(
            r#"(function () {{
  if (window.__snackWatchdogInstalled) return;
  window.__snackWatchdogInstalled = true;

  var post = {bridge};

  function checkConnection() {{
    var marker = window[{object}];
    if (!marker || !marker[{flag}]) {{
      try {{ post({signal}); }} catch (e) {{}}
    }}
  }}
  setInterval(checkConnection, {interval});

  window.open = function (url) {{
    if (url) {{ window.location.href = String(url); }}
    return null;
  }};

  document.addEventListener('click', function (e) {{
    var target = e.target;
    var link = target && target.closest ? target.closest('a[target="_blank"]') : null;
    if (!link || !link.href) return;
    e.preventDefault();
    window.location.href = link.href;
  }}, true);
}})();
true;
"#,
            bridge = self.bridge,
            object = object,
            flag = flag,
            signal = signal,
            interval = self.config.poll_interval_ms,
        )
    }
}

impl Default for InjectedScript {
    fn default() -> Self {
        Self::new(WatchdogConfig::default())
    }
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}
