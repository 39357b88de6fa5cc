//! Snack Shell Connectivity Watchdog
//!
//! The hosted editor is expected to publish a liveness marker once its
//! runtime is up. A script injected into every tab polls for that marker on a
//! fixed interval and posts a single `DISCONNECTED` signal per failed poll.
//! The host side only has to recognise that one signal; recovery is a manual
//! reload.

mod protocol;
mod script;

pub use protocol::{HostMessage, DISCONNECTED_SIGNAL, POLL_INTERVAL_MS};
pub use script::{InjectedScript, WatchdogConfig, WRY_IPC_BRIDGE};
