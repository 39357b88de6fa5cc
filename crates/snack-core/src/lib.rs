//! Snack Shell Core
//!
//! Coordination layer for the shell. Rust owns every piece of state; each
//! tab's webview is a rendering host that only loads, reloads and reports.

mod config;
mod error;
mod host;
mod shell;

pub use config::Config;
pub use error::{CoreError, HostError};
pub use host::{HostRegistry, RenderingHost};
pub use shell::{Shell, ShellSnapshot, TabView};

// Re-export core components
pub use snack_policy::AllowList;
pub use snack_session::{
    AppLifecycle, LastLocation, LifecycleEvents, Phase, SessionError, SessionManager,
};
pub use snack_storage::{Database, KeyValueStore, StorageError};
pub use snack_tabs::{CloseOutcome, Connectivity, Tab, TabError};
pub use snack_watchdog::{HostMessage, InjectedScript, WatchdogConfig};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
