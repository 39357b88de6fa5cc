//! Application state management
use snack_core::{AppLifecycle, Config, LifecycleEvents, Result, Shell, ShellSnapshot};

/// Shared application state
pub struct AppState {
    shell: Shell,
    lifecycle: LifecycleEvents,
}

impl AppState {
    pub fn new() -> Result<Self> {
        let config = Config::load();
        config.validate()?;

        let runtime = tauri::async_runtime::handle();
        let shell = Shell::open_with_runtime(config, runtime.inner())?;

        Ok(Self {
            shell,
            lifecycle: LifecycleEvents::new(),
        })
    }

    pub fn initialize(&self) -> Result<()> {
        self.shell.attach_lifecycle(&self.lifecycle, AppLifecycle::Active);
        self.shell.initialize()?;
        Ok(())
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn snapshot(&self) -> ShellSnapshot {
        self.shell.snapshot()
    }

    /// Forward a platform lifecycle change to subscribers
    pub fn lifecycle_changed(&self, state: AppLifecycle) {
        self.lifecycle.emit(state);
    }
}
